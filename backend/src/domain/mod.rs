//! Domain primitives, services and ports.
//!
//! Purpose: model the tutoring centre's records (students, dues, payments,
//! marks, notifications, dropout requests) and the business rules over them
//! independently of HTTP and SQL. Adapters reach the services through the
//! driving ports in [`ports`]; services reach storage through driven ports.
//!
//! Public surface:
//! - Error (alias to `error::Error`): transport agnostic failure payload.
//! - ClassKey / Audience: class catalogue and fee table.
//! - FeeEngine: monthly dues with month-amount locking.
//! - RosterService: registration and two-phase roll resequencing.
//! - LeaderboardService, PaymentService, DropoutService, CourseworkService,
//!   NotificationService, SettingsService: the remaining use cases.

/// Implements `Display` and `FromStr` for enums stored as lowercase strings.
macro_rules! storage_enum {
    ($name:ident { $($variant:ident),+ $(,)? }) => {
        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = String;

            fn from_str(value: &str) -> Result<Self, Self::Err> {
                [$(Self::$variant),+]
                    .into_iter()
                    .find(|candidate| candidate.as_str() == value)
                    .ok_or_else(|| format!("unknown {}: {value}", stringify!($name)))
            }
        }
    };
}

pub mod class_catalog;
pub mod coursework;
pub mod coursework_service;
pub mod dropout;
pub mod dropout_service;
pub mod error;
pub mod fee_engine;
pub mod ids;
pub mod leaderboard;
pub mod leaderboard_service;
pub mod ledger;
pub mod notification_service;
pub mod notifications;
pub mod payment_service;
pub mod ports;
pub mod roster;
pub mod roster_service;
pub mod settings;
pub mod settings_service;
pub mod student;
pub mod trace_id;

#[cfg(test)]
pub(crate) mod test_support;

pub use self::class_catalog::{Audience, ClassKey, UnknownClassKey, fee_amount_for_class};
pub use self::coursework::{ClassTest, CourseworkValidationError, Mark, Pdf, Resource};
pub use self::coursework_service::CourseworkService;
pub use self::dropout::{DropoutAlreadyProcessed, DropoutRequest, DropoutStatus};
pub use self::dropout_service::DropoutService;
pub use self::error::{Error, ErrorCode, ErrorValidationError, TRACE_ID_HEADER};
pub use self::fee_engine::FeeEngine;
pub use self::ids::{
    DropoutId, DueId, NotificationId, PaymentId, PdfId, ResourceId, StudentId, TestId,
};
pub use self::leaderboard::{LeaderboardEntry, MarkTotals, rank_totals};
pub use self::leaderboard_service::LeaderboardService;
pub use self::ledger::{
    Due, DueDraft, DuesBatchOutcome, FeeStatus, InvalidMonthLabel, MonthLabel,
    MonthlyDuesOutcome, Payment, PaymentAlreadyProcessed, PaymentMethod, PaymentStatus,
    due_notification_message,
};
pub use self::notification_service::{DEFAULT_RETENTION_DAYS, NotificationService};
pub use self::notifications::{EventKind, EventPayload, Notification, RealtimeEvent, Recipient};
pub use self::payment_service::PaymentService;
pub use self::roster::{
    RemovedStudent, ResequencePlan, RollAssignment, next_roll_number,
};
pub use self::roster_service::RosterService;
pub use self::settings::{
    DEFAULT_MONTHLY_DUE_AMOUNT, SettingKey, UpiSettings, parse_monthly_amount,
};
pub use self::settings_service::SettingsService;
pub use self::student::{
    NewStudent, Student, StudentValidationError, registration_number, registration_serial,
};
pub use self::trace_id::TraceId;
