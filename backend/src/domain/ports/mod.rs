//! Domain ports for the hexagonal boundary.
//!
//! Driven ports (`*Repository`, [`RealtimePublisher`]) are implemented by the
//! outbound adapters. Driving ports (`*Command`, `*Query`) are implemented by
//! the domain services and consumed by the HTTP, WebSocket and CLI adapters.

mod macros;
pub(crate) use macros::define_port_error;

mod coursework_command;
mod coursework_repository;
mod dropout_command;
mod dropout_query;
mod dropout_repository;
mod dues_command;
mod dues_query;
mod leaderboard_query;
mod leaderboard_repository;
mod ledger_repository;
mod notification_command;
mod notification_query;
mod notification_repository;
mod payment_repository;
mod payments_command;
mod payments_query;
mod realtime_publisher;
mod roster_command;
mod roster_query;
mod roster_repository;
mod settings_command;
mod settings_query;
mod settings_repository;

#[cfg(test)]
pub use coursework_command::MockCourseworkCommand;
pub use coursework_command::{
    CourseworkCommand, CreateTestRequest, PublishPdfRequest, PublishResourceRequest,
    RecordMarkRequest,
};
#[cfg(test)]
pub use coursework_repository::MockCourseworkRepository;
pub use coursework_repository::{
    CourseworkRepository, CourseworkRepositoryError, FixtureCourseworkRepository,
};
pub use dropout_command::DropoutCommand;
#[cfg(test)]
pub use dropout_command::MockDropoutCommand;
pub use dropout_query::DropoutQuery;
#[cfg(test)]
pub use dropout_query::MockDropoutQuery;
#[cfg(test)]
pub use dropout_repository::MockDropoutRepository;
pub use dropout_repository::{
    DropoutRepository, DropoutRepositoryError, DropoutSettlement, FixtureDropoutRepository,
};
#[cfg(test)]
pub use dues_command::MockDuesCommand;
pub use dues_command::{AddDuesRequest, DuesCommand, UpdateDueRequest};
pub use dues_query::DuesQuery;
#[cfg(test)]
pub use dues_query::MockDuesQuery;
pub use leaderboard_query::LeaderboardQuery;
#[cfg(test)]
pub use leaderboard_query::MockLeaderboardQuery;
#[cfg(test)]
pub use leaderboard_repository::MockLeaderboardRepository;
pub use leaderboard_repository::{
    FixtureLeaderboardRepository, LeaderboardRepository, LeaderboardRepositoryError,
};
#[cfg(test)]
pub use ledger_repository::MockLedgerRepository;
pub use ledger_repository::{
    BillableStudent, BillingScope, DueChanges, FixtureLedgerRepository, LedgerRepository,
    LedgerRepositoryError,
};
#[cfg(test)]
pub use notification_command::MockNotificationCommand;
pub use notification_command::NotificationCommand;
#[cfg(test)]
pub use notification_query::MockNotificationQuery;
pub use notification_query::NotificationQuery;
#[cfg(test)]
pub use notification_repository::MockNotificationRepository;
pub use notification_repository::{
    FixtureNotificationRepository, NotificationRepository, NotificationRepositoryError,
};
#[cfg(test)]
pub use payment_repository::MockPaymentRepository;
pub use payment_repository::{
    FixturePaymentRepository, PaymentRepository, PaymentRepositoryError,
};
#[cfg(test)]
pub use payments_command::MockPaymentsCommand;
pub use payments_command::{PaymentsCommand, SubmitPaymentRequest};
#[cfg(test)]
pub use payments_query::MockPaymentsQuery;
pub use payments_query::PaymentsQuery;
#[cfg(test)]
pub use realtime_publisher::MockRealtimePublisher;
pub use realtime_publisher::{FixtureRealtimePublisher, RealtimePublisher};
#[cfg(test)]
pub use roster_command::MockRosterCommand;
pub use roster_command::RosterCommand;
#[cfg(test)]
pub use roster_query::MockRosterQuery;
pub use roster_query::RosterQuery;
#[cfg(test)]
pub use roster_repository::MockRosterRepository;
pub use roster_repository::{
    FixtureRosterRepository, RosterRepository, RosterRepositoryError, StudentRegistration,
};
#[cfg(test)]
pub use settings_command::MockSettingsCommand;
pub use settings_command::{SettingsCommand, UpdateUpiRequest};
#[cfg(test)]
pub use settings_query::MockSettingsQuery;
pub use settings_query::SettingsQuery;
#[cfg(test)]
pub use settings_repository::MockSettingsRepository;
pub use settings_repository::{
    FixtureSettingsRepository, SettingsRepository, SettingsRepositoryError,
};
