//! PostgreSQL persistence adapters using Diesel ORM.
//!
//! Each adapter implements one driven port from `crate::domain::ports` on top
//! of a shared `bb8` pool of `diesel-async` connections. Row structs
//! (`models.rs`) and table definitions (`schema.rs`) stay private to this
//! module; adapters hand only domain types back to the services.
//!
//! Multi-row invariants (a due and its notification, the two-phase roll
//! number rewrite, a removal and the resequence that follows) are written in
//! a single transaction per call.
//!
//! # Example
//!
//! ```ignore
//! use tutorhub::outbound::persistence::{DbPool, DieselRosterRepository, PoolConfig};
//!
//! let pool = DbPool::new(PoolConfig::new("postgres://localhost/tutorhub")).await?;
//! let roster = DieselRosterRepository::new(pool);
//! ```

mod diesel_coursework_repository;
mod diesel_dropout_repository;
pub(crate) mod diesel_helpers;
mod diesel_leaderboard_repository;
mod diesel_ledger_repository;
mod diesel_notification_repository;
mod diesel_payment_repository;
mod diesel_roster_repository;
mod diesel_settings_repository;
mod migrations;
mod models;
mod pool;
mod schema;

pub use diesel_coursework_repository::DieselCourseworkRepository;
pub use diesel_dropout_repository::DieselDropoutRepository;
pub use diesel_leaderboard_repository::DieselLeaderboardRepository;
pub use diesel_ledger_repository::DieselLedgerRepository;
pub use diesel_notification_repository::DieselNotificationRepository;
pub use diesel_payment_repository::DieselPaymentRepository;
pub use diesel_roster_repository::DieselRosterRepository;
pub use diesel_settings_repository::DieselSettingsRepository;
pub use migrations::{MIGRATIONS, MigrationError, run_pending_migrations};
pub use pool::{DbPool, PoolConfig, PoolError};
