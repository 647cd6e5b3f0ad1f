//! Embedded schema migrations.
//!
//! Diesel's migration harness needs a synchronous connection, so callers on
//! the async runtime should run [`run_pending_migrations`] inside
//! `spawn_blocking`.

use diesel::Connection;
use diesel::pg::PgConnection;
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};
use tracing::info;

/// Migrations compiled from `backend/migrations`.
pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// Failure while connecting or applying migrations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("migration failed: {message}")]
pub struct MigrationError {
    message: String,
}

/// Apply every pending migration, returning the versions that ran.
///
/// # Errors
///
/// Returns [`MigrationError`] when the database is unreachable or a
/// migration fails.
pub fn run_pending_migrations(database_url: &str) -> Result<Vec<String>, MigrationError> {
    let mut conn = PgConnection::establish(database_url).map_err(|err| MigrationError {
        message: format!("connect: {err}"),
    })?;
    let applied = conn
        .run_pending_migrations(MIGRATIONS)
        .map_err(|err| MigrationError {
            message: err.to_string(),
        })?
        .into_iter()
        .map(|version| version.to_string())
        .collect::<Vec<_>>();
    info!(count = applied.len(), "applied pending migrations");
    Ok(applied)
}
