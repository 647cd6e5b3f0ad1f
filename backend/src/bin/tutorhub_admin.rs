//! Operator commands for scheduled and maintenance jobs.
#![cfg_attr(not(any(test, doctest)), deny(clippy::unwrap_used))]
#![cfg_attr(not(any(test, doctest)), deny(clippy::expect_used))]

use std::env;
use std::io;
use std::sync::Arc;

use chrono::{DateTime, FixedOffset, Utc};
use clap::{Parser, Subcommand};
use mockable::DefaultClock;
use tokio::runtime::Builder;
use tracing::warn;
use tracing_subscriber::{EnvFilter, fmt};

use tutorhub::domain::ports::{
    DuesCommand, FixtureRealtimePublisher, NotificationCommand, RosterCommand,
};
use tutorhub::domain::{
    ClassKey, DEFAULT_RETENTION_DAYS, FeeEngine, NotificationService, RosterService,
};
use tutorhub::outbound::persistence::{
    DbPool, DieselLedgerRepository, DieselNotificationRepository, DieselRosterRepository,
    DieselSettingsRepository, PoolConfig, run_pending_migrations,
};

/// `tutorhub-admin` command arguments.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "tutorhub-admin",
    about = "Run tutorhub maintenance jobs against the database",
    version
)]
struct CliArgs {
    /// Database connection URL. Falls back to `DATABASE_URL` when omitted.
    #[arg(long = "database-url", value_name = "url", global = true)]
    database_url: Option<String>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Clone, Subcommand)]
enum Command {
    /// Bill every student for the current month.
    AssignDues {
        /// Bill the month containing this instant instead of now.
        #[arg(long, value_name = "rfc3339", value_parser = parse_timestamp)]
        at: Option<DateTime<Utc>>,
        /// Offset from UTC, in minutes, used to pick the month.
        #[arg(long = "utc-offset-minutes", default_value_t = 330, allow_negative_numbers = true)]
        utc_offset_minutes: i32,
    },
    /// Delete notifications past their retention window.
    PurgeNotifications {
        #[arg(long = "retention-days", default_value_t = DEFAULT_RETENTION_DAYS)]
        retention_days: u32,
    },
    /// Re-pack one class's roll numbers to 1..n.
    Resequence {
        #[arg(long = "class", value_name = "key", value_parser = parse_class_key)]
        class_key: ClassKey,
    },
    /// Apply pending schema migrations.
    Migrate,
}

fn main() -> io::Result<()> {
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let args = CliArgs::try_parse().map_err(io::Error::other)?;
    let database_url = resolve_database_url(args.database_url)?;

    let runtime = Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|error| io::Error::other(format!("create Tokio runtime: {error}")))?;
    runtime.block_on(run(args.command, database_url))
}

async fn connect(database_url: &str) -> io::Result<DbPool> {
    DbPool::new(PoolConfig::new(database_url).with_max_size(2))
        .await
        .map_err(|error| io::Error::other(format!("create database pool: {error}")))
}

async fn migrate(database_url: String) -> io::Result<()> {
    let applied = tokio::task::spawn_blocking(move || run_pending_migrations(&database_url))
        .await
        .map_err(|error| io::Error::other(format!("migration task failed: {error}")))?
        .map_err(io::Error::other)?;
    println!("applied={}", applied.len());
    for version in applied {
        println!("migration={version}");
    }
    Ok(())
}

async fn run(command: Command, database_url: String) -> io::Result<()> {
    match command {
        Command::AssignDues {
            at,
            utc_offset_minutes,
        } => {
            let offset = utc_offset_minutes
                .checked_mul(60)
                .and_then(FixedOffset::east_opt)
                .ok_or_else(|| {
                    io::Error::new(io::ErrorKind::InvalidInput, "UTC offset out of range")
                })?;
            let pool = connect(&database_url).await?;
            let engine = FeeEngine::new(
                Arc::new(DieselLedgerRepository::new(pool.clone())),
                Arc::new(DieselSettingsRepository::new(pool)),
                Arc::new(FixtureRealtimePublisher),
                Arc::new(DefaultClock),
                offset,
            );
            let outcome = match at {
                Some(at) => engine.assign_monthly_dues(at).await,
                None => engine.assign_current_month().await,
            }
            .map_err(|error| io::Error::other(format!("assign dues failed: {error}")))?;
            println!("month={}", outcome.month);
            println!("amount={}", outcome.amount);
            println!("created={}", outcome.created);
            println!("skipped={}", outcome.skipped);
        }
        Command::PurgeNotifications { retention_days } => {
            let pool = connect(&database_url).await?;
            let service = NotificationService::new(
                Arc::new(DieselNotificationRepository::new(pool)),
                Arc::new(FixtureRealtimePublisher),
                Arc::new(DefaultClock),
            )
            .with_retention_days(retention_days);
            let deleted = service
                .purge_expired()
                .await
                .map_err(|error| io::Error::other(format!("purge failed: {error}")))?;
            println!("deleted={deleted}");
        }
        Command::Resequence { class_key } => {
            let pool = connect(&database_url).await?;
            let roster = RosterService::new(Arc::new(DieselRosterRepository::new(pool)));
            let students = roster
                .resequence(class_key)
                .await
                .map_err(|error| io::Error::other(format!("resequence failed: {error}")))?;
            println!("class={}", class_key.as_str());
            println!("students={}", students.len());
        }
        Command::Migrate => migrate(database_url).await?,
    }
    Ok(())
}

fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, String> {
    DateTime::parse_from_rfc3339(raw)
        .map(|at| at.with_timezone(&Utc))
        .map_err(|error| format!("expected an RFC 3339 timestamp: {error}"))
}

fn parse_class_key(raw: &str) -> Result<ClassKey, String> {
    raw.parse::<ClassKey>().map_err(|error| error.to_string())
}

fn resolve_database_url(explicit: Option<String>) -> io::Result<String> {
    if let Some(value) = explicit {
        if value.trim().is_empty() {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "--database-url must not be empty when provided",
            ));
        }
        return Ok(value);
    }

    let from_env = env::var("DATABASE_URL").map_err(|_| {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            "database URL missing: set --database-url or DATABASE_URL",
        )
    })?;
    if from_env.trim().is_empty() {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            "DATABASE_URL must not be empty",
        ));
    }
    Ok(from_env)
}

#[cfg(test)]
mod tests {
    //! Unit tests for CLI parsing helpers.

    use super::*;
    use env_lock::lock_env;
    use rstest::rstest;

    #[rstest]
    fn assign_dues_accepts_an_explicit_instant() {
        let args = CliArgs::try_parse_from([
            "tutorhub-admin",
            "assign-dues",
            "--at",
            "2025-03-31T20:00:00Z",
        ])
        .expect("arguments parse");
        match args.command {
            Command::AssignDues {
                at,
                utc_offset_minutes,
            } => {
                assert_eq!(
                    at.map(|at| at.to_rfc3339()).as_deref(),
                    Some("2025-03-31T20:00:00+00:00")
                );
                assert_eq!(utc_offset_minutes, 330);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[rstest]
    #[case("next tuesday")]
    #[case("2025-03-31")]
    fn assign_dues_rejects_malformed_instants(#[case] raw: &str) {
        assert!(CliArgs::try_parse_from(["tutorhub-admin", "assign-dues", "--at", raw]).is_err());
    }

    #[rstest]
    #[case("11_science", true)]
    #[case("13", false)]
    fn resequence_validates_the_class(#[case] raw: &str, #[case] valid: bool) {
        let parsed =
            CliArgs::try_parse_from(["tutorhub-admin", "resequence", "--class", raw]);
        assert_eq!(parsed.is_ok(), valid);
    }

    #[rstest]
    fn database_url_flag_is_global() {
        let args = CliArgs::try_parse_from([
            "tutorhub-admin",
            "migrate",
            "--database-url",
            "postgres://localhost/tutorhub",
        ])
        .expect("arguments parse");
        assert_eq!(
            args.database_url.as_deref(),
            Some("postgres://localhost/tutorhub")
        );
    }

    #[rstest]
    fn resolve_database_url_rejects_empty_explicit() {
        let error = resolve_database_url(Some("   ".to_owned())).expect_err("empty should fail");
        assert_eq!(error.kind(), io::ErrorKind::InvalidInput);
    }

    #[rstest]
    fn resolve_database_url_falls_back_to_the_environment() {
        let _guard = lock_env([("DATABASE_URL", Some("postgres://env/tutorhub".to_owned()))]);
        assert_eq!(
            resolve_database_url(None).expect("environment url"),
            "postgres://env/tutorhub"
        );
    }

    #[rstest]
    fn resolve_database_url_requires_a_source() {
        let _guard = lock_env([("DATABASE_URL", None::<String>)]);
        let error = resolve_database_url(None).expect_err("missing url");
        assert_eq!(error.kind(), io::ErrorKind::InvalidInput);
    }
}
