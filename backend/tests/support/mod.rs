//! Shared helpers for the PostgreSQL-backed integration suites.
//!
//! Each suite includes this module with `mod support;`, so every helper is
//! compiled once per test crate and some go unused in any given one.
#![allow(dead_code, reason = "helpers are shared across separate test crates")]

mod cluster_skip;
mod pg_embed;

use std::future::Future;

use chrono::{DateTime, Local, TimeZone, Utc};
use mockable::Clock;
use pg_embedded_setup_unpriv::TestCluster;
use postgres::{Client, NoTls};
use tokio::runtime::Runtime;
use tutorhub::domain::ports::StudentRegistration;
use tutorhub::domain::{ClassKey, Student, StudentId, registration_number};
use tutorhub::outbound::persistence::{DbPool, PoolConfig, run_pending_migrations};

pub use cluster_skip::handle_cluster_setup_failure;

/// Migrated database on a private embedded cluster plus a runtime to drive
/// the async repositories from synchronous tests.
///
/// The `postgres` client blocks on its own runtime, so tests stay synchronous
/// and enter [`Runtime::block_on`] only around repository calls.
pub struct TestDatabase {
    pub pool: DbPool,
    pub database_url: String,
    runtime: Runtime,
    _cluster: TestCluster,
}

impl TestDatabase {
    /// Start a cluster, apply every migration and open a small pool.
    pub fn provision() -> Result<Self, String> {
        let cluster = pg_embed::test_cluster()?;
        let database_url = cluster.connection().database_url("postgres");
        run_pending_migrations(&database_url).map_err(|err| err.to_string())?;

        let runtime = Runtime::new().map_err(|err| format!("create runtime: {err}"))?;
        let config = PoolConfig::new(&database_url)
            .with_max_size(4)
            .with_min_idle(Some(1));
        let pool = runtime
            .block_on(DbPool::new(config))
            .map_err(|err| err.to_string())?;

        Ok(Self {
            pool,
            database_url,
            runtime,
            _cluster: cluster,
        })
    }

    pub fn block_on<F: Future>(&self, future: F) -> F::Output {
        self.runtime.block_on(future)
    }

    /// Run a scalar `COUNT(*)` style query outside the pool.
    pub fn count(&self, sql: &str) -> i64 {
        let mut client = Client::connect(&self.database_url, NoTls)
            .unwrap_or_else(|err| panic!("connect: {}", format_postgres_error(&err)));
        let row = client
            .query_one(sql, &[])
            .unwrap_or_else(|err| panic!("{sql}: {}", format_postgres_error(&err)));
        row.get(0)
    }
}

/// Fixture for suites that need a database, honouring `SKIP_TEST_CLUSTER`.
pub fn database() -> Option<TestDatabase> {
    match TestDatabase::provision() {
        Ok(db) => Some(db),
        Err(reason) => handle_cluster_setup_failure(reason),
    }
}

/// Clock pinned to a single instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl FixedClock {
    pub fn at(year: i32, month: u32, day: u32, hour: u32) -> Self {
        Self(
            Utc.with_ymd_and_hms(year, month, day, hour, 0, 0)
                .single()
                .expect("valid timestamp"),
        )
    }
}

impl Clock for FixedClock {
    fn local(&self) -> DateTime<Local> {
        self.0.with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        self.0
    }
}

/// Registration record with a predictable registration number.
pub fn registration(name: &str, class_key: ClassKey, roll_number: i32) -> StudentRegistration {
    let id = StudentId::random();
    StudentRegistration {
        student: Student {
            id,
            full_name: name.to_owned(),
            class_key,
            roll_number,
            registration_no: registration_number(
                class_key,
                u32::try_from(roll_number).expect("positive roll number"),
            ),
        },
        email: format!("{id}@students.tutorhub.example"),
    }
}

/// Render a `postgres` error with its SQLSTATE and detail when present.
pub fn format_postgres_error(error: &postgres::Error) -> String {
    let Some(db_error) = error.as_db_error() else {
        return error.to_string();
    };
    let mut summary = format!("postgres error {:?}: {}", db_error.code(), db_error.message());
    if let Some(detail) = db_error.detail() {
        summary.push_str("; detail: ");
        summary.push_str(detail);
    }
    summary
}
