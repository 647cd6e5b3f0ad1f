//! Tutoring centre backend library.
//!
//! The domain holds the dues ledger, roster, leaderboard and notification
//! rules; inbound adapters expose them over HTTP and WebSocket, outbound
//! adapters persist them in PostgreSQL.
#![cfg_attr(not(any(test, doctest)), deny(clippy::unwrap_used))]
#![cfg_attr(not(any(test, doctest)), deny(clippy::expect_used))]

pub mod doc;
pub mod domain;
pub mod inbound;
pub mod middleware;
pub mod outbound;

/// Public OpenAPI surface used by Swagger UI and tooling.
pub use doc::ApiDoc;
pub use middleware::Trace;
