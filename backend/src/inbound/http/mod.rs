//! HTTP inbound adapter exposing REST endpoints.

pub mod coursework;
pub mod dropouts;
pub mod dues;
pub mod error;
pub mod health;
pub mod leaderboard;
pub mod notifications;
pub mod payments;
pub mod schemas;
pub mod settings;
pub mod state;
pub mod students;
#[cfg(test)]
pub mod test_utils;
pub mod validation;

pub use error::ApiResult;
