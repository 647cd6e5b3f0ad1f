//! Shared HTTP adapter state.
//!
//! HTTP handlers accept this state via `actix_web::web::Data` so they only
//! depend on domain ports (use-cases) and remain testable without I/O.

use std::sync::Arc;

use crate::domain::ports::{
    CourseworkCommand, DropoutCommand, DropoutQuery, DuesCommand, DuesQuery, LeaderboardQuery,
    NotificationCommand, NotificationQuery, PaymentsCommand, PaymentsQuery, RosterCommand,
    RosterQuery, SettingsCommand, SettingsQuery,
};

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub dues: Arc<dyn DuesCommand>,
    pub dues_query: Arc<dyn DuesQuery>,
    pub payments: Arc<dyn PaymentsCommand>,
    pub payments_query: Arc<dyn PaymentsQuery>,
    pub roster: Arc<dyn RosterCommand>,
    pub roster_query: Arc<dyn RosterQuery>,
    pub leaderboard: Arc<dyn LeaderboardQuery>,
    pub dropouts: Arc<dyn DropoutCommand>,
    pub dropouts_query: Arc<dyn DropoutQuery>,
    pub notifications: Arc<dyn NotificationCommand>,
    pub notifications_query: Arc<dyn NotificationQuery>,
    pub coursework: Arc<dyn CourseworkCommand>,
    pub settings: Arc<dyn SettingsCommand>,
    pub settings_query: Arc<dyn SettingsQuery>,
}
