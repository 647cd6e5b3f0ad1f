//! Test helpers for inbound HTTP components.

use std::sync::Arc;

use actix_web::body::MessageBody;
use actix_web::dev::{ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, Error as ActixError, web};
use serde_json::Value;

use crate::domain::ports::{
    MockCourseworkCommand, MockDropoutCommand, MockDropoutQuery, MockDuesCommand, MockDuesQuery,
    MockLeaderboardQuery, MockNotificationCommand, MockNotificationQuery, MockPaymentsCommand,
    MockPaymentsQuery, MockRosterCommand, MockRosterQuery, MockSettingsCommand, MockSettingsQuery,
};
use crate::inbound::http::state::HttpState;

/// One mock per driving port. Tests set expectations on the ports a handler
/// touches; any unexpected call panics inside the mock.
#[derive(Default)]
pub struct MockPorts {
    pub dues: MockDuesCommand,
    pub dues_query: MockDuesQuery,
    pub payments: MockPaymentsCommand,
    pub payments_query: MockPaymentsQuery,
    pub roster: MockRosterCommand,
    pub roster_query: MockRosterQuery,
    pub leaderboard: MockLeaderboardQuery,
    pub dropouts: MockDropoutCommand,
    pub dropouts_query: MockDropoutQuery,
    pub notifications: MockNotificationCommand,
    pub notifications_query: MockNotificationQuery,
    pub coursework: MockCourseworkCommand,
    pub settings: MockSettingsCommand,
    pub settings_query: MockSettingsQuery,
}

impl MockPorts {
    pub fn into_state(self) -> HttpState {
        HttpState {
            dues: Arc::new(self.dues),
            dues_query: Arc::new(self.dues_query),
            payments: Arc::new(self.payments),
            payments_query: Arc::new(self.payments_query),
            roster: Arc::new(self.roster),
            roster_query: Arc::new(self.roster_query),
            leaderboard: Arc::new(self.leaderboard),
            dropouts: Arc::new(self.dropouts),
            dropouts_query: Arc::new(self.dropouts_query),
            notifications: Arc::new(self.notifications),
            notifications_query: Arc::new(self.notifications_query),
            coursework: Arc::new(self.coursework),
            settings: Arc::new(self.settings),
            settings_query: Arc::new(self.settings_query),
        }
    }
}

/// An app with the given handlers mounted under `/api/v1`.
pub fn api_app<F>(
    ports: MockPorts,
    register: F,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse<impl MessageBody>,
        Error = ActixError,
        InitError = (),
    >,
>
where
    F: FnOnce(&mut web::ServiceConfig),
{
    App::new()
        .app_data(web::Data::new(ports.into_state()))
        .service(web::scope("/api/v1").configure(register))
}

/// Extract `details.field` from an error body.
pub fn error_field(body: &Value) -> Option<&str> {
    body.get("details")?.get("field")?.as_str()
}
