//! WebSocket inbound adapter relaying real-time events to connected clients.
//!
//! Responsibilities:
//! - validate upgrade requests against the configured origin allow-list
//! - place the connection in a student room when `?student=<id>` is given
//! - spawn the per-connection session loop

use actix_web::web::{self, Payload};
use actix_web::{
    HttpRequest, HttpResponse, get,
    http::header::{HeaderValue, ORIGIN},
};
use serde::Deserialize;
use tracing::{debug, error, warn};
use url::Url;

use crate::domain::StudentId;

mod session;

pub mod messages;
pub mod state;

use state::{AllowedOrigins, WsState};

/// Upgrade query parameters.
#[derive(Debug, Default, Deserialize)]
pub struct WsQuery {
    /// Student whose room the connection joins.
    pub student: Option<String>,
}

/// Handle WebSocket upgrade for the `/ws` endpoint.
#[get("/ws")]
pub async fn ws_entry(
    state: web::Data<WsState>,
    req: HttpRequest,
    query: web::Query<WsQuery>,
    stream: Payload,
) -> actix_web::Result<HttpResponse> {
    let mut origin_iter = req.headers().get_all(ORIGIN);
    let origin_header = origin_iter.next().ok_or_else(|| {
        error!("Missing Origin header on WebSocket upgrade");
        actix_web::error::ErrorForbidden("Origin not allowed")
    })?;
    if origin_iter.next().is_some() {
        error!("Multiple Origin headers on WebSocket upgrade");
        return Err(actix_web::error::ErrorBadRequest("Invalid Origin header"));
    }

    validate_origin(&state.allowed_origins, origin_header)?;
    let room = parse_room(query.student.as_deref())?;

    let (response, session, msg_stream) = actix_ws::handle(&req, stream).map_err(|error| {
        error!(error = %error, "WebSocket upgrade failed");
        actix_web::error::ErrorInternalServerError("WebSocket upgrade failed")
    })?;

    debug!(room = ?room, "WebSocket connection opened");
    let events = state.hub.subscribe();
    actix_web::rt::spawn(session::handle_ws_session(
        events, room, session, msg_stream,
    ));
    Ok(response)
}

fn parse_room(raw: Option<&str>) -> actix_web::Result<Option<String>> {
    let Some(raw) = raw.map(str::trim).filter(|value| !value.is_empty()) else {
        return Ok(None);
    };
    raw.parse::<StudentId>()
        .map(|student| Some(student.room()))
        .map_err(|_| {
            warn!(student = raw, "Rejected WS upgrade with invalid student id");
            actix_web::error::ErrorBadRequest("Invalid student id")
        })
}

fn validate_origin(allowed: &AllowedOrigins, origin_header: &HeaderValue) -> actix_web::Result<()> {
    let origin_value = match origin_header.to_str() {
        Ok(value) => value,
        Err(error) => {
            error!(error = %error, "Failed to parse Origin header as string");
            return Err(actix_web::error::ErrorBadRequest("Invalid Origin header"));
        }
    };

    let origin = Url::parse(origin_value).map_err(|error| {
        error!(error = %error, "Failed to parse Origin header as URL");
        actix_web::error::ErrorBadRequest("Invalid Origin header")
    })?;

    if allowed.contains(&origin) {
        Ok(())
    } else {
        warn!(
            origin = origin_value,
            "Rejected WS upgrade due to disallowed Origin"
        );
        Err(actix_web::error::ErrorForbidden("Origin not allowed"))
    }
}
