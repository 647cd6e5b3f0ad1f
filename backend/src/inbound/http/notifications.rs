//! Notification HTTP handlers.
//!
//! ```text
//! POST   /api/v1/admin/notifications
//! DELETE /api/v1/admin/notifications/expired
//! GET    /api/v1/students/{studentId}/notifications
//! POST   /api/v1/students/{studentId}/notifications/{notificationId}/read
//! ```

use actix_web::{HttpResponse, delete, get, post, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{Notification, NotificationId, Recipient, StudentId};
use crate::inbound::http::ApiResult;
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, missing_field_error, parse_audience, parse_id};

const STUDENT_ID: FieldName = FieldName::new("studentId");
const NOTIFICATION_ID: FieldName = FieldName::new("notificationId");
const AUDIENCE: FieldName = FieldName::new("audience");
const MESSAGE: FieldName = FieldName::new("message");

/// A notification as shown in a student's inbox.
///
/// Exactly one of `studentId` and `audience` is set.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NotificationResponse {
    pub id: String,
    pub student_id: Option<String>,
    #[schema(example = "all")]
    pub audience: Option<String>,
    pub message: String,
    pub is_read: bool,
    pub created_at: String,
}

impl From<Notification> for NotificationResponse {
    fn from(value: Notification) -> Self {
        let (student_id, audience) = match value.recipient {
            Recipient::Student(student_id) => (Some(student_id.to_string()), None),
            Recipient::Audience(audience) => (None, Some(audience.as_str().to_owned())),
        };
        Self {
            id: value.id.to_string(),
            student_id,
            audience,
            message: value.message,
            is_read: value.is_read,
            created_at: value.created_at.to_rfc3339(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BroadcastBody {
    /// `all` or a class key.
    pub audience: Option<String>,
    pub message: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PurgeResponse {
    pub deleted: u64,
}

/// Persist an announcement and push it to connected clients.
#[utoipa::path(
    post,
    path = "/api/v1/admin/notifications",
    request_body = BroadcastBody,
    responses(
        (status = 201, description = "Announcement stored", body = NotificationResponse),
        (status = 400, description = "Invalid request", body = ErrorSchema)
    ),
    tags = ["notifications"],
    operation_id = "broadcastNotification"
)]
#[post("/admin/notifications")]
pub async fn broadcast(
    state: web::Data<HttpState>,
    payload: web::Json<BroadcastBody>,
) -> ApiResult<HttpResponse> {
    let BroadcastBody { audience, message } = payload.into_inner();
    let audience = audience.ok_or_else(|| missing_field_error(AUDIENCE))?;
    let audience = parse_audience(&audience, AUDIENCE)?;
    let message = message
        .map(|message| message.trim().to_owned())
        .filter(|message| !message.is_empty())
        .ok_or_else(|| missing_field_error(MESSAGE))?;

    let notification = state.notifications.broadcast(audience, message).await?;
    Ok(HttpResponse::Created().json(NotificationResponse::from(notification)))
}

/// Delete notifications older than the retention window.
#[utoipa::path(
    delete,
    path = "/api/v1/admin/notifications/expired",
    responses(
        (status = 200, description = "Number of notifications deleted", body = PurgeResponse),
        (status = 503, description = "Service unavailable", body = ErrorSchema)
    ),
    tags = ["notifications"],
    operation_id = "purgeExpiredNotifications"
)]
#[delete("/admin/notifications/expired")]
pub async fn purge_expired(state: web::Data<HttpState>) -> ApiResult<web::Json<PurgeResponse>> {
    let deleted = state.notifications.purge_expired().await?;
    Ok(web::Json(PurgeResponse { deleted }))
}

#[utoipa::path(
    get,
    path = "/api/v1/students/{studentId}/notifications",
    params(("studentId" = String, Path, description = "Student identifier")),
    responses(
        (status = 200, description = "Visible notifications, newest first", body = [NotificationResponse]),
        (status = 404, description = "Student not found", body = ErrorSchema)
    ),
    tags = ["notifications"],
    operation_id = "notificationsFor"
)]
#[get("/students/{student_id}/notifications")]
pub async fn notifications_for(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<web::Json<Vec<NotificationResponse>>> {
    let student_id: StudentId = parse_id(&path.into_inner(), STUDENT_ID)?;
    let notifications = state
        .notifications_query
        .notifications_for(student_id)
        .await?;
    Ok(web::Json(
        notifications
            .into_iter()
            .map(NotificationResponse::from)
            .collect(),
    ))
}

#[utoipa::path(
    post,
    path = "/api/v1/students/{studentId}/notifications/{notificationId}/read",
    params(
        ("studentId" = String, Path, description = "Student identifier"),
        ("notificationId" = String, Path, description = "Notification identifier")
    ),
    responses(
        (status = 204, description = "Marked read"),
        (status = 404, description = "Notification not visible to the student", body = ErrorSchema)
    ),
    tags = ["notifications"],
    operation_id = "markNotificationRead"
)]
#[post("/students/{student_id}/notifications/{notification_id}/read")]
pub async fn mark_read(
    state: web::Data<HttpState>,
    path: web::Path<(String, String)>,
) -> ApiResult<HttpResponse> {
    let (student_id, notification_id) = path.into_inner();
    let student_id: StudentId = parse_id(&student_id, STUDENT_ID)?;
    let notification_id: NotificationId = parse_id(&notification_id, NOTIFICATION_ID)?;
    state
        .notifications
        .mark_read(student_id, notification_id)
        .await?;
    Ok(HttpResponse::NoContent().finish())
}
