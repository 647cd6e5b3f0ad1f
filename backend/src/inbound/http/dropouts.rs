//! Dropout request HTTP handlers.
//!
//! ```text
//! GET  /api/v1/admin/dropouts?status=pending
//! POST /api/v1/admin/dropouts/{requestId}/approve
//! POST /api/v1/admin/dropouts/{requestId}/reject
//! POST /api/v1/students/{studentId}/dropout
//! ```

use std::str::FromStr;

use actix_web::{HttpResponse, get, post, web};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::domain::{DropoutId, DropoutRequest, DropoutStatus, Error};
use crate::inbound::http::ApiResult;
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{
    FieldName, invalid_value_error, missing_field_error, parse_id,
};

const REQUEST_ID: FieldName = FieldName::new("requestId");
const STUDENT_ID: FieldName = FieldName::new("studentId");
const STATUS: FieldName = FieldName::new("status");
const REASON: FieldName = FieldName::new("reason");
const ADMIN_RESPONSE: FieldName = FieldName::new("adminResponse");

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DropoutResponse {
    pub id: String,
    pub student_id: String,
    pub reason: String,
    #[schema(example = "pending")]
    pub status: String,
    pub admin_response: Option<String>,
    pub requested_at: String,
    pub processed_at: Option<String>,
}

impl From<DropoutRequest> for DropoutResponse {
    fn from(value: DropoutRequest) -> Self {
        Self {
            id: value.id.to_string(),
            student_id: value.student_id.to_string(),
            reason: value.reason,
            status: value.status.as_str().to_owned(),
            admin_response: value.admin_response,
            requested_at: value.requested_at.to_rfc3339(),
            processed_at: value.processed_at.map(|at| at.to_rfc3339()),
        }
    }
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct DropoutListQuery {
    /// `pending` (default), `approved` or `rejected`.
    pub status: Option<String>,
}

#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DropoutRequestBody {
    pub reason: Option<String>,
}

#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RejectDropoutBody {
    pub admin_response: Option<String>,
}

fn required_text(value: Option<String>, field: FieldName) -> Result<String, Error> {
    let value = value.ok_or_else(|| missing_field_error(field))?;
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(missing_field_error(field));
    }
    Ok(trimmed.to_owned())
}

fn parse_status(raw: Option<&str>) -> Result<DropoutStatus, Error> {
    raw.map_or(Ok(DropoutStatus::default()), |value| {
        DropoutStatus::from_str(value).map_err(|_| {
            invalid_value_error(STATUS, "status must be pending, approved or rejected", value)
        })
    })
}

#[utoipa::path(
    get,
    path = "/api/v1/admin/dropouts",
    params(DropoutListQuery),
    responses(
        (status = 200, description = "Dropout requests, newest first", body = [DropoutResponse]),
        (status = 400, description = "Unknown status", body = ErrorSchema)
    ),
    tags = ["dropouts"],
    operation_id = "listDropouts"
)]
#[get("/admin/dropouts")]
pub async fn list_dropouts(
    state: web::Data<HttpState>,
    query: web::Query<DropoutListQuery>,
) -> ApiResult<web::Json<Vec<DropoutResponse>>> {
    let status = parse_status(query.status.as_deref())?;
    let requests = state.dropouts_query.list_dropouts(status).await?;
    Ok(web::Json(
        requests.into_iter().map(DropoutResponse::from).collect(),
    ))
}

/// Approve a pending request and remove the student.
#[utoipa::path(
    post,
    path = "/api/v1/admin/dropouts/{requestId}/approve",
    params(("requestId" = String, Path, description = "Dropout request identifier")),
    responses(
        (status = 200, description = "Approved request", body = DropoutResponse),
        (status = 404, description = "Request not found", body = ErrorSchema),
        (
            status = 409,
            description = "Already processed, or the student still owes dues",
            body = ErrorSchema
        )
    ),
    tags = ["dropouts"],
    operation_id = "approveDropout"
)]
#[post("/admin/dropouts/{request_id}/approve")]
pub async fn approve_dropout(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<web::Json<DropoutResponse>> {
    let request_id: DropoutId = parse_id(&path.into_inner(), REQUEST_ID)?;
    let request = state.dropouts.approve_dropout(request_id).await?;
    Ok(web::Json(request.into()))
}

#[utoipa::path(
    post,
    path = "/api/v1/admin/dropouts/{requestId}/reject",
    params(("requestId" = String, Path, description = "Dropout request identifier")),
    request_body = RejectDropoutBody,
    responses(
        (status = 200, description = "Rejected request", body = DropoutResponse),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 404, description = "Request not found", body = ErrorSchema),
        (status = 409, description = "Already processed", body = ErrorSchema)
    ),
    tags = ["dropouts"],
    operation_id = "rejectDropout"
)]
#[post("/admin/dropouts/{request_id}/reject")]
pub async fn reject_dropout(
    state: web::Data<HttpState>,
    path: web::Path<String>,
    payload: web::Json<RejectDropoutBody>,
) -> ApiResult<web::Json<DropoutResponse>> {
    let request_id: DropoutId = parse_id(&path.into_inner(), REQUEST_ID)?;
    let response = required_text(payload.into_inner().admin_response, ADMIN_RESPONSE)?;
    let request = state.dropouts.reject_dropout(request_id, response).await?;
    Ok(web::Json(request.into()))
}

#[utoipa::path(
    post,
    path = "/api/v1/students/{studentId}/dropout",
    params(("studentId" = String, Path, description = "Student identifier")),
    request_body = DropoutRequestBody,
    responses(
        (status = 201, description = "Pending request", body = DropoutResponse),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 409, description = "A request is already pending", body = ErrorSchema)
    ),
    tags = ["dropouts"],
    operation_id = "requestDropout"
)]
#[post("/students/{student_id}/dropout")]
pub async fn request_dropout(
    state: web::Data<HttpState>,
    path: web::Path<String>,
    payload: web::Json<DropoutRequestBody>,
) -> ApiResult<HttpResponse> {
    let student_id = parse_id(&path.into_inner(), STUDENT_ID)?;
    let reason = required_text(payload.into_inner().reason, REASON)?;
    let request = state.dropouts.request_dropout(student_id, reason).await?;
    Ok(HttpResponse::Created().json(DropoutResponse::from(request)))
}
