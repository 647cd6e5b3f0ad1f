//! Payment HTTP handlers.
//!
//! ```text
//! GET  /api/v1/admin/payments/pending
//! POST /api/v1/admin/payments/{paymentId}/approve
//! POST /api/v1/admin/payments/{paymentId}/reject
//! POST /api/v1/admin/payments/{paymentId}/confirm-cash
//! POST /api/v1/students/{studentId}/payments
//! ```

use std::str::FromStr;

use actix_web::{HttpResponse, get, post, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::ports::SubmitPaymentRequest;
use crate::domain::{Error, Payment, PaymentId, PaymentMethod, StudentId};
use crate::inbound::http::ApiResult;
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{
    FieldName, invalid_value_error, missing_field_error, parse_id,
};

const PAYMENT_ID: FieldName = FieldName::new("paymentId");
const STUDENT_ID: FieldName = FieldName::new("studentId");
const DUE_ID: FieldName = FieldName::new("dueId");
const METHOD: FieldName = FieldName::new("method");

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PaymentResponse {
    pub id: String,
    pub due_id: String,
    pub student_id: String,
    #[schema(example = "upi")]
    pub method: String,
    pub reference: Option<String>,
    #[schema(example = "pending")]
    pub status: String,
    pub requested_at: String,
    pub processed_at: Option<String>,
}

impl From<Payment> for PaymentResponse {
    fn from(value: Payment) -> Self {
        Self {
            id: value.id.to_string(),
            due_id: value.due_id.to_string(),
            student_id: value.student_id.to_string(),
            method: value.method.as_str().to_owned(),
            reference: value.reference,
            status: value.status.as_str().to_owned(),
            requested_at: value.requested_at.to_rfc3339(),
            processed_at: value.processed_at.map(|at| at.to_rfc3339()),
        }
    }
}

/// Payment submission. UPI payments must carry the transaction reference.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SubmitPaymentBody {
    pub due_id: Option<String>,
    #[schema(example = "upi")]
    pub method: Option<String>,
    pub reference: Option<String>,
}

fn parse_submission(
    student_id: StudentId,
    body: SubmitPaymentBody,
) -> Result<SubmitPaymentRequest, Error> {
    let due_id = body.due_id.ok_or_else(|| missing_field_error(DUE_ID))?;
    let method = body.method.ok_or_else(|| missing_field_error(METHOD))?;
    let method = PaymentMethod::from_str(&method)
        .map_err(|_| invalid_value_error(METHOD, "method must be upi or cash", &method))?;
    let reference = body
        .reference
        .map(|reference| reference.trim().to_owned())
        .filter(|reference| !reference.is_empty());
    Ok(SubmitPaymentRequest {
        student_id,
        due_id: parse_id(&due_id, DUE_ID)?,
        method,
        reference,
    })
}

fn payment_id(path: web::Path<String>) -> Result<PaymentId, Error> {
    parse_id(&path.into_inner(), PAYMENT_ID)
}

#[utoipa::path(
    get,
    path = "/api/v1/admin/payments/pending",
    responses(
        (status = 200, description = "Pending payments, newest first", body = [PaymentResponse]),
        (status = 503, description = "Service unavailable", body = ErrorSchema)
    ),
    tags = ["payments"],
    operation_id = "pendingPayments"
)]
#[get("/admin/payments/pending")]
pub async fn pending_payments(
    state: web::Data<HttpState>,
) -> ApiResult<web::Json<Vec<PaymentResponse>>> {
    let payments = state.payments_query.pending_payments().await?;
    Ok(web::Json(
        payments.into_iter().map(PaymentResponse::from).collect(),
    ))
}

/// Confirm a pending payment and mark its due paid.
#[utoipa::path(
    post,
    path = "/api/v1/admin/payments/{paymentId}/approve",
    params(("paymentId" = String, Path, description = "Payment identifier")),
    responses(
        (status = 200, description = "Confirmed payment", body = PaymentResponse),
        (status = 404, description = "Payment not found", body = ErrorSchema),
        (status = 409, description = "Payment already processed", body = ErrorSchema)
    ),
    tags = ["payments"],
    operation_id = "approvePayment"
)]
#[post("/admin/payments/{payment_id}/approve")]
pub async fn approve_payment(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<web::Json<PaymentResponse>> {
    let payment = state.payments.approve_payment(payment_id(path)?).await?;
    Ok(web::Json(payment.into()))
}

#[utoipa::path(
    post,
    path = "/api/v1/admin/payments/{paymentId}/reject",
    params(("paymentId" = String, Path, description = "Payment identifier")),
    responses(
        (status = 200, description = "Rejected payment", body = PaymentResponse),
        (status = 404, description = "Payment not found", body = ErrorSchema),
        (status = 409, description = "Payment already processed", body = ErrorSchema)
    ),
    tags = ["payments"],
    operation_id = "rejectPayment"
)]
#[post("/admin/payments/{payment_id}/reject")]
pub async fn reject_payment(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<web::Json<PaymentResponse>> {
    let payment = state.payments.reject_payment(payment_id(path)?).await?;
    Ok(web::Json(payment.into()))
}

/// Confirm a cash payment handed over at the desk.
#[utoipa::path(
    post,
    path = "/api/v1/admin/payments/{paymentId}/confirm-cash",
    params(("paymentId" = String, Path, description = "Payment identifier")),
    responses(
        (status = 200, description = "Confirmed payment", body = PaymentResponse),
        (status = 400, description = "Payment is not a cash payment", body = ErrorSchema),
        (status = 404, description = "Payment not found", body = ErrorSchema),
        (status = 409, description = "Payment already processed", body = ErrorSchema)
    ),
    tags = ["payments"],
    operation_id = "confirmCashPayment"
)]
#[post("/admin/payments/{payment_id}/confirm-cash")]
pub async fn confirm_cash_payment(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<web::Json<PaymentResponse>> {
    let payment = state
        .payments
        .confirm_cash_payment(payment_id(path)?)
        .await?;
    Ok(web::Json(payment.into()))
}

#[utoipa::path(
    post,
    path = "/api/v1/students/{studentId}/payments",
    params(("studentId" = String, Path, description = "Student identifier")),
    request_body = SubmitPaymentBody,
    responses(
        (status = 201, description = "Payment awaiting review", body = PaymentResponse),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 404, description = "Due not found", body = ErrorSchema),
        (status = 409, description = "Due already paid or a payment is pending", body = ErrorSchema)
    ),
    tags = ["payments"],
    operation_id = "submitPayment"
)]
#[post("/students/{student_id}/payments")]
pub async fn submit_payment(
    state: web::Data<HttpState>,
    path: web::Path<String>,
    payload: web::Json<SubmitPaymentBody>,
) -> ApiResult<HttpResponse> {
    let student_id = parse_id(&path.into_inner(), STUDENT_ID)?;
    let request = parse_submission(student_id, payload.into_inner())?;
    let payment = state.payments.submit_payment(request).await?;
    Ok(HttpResponse::Created().json(PaymentResponse::from(payment)))
}
