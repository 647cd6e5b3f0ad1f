//! Settings HTTP handlers.
//!
//! ```text
//! GET /api/v1/admin/settings/monthly-due
//! PUT /api/v1/admin/settings/monthly-due
//! GET /api/v1/admin/settings/upi
//! PUT /api/v1/admin/settings/upi
//! GET /api/v1/payment-details
//! ```

use actix_web::{get, put, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::ports::UpdateUpiRequest;
use crate::domain::{DEFAULT_MONTHLY_DUE_AMOUNT, Error, UpiSettings};
use crate::inbound::http::ApiResult;
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, invalid_value_error, missing_field_error};

const MONTHLY_DUE_AMOUNT: FieldName = FieldName::new("monthlyDueAmount");

/// Stored monthly due amount, and the amount the fee engine falls back to.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyDueResponse {
    pub monthly_due_amount: Option<u32>,
    #[schema(example = 1500)]
    pub default_amount: u32,
}

impl MonthlyDueResponse {
    fn new(monthly_due_amount: Option<u32>) -> Self {
        Self {
            monthly_due_amount,
            default_amount: DEFAULT_MONTHLY_DUE_AMOUNT,
        }
    }
}

#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyDueBody {
    pub monthly_due_amount: Option<i64>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpiSettingsResponse {
    pub upi_id: Option<String>,
    pub upi_phone: Option<String>,
    /// Path or URL of the QR code image.
    pub upi_qr: Option<String>,
}

impl From<UpiSettings> for UpiSettingsResponse {
    fn from(value: UpiSettings) -> Self {
        Self {
            upi_id: value.upi_id,
            upi_phone: value.upi_phone,
            upi_qr: value.upi_qr,
        }
    }
}

#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpiSettingsBody {
    pub upi_id: Option<String>,
    pub upi_phone: Option<String>,
    /// Omit to keep the current QR image.
    pub upi_qr: Option<String>,
}

fn parse_amount(raw: Option<i64>) -> Result<u32, Error> {
    let raw = raw.ok_or_else(|| missing_field_error(MONTHLY_DUE_AMOUNT))?;
    u32::try_from(raw).map_err(|_| {
        invalid_value_error(
            MONTHLY_DUE_AMOUNT,
            "monthlyDueAmount must be a non-negative whole number",
            &raw.to_string(),
        )
    })
}

fn parse_upi(body: UpiSettingsBody) -> Result<UpdateUpiRequest, Error> {
    Ok(UpdateUpiRequest {
        upi_id: body
            .upi_id
            .ok_or_else(|| missing_field_error(FieldName::new("upiId")))?,
        upi_phone: body
            .upi_phone
            .ok_or_else(|| missing_field_error(FieldName::new("upiPhone")))?,
        upi_qr: body.upi_qr,
    })
}

#[utoipa::path(
    get,
    path = "/api/v1/admin/settings/monthly-due",
    responses(
        (status = 200, description = "Monthly due setting", body = MonthlyDueResponse),
        (status = 503, description = "Service unavailable", body = ErrorSchema)
    ),
    tags = ["settings"],
    operation_id = "getMonthlyDueAmount"
)]
#[get("/admin/settings/monthly-due")]
pub async fn get_monthly_due(state: web::Data<HttpState>) -> ApiResult<web::Json<MonthlyDueResponse>> {
    let amount = state.settings_query.monthly_due_amount().await?;
    Ok(web::Json(MonthlyDueResponse::new(amount)))
}

/// Change the amount used for months that have no dues yet.
///
/// Months already billed keep their locked amount.
#[utoipa::path(
    put,
    path = "/api/v1/admin/settings/monthly-due",
    request_body = MonthlyDueBody,
    responses(
        (status = 200, description = "Updated setting", body = MonthlyDueResponse),
        (status = 400, description = "Invalid request", body = ErrorSchema)
    ),
    tags = ["settings"],
    operation_id = "setMonthlyDueAmount"
)]
#[put("/admin/settings/monthly-due")]
pub async fn set_monthly_due(
    state: web::Data<HttpState>,
    payload: web::Json<MonthlyDueBody>,
) -> ApiResult<web::Json<MonthlyDueResponse>> {
    let amount = parse_amount(payload.into_inner().monthly_due_amount)?;
    state.settings.set_monthly_due_amount(amount).await?;
    Ok(web::Json(MonthlyDueResponse::new(Some(amount))))
}

#[utoipa::path(
    get,
    path = "/api/v1/admin/settings/upi",
    responses(
        (status = 200, description = "UPI payment details", body = UpiSettingsResponse)
    ),
    tags = ["settings"],
    operation_id = "getUpiSettings"
)]
#[get("/admin/settings/upi")]
pub async fn get_upi_settings(
    state: web::Data<HttpState>,
) -> ApiResult<web::Json<UpiSettingsResponse>> {
    let settings = state.settings_query.upi_settings().await?;
    Ok(web::Json(settings.into()))
}

#[utoipa::path(
    put,
    path = "/api/v1/admin/settings/upi",
    request_body = UpiSettingsBody,
    responses(
        (status = 200, description = "Updated UPI details", body = UpiSettingsResponse),
        (status = 400, description = "Invalid request", body = ErrorSchema)
    ),
    tags = ["settings"],
    operation_id = "updateUpiSettings"
)]
#[put("/admin/settings/upi")]
pub async fn update_upi_settings(
    state: web::Data<HttpState>,
    payload: web::Json<UpiSettingsBody>,
) -> ApiResult<web::Json<UpiSettingsResponse>> {
    let request = parse_upi(payload.into_inner())?;
    let settings = state.settings.update_upi_settings(request).await?;
    Ok(web::Json(settings.into()))
}

/// Where students should send UPI payments.
#[utoipa::path(
    get,
    path = "/api/v1/payment-details",
    responses(
        (status = 200, description = "UPI payment details", body = UpiSettingsResponse)
    ),
    tags = ["payments"],
    operation_id = "paymentDetails"
)]
#[get("/payment-details")]
pub async fn payment_details(
    state: web::Data<HttpState>,
) -> ApiResult<web::Json<UpiSettingsResponse>> {
    let settings = state.settings_query.upi_settings().await?;
    Ok(web::Json(settings.into()))
}
