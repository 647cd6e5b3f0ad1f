//! Dues HTTP handlers.
//!
//! ```text
//! POST   /api/v1/admin/dues/monthly
//! POST   /api/v1/admin/dues
//! PUT    /api/v1/admin/dues/{dueId}
//! DELETE /api/v1/admin/dues/{dueId}
//! POST   /api/v1/admin/dues/{dueId}/toggle-paid
//! GET    /api/v1/students/{studentId}/dues
//! ```

use actix_web::{HttpResponse, delete, get, post, put, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::ports::{AddDuesRequest, BillingScope, UpdateDueRequest};
use crate::domain::{Due, DueId, DuesBatchOutcome, Error, FeeStatus, MonthlyDuesOutcome, StudentId};
use crate::inbound::http::ApiResult;
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{
    FieldName, invalid_value_error, missing_field_error, parse_class_key, parse_id,
    parse_id_list, parse_month,
};

const DUE_ID: FieldName = FieldName::new("dueId");
const STUDENT_ID: FieldName = FieldName::new("studentId");
const MONTH: FieldName = FieldName::new("month");
const AMOUNT: FieldName = FieldName::new("amount");
const TARGET: FieldName = FieldName::new("target");
const CLASS_KEY: FieldName = FieldName::new("classKey");
const STUDENT_IDS: FieldName = FieldName::new("studentIds");

/// A single due as returned to clients.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DueResponse {
    pub id: String,
    pub student_id: String,
    #[schema(example = "March 2025")]
    pub month: String,
    pub amount: u32,
    pub is_paid: bool,
    pub created_at: String,
}

impl From<Due> for DueResponse {
    fn from(value: Due) -> Self {
        Self {
            id: value.id.to_string(),
            student_id: value.student_id.to_string(),
            month: value.month.to_string(),
            amount: value.amount,
            is_paid: value.is_paid,
            created_at: value.created_at.to_rfc3339(),
        }
    }
}

/// Result of a monthly assignment run.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyDuesResponse {
    pub month: String,
    /// Amount locked for the month.
    pub amount: u32,
    pub created: usize,
    pub skipped: usize,
}

impl From<MonthlyDuesOutcome> for MonthlyDuesResponse {
    fn from(value: MonthlyDuesOutcome) -> Self {
        Self {
            month: value.month.to_string(),
            amount: value.amount,
            created: value.created,
            skipped: value.skipped,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DuesBatchResponse {
    pub added: usize,
    /// Students who already had a due for the month.
    pub skipped: usize,
}

impl From<DuesBatchOutcome> for DuesBatchResponse {
    fn from(value: DuesBatchOutcome) -> Self {
        Self {
            added: value.added,
            skipped: value.skipped,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FeeStatusResponse {
    pub dues: Vec<DueResponse>,
    pub outstanding: u64,
    pub paid: u64,
    pub total_due: u64,
}

impl From<FeeStatus> for FeeStatusResponse {
    fn from(value: FeeStatus) -> Self {
        Self {
            dues: value.dues.into_iter().map(DueResponse::from).collect(),
            outstanding: value.outstanding,
            paid: value.paid,
            total_due: value.total_due,
        }
    }
}

/// Manual due assignment.
///
/// `target` is `all`, `class` (with `classKey`) or `students` (with
/// `studentIds`). Without `amount` each student is billed their class fee.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AddDuesBody {
    pub target: Option<String>,
    pub class_key: Option<String>,
    pub student_ids: Option<Vec<String>>,
    pub month: Option<String>,
    pub amount: Option<u32>,
    #[serde(default)]
    pub is_paid: bool,
}

#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateDueBody {
    pub month: Option<String>,
    pub amount: Option<u32>,
    pub is_paid: Option<bool>,
}

fn parse_scope(body: &AddDuesBody) -> Result<BillingScope, Error> {
    let target = body
        .target
        .as_deref()
        .ok_or_else(|| missing_field_error(TARGET))?;
    match target {
        "all" => Ok(BillingScope::Everyone),
        "class" => {
            let raw = body
                .class_key
                .as_deref()
                .ok_or_else(|| missing_field_error(CLASS_KEY))?;
            Ok(BillingScope::Class(parse_class_key(raw, CLASS_KEY)?))
        }
        "students" => {
            let raw = body
                .student_ids
                .as_deref()
                .ok_or_else(|| missing_field_error(STUDENT_IDS))?;
            if raw.is_empty() {
                return Err(invalid_value_error(
                    STUDENT_IDS,
                    "studentIds must name at least one student",
                    "[]",
                ));
            }
            Ok(BillingScope::Students(parse_id_list(raw, STUDENT_IDS)?))
        }
        other => Err(invalid_value_error(
            TARGET,
            "target must be all, class or students",
            other,
        )),
    }
}

fn parse_add_dues(body: AddDuesBody) -> Result<AddDuesRequest, Error> {
    let scope = parse_scope(&body)?;
    let month = body.month.ok_or_else(|| missing_field_error(MONTH))?;
    Ok(AddDuesRequest {
        scope,
        month: parse_month(&month, MONTH)?,
        amount: body.amount,
        is_paid: body.is_paid,
    })
}

fn parse_update_due(due_id: DueId, body: UpdateDueBody) -> Result<UpdateDueRequest, Error> {
    let month = body.month.ok_or_else(|| missing_field_error(MONTH))?;
    let amount = body.amount.ok_or_else(|| missing_field_error(AMOUNT))?;
    let is_paid = body
        .is_paid
        .ok_or_else(|| missing_field_error(FieldName::new("isPaid")))?;
    Ok(UpdateDueRequest {
        due_id,
        month: parse_month(&month, MONTH)?,
        amount,
        is_paid,
    })
}

/// Assign this month's dues to every student.
#[utoipa::path(
    post,
    path = "/api/v1/admin/dues/monthly",
    description = "Create the current month's due for every student. The first due of a month locks its amount.",
    responses(
        (status = 200, description = "Assignment outcome", body = MonthlyDuesResponse),
        (status = 503, description = "Service unavailable", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["dues"],
    operation_id = "assignMonthlyDues"
)]
#[post("/admin/dues/monthly")]
pub async fn assign_monthly_dues(
    state: web::Data<HttpState>,
) -> ApiResult<web::Json<MonthlyDuesResponse>> {
    let outcome = state.dues.assign_current_month().await?;
    Ok(web::Json(outcome.into()))
}

#[utoipa::path(
    post,
    path = "/api/v1/admin/dues",
    request_body = AddDuesBody,
    responses(
        (status = 200, description = "Dues added", body = DuesBatchResponse),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 503, description = "Service unavailable", body = ErrorSchema)
    ),
    tags = ["dues"],
    operation_id = "addDues"
)]
#[post("/admin/dues")]
pub async fn add_dues(
    state: web::Data<HttpState>,
    payload: web::Json<AddDuesBody>,
) -> ApiResult<web::Json<DuesBatchResponse>> {
    let request = parse_add_dues(payload.into_inner())?;
    let outcome = state.dues.add_dues(request).await?;
    Ok(web::Json(outcome.into()))
}

#[utoipa::path(
    put,
    path = "/api/v1/admin/dues/{dueId}",
    params(("dueId" = String, Path, description = "Due identifier")),
    request_body = UpdateDueBody,
    responses(
        (status = 200, description = "Updated due", body = DueResponse),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 404, description = "Due not found", body = ErrorSchema),
        (status = 409, description = "Student already has a due for that month", body = ErrorSchema)
    ),
    tags = ["dues"],
    operation_id = "updateDue"
)]
#[put("/admin/dues/{due_id}")]
pub async fn update_due(
    state: web::Data<HttpState>,
    path: web::Path<String>,
    payload: web::Json<UpdateDueBody>,
) -> ApiResult<web::Json<DueResponse>> {
    let due_id = parse_id(&path.into_inner(), DUE_ID)?;
    let request = parse_update_due(due_id, payload.into_inner())?;
    let due = state.dues.update_due(request).await?;
    Ok(web::Json(due.into()))
}

#[utoipa::path(
    delete,
    path = "/api/v1/admin/dues/{dueId}",
    params(("dueId" = String, Path, description = "Due identifier")),
    responses(
        (status = 204, description = "Due deleted"),
        (status = 404, description = "Due not found", body = ErrorSchema)
    ),
    tags = ["dues"],
    operation_id = "deleteDue"
)]
#[delete("/admin/dues/{due_id}")]
pub async fn delete_due(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let due_id = parse_id(&path.into_inner(), DUE_ID)?;
    state.dues.delete_due(due_id).await?;
    Ok(HttpResponse::NoContent().finish())
}

#[utoipa::path(
    post,
    path = "/api/v1/admin/dues/{dueId}/toggle-paid",
    params(("dueId" = String, Path, description = "Due identifier")),
    responses(
        (status = 200, description = "Due with flipped paid flag", body = DueResponse),
        (status = 404, description = "Due not found", body = ErrorSchema)
    ),
    tags = ["dues"],
    operation_id = "toggleDuePaid"
)]
#[post("/admin/dues/{due_id}/toggle-paid")]
pub async fn toggle_due_paid(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<web::Json<DueResponse>> {
    let due_id = parse_id(&path.into_inner(), DUE_ID)?;
    let due = state.dues.toggle_paid(due_id).await?;
    Ok(web::Json(due.into()))
}

/// A student's dues with outstanding and paid totals.
#[utoipa::path(
    get,
    path = "/api/v1/students/{studentId}/dues",
    params(("studentId" = String, Path, description = "Student identifier")),
    responses(
        (status = 200, description = "Fee status", body = FeeStatusResponse),
        (status = 400, description = "Invalid request", body = ErrorSchema)
    ),
    tags = ["dues"],
    operation_id = "feeStatus"
)]
#[get("/students/{student_id}/dues")]
pub async fn fee_status(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<web::Json<FeeStatusResponse>> {
    let student_id: StudentId = parse_id(&path.into_inner(), STUDENT_ID)?;
    let status = state.dues_query.fee_status(student_id).await?;
    Ok(web::Json(status.into()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ClassKey, MonthLabel};
    use crate::inbound::http::test_utils::{MockPorts, api_app, error_field};
    use actix_web::http::StatusCode;
    use actix_web::test as actix_test;
    use chrono::Utc;
    use rstest::rstest;
    use serde_json::{Value, json};

    fn march() -> MonthLabel {
        MonthLabel::parse("March 2025").expect("valid month")
    }

    fn due(student_id: StudentId, amount: u32, is_paid: bool) -> Due {
        Due {
            id: DueId::random(),
            student_id,
            month: march(),
            amount,
            is_paid,
            created_at: Utc::now(),
        }
    }

    fn register(cfg: &mut web::ServiceConfig) {
        cfg.service(assign_monthly_dues)
            .service(add_dues)
            .service(update_due)
            .service(delete_due)
            .service(toggle_due_paid)
            .service(fee_status);
    }

    #[actix_web::test]
    async fn monthly_assignment_reports_the_locked_amount() {
        let mut ports = MockPorts::default();
        ports.dues.expect_assign_current_month().times(1).returning(|| {
            Ok(MonthlyDuesOutcome {
                month: march(),
                amount: 1200,
                created: 3,
                skipped: 1,
            })
        });
        let app = actix_test::init_service(api_app(ports, register)).await;

        let request = actix_test::TestRequest::post()
            .uri("/api/v1/admin/dues/monthly")
            .to_request();
        let body: Value = actix_test::call_and_read_body_json(&app, request).await;

        assert_eq!(
            body,
            json!({"month": "March 2025", "amount": 1200, "created": 3, "skipped": 1})
        );
    }

    #[actix_web::test]
    async fn add_dues_for_a_class_passes_the_scope_through() {
        let mut ports = MockPorts::default();
        ports
            .dues
            .expect_add_dues()
            .withf(|request| {
                request.scope == BillingScope::Class(ClassKey::Ten)
                    && request.amount.is_none()
                    && !request.is_paid
            })
            .times(1)
            .returning(|_| Ok(DuesBatchOutcome { added: 4, skipped: 0 }));
        let app = actix_test::init_service(api_app(ports, register)).await;

        let request = actix_test::TestRequest::post()
            .uri("/api/v1/admin/dues")
            .set_json(json!({"target": "class", "classKey": "10", "month": "March 2025"}))
            .to_request();
        let body: Value = actix_test::call_and_read_body_json(&app, request).await;

        assert_eq!(body, json!({"added": 4, "skipped": 0}));
    }

    #[rstest]
    #[case(json!({"month": "March 2025"}), "target")]
    #[case(json!({"target": "class", "month": "March 2025"}), "classKey")]
    #[case(json!({"target": "students", "studentIds": [], "month": "March 2025"}), "studentIds")]
    #[case(json!({"target": "everyone", "month": "March 2025"}), "target")]
    #[case(json!({"target": "all", "month": "2025-03"}), "month")]
    #[actix_web::test]
    async fn add_dues_rejects_malformed_bodies(#[case] payload: Value, #[case] field: &str) {
        let app = actix_test::init_service(api_app(MockPorts::default(), register)).await;

        let request = actix_test::TestRequest::post()
            .uri("/api/v1/admin/dues")
            .set_json(payload)
            .to_request();
        let response = actix_test::call_service(&app, request).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body: Value = actix_test::read_body_json(response).await;
        assert_eq!(error_field(&body), Some(field));
    }

    #[actix_web::test]
    async fn update_due_requires_every_field() {
        let app = actix_test::init_service(api_app(MockPorts::default(), register)).await;

        let request = actix_test::TestRequest::put()
            .uri(&format!("/api/v1/admin/dues/{}", DueId::random()))
            .set_json(json!({"month": "March 2025", "isPaid": true}))
            .to_request();
        let response = actix_test::call_service(&app, request).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body: Value = actix_test::read_body_json(response).await;
        assert_eq!(error_field(&body), Some("amount"));
    }

    #[actix_web::test]
    async fn duplicate_month_on_update_is_a_conflict() {
        let mut ports = MockPorts::default();
        ports
            .dues
            .expect_update_due()
            .returning(|_| Err(Error::conflict("the student already has a due for March 2025")));
        let app = actix_test::init_service(api_app(ports, register)).await;

        let request = actix_test::TestRequest::put()
            .uri(&format!("/api/v1/admin/dues/{}", DueId::random()))
            .set_json(json!({"month": "March 2025", "amount": 500, "isPaid": false}))
            .to_request();
        let response = actix_test::call_service(&app, request).await;
        assert_eq!(response.status(), StatusCode::CONFLICT);
    }

    #[actix_web::test]
    async fn delete_due_returns_no_content() {
        let due_id = DueId::random();
        let mut ports = MockPorts::default();
        ports
            .dues
            .expect_delete_due()
            .withf(move |id| *id == due_id)
            .times(1)
            .returning(|_| Ok(()));
        let app = actix_test::init_service(api_app(ports, register)).await;

        let request = actix_test::TestRequest::delete()
            .uri(&format!("/api/v1/admin/dues/{due_id}"))
            .to_request();
        let response = actix_test::call_service(&app, request).await;
        assert_eq!(response.status(), StatusCode::NO_CONTENT);
    }

    #[actix_web::test]
    async fn toggle_rejects_malformed_ids_before_calling_the_engine() {
        let app = actix_test::init_service(api_app(MockPorts::default(), register)).await;

        let request = actix_test::TestRequest::post()
            .uri("/api/v1/admin/dues/not-a-uuid/toggle-paid")
            .to_request();
        let response = actix_test::call_service(&app, request).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body: Value = actix_test::read_body_json(response).await;
        assert_eq!(error_field(&body), Some("dueId"));
    }

    #[actix_web::test]
    async fn fee_status_sums_outstanding_and_paid() {
        let student_id = StudentId::random();
        let mut ports = MockPorts::default();
        ports
            .dues_query
            .expect_fee_status()
            .withf(move |id| *id == student_id)
            .returning(move |id| {
                Ok(FeeStatus::from_dues(vec![due(id, 500, false), due(id, 400, true)]))
            });
        let app = actix_test::init_service(api_app(ports, register)).await;

        let request = actix_test::TestRequest::get()
            .uri(&format!("/api/v1/students/{student_id}/dues"))
            .to_request();
        let body: Value = actix_test::call_and_read_body_json(&app, request).await;

        assert_eq!(body["outstanding"], 500);
        assert_eq!(body["paid"], 400);
        assert_eq!(body["totalDue"], 900);
        assert_eq!(body["dues"].as_array().map(Vec::len), Some(2));
        assert_eq!(body["dues"][0]["month"], "March 2025");
    }
}
