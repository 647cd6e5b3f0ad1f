//! Leaderboard HTTP handlers.
//!
//! ```text
//! GET /api/v1/leaderboard
//! GET /api/v1/leaderboard/{classKey}
//! GET /api/v1/students/{studentId}/leaderboard
//! ```

use actix_web::{get, web};
use serde::Serialize;
use utoipa::ToSchema;

use crate::domain::{ClassKey, LeaderboardEntry};
use crate::inbound::http::ApiResult;
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, parse_class_key, parse_id};

const CLASS_KEY: FieldName = FieldName::new("classKey");
const STUDENT_ID: FieldName = FieldName::new("studentId");

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardEntryResponse {
    /// 1-based position; ties are broken by roll number.
    pub rank: u32,
    pub student_id: String,
    pub full_name: String,
    pub roll_number: i32,
    pub total: i64,
    pub total_tests: i64,
}

impl From<LeaderboardEntry> for LeaderboardEntryResponse {
    fn from(value: LeaderboardEntry) -> Self {
        Self {
            rank: value.rank,
            student_id: value.student_id.to_string(),
            full_name: value.full_name,
            roll_number: value.roll_number,
            total: value.total,
            total_tests: value.total_tests,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ClassSummary {
    #[schema(example = "11_arts")]
    pub class_key: String,
    #[schema(example = "Class 11 Arts")]
    pub label: String,
}

impl From<ClassKey> for ClassSummary {
    fn from(value: ClassKey) -> Self {
        Self {
            class_key: value.as_str().to_owned(),
            label: value.label().to_owned(),
        }
    }
}

/// Classes that have at least one student on the board.
#[utoipa::path(
    get,
    path = "/api/v1/leaderboard",
    responses(
        (status = 200, description = "Classes with leaderboard data", body = [ClassSummary]),
        (status = 503, description = "Service unavailable", body = ErrorSchema)
    ),
    tags = ["leaderboard"],
    operation_id = "classesWithData"
)]
#[get("/leaderboard")]
pub async fn classes_with_data(
    state: web::Data<HttpState>,
) -> ApiResult<web::Json<Vec<ClassSummary>>> {
    let classes = state.leaderboard.classes_with_data().await?;
    Ok(web::Json(classes.into_iter().map(ClassSummary::from).collect()))
}

#[utoipa::path(
    get,
    path = "/api/v1/leaderboard/{classKey}",
    params(("classKey" = String, Path, description = "Class key")),
    responses(
        (status = 200, description = "Ranked class leaderboard", body = [LeaderboardEntryResponse]),
        (status = 400, description = "Unknown class", body = ErrorSchema)
    ),
    tags = ["leaderboard"],
    operation_id = "leaderboardForClass"
)]
#[get("/leaderboard/{class_key}")]
pub async fn leaderboard_for_class(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<web::Json<Vec<LeaderboardEntryResponse>>> {
    let class_key = parse_class_key(&path.into_inner(), CLASS_KEY)?;
    let entries = state.leaderboard.leaderboard_for_class(class_key).await?;
    Ok(web::Json(
        entries
            .into_iter()
            .map(LeaderboardEntryResponse::from)
            .collect(),
    ))
}

/// The student's own row within their class.
#[utoipa::path(
    get,
    path = "/api/v1/students/{studentId}/leaderboard",
    params(("studentId" = String, Path, description = "Student identifier")),
    responses(
        (status = 200, description = "Leaderboard position", body = LeaderboardEntryResponse),
        (status = 404, description = "Student not found", body = ErrorSchema)
    ),
    tags = ["leaderboard"],
    operation_id = "leaderboardPosition"
)]
#[get("/students/{student_id}/leaderboard")]
pub async fn leaderboard_position(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<web::Json<LeaderboardEntryResponse>> {
    let student_id = parse_id(&path.into_inner(), STUDENT_ID)?;
    let entry = state.leaderboard.leaderboard_position(student_id).await?;
    Ok(web::Json(entry.into()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Error, MarkTotals, StudentId, rank_totals};
    use crate::inbound::http::test_utils::{MockPorts, api_app};
    use actix_web::http::StatusCode;
    use actix_web::test as actix_test;
    use serde_json::{Value, json};

    fn totals(roll_number: i32, total: i64) -> MarkTotals {
        MarkTotals {
            student_id: StudentId::random(),
            full_name: format!("Student {roll_number}"),
            roll_number,
            total,
            tests_taken: 2,
        }
    }

    fn register(cfg: &mut web::ServiceConfig) {
        cfg.service(classes_with_data)
            .service(leaderboard_for_class)
            .service(leaderboard_position);
    }

    #[actix_web::test]
    async fn classes_carry_their_labels() {
        let mut ports = MockPorts::default();
        ports
            .leaderboard
            .expect_classes_with_data()
            .returning(|| Ok(vec![ClassKey::Six, ClassKey::TwelveScience]));
        let app = actix_test::init_service(api_app(ports, register)).await;

        let request = actix_test::TestRequest::get().uri("/api/v1/leaderboard").to_request();
        let body: Value = actix_test::call_and_read_body_json(&app, request).await;
        assert_eq!(
            body,
            json!([
                {"classKey": "6", "label": "Class 6"},
                {"classKey": "12_science", "label": "Class 12 Science"},
            ])
        );
    }

    #[actix_web::test]
    async fn class_leaderboard_keeps_rank_order() {
        let mut ports = MockPorts::default();
        ports
            .leaderboard
            .expect_leaderboard_for_class()
            .withf(|class_key| *class_key == ClassKey::Ten)
            .returning(|_| Ok(rank_totals(vec![totals(2, 80), totals(1, 80), totals(3, 95)])));
        let app = actix_test::init_service(api_app(ports, register)).await;

        let request = actix_test::TestRequest::get()
            .uri("/api/v1/leaderboard/10")
            .to_request();
        let body: Value = actix_test::call_and_read_body_json(&app, request).await;
        let rolls: Vec<i64> = body
            .as_array()
            .expect("array")
            .iter()
            .filter_map(|entry| entry["rollNumber"].as_i64())
            .collect();
        assert_eq!(rolls, vec![3, 1, 2]);
        assert_eq!(body[0]["rank"], 1);
        assert_eq!(body[0]["totalTests"], 2);
    }

    #[actix_web::test]
    async fn position_for_an_unknown_student_is_not_found() {
        let mut ports = MockPorts::default();
        ports
            .leaderboard
            .expect_leaderboard_position()
            .returning(|_| Err(Error::not_found("student not found")));
        let app = actix_test::init_service(api_app(ports, register)).await;

        let request = actix_test::TestRequest::get()
            .uri(&format!("/api/v1/students/{}/leaderboard", StudentId::random()))
            .to_request();
        let response = actix_test::call_service(&app, request).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
