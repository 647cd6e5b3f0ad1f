//! Roster HTTP handlers.
//!
//! ```text
//! POST   /api/v1/admin/students
//! DELETE /api/v1/admin/students/{studentId}
//! GET    /api/v1/admin/classes/{classKey}/roster
//! POST   /api/v1/admin/classes/{classKey}/resequence
//! ```

use actix_web::{HttpResponse, delete, get, post, web};
use serde::{Deserialize, Serialize};
use serde_json::json;
use utoipa::ToSchema;

use crate::domain::{Error, NewStudent, RemovedStudent, Student, StudentValidationError};
use crate::inbound::http::ApiResult;
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{
    FieldName, missing_field_error, parse_class_key, parse_id,
};

const FULL_NAME: FieldName = FieldName::new("fullName");
const EMAIL: FieldName = FieldName::new("email");
const CLASS_KEY: FieldName = FieldName::new("classKey");
const STUDENT_ID: FieldName = FieldName::new("studentId");

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StudentResponse {
    pub id: String,
    pub full_name: String,
    #[schema(example = "11_science")]
    pub class_key: String,
    pub roll_number: i32,
    #[schema(example = "E.T.11S(004)")]
    pub registration_no: String,
}

impl From<Student> for StudentResponse {
    fn from(value: Student) -> Self {
        Self {
            id: value.id.to_string(),
            full_name: value.full_name,
            class_key: value.class_key.as_str().to_owned(),
            roll_number: value.roll_number,
            registration_no: value.registration_no,
        }
    }
}

/// The renumbered roster of a class.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RosterResponse {
    pub class_key: String,
    pub students: Vec<StudentResponse>,
}

impl RosterResponse {
    fn new(class_key: &str, students: Vec<Student>) -> Self {
        Self {
            class_key: class_key.to_owned(),
            students: students.into_iter().map(StudentResponse::from).collect(),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ResequenceResponse {
    pub class_key: String,
    /// Number of profiles renumbered.
    pub renumbered: usize,
    pub students: Vec<StudentResponse>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RemovedStudentResponse {
    pub student_id: String,
    pub class_key: String,
    /// The vacated class after resequencing.
    pub remaining: Vec<StudentResponse>,
}

impl From<RemovedStudent> for RemovedStudentResponse {
    fn from(value: RemovedStudent) -> Self {
        Self {
            student_id: value.student_id.to_string(),
            class_key: value.class_key.as_str().to_owned(),
            remaining: value
                .remaining
                .into_iter()
                .map(StudentResponse::from)
                .collect(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterStudentBody {
    pub full_name: Option<String>,
    pub email: Option<String>,
    #[schema(example = "9")]
    pub class_key: Option<String>,
}

fn admission_error(error: StudentValidationError) -> Error {
    let field = match error {
        StudentValidationError::EmptyName => "fullName",
        StudentValidationError::InvalidEmail => "email",
    };
    Error::invalid_request(error.to_string())
        .with_details(json!({"field": field, "code": "invalid_value"}))
}

fn parse_registration(body: RegisterStudentBody) -> Result<NewStudent, Error> {
    let full_name = body.full_name.ok_or_else(|| missing_field_error(FULL_NAME))?;
    let email = body.email.ok_or_else(|| missing_field_error(EMAIL))?;
    let class_key = body.class_key.ok_or_else(|| missing_field_error(CLASS_KEY))?;
    let class_key = parse_class_key(&class_key, CLASS_KEY)?;
    NewStudent::try_new(full_name, email, class_key).map_err(admission_error)
}

/// Admit a student at the end of the global roll sequence.
#[utoipa::path(
    post,
    path = "/api/v1/admin/students",
    request_body = RegisterStudentBody,
    responses(
        (status = 201, description = "Registered student", body = StudentResponse),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 409, description = "Email already registered", body = ErrorSchema)
    ),
    tags = ["roster"],
    operation_id = "registerStudent"
)]
#[post("/admin/students")]
pub async fn register_student(
    state: web::Data<HttpState>,
    payload: web::Json<RegisterStudentBody>,
) -> ApiResult<HttpResponse> {
    let admission = parse_registration(payload.into_inner())?;
    let student = state.roster.register_student(admission).await?;
    Ok(HttpResponse::Created().json(StudentResponse::from(student)))
}

/// Remove a student with every dependent record, then close the roll gap.
#[utoipa::path(
    delete,
    path = "/api/v1/admin/students/{studentId}",
    params(("studentId" = String, Path, description = "Student identifier")),
    responses(
        (status = 200, description = "Student removed", body = RemovedStudentResponse),
        (status = 404, description = "Student not found", body = ErrorSchema)
    ),
    tags = ["roster"],
    operation_id = "removeStudent"
)]
#[delete("/admin/students/{student_id}")]
pub async fn remove_student(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<web::Json<RemovedStudentResponse>> {
    let student_id = parse_id(&path.into_inner(), STUDENT_ID)?;
    let removed = state.roster.remove_student(student_id).await?;
    Ok(web::Json(removed.into()))
}

#[utoipa::path(
    get,
    path = "/api/v1/admin/classes/{classKey}/roster",
    params(("classKey" = String, Path, description = "Class key, e.g. 10 or 12_arts")),
    responses(
        (status = 200, description = "Class roster by roll number", body = RosterResponse),
        (status = 400, description = "Unknown class", body = ErrorSchema)
    ),
    tags = ["roster"],
    operation_id = "classRoster"
)]
#[get("/admin/classes/{class_key}/roster")]
pub async fn class_roster(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<web::Json<RosterResponse>> {
    let class_key = parse_class_key(&path.into_inner(), CLASS_KEY)?;
    let students = state.roster_query.class_roster(class_key).await?;
    Ok(web::Json(RosterResponse::new(class_key.as_str(), students)))
}

/// Renumber a class contiguously from 1, keeping relative order.
#[utoipa::path(
    post,
    path = "/api/v1/admin/classes/{classKey}/resequence",
    params(("classKey" = String, Path, description = "Class key")),
    responses(
        (status = 200, description = "Renumbered roster", body = ResequenceResponse),
        (status = 400, description = "Unknown class", body = ErrorSchema)
    ),
    tags = ["roster"],
    operation_id = "resequenceRollNumbers"
)]
#[post("/admin/classes/{class_key}/resequence")]
pub async fn resequence_class(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<web::Json<ResequenceResponse>> {
    let class_key = parse_class_key(&path.into_inner(), CLASS_KEY)?;
    let students = state.roster.resequence(class_key).await?;
    Ok(web::Json(ResequenceResponse {
        class_key: class_key.as_str().to_owned(),
        renumbered: students.len(),
        students: students.into_iter().map(StudentResponse::from).collect(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ClassKey, StudentId};
    use crate::inbound::http::test_utils::{MockPorts, api_app, error_field};
    use actix_web::http::StatusCode;
    use actix_web::test as actix_test;
    use rstest::rstest;
    use serde_json::Value;

    fn student(class_key: ClassKey, roll_number: i32) -> Student {
        Student {
            id: StudentId::random(),
            full_name: format!("Student {roll_number}"),
            class_key,
            roll_number,
            registration_no: format!("E.T.{}({roll_number:03})", class_key.registration_code()),
        }
    }

    fn register(cfg: &mut web::ServiceConfig) {
        cfg.service(register_student)
            .service(remove_student)
            .service(class_roster)
            .service(resequence_class);
    }

    #[rstest]
    #[case(json!({"email": "a@b.in", "classKey": "9"}), "fullName")]
    #[case(json!({"fullName": "Asha", "classKey": "9"}), "email")]
    #[case(json!({"fullName": "Asha", "email": "a@b.in", "classKey": "13"}), "classKey")]
    #[case(json!({"fullName": "  ", "email": "a@b.in", "classKey": "9"}), "fullName")]
    #[case(json!({"fullName": "Asha", "email": "not-an-email", "classKey": "9"}), "email")]
    #[actix_web::test]
    async fn invalid_registrations_name_the_field(#[case] payload: Value, #[case] field: &str) {
        let app = actix_test::init_service(api_app(MockPorts::default(), register)).await;

        let request = actix_test::TestRequest::post()
            .uri("/api/v1/admin/students")
            .set_json(payload)
            .to_request();
        let response = actix_test::call_service(&app, request).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body: Value = actix_test::read_body_json(response).await;
        assert_eq!(error_field(&body), Some(field));
    }

    #[actix_web::test]
    async fn registration_returns_the_new_student() {
        let mut ports = MockPorts::default();
        ports
            .roster
            .expect_register_student()
            .withf(|admission| {
                admission.full_name() == "Asha Rao"
                    && admission.email() == "asha@example.com"
                    && admission.class_key() == ClassKey::ElevenScience
            })
            .times(1)
            .returning(|_| Ok(student(ClassKey::ElevenScience, 12)));
        let app = actix_test::init_service(api_app(ports, register)).await;

        let request = actix_test::TestRequest::post()
            .uri("/api/v1/admin/students")
            .set_json(json!({
                "fullName": " Asha Rao ",
                "email": "Asha@Example.com",
                "classKey": "11_science",
            }))
            .to_request();
        let response = actix_test::call_service(&app, request).await;
        assert_eq!(response.status(), StatusCode::CREATED);
        let body: Value = actix_test::read_body_json(response).await;
        assert_eq!(body["rollNumber"], 12);
        assert_eq!(body["registrationNo"], "E.T.11S(012)");
    }

    #[actix_web::test]
    async fn removing_an_unknown_student_is_not_found() {
        let mut ports = MockPorts::default();
        ports
            .roster
            .expect_remove_student()
            .returning(|id| Err(Error::not_found(format!("student {id} not found"))));
        let app = actix_test::init_service(api_app(ports, register)).await;

        let request = actix_test::TestRequest::delete()
            .uri(&format!("/api/v1/admin/students/{}", StudentId::random()))
            .to_request();
        let response = actix_test::call_service(&app, request).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[actix_web::test]
    async fn removal_reports_the_resequenced_class() {
        let mut ports = MockPorts::default();
        ports.roster.expect_remove_student().returning(|student_id| {
            Ok(RemovedStudent {
                student_id,
                class_key: ClassKey::Eight,
                remaining: vec![student(ClassKey::Eight, 1), student(ClassKey::Eight, 2)],
            })
        });
        let app = actix_test::init_service(api_app(ports, register)).await;

        let request = actix_test::TestRequest::delete()
            .uri(&format!("/api/v1/admin/students/{}", StudentId::random()))
            .to_request();
        let body: Value = actix_test::call_and_read_body_json(&app, request).await;
        assert_eq!(body["classKey"], "8");
        assert_eq!(body["remaining"][1]["rollNumber"], 2);
    }

    #[actix_web::test]
    async fn resequence_reports_how_many_were_renumbered() {
        let mut ports = MockPorts::default();
        ports
            .roster
            .expect_resequence()
            .withf(|class_key| *class_key == ClassKey::TwelveArts)
            .times(1)
            .returning(|class_key| {
                Ok((1..=3).map(|roll| student(class_key, roll)).collect())
            });
        let app = actix_test::init_service(api_app(ports, register)).await;

        let request = actix_test::TestRequest::post()
            .uri("/api/v1/admin/classes/12_arts/resequence")
            .to_request();
        let body: Value = actix_test::call_and_read_body_json(&app, request).await;
        assert_eq!(body["renumbered"], 3);
        assert_eq!(body["students"][2]["rollNumber"], 3);
    }

    #[actix_web::test]
    async fn roster_rejects_unknown_classes() {
        let app = actix_test::init_service(api_app(MockPorts::default(), register)).await;

        let request = actix_test::TestRequest::get()
            .uri("/api/v1/admin/classes/5/roster")
            .to_request();
        let response = actix_test::call_service(&app, request).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body: Value = actix_test::read_body_json(response).await;
        assert_eq!(error_field(&body), Some("classKey"));
    }
}
