//! Coursework HTTP handlers: class tests, marks, study PDFs and links.
//!
//! ```text
//! POST   /api/v1/admin/tests
//! PUT    /api/v1/admin/tests/{testId}/marks
//! DELETE /api/v1/admin/tests/{testId}/marks/{studentId}
//! POST   /api/v1/admin/pdfs
//! POST   /api/v1/admin/resources
//! ```

use actix_web::{HttpResponse, delete, post, put, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::ports::{
    CreateTestRequest, PublishPdfRequest, PublishResourceRequest, RecordMarkRequest,
};
use crate::domain::{ClassTest, Error, Mark, Pdf, Resource, StudentId, TestId};
use crate::inbound::http::ApiResult;
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{
    FieldName, missing_field_error, parse_audience, parse_date, parse_id,
};

const TEST_ID: FieldName = FieldName::new("testId");
const STUDENT_ID: FieldName = FieldName::new("studentId");
const AUDIENCE: FieldName = FieldName::new("audience");
const HELD_ON: FieldName = FieldName::new("heldOn");

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ClassTestResponse {
    pub id: String,
    pub name: String,
    pub audience: String,
    #[schema(example = "2025-03-14")]
    pub held_on: String,
    pub total_marks: u32,
}

impl From<ClassTest> for ClassTestResponse {
    fn from(value: ClassTest) -> Self {
        Self {
            id: value.id.to_string(),
            name: value.name,
            audience: value.audience.as_str().to_owned(),
            held_on: value.held_on.format("%Y-%m-%d").to_string(),
            total_marks: value.total_marks,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MarkResponse {
    pub student_id: String,
    pub test_id: String,
    pub marks_obtained: u32,
    pub updated_at: String,
}

impl From<Mark> for MarkResponse {
    fn from(value: Mark) -> Self {
        Self {
            student_id: value.student_id.to_string(),
            test_id: value.test_id.to_string(),
            marks_obtained: value.marks_obtained,
            updated_at: value.updated_at.to_rfc3339(),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PdfResponse {
    pub id: String,
    pub title: String,
    pub file_path: String,
    pub audience: String,
    pub uploaded_at: String,
}

impl From<Pdf> for PdfResponse {
    fn from(value: Pdf) -> Self {
        Self {
            id: value.id.to_string(),
            title: value.title,
            file_path: value.file_path,
            audience: value.audience.as_str().to_owned(),
            uploaded_at: value.uploaded_at.to_rfc3339(),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ResourceResponse {
    pub id: String,
    pub name: String,
    pub link: String,
    pub description: Option<String>,
    pub audience: String,
    pub created_at: String,
}

impl From<Resource> for ResourceResponse {
    fn from(value: Resource) -> Self {
        Self {
            id: value.id.to_string(),
            name: value.name,
            link: value.link,
            description: value.description,
            audience: value.audience.as_str().to_owned(),
            created_at: value.created_at.to_rfc3339(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateTestBody {
    pub name: Option<String>,
    #[schema(example = "2025-03-14")]
    pub held_on: Option<String>,
    pub total_marks: Option<u32>,
    /// `all` or a class key.
    pub audience: Option<String>,
}

#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RecordMarkBody {
    pub student_id: Option<String>,
    pub marks_obtained: Option<u32>,
}

#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PublishPdfBody {
    pub title: Option<String>,
    /// Where the uploaded file already lives; the file itself is not handled here.
    pub file_path: Option<String>,
    pub audience: Option<String>,
}

#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PublishResourceBody {
    pub name: Option<String>,
    #[schema(example = "https://videos.example.com/trigonometry")]
    pub link: Option<String>,
    pub description: Option<String>,
    pub audience: Option<String>,
}

fn parse_create_test(body: CreateTestBody) -> Result<CreateTestRequest, Error> {
    let name = body
        .name
        .ok_or_else(|| missing_field_error(FieldName::new("name")))?;
    let held_on = body.held_on.ok_or_else(|| missing_field_error(HELD_ON))?;
    let total_marks = body
        .total_marks
        .ok_or_else(|| missing_field_error(FieldName::new("totalMarks")))?;
    let audience = body.audience.ok_or_else(|| missing_field_error(AUDIENCE))?;
    Ok(CreateTestRequest {
        name,
        held_on: parse_date(&held_on, HELD_ON)?,
        total_marks,
        audience: parse_audience(&audience, AUDIENCE)?,
    })
}

fn parse_publish_pdf(body: PublishPdfBody) -> Result<PublishPdfRequest, Error> {
    let title = body
        .title
        .ok_or_else(|| missing_field_error(FieldName::new("title")))?;
    let file_path = body
        .file_path
        .ok_or_else(|| missing_field_error(FieldName::new("filePath")))?;
    let audience = body.audience.ok_or_else(|| missing_field_error(AUDIENCE))?;
    Ok(PublishPdfRequest {
        title,
        file_path,
        audience: parse_audience(&audience, AUDIENCE)?,
    })
}

fn parse_publish_resource(body: PublishResourceBody) -> Result<PublishResourceRequest, Error> {
    let name = body
        .name
        .ok_or_else(|| missing_field_error(FieldName::new("name")))?;
    let link = body
        .link
        .ok_or_else(|| missing_field_error(FieldName::new("link")))?;
    let audience = body.audience.ok_or_else(|| missing_field_error(AUDIENCE))?;
    Ok(PublishResourceRequest {
        name,
        link,
        description: body.description,
        audience: parse_audience(&audience, AUDIENCE)?,
    })
}

/// Schedule a class test and announce it.
#[utoipa::path(
    post,
    path = "/api/v1/admin/tests",
    request_body = CreateTestBody,
    responses(
        (status = 201, description = "Test created", body = ClassTestResponse),
        (status = 400, description = "Invalid request", body = ErrorSchema)
    ),
    tags = ["coursework"],
    operation_id = "createTest"
)]
#[post("/admin/tests")]
pub async fn create_test(
    state: web::Data<HttpState>,
    payload: web::Json<CreateTestBody>,
) -> ApiResult<HttpResponse> {
    let request = parse_create_test(payload.into_inner())?;
    let test = state.coursework.create_test(request).await?;
    Ok(HttpResponse::Created().json(ClassTestResponse::from(test)))
}

/// Record or overwrite a student's score for a test.
#[utoipa::path(
    put,
    path = "/api/v1/admin/tests/{testId}/marks",
    params(("testId" = String, Path, description = "Test identifier")),
    request_body = RecordMarkBody,
    responses(
        (status = 200, description = "Stored mark", body = MarkResponse),
        (status = 400, description = "Invalid request or marks out of range", body = ErrorSchema),
        (status = 404, description = "Test or student not found", body = ErrorSchema)
    ),
    tags = ["coursework"],
    operation_id = "recordMark"
)]
#[put("/admin/tests/{test_id}/marks")]
pub async fn record_mark(
    state: web::Data<HttpState>,
    path: web::Path<String>,
    payload: web::Json<RecordMarkBody>,
) -> ApiResult<web::Json<MarkResponse>> {
    let test_id: TestId = parse_id(&path.into_inner(), TEST_ID)?;
    let RecordMarkBody {
        student_id,
        marks_obtained,
    } = payload.into_inner();
    let student_id = student_id.ok_or_else(|| missing_field_error(STUDENT_ID))?;
    let marks_obtained =
        marks_obtained.ok_or_else(|| missing_field_error(FieldName::new("marksObtained")))?;

    let mark = state
        .coursework
        .record_mark(RecordMarkRequest {
            student_id: parse_id(&student_id, STUDENT_ID)?,
            test_id,
            marks_obtained,
        })
        .await?;
    Ok(web::Json(mark.into()))
}

#[utoipa::path(
    delete,
    path = "/api/v1/admin/tests/{testId}/marks/{studentId}",
    params(
        ("testId" = String, Path, description = "Test identifier"),
        ("studentId" = String, Path, description = "Student identifier")
    ),
    responses(
        (status = 204, description = "Mark deleted"),
        (status = 400, description = "Invalid identifier", body = ErrorSchema),
        (status = 404, description = "No mark stored for that student", body = ErrorSchema)
    ),
    tags = ["coursework"],
    operation_id = "deleteMark"
)]
#[delete("/admin/tests/{test_id}/marks/{student_id}")]
pub async fn delete_mark(
    state: web::Data<HttpState>,
    path: web::Path<(String, String)>,
) -> ApiResult<HttpResponse> {
    let (test_id, student_id) = path.into_inner();
    let test_id: TestId = parse_id(&test_id, TEST_ID)?;
    let student_id: StudentId = parse_id(&student_id, STUDENT_ID)?;
    state.coursework.delete_mark(test_id, student_id).await?;
    Ok(HttpResponse::NoContent().finish())
}

#[utoipa::path(
    post,
    path = "/api/v1/admin/pdfs",
    request_body = PublishPdfBody,
    responses(
        (status = 201, description = "PDF published", body = PdfResponse),
        (status = 400, description = "Invalid request", body = ErrorSchema)
    ),
    tags = ["coursework"],
    operation_id = "publishPdf"
)]
#[post("/admin/pdfs")]
pub async fn publish_pdf(
    state: web::Data<HttpState>,
    payload: web::Json<PublishPdfBody>,
) -> ApiResult<HttpResponse> {
    let request = parse_publish_pdf(payload.into_inner())?;
    let pdf = state.coursework.publish_pdf(request).await?;
    Ok(HttpResponse::Created().json(PdfResponse::from(pdf)))
}

/// Share a study link with a class or with everyone.
#[utoipa::path(
    post,
    path = "/api/v1/admin/resources",
    request_body = PublishResourceBody,
    responses(
        (status = 201, description = "Resource shared", body = ResourceResponse),
        (status = 400, description = "Invalid request", body = ErrorSchema)
    ),
    tags = ["coursework"],
    operation_id = "publishResource"
)]
#[post("/admin/resources")]
pub async fn publish_resource(
    state: web::Data<HttpState>,
    payload: web::Json<PublishResourceBody>,
) -> ApiResult<HttpResponse> {
    let request = parse_publish_resource(payload.into_inner())?;
    let resource = state.coursework.publish_resource(request).await?;
    Ok(HttpResponse::Created().json(ResourceResponse::from(resource)))
}
