//! Coursework service: tests, marks, PDFs and study links. New material is
//! announced in real time.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use serde_json::json;
use tracing::{info, warn};

use crate::domain::notifications::{resource_message, upload_message};
use crate::domain::ports::{
    CourseworkCommand, CourseworkRepository, CourseworkRepositoryError, CreateTestRequest,
    PublishPdfRequest, PublishResourceRequest, RealtimePublisher, RecordMarkRequest,
};
use crate::domain::{
    ClassTest, CourseworkValidationError, Error, EventKind, Mark, Notification, Pdf,
    RealtimeEvent, Recipient, Resource, StudentId, TestId,
};

const RESOURCES_PAGE: &str = "/student/resources";

fn map_repository_error(error: CourseworkRepositoryError) -> Error {
    match error {
        CourseworkRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("coursework repository unavailable: {message}"))
        }
        CourseworkRepositoryError::Query { message } => {
            Error::internal(format!("coursework repository error: {message}"))
        }
        CourseworkRepositoryError::UnknownStudent { student_id } => {
            Error::not_found(format!("student {student_id} not found"))
        }
    }
}

fn map_validation_error(error: CourseworkValidationError) -> Error {
    let field = match &error {
        CourseworkValidationError::Blank { field } => *field,
        CourseworkValidationError::ZeroTotalMarks => "totalMarks",
        CourseworkValidationError::MarksOutOfRange { .. } => "marksObtained",
        CourseworkValidationError::InvalidLink => "link",
    };
    Error::invalid_request(error.to_string()).with_details(json!({ "field": field }))
}

#[derive(Clone)]
pub struct CourseworkService<C> {
    coursework_repo: Arc<C>,
    publisher: Arc<dyn RealtimePublisher>,
    clock: Arc<dyn Clock>,
}

impl<C> CourseworkService<C> {
    pub fn new(
        coursework_repo: Arc<C>,
        publisher: Arc<dyn RealtimePublisher>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            coursework_repo,
            publisher,
            clock,
        }
    }
}

#[async_trait]
impl<C> CourseworkCommand for CourseworkService<C>
where
    C: CourseworkRepository,
{
    async fn create_test(&self, request: CreateTestRequest) -> Result<ClassTest, Error> {
        let test = ClassTest::try_new(
            &request.name,
            request.audience,
            request.held_on,
            request.total_marks,
        )
        .map_err(map_validation_error)?;
        let message = upload_message("test", &test.name, test.audience);
        let announcement = Notification::new(
            Recipient::Audience(test.audience),
            message.clone(),
            self.clock.utc(),
        );

        self.coursework_repo
            .create_test(&test, &announcement)
            .await
            .map_err(map_repository_error)?;
        self.publisher
            .publish(RealtimeEvent::broadcast(EventKind::NewTest, message));
        info!(test_id = %test.id, audience = %test.audience, "test created");
        Ok(test)
    }

    async fn record_mark(&self, request: RecordMarkRequest) -> Result<Mark, Error> {
        let test = self
            .coursework_repo
            .find_test(&request.test_id)
            .await
            .map_err(map_repository_error)?
            .ok_or_else(|| Error::not_found(format!("test {} not found", request.test_id)))?;
        let marks_obtained = test
            .check_marks(request.marks_obtained)
            .map_err(map_validation_error)?;
        let mark = Mark {
            student_id: request.student_id,
            test_id: test.id,
            marks_obtained,
            updated_at: self.clock.utc(),
        };
        self.coursework_repo
            .upsert_mark(&mark)
            .await
            .map_err(map_repository_error)?;
        Ok(mark)
    }

    async fn delete_mark(&self, test_id: TestId, student_id: StudentId) -> Result<(), Error> {
        let deleted = self
            .coursework_repo
            .delete_mark(&student_id, &test_id)
            .await
            .map_err(map_repository_error)?;
        if !deleted {
            return Err(Error::not_found(format!(
                "no mark for student {student_id} in test {test_id}"
            )));
        }
        warn!(%test_id, %student_id, "mark deleted");
        Ok(())
    }

    async fn publish_pdf(&self, request: PublishPdfRequest) -> Result<Pdf, Error> {
        let now = self.clock.utc();
        let pdf = Pdf::try_new(&request.title, &request.file_path, request.audience, now)
            .map_err(map_validation_error)?;
        let message = upload_message("PDF", &pdf.title, pdf.audience);
        let announcement = Notification::new(Recipient::Audience(pdf.audience), message.clone(), now);

        self.coursework_repo
            .publish_pdf(&pdf, &announcement)
            .await
            .map_err(map_repository_error)?;
        self.publisher
            .publish(RealtimeEvent::broadcast(EventKind::NewPdf, message));
        info!(pdf_id = %pdf.id, audience = %pdf.audience, "pdf published");
        Ok(pdf)
    }

    async fn publish_resource(&self, request: PublishResourceRequest) -> Result<Resource, Error> {
        let now = self.clock.utc();
        let resource = Resource::try_new(
            &request.name,
            &request.link,
            request.description.as_deref(),
            request.audience,
            now,
        )
        .map_err(map_validation_error)?;
        let message = resource_message(&resource.name, resource.audience);
        let announcement =
            Notification::new(Recipient::Audience(resource.audience), message.clone(), now);

        self.coursework_repo
            .publish_resource(&resource, &announcement)
            .await
            .map_err(map_repository_error)?;
        self.publisher.publish(
            RealtimeEvent::broadcast(EventKind::NewNotification, message)
                .linking_to(RESOURCES_PAGE, "View Resources"),
        );
        info!(resource_id = %resource.id, audience = %resource.audience, "resource shared");
        Ok(resource)
    }
}
