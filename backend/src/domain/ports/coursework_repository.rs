//! Port for tests, marks, PDF metadata and shared study links.

use async_trait::async_trait;

use crate::domain::{ClassTest, Mark, Notification, Pdf, Resource, StudentId, TestId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by coursework repository adapters.
    pub enum CourseworkRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } =>
            "coursework repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } =>
            "coursework repository query failed: {message}",
        /// The mark references a student that does not exist.
        UnknownStudent { student_id: String } =>
            "student {student_id} does not exist",
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CourseworkRepository: Send + Sync {
    /// Persist a test and its announcement in one transaction.
    async fn create_test(
        &self,
        test: &ClassTest,
        announcement: &Notification,
    ) -> Result<(), CourseworkRepositoryError>;

    async fn find_test(&self, id: &TestId) -> Result<Option<ClassTest>, CourseworkRepositoryError>;

    /// Insert or replace the mark for `(student, test)`.
    async fn upsert_mark(&self, mark: &Mark) -> Result<(), CourseworkRepositoryError>;

    /// Remove the mark for `(student, test)`; `false` when none was stored.
    async fn delete_mark(
        &self,
        student_id: &StudentId,
        test_id: &TestId,
    ) -> Result<bool, CourseworkRepositoryError>;

    /// Persist PDF metadata and its announcement in one transaction.
    async fn publish_pdf(
        &self,
        pdf: &Pdf,
        announcement: &Notification,
    ) -> Result<(), CourseworkRepositoryError>;

    /// Persist a study link and its announcement in one transaction.
    async fn publish_resource(
        &self,
        resource: &Resource,
        announcement: &Notification,
    ) -> Result<(), CourseworkRepositoryError>;
}

/// Fixture repository that stores nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureCourseworkRepository;

#[async_trait]
impl CourseworkRepository for FixtureCourseworkRepository {
    async fn create_test(
        &self,
        _test: &ClassTest,
        _announcement: &Notification,
    ) -> Result<(), CourseworkRepositoryError> {
        Ok(())
    }

    async fn find_test(
        &self,
        _id: &TestId,
    ) -> Result<Option<ClassTest>, CourseworkRepositoryError> {
        Ok(None)
    }

    async fn upsert_mark(&self, _mark: &Mark) -> Result<(), CourseworkRepositoryError> {
        Ok(())
    }

    async fn delete_mark(
        &self,
        _student_id: &StudentId,
        _test_id: &TestId,
    ) -> Result<bool, CourseworkRepositoryError> {
        Ok(false)
    }

    async fn publish_pdf(
        &self,
        _pdf: &Pdf,
        _announcement: &Notification,
    ) -> Result<(), CourseworkRepositoryError> {
        Ok(())
    }

    async fn publish_resource(
        &self,
        _resource: &Resource,
        _announcement: &Notification,
    ) -> Result<(), CourseworkRepositoryError> {
        Ok(())
    }
}
