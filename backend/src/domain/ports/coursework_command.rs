//! Driving port for tests, marks and study material.

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::domain::{Audience, ClassTest, Error, Mark, Pdf, Resource, StudentId, TestId};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateTestRequest {
    pub name: String,
    pub held_on: NaiveDate,
    pub total_marks: u32,
    pub audience: Audience,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordMarkRequest {
    pub student_id: StudentId,
    pub test_id: TestId,
    pub marks_obtained: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishPdfRequest {
    pub title: String,
    pub file_path: String,
    pub audience: Audience,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishResourceRequest {
    pub name: String,
    pub link: String,
    pub description: Option<String>,
    pub audience: Audience,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CourseworkCommand: Send + Sync {
    /// Schedule a test and announce it with a `new_test` event.
    async fn create_test(&self, request: CreateTestRequest) -> Result<ClassTest, Error>;

    /// Insert or replace a student's score, bounded by the test total.
    async fn record_mark(&self, request: RecordMarkRequest) -> Result<Mark, Error>;

    /// Remove a student's score for a test.
    async fn delete_mark(&self, test_id: TestId, student_id: StudentId) -> Result<(), Error>;

    /// Record PDF metadata and announce it with a `new_pdf` event.
    async fn publish_pdf(&self, request: PublishPdfRequest) -> Result<Pdf, Error>;

    /// Share a study link and announce it to its audience.
    async fn publish_resource(&self, request: PublishResourceRequest) -> Result<Resource, Error>;
}
