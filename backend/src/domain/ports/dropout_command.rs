//! Driving port for the dropout workflow.

use async_trait::async_trait;

use crate::domain::{DropoutId, DropoutRequest, Error, StudentId};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DropoutCommand: Send + Sync {
    /// Open a pending request; a student holds at most one at a time.
    async fn request_dropout(
        &self,
        student_id: StudentId,
        reason: String,
    ) -> Result<DropoutRequest, Error>;

    /// Approve a pending request and remove the student.
    ///
    /// Fails with a conflict while the student owes anything.
    async fn approve_dropout(&self, request_id: DropoutId) -> Result<DropoutRequest, Error>;

    async fn reject_dropout(
        &self,
        request_id: DropoutId,
        admin_response: String,
    ) -> Result<DropoutRequest, Error>;
}
