//! Driving port for reading a student's fee position.

use async_trait::async_trait;

use crate::domain::{Error, FeeStatus, StudentId};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DuesQuery: Send + Sync {
    /// Dues of one student with outstanding, paid and total amounts.
    async fn fee_status(&self, student_id: StudentId) -> Result<FeeStatus, Error>;
}
