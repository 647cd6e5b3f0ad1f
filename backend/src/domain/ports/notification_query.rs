//! Driving port for a student's notification feed.

use async_trait::async_trait;

use crate::domain::{Error, Notification, StudentId};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait NotificationQuery: Send + Sync {
    async fn notifications_for(&self, student_id: StudentId) -> Result<Vec<Notification>, Error>;
}
