//! Driving port for sending and housekeeping notifications.

use async_trait::async_trait;

use crate::domain::{Audience, Error, Notification, NotificationId, StudentId};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait NotificationCommand: Send + Sync {
    /// Persist an announcement and push a `new_notification` event.
    async fn broadcast(&self, audience: Audience, message: String) -> Result<Notification, Error>;

    async fn mark_read(
        &self,
        student_id: StudentId,
        notification_id: NotificationId,
    ) -> Result<(), Error>;

    /// Delete notifications past the retention window; returns the count.
    async fn purge_expired(&self) -> Result<u64, Error>;
}
