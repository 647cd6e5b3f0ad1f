//! Port for persisted notifications.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::{Notification, NotificationId, StudentId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by notification repository adapters.
    pub enum NotificationRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } =>
            "notification repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } =>
            "notification repository query failed: {message}",
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait NotificationRepository: Send + Sync {
    async fn insert(&self, notification: &Notification) -> Result<(), NotificationRepositoryError>;

    /// Notifications visible to a student: personal ones plus those for the
    /// student's class or for everyone, newest first. `None` for unknown
    /// students.
    async fn visible_to(
        &self,
        student_id: &StudentId,
    ) -> Result<Option<Vec<Notification>>, NotificationRepositoryError>;

    /// Mark a notification visible to the student as read; `false` when no
    /// such notification is visible to them.
    async fn mark_read(
        &self,
        student_id: &StudentId,
        notification_id: &NotificationId,
    ) -> Result<bool, NotificationRepositoryError>;

    /// Delete notifications created before `cutoff`, returning the count.
    async fn purge_before(&self, cutoff: DateTime<Utc>) -> Result<u64, NotificationRepositoryError>;
}

/// Fixture repository that stores nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureNotificationRepository;

#[async_trait]
impl NotificationRepository for FixtureNotificationRepository {
    async fn insert(&self, _notification: &Notification) -> Result<(), NotificationRepositoryError> {
        Ok(())
    }

    async fn visible_to(
        &self,
        _student_id: &StudentId,
    ) -> Result<Option<Vec<Notification>>, NotificationRepositoryError> {
        Ok(None)
    }

    async fn mark_read(
        &self,
        _student_id: &StudentId,
        _notification_id: &NotificationId,
    ) -> Result<bool, NotificationRepositoryError> {
        Ok(false)
    }

    async fn purge_before(
        &self,
        _cutoff: DateTime<Utc>,
    ) -> Result<u64, NotificationRepositoryError> {
        Ok(0)
    }
}
