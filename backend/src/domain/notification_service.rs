//! Notification service implementing [`NotificationCommand`] and
//! [`NotificationQuery`].

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Duration;
use mockable::Clock;
use serde_json::json;
use tracing::info;

use crate::domain::ports::{
    NotificationCommand, NotificationQuery, NotificationRepository, NotificationRepositoryError,
    RealtimePublisher,
};
use crate::domain::{
    Audience, Error, EventKind, Notification, NotificationId, RealtimeEvent, Recipient, StudentId,
};

/// Notifications older than this many days are purged by default.
pub const DEFAULT_RETENTION_DAYS: u32 = 15;

fn map_repository_error(error: NotificationRepositoryError) -> Error {
    match error {
        NotificationRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("notification repository unavailable: {message}"))
        }
        NotificationRepositoryError::Query { message } => {
            Error::internal(format!("notification repository error: {message}"))
        }
    }
}

#[derive(Clone)]
pub struct NotificationService<N> {
    notification_repo: Arc<N>,
    publisher: Arc<dyn RealtimePublisher>,
    clock: Arc<dyn Clock>,
    retention: Duration,
}

impl<N> NotificationService<N> {
    pub fn new(
        notification_repo: Arc<N>,
        publisher: Arc<dyn RealtimePublisher>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            notification_repo,
            publisher,
            clock,
            retention: Duration::days(i64::from(DEFAULT_RETENTION_DAYS)),
        }
    }

    /// Override how long notifications are kept.
    #[must_use]
    pub fn with_retention_days(mut self, days: u32) -> Self {
        self.retention = Duration::days(i64::from(days));
        self
    }
}

#[async_trait]
impl<N> NotificationCommand for NotificationService<N>
where
    N: NotificationRepository,
{
    async fn broadcast(&self, audience: Audience, message: String) -> Result<Notification, Error> {
        let message = message.trim();
        if message.is_empty() {
            return Err(Error::invalid_request("notification message must not be empty")
                .with_details(json!({ "field": "message" })));
        }
        let notification =
            Notification::new(Recipient::Audience(audience), message, self.clock.utc());
        self.notification_repo
            .insert(&notification)
            .await
            .map_err(map_repository_error)?;
        self.publisher.publish(RealtimeEvent::broadcast(
            EventKind::NewNotification,
            notification.message.clone(),
        ));
        info!(notification_id = %notification.id, audience = %audience, "notification sent");
        Ok(notification)
    }

    async fn mark_read(
        &self,
        student_id: StudentId,
        notification_id: NotificationId,
    ) -> Result<(), Error> {
        let updated = self
            .notification_repo
            .mark_read(&student_id, &notification_id)
            .await
            .map_err(map_repository_error)?;
        if updated {
            Ok(())
        } else {
            Err(Error::not_found(format!(
                "notification {notification_id} not found"
            )))
        }
    }

    async fn purge_expired(&self) -> Result<u64, Error> {
        let cutoff = self.clock.utc() - self.retention;
        let purged = self
            .notification_repo
            .purge_before(cutoff)
            .await
            .map_err(map_repository_error)?;
        info!(purged, %cutoff, "expired notifications purged");
        Ok(purged)
    }
}

#[async_trait]
impl<N> NotificationQuery for NotificationService<N>
where
    N: NotificationRepository,
{
    async fn notifications_for(&self, student_id: StudentId) -> Result<Vec<Notification>, Error> {
        self.notification_repo
            .visible_to(&student_id)
            .await
            .map_err(map_repository_error)?
            .ok_or_else(|| Error::not_found(format!("student {student_id} not found")))
    }
}
