//! Persisted notifications and the real-time events that nudge clients.
//!
//! A [`Notification`] row is the durable record a student reads later. A
//! [`RealtimeEvent`] is a best-effort push to whoever is connected right now;
//! losing one is never an error.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Audience, NotificationId, StudentId};

/// Named real-time event understood by the student dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    FeeNotification,
    NewNotification,
    NewPdf,
    NewTest,
}

impl EventKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::FeeNotification => "fee_notification",
            Self::NewNotification => "new_notification",
            Self::NewPdf => "new_pdf",
            Self::NewTest => "new_test",
        }
    }

    /// Dashboard page the event links to.
    pub const fn url(self) -> &'static str {
        match self {
            Self::FeeNotification => "/student/fees",
            Self::NewNotification => "/student/notifications",
            Self::NewPdf => "/student/pdfs",
            Self::NewTest => "/student/tests",
        }
    }

    /// Caption of the call-to-action button.
    pub const fn button(self) -> &'static str {
        match self {
            Self::FeeNotification => "View Dues",
            Self::NewNotification => "See it",
            Self::NewPdf => "Open it",
            Self::NewTest => "Update",
        }
    }
}

/// Body carried by every real-time event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventPayload {
    pub message: String,
    pub url: String,
    pub button: String,
}

/// Event pushed to connected clients, optionally limited to one room.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RealtimeEvent {
    pub kind: EventKind,
    pub payload: EventPayload,
    pub room: Option<String>,
}

impl RealtimeEvent {
    /// Event for every connected client.
    pub fn broadcast(kind: EventKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            payload: EventPayload {
                message: message.into(),
                url: kind.url().to_owned(),
                button: kind.button().to_owned(),
            },
            room: None,
        }
    }

    /// Event for the connections of a single student.
    ///
    /// # Examples
    /// ```
    /// use tutorhub::domain::{EventKind, RealtimeEvent, StudentId};
    ///
    /// let student = StudentId::random();
    /// let event = RealtimeEvent::for_student(EventKind::FeeNotification, student, "due");
    /// assert_eq!(event.room, Some(student.room()));
    /// assert_eq!(event.payload.button, "View Dues");
    /// ```
    pub fn for_student(kind: EventKind, student: StudentId, message: impl Into<String>) -> Self {
        Self {
            room: Some(student.room()),
            ..Self::broadcast(kind, message)
        }
    }

    /// Point the call-to-action at a page other than the kind's default.
    pub fn linking_to(mut self, url: &str, button: &str) -> Self {
        url.clone_into(&mut self.payload.url);
        button.clone_into(&mut self.payload.button);
        self
    }

    /// Whether a connection that joined `room` (if any) should receive this.
    pub fn is_visible_to(&self, room: Option<&str>) -> bool {
        match self.room.as_deref() {
            None => true,
            Some(target) => room == Some(target),
        }
    }
}

/// Who a notification is addressed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "camelCase")]
pub enum Recipient {
    Student(StudentId),
    Audience(Audience),
}

/// A persisted notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub id: NotificationId,
    pub recipient: Recipient,
    pub message: String,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
}

impl Notification {
    /// A fresh, unread notification.
    pub fn new(recipient: Recipient, message: impl Into<String>, created_at: DateTime<Utc>) -> Self {
        Self {
            id: NotificationId::random(),
            recipient,
            message: message.into(),
            is_read: false,
            created_at,
        }
    }
}

/// Message announcing new material for an audience.
pub(crate) fn upload_message(kind: &str, title: &str, audience: Audience) -> String {
    format!("New {kind} \"{title}\" uploaded for {}.", audience.label())
}

/// Message announcing a shared study link.
pub(crate) fn resource_message(name: &str, audience: Audience) -> String {
    format!("Resource \"{name}\" is now available for {}.", audience.label())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ClassKey;
    use rstest::rstest;

    #[rstest]
    #[case(EventKind::FeeNotification, "fee_notification", "/student/fees", "View Dues")]
    #[case(EventKind::NewNotification, "new_notification", "/student/notifications", "See it")]
    #[case(EventKind::NewPdf, "new_pdf", "/student/pdfs", "Open it")]
    #[case(EventKind::NewTest, "new_test", "/student/tests", "Update")]
    fn event_kinds_carry_their_links(
        #[case] kind: EventKind,
        #[case] name: &str,
        #[case] url: &str,
        #[case] button: &str,
    ) {
        let event = RealtimeEvent::broadcast(kind, "hello");
        assert_eq!(kind.as_str(), name);
        assert_eq!(event.payload.url, url);
        assert_eq!(event.payload.button, button);
        assert!(event.room.is_none());
    }

    #[test]
    fn room_scoped_events_reach_only_their_room() {
        let student = StudentId::random();
        let event = RealtimeEvent::for_student(EventKind::FeeNotification, student, "due");
        let room = student.room();
        assert!(event.is_visible_to(Some(room.as_str())));
        assert!(!event.is_visible_to(Some("student_other")));
        assert!(!event.is_visible_to(None));
    }

    #[test]
    fn unscoped_events_reach_everyone() {
        let event = RealtimeEvent::broadcast(EventKind::NewPdf, "pdf");
        assert!(event.is_visible_to(None));
        assert!(event.is_visible_to(Some("student_x")));
    }

    #[test]
    fn resource_events_link_to_the_resources_page() {
        let event = RealtimeEvent::broadcast(
            EventKind::NewNotification,
            resource_message("Trig video", Audience::Everyone),
        )
        .linking_to("/student/resources", "View Resources");
        assert_eq!(event.kind.as_str(), "new_notification");
        assert_eq!(event.payload.url, "/student/resources");
        assert_eq!(event.payload.button, "View Resources");
        assert_eq!(
            event.payload.message,
            "Resource \"Trig video\" is now available for All Students."
        );
    }

    #[test]
    fn upload_message_names_audience() {
        let message = upload_message("test", "Algebra I", Audience::Class(ClassKey::Nine));
        assert_eq!(message, "New test \"Algebra I\" uploaded for Class 9.");
    }
}
