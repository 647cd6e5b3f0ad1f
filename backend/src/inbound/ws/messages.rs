//! Wire-level message definitions for the WebSocket adapter.
//!
//! Real-time events are sent as `{"event": "<kind>", "data": {...}}` text
//! frames. Clients may switch rooms with `{"type": "join", "studentId": ...}`
//! or `{"type": "leave"}`.

use serde::{Deserialize, Serialize};

use crate::domain::{EventPayload, RealtimeEvent, StudentId};

/// Outbound frame for a real-time event.
#[derive(Debug, Serialize)]
pub struct EventFrame<'a> {
    pub event: &'static str,
    pub data: &'a EventPayload,
}

impl<'a> From<&'a RealtimeEvent> for EventFrame<'a> {
    fn from(value: &'a RealtimeEvent) -> Self {
        Self {
            event: value.kind.as_str(),
            data: &value.payload,
        }
    }
}

/// Inbound control message.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ClientMessage {
    #[serde(rename_all = "camelCase")]
    Join { student_id: StudentId },
    Leave,
}

impl ClientMessage {
    /// The room a connection is in after applying this message.
    pub fn room(&self) -> Option<String> {
        match self {
            Self::Join { student_id } => Some(student_id.room()),
            Self::Leave => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::EventKind;
    use rstest::rstest;
    use serde_json::{Value, json};
    use uuid::Uuid;

    #[rstest]
    fn event_frames_carry_kind_and_payload() {
        let event = RealtimeEvent::broadcast(EventKind::NewPdf, "Algebra notes uploaded");
        let value = serde_json::to_value(EventFrame::from(&event)).expect("serialise frame");
        assert_eq!(
            value,
            json!({
                "event": "new_pdf",
                "data": {
                    "message": "Algebra notes uploaded",
                    "url": "/student/pdfs",
                    "button": "Open it",
                },
            })
        );
    }

    #[rstest]
    fn join_selects_the_student_room() {
        let raw = json!({"type": "join", "studentId": Uuid::nil()}).to_string();
        let message: ClientMessage = serde_json::from_str(&raw).expect("valid join");
        assert_eq!(
            message.room().as_deref(),
            Some("student_00000000-0000-0000-0000-000000000000")
        );
    }

    #[rstest]
    #[case(json!({"type": "leave"}), true)]
    #[case(json!({"type": "join"}), false)]
    #[case(json!({"type": "subscribe", "room": "all"}), false)]
    fn control_messages_are_strict(#[case] raw: Value, #[case] valid: bool) {
        assert_eq!(serde_json::from_value::<ClientMessage>(raw).is_ok(), valid);
    }
}
