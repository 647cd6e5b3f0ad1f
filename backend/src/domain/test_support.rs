//! Shared fixtures for domain service unit tests.

use std::sync::{Arc, Mutex};

use chrono::{DateTime, Local, TimeZone, Utc};
use mockable::Clock;

use super::ports::RealtimePublisher;
use super::{ClassKey, RealtimeEvent, Student, StudentId};

/// 10:30 UTC on 14 March 2025, i.e. 16:00 in the centre's +05:30 offset.
pub(crate) fn fixture_timestamp() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 3, 14, 10, 30, 0)
        .single()
        .expect("valid fixture timestamp")
}

struct FixtureClock {
    utc_now: DateTime<Utc>,
}

impl Clock for FixtureClock {
    fn local(&self) -> DateTime<Local> {
        self.utc_now.with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        self.utc_now
    }
}

pub(crate) fn fixture_clock() -> Arc<dyn Clock> {
    clock_at(fixture_timestamp())
}

pub(crate) fn clock_at(utc_now: DateTime<Utc>) -> Arc<dyn Clock> {
    Arc::new(FixtureClock { utc_now })
}

pub(crate) fn student(class_key: ClassKey, roll_number: i32) -> Student {
    Student {
        id: StudentId::random(),
        full_name: format!("Student {roll_number}"),
        class_key,
        roll_number,
        registration_no: super::registration_number(
            class_key,
            u32::try_from(roll_number).unwrap_or(0),
        ),
    }
}

/// Publisher that remembers every event it was handed.
#[derive(Default)]
pub(crate) struct RecordingPublisher {
    events: Mutex<Vec<RealtimeEvent>>,
}

impl RecordingPublisher {
    pub(crate) fn events(&self) -> Vec<RealtimeEvent> {
        self.events.lock().expect("publisher lock").clone()
    }
}

impl RealtimePublisher for RecordingPublisher {
    fn publish(&self, event: RealtimeEvent) {
        self.events.lock().expect("publisher lock").push(event);
    }
}
