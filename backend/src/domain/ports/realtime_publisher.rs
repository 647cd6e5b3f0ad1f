//! Port for pushing real-time events to connected clients.
//!
//! Delivery is fire-and-forget and at most once. Publishing never fails from
//! the caller's point of view; an adapter with no listeners drops the event.

use crate::domain::RealtimeEvent;

#[cfg_attr(test, mockall::automock)]
pub trait RealtimePublisher: Send + Sync {
    fn publish(&self, event: RealtimeEvent);
}

/// Publisher that discards every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureRealtimePublisher;

impl RealtimePublisher for FixtureRealtimePublisher {
    fn publish(&self, event: RealtimeEvent) {
        tracing::trace!(event = event.kind.as_str(), "discarding real-time event");
    }
}
