//! In-process real-time hub.
//!
//! Domain services publish through the [`RealtimePublisher`] port; every
//! WebSocket connection holds a [`broadcast::Receiver`] obtained from
//! [`BroadcastHub::subscribe`] and filters events by room itself. Slow
//! receivers lose the oldest events rather than holding up publishers.

use tokio::sync::broadcast;
use tracing::{debug, warn};

use crate::domain::RealtimeEvent;
use crate::domain::ports::RealtimePublisher;

/// Events buffered per receiver before the oldest are dropped.
pub const DEFAULT_CAPACITY: usize = 256;

/// Cloneable handle to a shared broadcast channel.
#[derive(Debug, Clone)]
pub struct BroadcastHub {
    sender: broadcast::Sender<RealtimeEvent>,
}

impl BroadcastHub {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Join the hub; the receiver sees events published from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<RealtimeEvent> {
        self.sender.subscribe()
    }

    pub fn listener_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for BroadcastHub {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl RealtimePublisher for BroadcastHub {
    fn publish(&self, event: RealtimeEvent) {
        let kind = event.kind.as_str();
        match self.sender.send(event) {
            Ok(listeners) => debug!(event = kind, listeners, "published real-time event"),
            Err(_) => warn!(event = kind, "no real-time listeners; event dropped"),
        }
    }
}
