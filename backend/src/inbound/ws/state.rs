//! Shared WebSocket adapter state.

use std::sync::Arc;

use url::{Origin, Url};

use crate::outbound::realtime::BroadcastHub;

/// Origins permitted to open a WebSocket, compared by scheme, host and port.
#[derive(Debug, Clone, Default)]
pub struct AllowedOrigins {
    origins: Arc<[Origin]>,
}

impl AllowedOrigins {
    /// Parse configured origins; entries that are not absolute URLs are
    /// returned as the error list.
    pub fn parse<I, S>(raw: I) -> Result<Self, Vec<String>>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut origins = Vec::new();
        let mut invalid = Vec::new();
        for entry in raw {
            let entry = entry.as_ref().trim();
            match Url::parse(entry) {
                Ok(url) if url.origin().is_tuple() => origins.push(url.origin()),
                _ => invalid.push(entry.to_owned()),
            }
        }
        if invalid.is_empty() {
            Ok(Self {
                origins: origins.into(),
            })
        } else {
            Err(invalid)
        }
    }

    pub fn contains(&self, origin: &Url) -> bool {
        let origin = origin.origin();
        self.origins.iter().any(|allowed| *allowed == origin)
    }

    pub fn is_empty(&self) -> bool {
        self.origins.is_empty()
    }
}

/// Dependency bundle for WebSocket connections.
#[derive(Clone)]
pub struct WsState {
    pub hub: BroadcastHub,
    pub allowed_origins: AllowedOrigins,
}

impl WsState {
    pub fn new(hub: BroadcastHub, allowed_origins: AllowedOrigins) -> Self {
        Self {
            hub,
            allowed_origins,
        }
    }
}
