//! Outbound adapters implementing driven ports.
//!
//! - **persistence**: PostgreSQL repositories on Diesel with a `bb8` pool
//! - **realtime**: in-process broadcast hub feeding WebSocket connections
//!
//! Adapters translate between domain types and infrastructure
//! representations. They hold no business rules.

pub mod persistence;
pub mod realtime;
