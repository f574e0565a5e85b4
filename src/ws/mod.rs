//! WebSocket layer: connection handling, message routing, subscriptions.
//!
//! The WebSocket endpoint at `/ws` lets clients subscribe to listings and
//! receive their counters every time the daily aggregate is replaced.

pub mod connection;
pub mod handler;
pub mod messages;
pub mod subscription;
