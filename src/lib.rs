//! # listing-pulse
//!
//! Live per-day view and apply counters for internship listings.
//!
//! The gateway reads today's rows of the `activity_logs` table, folds them
//! into per-listing counters, and keeps that aggregate fresh: every insert
//! notification from PostgreSQL and every local midnight triggers a full
//! rebuild. Clients read the aggregate over REST or subscribe to it over
//! WebSocket.
//!
//! ## Architecture
//!
//! ```text
//! Clients (HTTP, WebSocket)
//!     │
//!     ├── REST Handlers (api/)
//!     ├── WS Handler (ws/)
//!     │
//!     ├── StatsAggregator / StatsSubscription (service/)
//!     ├── EventBus (domain/)
//!     │
//!     ├── StatsFetcher → StatsMap (service/, domain/)
//!     │
//!     └── ActivityStore: PostgreSQL query + LISTEN/NOTIFY (store/)
//! ```

pub mod api;
pub mod app_state;
pub mod config;
pub mod domain;
pub mod error;
pub mod service;
pub mod store;
pub mod ws;
