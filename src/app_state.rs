//! Shared application state injected into all Axum handlers.

use chrono_tz::Tz;
use tokio::sync::watch;

use crate::domain::{DailySnapshot, EventBus, RefreshZone};

/// Shared application state available to all handlers via Axum's
/// `State` extractor.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Live reader of the daily aggregate and its window.
    pub stats: watch::Receiver<DailySnapshot>,
    /// Event bus for WebSocket subscriptions.
    pub event_bus: EventBus,
    /// Zone defining "today".
    pub stats_time_zone: Tz,
    /// Zone whose midnight triggers the daily refresh.
    pub refresh_zone: RefreshZone,
}

impl AppState {
    /// Returns the current aggregate with the window it covers.
    #[must_use]
    pub fn snapshot(&self) -> DailySnapshot {
        self.stats.borrow().clone()
    }
}
