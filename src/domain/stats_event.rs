//! Domain events reflecting replacements of the daily aggregate.
//!
//! Every successful fetch emits a [`StatsEvent`] through the
//! [`super::EventBus`]. WebSocket connections forward it to their clients,
//! filtered by the listings each client subscribed to.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::{DailyBounds, RefreshTrigger, StatsMap};

/// Domain event emitted after the held aggregate was replaced.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event_type", rename_all = "snake_case")]
pub enum StatsEvent {
    /// A fetch completed and its map is now the current aggregate.
    StatsRefreshed {
        /// What started the fetch.
        trigger: RefreshTrigger,
        /// Window the fetch covered.
        bounds: DailyBounds,
        /// The new aggregate.
        stats: Arc<StatsMap>,
        /// Completion timestamp.
        timestamp: DateTime<Utc>,
    },
}

impl StatsEvent {
    /// Returns the aggregate carried by this event.
    #[must_use]
    pub fn stats(&self) -> &Arc<StatsMap> {
        match self {
            Self::StatsRefreshed { stats, .. } => stats,
        }
    }

    /// Returns the event type as a static string slice.
    #[must_use]
    pub const fn event_type_str(&self) -> &'static str {
        match self {
            Self::StatsRefreshed { .. } => "stats_refreshed",
        }
    }
}
