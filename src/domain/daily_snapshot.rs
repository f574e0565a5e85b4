//! The held aggregate together with the window it was computed for.

use std::sync::Arc;

use super::{DailyBounds, StatsMap};

/// Result of the last successful fetch.
///
/// `bounds` is the window that fetch covered, which lags the wall clock
/// between local midnight in the aggregation zone and the next refresh.
/// Cloning is cheap: the map is shared.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DailySnapshot {
    /// Window the counters were computed over.
    pub bounds: DailyBounds,
    /// Per-listing counters.
    pub stats: Arc<StatsMap>,
}

impl DailySnapshot {
    /// An empty aggregate for `bounds`, held until the first fetch lands.
    #[must_use]
    pub fn empty(bounds: DailyBounds) -> Self {
        Self {
            bounds,
            stats: Arc::new(StatsMap::new()),
        }
    }
}
