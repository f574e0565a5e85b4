//! Service layer: aggregation and refresh orchestration.
//!
//! [`StatsFetcher`] rebuilds the daily aggregate from the activity store and
//! emits events through the [`super::domain::EventBus`].
//! [`StatsAggregator`] attaches a [`StatsSubscription`] that keeps the
//! aggregate fresh on insert notifications and at local midnight.

pub mod refresh_scheduler;
pub mod stats_fetcher;

pub use refresh_scheduler::{RefreshSchedule, StatsAggregator, StatsSubscription};
pub use stats_fetcher::{Clock, StatsFetcher};
