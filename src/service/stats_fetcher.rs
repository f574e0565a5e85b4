//! Stats fetcher: queries the daily window and replaces the held aggregate.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use tokio::sync::watch;

use crate::domain::{DailyBounds, DailySnapshot, EventBus, RefreshTrigger, StatsEvent, StatsMap};
use crate::error::GatewayError;
use crate::store::ActivityStore;

/// Source of the current instant. Production code uses [`Utc::now`].
pub type Clock = fn() -> DateTime<Utc>;

/// Holder of the current aggregate plus the means to rebuild it.
///
/// The aggregate lives in a [`watch`] channel as a [`DailySnapshot`] so
/// readers always see the latest complete map, with the window it covers,
/// and can await replacements. Cloning the fetcher shares the same holder.
///
/// Query failures never leave this type: they are logged and the held
/// snapshot stays as it was.
#[derive(Debug, Clone)]
pub struct StatsFetcher {
    store: Arc<dyn ActivityStore>,
    time_zone: Tz,
    clock: Clock,
    snapshot_tx: Arc<watch::Sender<DailySnapshot>>,
    event_bus: EventBus,
}

impl StatsFetcher {
    /// Creates a fetcher reading the wall clock and holding an empty
    /// aggregate.
    #[must_use]
    pub fn new(store: Arc<dyn ActivityStore>, time_zone: Tz, event_bus: EventBus) -> Self {
        Self::with_clock(store, time_zone, event_bus, Utc::now)
    }

    /// Creates a fetcher whose "today" is read from `clock`.
    #[must_use]
    pub fn with_clock(
        store: Arc<dyn ActivityStore>,
        time_zone: Tz,
        event_bus: EventBus,
        clock: Clock,
    ) -> Self {
        let initial = DailySnapshot::empty(DailyBounds::containing(clock(), &time_zone));
        let (snapshot_tx, _) = watch::channel(initial);
        Self {
            store,
            time_zone,
            clock,
            snapshot_tx: Arc::new(snapshot_tx),
            event_bus,
        }
    }

    /// Returns a live-updating reader of the snapshot.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<DailySnapshot> {
        self.snapshot_tx.subscribe()
    }

    /// Returns the snapshot left by the last successful fetch.
    #[must_use]
    pub fn snapshot(&self) -> DailySnapshot {
        self.snapshot_tx.borrow().clone()
    }

    /// Returns the aggregate as of the last successful fetch.
    #[must_use]
    pub fn current(&self) -> Arc<StatsMap> {
        Arc::clone(&self.snapshot_tx.borrow().stats)
    }

    /// Rebuilds the aggregate for the current local day.
    ///
    /// Returns `true` if the held map was replaced.
    pub async fn refresh(&self, trigger: RefreshTrigger) -> bool {
        let bounds = DailyBounds::containing((self.clock)(), &self.time_zone);
        self.refresh_within(bounds, trigger).await
    }

    /// Rebuilds the aggregate for an explicit window.
    ///
    /// Returns `true` if the held map was replaced, `false` if the query
    /// failed and the previous map was kept.
    pub async fn refresh_within(&self, bounds: DailyBounds, trigger: RefreshTrigger) -> bool {
        match self.try_refresh(bounds, trigger).await {
            Ok(listings) => {
                tracing::debug!(%trigger, listings, "daily stats refreshed");
                true
            }
            Err(e) => {
                tracing::error!(error = %e, %trigger, "error fetching daily stats");
                false
            }
        }
    }

    async fn try_refresh(
        &self,
        bounds: DailyBounds,
        trigger: RefreshTrigger,
    ) -> Result<usize, GatewayError> {
        let rows = self.store.fetch_activity(&bounds).await?;
        let stats = Arc::new(StatsMap::from_rows(rows));
        let listings = stats.len();

        self.snapshot_tx.send_replace(DailySnapshot {
            bounds,
            stats: Arc::clone(&stats),
        });

        let _ = self.event_bus.publish(StatsEvent::StatsRefreshed {
            trigger,
            bounds,
            stats,
            timestamp: Utc::now(),
        });

        Ok(listings)
    }
}
