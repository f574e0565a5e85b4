//! Refresh scheduler: keeps the daily aggregate live while attached.
//!
//! [`StatsAggregator::attach`] acquires three resources and hands them to the
//! returned [`StatsSubscription`]:
//!
//! ```text
//! insert feed ──┐
//! midnight timer ──┼──► trigger channel ──► consumer loop ──► spawn fetch
//! initial ─────┘
//! ```
//!
//! Every trigger starts exactly one fetch. Fetches are spawned, so bursts of
//! triggers produce overlapping fetches and the last one to finish wins.
//! Detaching aborts the timer, the insert feed and the consumer loop; fetches
//! already in flight run to completion.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};

use super::{Clock, StatsFetcher};
use crate::domain::{DailySnapshot, EventBus, FULL_DAY, RefreshTrigger, RefreshZone, StatsMap};
use crate::error::GatewayError;
use crate::store::{ActivityStore, InsertFeed};

/// When the timer-driven refreshes fire relative to attaching.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RefreshSchedule {
    /// Delay until the one-shot midnight refresh.
    pub first_delay: Duration,
    /// Period of the recurring refresh that follows it.
    pub period: Duration,
}

impl RefreshSchedule {
    /// Next local midnight in `zone` after `now`, then every 24 h.
    #[must_use]
    pub fn at_next_midnight_from(now: DateTime<Utc>, zone: RefreshZone) -> Self {
        Self {
            first_delay: zone.until_next_midnight(now),
            period: FULL_DAY,
        }
    }
}

/// Builds live subscriptions to the daily aggregate.
#[derive(Debug, Clone)]
pub struct StatsAggregator {
    store: Arc<dyn ActivityStore>,
    time_zone: Tz,
    refresh_zone: RefreshZone,
    event_bus: EventBus,
    clock: Clock,
}

impl StatsAggregator {
    /// Creates an aggregator over `store`.
    ///
    /// `time_zone` defines "today"; `refresh_zone` decides when midnight
    /// refreshes fire.
    #[must_use]
    pub fn new(
        store: Arc<dyn ActivityStore>,
        time_zone: Tz,
        refresh_zone: RefreshZone,
        event_bus: EventBus,
    ) -> Self {
        Self {
            store,
            time_zone,
            refresh_zone,
            event_bus,
            clock: Utc::now,
        }
    }

    /// Reads "today" and the next midnight from `clock` instead of the wall
    /// clock.
    #[must_use]
    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    /// Starts a subscription with timers at the next local midnight of the
    /// refresh zone.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::SubscriptionError`] if the store's insert feed
    /// cannot be opened.
    pub async fn attach(&self) -> Result<StatsSubscription, GatewayError> {
        let schedule = RefreshSchedule::at_next_midnight_from((self.clock)(), self.refresh_zone);
        self.attach_with_schedule(schedule).await
    }

    /// Starts a subscription with an explicit timer schedule.
    ///
    /// Sends the initial trigger, opens the insert feed, then arms the
    /// timer. The initial fetch is already running while the feed opens.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::SubscriptionError`] if the store's insert feed
    /// cannot be opened. Nothing is left running in that case.
    pub async fn attach_with_schedule(
        &self,
        schedule: RefreshSchedule,
    ) -> Result<StatsSubscription, GatewayError> {
        let fetcher = StatsFetcher::with_clock(
            Arc::clone(&self.store),
            self.time_zone,
            self.event_bus.clone(),
            self.clock,
        );
        let (trigger_tx, trigger_rx) = mpsc::unbounded_channel();

        let consumer = tokio::spawn(run_refresh_loop(fetcher.clone(), trigger_rx));
        let _ = trigger_tx.send(RefreshTrigger::Initial);

        let feed = match self.store.subscribe_inserts().await {
            Ok(feed) => feed,
            Err(e) => {
                consumer.abort();
                return Err(e);
            }
        };

        let notifications = tokio::spawn(forward_inserts(feed, trigger_tx.clone()));
        let timer = tokio::spawn(run_midnight_timer(schedule, trigger_tx));

        tracing::info!(
            time_zone = %self.time_zone,
            refresh_zone = %self.refresh_zone,
            first_refresh_in_secs = schedule.first_delay.as_secs(),
            "stats subscription attached"
        );

        Ok(StatsSubscription {
            fetcher,
            tasks: vec![timer, notifications, consumer],
        })
    }
}

/// A live daily aggregate, kept fresh until detached.
///
/// Owns the insert feed, the midnight timer and the consumer loop. Dropping
/// the subscription has the same effect as [`StatsSubscription::detach`].
#[derive(Debug)]
pub struct StatsSubscription {
    fetcher: StatsFetcher,
    tasks: Vec<JoinHandle<()>>,
}

impl StatsSubscription {
    /// Returns a live-updating reader of the snapshot.
    #[must_use]
    pub fn stats(&self) -> watch::Receiver<DailySnapshot> {
        self.fetcher.subscribe()
    }

    /// Returns the aggregate as of the last successful fetch.
    #[must_use]
    pub fn current(&self) -> Arc<StatsMap> {
        self.fetcher.current()
    }

    /// Cancels the timers and closes the insert feed.
    pub fn detach(mut self) {
        self.release();
        tracing::info!("stats subscription detached");
    }

    fn release(&mut self) {
        for task in self.tasks.drain(..) {
            task.abort();
        }
    }
}

impl Drop for StatsSubscription {
    fn drop(&mut self) {
        self.release();
    }
}

/// Consumes triggers until every sender is gone, spawning one fetch each.
async fn run_refresh_loop(
    fetcher: StatsFetcher,
    mut triggers: mpsc::UnboundedReceiver<RefreshTrigger>,
) {
    while let Some(trigger) = triggers.recv().await {
        let fetcher = fetcher.clone();
        tokio::spawn(async move {
            fetcher.refresh(trigger).await;
        });
    }
}

/// Turns each insert notification into one trigger.
async fn forward_inserts(mut feed: InsertFeed, triggers: mpsc::UnboundedSender<RefreshTrigger>) {
    while feed.next().await.is_some() {
        if triggers.send(RefreshTrigger::Insert).is_err() {
            return;
        }
    }
    tracing::warn!("activity insert feed closed; live updates stopped");
}

/// Fires once after the first delay, then on every period.
async fn run_midnight_timer(
    schedule: RefreshSchedule,
    triggers: mpsc::UnboundedSender<RefreshTrigger>,
) {
    tokio::time::sleep(schedule.first_delay).await;
    if triggers.send(RefreshTrigger::Midnight).is_err() {
        return;
    }

    let mut interval =
        tokio::time::interval_at(Instant::now() + schedule.period, schedule.period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    loop {
        interval.tick().await;
        if triggers.send(RefreshTrigger::Interval).is_err() {
            return;
        }
    }
}
