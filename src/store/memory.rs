//! In-process activity store.
//!
//! Keeps the activity log in a `Vec` and fans insert notifications out to
//! every open [`InsertFeed`]. Queries can be switched to fail, and every
//! query is counted, which makes the store suitable for exercising the
//! refresh lifecycle without a database.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use tokio::sync::{Mutex, RwLock, mpsc};

use super::{ActivityStore, InsertFeed};
use crate::domain::{ActivityEvent, ActivityRow, DailyBounds};
use crate::error::GatewayError;

/// Activity store held entirely in memory.
#[derive(Debug, Default)]
pub struct InMemoryActivityStore {
    events: RwLock<Vec<ActivityEvent>>,
    subscribers: Mutex<Vec<mpsc::UnboundedSender<()>>>,
    failing: AtomicBool,
    queries: AtomicUsize,
}

impl InMemoryActivityStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store pre-filled with `events`, without notifying anyone.
    #[must_use]
    pub fn with_events(events: Vec<ActivityEvent>) -> Self {
        Self {
            events: RwLock::new(events),
            ..Self::default()
        }
    }

    /// Appends an event and notifies every open subscription once.
    pub async fn record(&self, event: ActivityEvent) {
        self.events.write().await.push(event);

        let mut subscribers = self.subscribers.lock().await;
        subscribers.retain(|tx| tx.send(()).is_ok());
    }

    /// Makes subsequent queries fail (`true`) or succeed (`false`).
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Number of queries served so far, failed ones included.
    #[must_use]
    pub fn query_count(&self) -> usize {
        self.queries.load(Ordering::SeqCst)
    }

    /// Number of subscriptions whose feed is still open.
    pub async fn open_subscriptions(&self) -> usize {
        self.subscribers
            .lock()
            .await
            .iter()
            .filter(|tx| !tx.is_closed())
            .count()
    }
}

#[async_trait]
impl ActivityStore for InMemoryActivityStore {
    async fn fetch_activity(
        &self,
        bounds: &DailyBounds,
    ) -> Result<Vec<ActivityRow>, GatewayError> {
        self.queries.fetch_add(1, Ordering::SeqCst);

        if self.failing.load(Ordering::SeqCst) {
            return Err(GatewayError::StoreError(
                "in-memory store set to fail".to_string(),
            ));
        }

        Ok(self
            .events
            .read()
            .await
            .iter()
            .filter(|event| bounds.contains(event.created_at))
            .map(ActivityEvent::to_row)
            .collect())
    }

    async fn subscribe_inserts(&self) -> Result<InsertFeed, GatewayError> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.subscribers.lock().await.push(tx);
        Ok(InsertFeed::new(rx, None))
    }
}
