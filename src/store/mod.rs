//! Store layer: the activity log the aggregate is computed from.
//!
//! [`ActivityStore`] is the seam between the aggregator and the external
//! event log. It exposes the two operations the aggregator consumes: a
//! window query projecting `(internship_id, event)` and a live feed of
//! insert notifications. [`postgres::PostgresActivityStore`] backs it with
//! `sqlx` and `LISTEN/NOTIFY`; [`memory::InMemoryActivityStore`] keeps rows
//! in process.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::domain::{ActivityRow, DailyBounds};
use crate::error::GatewayError;

pub use memory::InMemoryActivityStore;
pub use postgres::PostgresActivityStore;

/// Read side of the activity log.
#[async_trait]
pub trait ActivityStore: Send + Sync + std::fmt::Debug {
    /// Returns every row with `created_at` in `[bounds.start, bounds.end]`,
    /// for all listings, in no particular order.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::StoreError`] if the query fails.
    async fn fetch_activity(
        &self,
        bounds: &DailyBounds,
    ) -> Result<Vec<ActivityRow>, GatewayError>;

    /// Opens a live subscription to inserts into the activity log.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::SubscriptionError`] if the subscription
    /// cannot be established.
    async fn subscribe_inserts(&self) -> Result<InsertFeed, GatewayError>;
}

/// Live feed of insert notifications.
///
/// Each received `()` stands for one inserted row; the content of the
/// notification is not exposed. Dropping the feed closes the subscription.
#[derive(Debug)]
pub struct InsertFeed {
    rx: mpsc::UnboundedReceiver<()>,
    listener: Option<JoinHandle<()>>,
}

impl InsertFeed {
    /// Wraps a notification receiver. `listener` is the task feeding it, if
    /// any; it is aborted when the feed is dropped.
    #[must_use]
    pub fn new(rx: mpsc::UnboundedReceiver<()>, listener: Option<JoinHandle<()>>) -> Self {
        Self { rx, listener }
    }

    /// Waits for the next notification. Returns `None` once the source has
    /// gone away.
    pub async fn next(&mut self) -> Option<()> {
        self.rx.recv().await
    }
}

impl Drop for InsertFeed {
    fn drop(&mut self) {
        if let Some(listener) = self.listener.take() {
            listener.abort();
        }
    }
}
