//! Per-connection subscription manager.
//!
//! Tracks which listings a WebSocket client is subscribed to and provides
//! server-side filtering of the aggregate.

use std::collections::HashSet;

use crate::domain::{ListingId, StatsMap};

/// Manages the set of listing subscriptions for a single WebSocket
/// connection.
#[derive(Debug, Default)]
pub struct SubscriptionManager {
    /// Subscribed listings. If `subscribe_all` is true, this set is ignored.
    listing_ids: HashSet<ListingId>,
    /// Whether the client subscribes to all listings (wildcard `"*"`).
    subscribe_all: bool,
}

impl SubscriptionManager {
    /// Creates a new empty subscription manager.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds listings to the subscription set. `wildcard` enables `"*"`.
    pub fn subscribe(&mut self, ids: &[ListingId], wildcard: bool) {
        if wildcard {
            self.subscribe_all = true;
        }
        self.listing_ids.extend(ids.iter().cloned());
    }

    /// Removes listings from the subscription set. `wildcard` clears `"*"`.
    pub fn unsubscribe(&mut self, ids: &[ListingId], wildcard: bool) {
        if wildcard {
            self.subscribe_all = false;
        }
        for id in ids {
            self.listing_ids.remove(id);
        }
    }

    /// Returns `true` if the given listing matches the subscription filter.
    #[must_use]
    pub fn matches(&self, listing_id: &ListingId) -> bool {
        self.subscribe_all || self.listing_ids.contains(listing_id)
    }

    /// Returns `true` if the connection should receive refresh events.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.subscribe_all || !self.listing_ids.is_empty()
    }

    /// Copies the part of `stats` this connection is subscribed to.
    #[must_use]
    pub fn filter(&self, stats: &StatsMap) -> StatsMap {
        if self.subscribe_all {
            return stats.clone();
        }
        stats.filtered(|id| self.matches(id))
    }

    /// Returns the number of explicitly subscribed listings.
    #[must_use]
    pub fn count(&self) -> usize {
        self.listing_ids.len()
    }

    /// Returns `true` if the wildcard subscription is active.
    #[must_use]
    pub fn is_subscribed_all(&self) -> bool {
        self.subscribe_all
    }
}
