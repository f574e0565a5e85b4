//! Per-listing daily counters.
//!
//! [`StatsMap`] is rebuilt from scratch on every refresh by folding the rows
//! of the daily window through [`StatsMap::from_rows`]. It is never merged
//! into: each successful fetch replaces the previous map wholesale.

use std::collections::BTreeMap;
use std::collections::btree_map;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::{ActivityKind, ActivityRow, ListingId};

/// View and apply counts of one listing for the current day.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ListingStats {
    /// Number of `"view"` events.
    pub views: u64,
    /// Number of `"apply"` events.
    pub applies: u64,
}

impl ListingStats {
    /// Bumps the counter matching `kind`; other kinds are ignored.
    pub fn record(&mut self, kind: ActivityKind) {
        match kind {
            ActivityKind::View => self.views = self.views.saturating_add(1),
            ActivityKind::Apply => self.applies = self.applies.saturating_add(1),
            ActivityKind::Other => {}
        }
    }
}

/// Mapping from listing to its counters for the current day.
///
/// Only listings with at least one countable event are present; a missing
/// key means zero views and zero applies. Serializes as a JSON object keyed
/// by listing id, in sorted key order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StatsMap(BTreeMap<ListingId, ListingStats>);

impl StatsMap {
    /// Creates an empty map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Folds query rows into a fresh map.
    ///
    /// Rows whose event is neither `"view"` nor `"apply"` are skipped before
    /// an entry is created, so they never add a listing on their own.
    #[must_use]
    pub fn from_rows<I>(rows: I) -> Self
    where
        I: IntoIterator<Item = ActivityRow>,
    {
        let mut map = BTreeMap::new();
        for row in rows {
            let kind = row.kind();
            if !kind.is_countable() {
                continue;
            }
            map.entry(row.listing_id)
                .or_insert_with(ListingStats::default)
                .record(kind);
        }
        Self(map)
    }

    /// Counters for one listing, if it had countable events.
    #[must_use]
    pub fn get(&self, listing_id: &str) -> Option<&ListingStats> {
        self.0.get(listing_id)
    }

    /// Counters for one listing, zero when absent.
    #[must_use]
    pub fn get_or_zero(&self, listing_id: &str) -> ListingStats {
        self.get(listing_id).copied().unwrap_or_default()
    }

    /// Number of listings in the map.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if no listing had countable events.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterates listings in key order.
    pub fn iter(&self) -> btree_map::Iter<'_, ListingId, ListingStats> {
        self.0.iter()
    }

    /// Copies the entries whose listing satisfies `keep`.
    #[must_use]
    pub fn filtered<F>(&self, mut keep: F) -> Self
    where
        F: FnMut(&ListingId) -> bool,
    {
        Self(
            self.0
                .iter()
                .filter(|(id, _)| keep(id))
                .map(|(id, stats)| (id.clone(), *stats))
                .collect(),
        )
    }
}

impl FromIterator<ActivityRow> for StatsMap {
    fn from_iter<I: IntoIterator<Item = ActivityRow>>(iter: I) -> Self {
        Self::from_rows(iter)
    }
}

impl<'a> IntoIterator for &'a StatsMap {
    type Item = (&'a ListingId, &'a ListingStats);
    type IntoIter = btree_map::Iter<'a, ListingId, ListingStats>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
