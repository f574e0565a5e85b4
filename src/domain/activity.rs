//! Activity log rows and event kinds.
//!
//! The activity log stores the event name as free text. Only `"view"` and
//! `"apply"` are counted by the daily aggregate; every other value maps to
//! [`ActivityKind::Other`].

use chrono::{DateTime, Utc};

use super::ListingId;

/// Kind of a logged user action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActivityKind {
    /// The listing was viewed.
    View,
    /// Somebody applied to the listing.
    Apply,
    /// Any other event name (e.g. `"reject"`).
    Other,
}

impl ActivityKind {
    /// Classifies a raw `event` column value. Matching is exact.
    #[must_use]
    pub fn from_event(raw: &str) -> Self {
        match raw {
            "view" => Self::View,
            "apply" => Self::Apply,
            _ => Self::Other,
        }
    }

    /// Returns `true` for kinds that contribute to the daily counters.
    #[must_use]
    pub const fn is_countable(self) -> bool {
        matches!(self, Self::View | Self::Apply)
    }
}

/// A row as projected by the daily stats query: `(internship_id, event)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivityRow {
    /// Listing the event was recorded against.
    pub listing_id: ListingId,
    /// Raw event name.
    pub event: String,
}

impl ActivityRow {
    /// Creates a row from its two projected columns.
    #[must_use]
    pub fn new(listing_id: impl Into<ListingId>, event: impl Into<String>) -> Self {
        Self {
            listing_id: listing_id.into(),
            event: event.into(),
        }
    }

    /// Returns the classified event kind.
    #[must_use]
    pub fn kind(&self) -> ActivityKind {
        ActivityKind::from_event(&self.event)
    }
}

/// A full activity log entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivityEvent {
    /// Listing the event was recorded against.
    pub listing_id: ListingId,
    /// Raw event name.
    pub event: String,
    /// Server-side creation timestamp.
    pub created_at: DateTime<Utc>,
}

impl ActivityEvent {
    /// Creates a new log entry.
    #[must_use]
    pub fn new(
        listing_id: impl Into<ListingId>,
        event: impl Into<String>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            listing_id: listing_id.into(),
            event: event.into(),
            created_at,
        }
    }

    /// Projects the entry onto the columns read by the stats query.
    #[must_use]
    pub fn to_row(&self) -> ActivityRow {
        ActivityRow {
            listing_id: self.listing_id.clone(),
            event: self.event.clone(),
        }
    }
}
