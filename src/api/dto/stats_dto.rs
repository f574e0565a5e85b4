//! Response bodies of the stats endpoints.

use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;

use crate::domain::{ListingId, StatsMap};

/// Response for `GET /api/v1/stats`.
#[derive(Debug, Serialize, ToSchema)]
pub struct DailyStatsResponse {
    /// Local calendar date the counters cover in the aggregation zone
    /// (`YYYY-MM-DD`).
    pub date: String,
    /// Aggregation zone name.
    pub time_zone: String,
    /// Start of the window the counters were fetched for (local midnight,
    /// inclusive).
    pub start: DateTime<Utc>,
    /// End of the daily window (local 23:59:59.999, inclusive).
    pub end: DateTime<Utc>,
    /// Number of listings with at least one counted event.
    pub listings: usize,
    /// Per-listing counters keyed by listing id.
    #[schema(value_type = Object)]
    pub stats: StatsMap,
}

/// Response for `GET /api/v1/stats/{listing_id}`.
#[derive(Debug, Serialize, ToSchema)]
pub struct ListingStatsResponse {
    /// Listing identifier.
    #[schema(value_type = String)]
    pub listing_id: ListingId,
    /// Views recorded today.
    pub views: u64,
    /// Applications recorded today.
    pub applies: u64,
}
