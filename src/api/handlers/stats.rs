//! Daily stats handlers: full aggregate and single listing.

use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};

use crate::api::dto::{DailyStatsResponse, ListingStatsResponse};
use crate::app_state::AppState;
use crate::domain::{DailySnapshot, ListingId};
use crate::error::{ErrorResponse, GatewayError};

/// `GET /stats`: Counters for every listing over the last fetched day.
#[utoipa::path(
    get,
    path = "/api/v1/stats",
    tag = "Stats",
    summary = "Today's counters for all listings",
    description = "Returns the current daily aggregate and the window it was computed for. Listings without views or applies in that window are absent from `stats`.",
    responses(
        (status = 200, description = "Current daily aggregate", body = DailyStatsResponse),
    )
)]
pub async fn get_daily_stats(State(state): State<AppState>) -> impl IntoResponse {
    let DailySnapshot { bounds, stats } = state.snapshot();

    Json(DailyStatsResponse {
        date: bounds.local_date(&state.stats_time_zone).to_string(),
        time_zone: state.stats_time_zone.name().to_string(),
        start: bounds.start,
        end: bounds.end,
        listings: stats.len(),
        stats: (*stats).clone(),
    })
}

/// `GET /stats/{listing_id}`: Today's counters for one listing.
///
/// # Errors
///
/// Returns [`GatewayError::InvalidRequest`] for a blank listing id.
#[utoipa::path(
    get,
    path = "/api/v1/stats/{listing_id}",
    tag = "Stats",
    summary = "Today's counters for one listing",
    description = "Returns the listing's views and applies for today; both are zero when the listing has no activity.",
    params(
        ("listing_id" = String, Path, description = "Listing identifier"),
    ),
    responses(
        (status = 200, description = "Listing counters", body = ListingStatsResponse),
        (status = 400, description = "Blank listing id", body = ErrorResponse),
    )
)]
pub async fn get_listing_stats(
    State(state): State<AppState>,
    Path(listing_id): Path<String>,
) -> Result<impl IntoResponse, GatewayError> {
    let listing_id = ListingId::parse(&listing_id)?;
    let counters = state.snapshot().stats.get_or_zero(listing_id.as_str());

    Ok(Json(ListingStatsResponse {
        listing_id,
        views: counters.views,
        applies: counters.applies,
    }))
}

/// Stats routes, mounted under `/api/v1`.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/stats", get(get_daily_stats))
        .route("/stats/{listing_id}", get(get_listing_stats))
}
