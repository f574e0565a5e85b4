//! System endpoints: health check, time zone settings.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use chrono::Utc;
use serde::Serialize;
use utoipa::ToSchema;

use crate::app_state::AppState;

/// Health check response.
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    /// Always `"healthy"` while the process serves requests.
    pub status: String,
    /// Current server time (RFC 3339).
    pub timestamp: String,
    /// Crate version.
    pub version: String,
}

/// `GET /health`: Service health status.
#[utoipa::path(
    get,
    path = "/health",
    tag = "System",
    summary = "Health check",
    description = "Returns service health status, version, and current timestamp.",
    responses(
        (status = 200, description = "Service is healthy", body = HealthResponse),
    )
)]
pub async fn health_handler() -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(HealthResponse {
            status: "healthy".to_string(),
            timestamp: Utc::now().to_rfc3339(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }),
    )
}

/// Time zones in effect.
#[derive(Debug, Serialize, ToSchema)]
pub struct TimeZonesResponse {
    /// Zone that defines "today" for the aggregate.
    pub aggregation_time_zone: String,
    /// Zone whose midnight triggers the daily refresh (`"host-local"` when
    /// the host zone is used).
    pub refresh_time_zone: String,
}

/// `GET /config/time-zones`: Aggregation and refresh zones.
#[utoipa::path(
    get,
    path = "/config/time-zones",
    tag = "System",
    summary = "Configured time zones",
    description = "Returns the zone defining the daily window and the zone whose midnight schedules the refresh. The two may differ.",
    responses(
        (status = 200, description = "Time zone settings", body = TimeZonesResponse),
    )
)]
pub async fn time_zones_handler(State(state): State<AppState>) -> impl IntoResponse {
    Json(TimeZonesResponse {
        aggregation_time_zone: state.stats_time_zone.name().to_string(),
        refresh_time_zone: state.refresh_zone.to_string(),
    })
}

/// System routes mounted at the root level (not under /api/v1).
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health_handler))
        .route("/config/time-zones", get(time_zones_handler))
}
