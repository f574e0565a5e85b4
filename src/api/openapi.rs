//! OpenAPI document for the REST surface.

use utoipa::OpenApi;

/// Generated OpenAPI specification, served at `/api-docs/openapi.json` when
/// the `swagger-ui` feature is enabled.
#[derive(Debug, OpenApi)]
#[openapi(
    info(
        title = "listing-pulse",
        description = "Live per-day view and apply counters for internship listings"
    ),
    paths(
        crate::api::handlers::system::health_handler,
        crate::api::handlers::system::time_zones_handler,
        crate::api::handlers::stats::get_daily_stats,
        crate::api::handlers::stats::get_listing_stats,
    ),
    components(schemas(
        crate::api::dto::DailyStatsResponse,
        crate::api::dto::ListingStatsResponse,
        crate::api::handlers::system::HealthResponse,
        crate::api::handlers::system::TimeZonesResponse,
        crate::domain::ListingStats,
        crate::error::ErrorResponse,
        crate::error::ErrorBody,
    )),
    tags(
        (name = "Stats", description = "Daily listing counters"),
        (name = "System", description = "Health and configuration"),
    )
)]
pub struct ApiDoc;
