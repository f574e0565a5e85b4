//! REST API layer: route handlers, DTOs, and router composition.
//!
//! All resource endpoints are mounted under `/api/v1`; system endpoints and
//! the WebSocket upgrade live at the root.

pub mod dto;
pub mod handlers;
pub mod openapi;

use axum::Router;
use axum::routing::get;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::app_state::AppState;
use crate::ws::handler::ws_handler;

/// Builds the complete API router with all REST endpoints.
pub fn build_router() -> Router<AppState> {
    let router = Router::new()
        .nest("/api/v1", handlers::routes())
        .merge(handlers::system::routes());

    #[cfg(feature = "swagger-ui")]
    let router = {
        use utoipa::OpenApi;
        router.merge(
            utoipa_swagger_ui::SwaggerUi::new("/swagger-ui")
                .url("/api-docs/openapi.json", openapi::ApiDoc::openapi()),
        )
    };

    router
}

/// Builds the full application: REST routes, `/ws`, tracing and CORS layers.
pub fn build_app(state: AppState) -> Router {
    Router::new()
        .merge(build_router())
        .route("/ws", get(ws_handler))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use std::sync::Arc;

    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use chrono::{DateTime, TimeDelta, Utc};
    use tokio::sync::watch;
    use tower::ServiceExt;
    use utoipa::OpenApi;

    use super::*;
    use crate::domain::{
        ActivityRow, DEFAULT_STATS_TZ, DailyBounds, DailySnapshot, EventBus, RefreshZone, StatsMap,
    };

    fn today() -> DailyBounds {
        let Ok(now) = "2026-10-17T05:00:00Z".parse::<DateTime<Utc>>() else {
            panic!("bad timestamp literal");
        };
        DailyBounds::containing(now, &DEFAULT_STATS_TZ)
    }

    fn snapshot(bounds: DailyBounds, stats: StatsMap) -> DailySnapshot {
        DailySnapshot {
            bounds,
            stats: Arc::new(stats),
        }
    }

    fn make_state(stats: StatsMap) -> (watch::Sender<DailySnapshot>, AppState) {
        let (tx, rx) = watch::channel(snapshot(today(), stats));
        let state = AppState {
            stats: rx,
            event_bus: EventBus::new(16),
            stats_time_zone: DEFAULT_STATS_TZ,
            refresh_zone: RefreshZone::HostLocal,
        };
        (tx, state)
    }

    async fn get_json(app: Router, uri: &str) -> (StatusCode, serde_json::Value) {
        let Ok(request) = Request::builder().uri(uri).body(Body::empty()) else {
            panic!("bad request");
        };
        let Ok(response) = app.oneshot(request).await else {
            panic!("request failed");
        };
        let status = response.status();
        let Ok(bytes) = axum::body::to_bytes(response.into_body(), usize::MAX).await else {
            panic!("body read failed");
        };
        let json = serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null);
        (status, json)
    }

    #[tokio::test]
    async fn stats_endpoint_returns_current_map() {
        let (_tx, state) = make_state(StatsMap::from_rows(vec![
            ActivityRow::new("A", "view"),
            ActivityRow::new("A", "apply"),
        ]));
        let (status, json) = get_json(build_app(state), "/api/v1/stats").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["listings"], 1);
        assert_eq!(json["time_zone"], "Asia/Jakarta");
        assert_eq!(json["stats"]["A"]["views"], 1);
        assert_eq!(json["stats"]["A"]["applies"], 1);
    }

    #[tokio::test]
    async fn stats_endpoint_sees_replaced_map() {
        let (tx, state) = make_state(StatsMap::new());
        let stats = StatsMap::from_rows(vec![ActivityRow::new("B", "view")]);
        tx.send_replace(snapshot(today(), stats));
        let (_, json) = get_json(build_app(state), "/api/v1/stats").await;
        assert_eq!(json["stats"]["B"]["views"], 1);
    }

    #[tokio::test]
    async fn stats_endpoint_reports_the_fetched_window() {
        let yesterday =
            DailyBounds::containing(today().start - TimeDelta::hours(1), &DEFAULT_STATS_TZ);
        let stats = StatsMap::from_rows(vec![ActivityRow::new("A", "view")]);
        let (tx, state) = make_state(StatsMap::new());
        tx.send_replace(snapshot(yesterday, stats));

        let (_, json) = get_json(build_app(state), "/api/v1/stats").await;
        assert_eq!(json["date"], "2026-10-16");
        assert_eq!(json["start"], "2026-10-15T17:00:00Z");
        assert_eq!(json["end"], "2026-10-16T16:59:59.999Z");
        assert_eq!(json["stats"]["A"]["views"], 1);
    }

    #[tokio::test]
    async fn unknown_listing_reads_zero() {
        let (_tx, state) = make_state(StatsMap::new());
        let (status, json) = get_json(build_app(state), "/api/v1/stats/nope").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["listing_id"], "nope");
        assert_eq!(json["views"], 0);
        assert_eq!(json["applies"], 0);
    }

    #[tokio::test]
    async fn blank_listing_is_rejected() {
        let (_tx, state) = make_state(StatsMap::new());
        let (status, json) = get_json(build_app(state), "/api/v1/stats/%20").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"]["code"], 1001);
    }

    #[tokio::test]
    async fn time_zones_endpoint_reports_both_zones() {
        let (_tx, state) = make_state(StatsMap::new());
        let (status, json) = get_json(build_app(state), "/config/time-zones").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["aggregation_time_zone"], "Asia/Jakarta");
        assert_eq!(json["refresh_time_zone"], "host-local");
    }

    #[test]
    fn openapi_lists_all_paths() {
        let doc = openapi::ApiDoc::openapi();
        for path in [
            "/health",
            "/config/time-zones",
            "/api/v1/stats",
            "/api/v1/stats/{listing_id}",
        ] {
            assert!(doc.paths.paths.contains_key(path), "missing {path}");
        }
    }
}
