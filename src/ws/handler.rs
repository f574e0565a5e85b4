//! Axum WebSocket upgrade handler.

use axum::extract::State;
use axum::extract::ws::WebSocketUpgrade;
use axum::response::IntoResponse;

use super::connection::run_connection;
use crate::app_state::AppState;

/// `GET /ws`: Upgrade HTTP connection to WebSocket.
pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> impl IntoResponse {
    let event_rx = state.event_bus.subscribe();
    let stats = state.stats.clone();
    tracing::debug!(
        subscribers = state.event_bus.receiver_count(),
        "ws client connected"
    );

    ws.on_upgrade(move |socket| run_connection(socket, event_rx, stats))
}
