//! WebSocket connection state machine.
//!
//! Handles the read/write loop for a single WebSocket connection,
//! dispatching incoming commands and forwarding filtered refresh events.

use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket};
use futures_util::{SinkExt, StreamExt};
use tokio::sync::{broadcast, watch};

use super::messages::{WsCommand, WsMessage, WsMessageType};
use super::subscription::SubscriptionManager;
use crate::domain::{DailySnapshot, ListingId, StatsEvent, StatsMap};

/// Runs the read/write loop for a single WebSocket connection.
///
/// - Reads commands from the client and dispatches them.
/// - Forwards refresh events from the [`broadcast::Receiver`] to the client,
///   restricted to the listings it subscribed to.
pub async fn run_connection(
    socket: WebSocket,
    mut event_rx: broadcast::Receiver<StatsEvent>,
    stats: watch::Receiver<DailySnapshot>,
) {
    let (mut ws_tx, mut ws_rx) = socket.split();
    let mut subs = SubscriptionManager::new();

    loop {
        tokio::select! {
            // Incoming message from client
            msg = ws_rx.next() => {
                match msg {
                    Some(Ok(Message::Text(text))) => {
                        let current = Arc::clone(&stats.borrow().stats);
                        let response = handle_text_message(&text, &mut subs, &current);
                        if let Some(resp_json) = response
                            && ws_tx.send(Message::text(resp_json)).await.is_err() {
                                break;
                            }
                    }
                    Some(Ok(Message::Close(_))) | None => break,
                    _ => {}
                }
            }
            // Event from EventBus
            event = event_rx.recv() => {
                match event {
                    Ok(stats_event) => {
                        if let Some(json) = render_event(&stats_event, &subs)
                            && ws_tx.send(Message::text(json)).await.is_err() {
                                break;
                            }
                    }
                    Err(broadcast::error::RecvError::Lagged(n)) => {
                        tracing::warn!(lagged = n, "ws client lagged behind event bus");
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        }
    }

    tracing::debug!("ws connection closed");
}

/// Serializes an event for this connection, or `None` if the client has no
/// subscriptions.
fn render_event(event: &StatsEvent, subs: &SubscriptionManager) -> Option<String> {
    if !subs.is_active() {
        return None;
    }

    let payload = match event {
        StatsEvent::StatsRefreshed {
            trigger,
            bounds,
            stats,
            timestamp,
        } => {
            let filtered = subs.filter(stats);
            serde_json::json!({
                "event_type": event.event_type_str(),
                "trigger": trigger,
                "start": bounds.start,
                "end": bounds.end,
                "listings": filtered.len(),
                "stats": filtered,
                "timestamp": timestamp,
            })
        }
    };

    let msg = WsMessage::new(uuid::Uuid::new_v4().to_string(), WsMessageType::Event, payload);
    serde_json::to_string(&msg).ok()
}

/// Handles a text message from the client, returning an optional JSON
/// response.
fn handle_text_message(
    text: &str,
    subs: &mut SubscriptionManager,
    current: &StatsMap,
) -> Option<String> {
    let Ok(msg) = serde_json::from_str::<WsMessage>(text) else {
        return serde_json::to_string(&WsMessage::error("", 400, "malformed JSON")).ok();
    };

    let Ok(command) = serde_json::from_value::<WsCommand>(msg.payload) else {
        return serde_json::to_string(&WsMessage::error(msg.id, 404, "unknown command")).ok();
    };

    let payload = match command {
        WsCommand::Subscribe { listing_ids } => {
            let (ids, wildcard) = parse_listing_ids(&listing_ids);
            subs.subscribe(&ids, wildcard);
            let visible = subs.filter(current);
            serde_json::json!({
                "subscribed": ids,
                "count": subs.count(),
                "wildcard": subs.is_subscribed_all(),
                "stats": visible,
            })
        }
        WsCommand::Unsubscribe { listing_ids } => {
            let (ids, wildcard) = parse_listing_ids(&listing_ids);
            subs.unsubscribe(&ids, wildcard);
            serde_json::json!({
                "unsubscribed": ids,
                "remaining_count": subs.count(),
                "wildcard": subs.is_subscribed_all(),
            })
        }
        WsCommand::GetStats => {
            let visible = subs.filter(current);
            serde_json::json!({
                "listings": visible.len(),
                "stats": visible,
            })
        }
    };

    serde_json::to_string(&WsMessage::new(msg.id, WsMessageType::Response, payload)).ok()
}

/// Splits raw ids into listing ids and the `"*"` wildcard flag. Blank ids
/// are dropped.
fn parse_listing_ids(raw: &[String]) -> (Vec<ListingId>, bool) {
    let mut ids = Vec::new();
    let mut wildcard = false;
    for id in raw {
        if id == "*" {
            wildcard = true;
        } else if let Ok(id) = ListingId::parse(id) {
            ids.push(id);
        }
    }
    (ids, wildcard)
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::domain::{ActivityRow, DEFAULT_STATS_TZ, DailyBounds, RefreshTrigger};

    fn sample_stats() -> StatsMap {
        StatsMap::from_rows(vec![
            ActivityRow::new("A", "view"),
            ActivityRow::new("A", "view"),
            ActivityRow::new("B", "apply"),
        ])
    }

    fn command(payload: serde_json::Value) -> String {
        let msg = WsMessage::new("req-1", WsMessageType::Command, payload);
        serde_json::to_string(&msg).unwrap_or_default()
    }

    fn parse(json: Option<String>) -> WsMessage {
        let Some(json) = json else {
            panic!("expected a response");
        };
        let Ok(msg) = serde_json::from_str::<WsMessage>(&json) else {
            panic!("response is not an envelope");
        };
        msg
    }

    #[test]
    fn malformed_json_yields_error() {
        let mut subs = SubscriptionManager::new();
        let msg = parse(handle_text_message("{not json", &mut subs, &sample_stats()));
        assert_eq!(msg.msg_type, WsMessageType::Error);
        assert_eq!(msg.payload["code"], 400);
    }

    #[test]
    fn unknown_command_yields_error() {
        let mut subs = SubscriptionManager::new();
        let text = command(serde_json::json!({"command": "reset_counters"}));
        let msg = parse(handle_text_message(&text, &mut subs, &sample_stats()));
        assert_eq!(msg.msg_type, WsMessageType::Error);
        assert_eq!(msg.id, "req-1");
        assert_eq!(msg.payload["code"], 404);
    }

    #[test]
    fn subscribe_returns_current_counters() {
        let mut subs = SubscriptionManager::new();
        let text = command(serde_json::json!({"command": "subscribe", "listing_ids": ["A", " "]}));
        let msg = parse(handle_text_message(&text, &mut subs, &sample_stats()));
        assert_eq!(msg.msg_type, WsMessageType::Response);
        assert_eq!(msg.payload["count"], 1);
        assert_eq!(msg.payload["wildcard"], false);
        assert_eq!(msg.payload["stats"]["A"]["views"], 2);
        assert!(msg.payload["stats"].get("B").is_none());
    }

    #[test]
    fn get_stats_with_wildcard_returns_everything() {
        let mut subs = SubscriptionManager::new();
        let sub = command(serde_json::json!({"command": "subscribe", "listing_ids": ["*"]}));
        let _ = handle_text_message(&sub, &mut subs, &sample_stats());

        let get = command(serde_json::json!({"command": "get_stats"}));
        let msg = parse(handle_text_message(&get, &mut subs, &sample_stats()));
        assert_eq!(msg.payload["listings"], 2);
        assert_eq!(msg.payload["stats"]["B"]["applies"], 1);
    }

    #[test]
    fn events_are_filtered_per_connection() {
        let event = StatsEvent::StatsRefreshed {
            trigger: RefreshTrigger::Insert,
            bounds: DailyBounds::containing(Utc::now(), &DEFAULT_STATS_TZ),
            stats: Arc::new(sample_stats()),
            timestamp: Utc::now(),
        };

        let idle = SubscriptionManager::new();
        assert!(render_event(&event, &idle).is_none());

        let mut subs = SubscriptionManager::new();
        subs.subscribe(&[ListingId::new("B")], false);
        let msg = parse(render_event(&event, &subs));
        assert_eq!(msg.msg_type, WsMessageType::Event);
        assert_eq!(msg.payload["event_type"], "stats_refreshed");
        assert_eq!(msg.payload["trigger"], "insert");
        assert_eq!(msg.payload["listings"], 1);
        assert!(msg.payload["stats"].get("A").is_none());
    }
}
