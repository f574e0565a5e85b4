//! Shared harness: the full app over an in-memory store on an ephemeral port.

#![allow(dead_code, clippy::panic)]

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};
use listing_pulse::api;
use listing_pulse::app_state::AppState;
use listing_pulse::domain::{
    ActivityEvent, DEFAULT_STATS_TZ, DailyBounds, EventBus, FULL_DAY, RefreshZone,
};
use listing_pulse::service::{RefreshSchedule, StatsAggregator, StatsSubscription};
use listing_pulse::store::{ActivityStore, InMemoryActivityStore};

pub struct TestServer {
    pub addr: SocketAddr,
    pub store: Arc<InMemoryActivityStore>,
    pub subscription: StatsSubscription,
}

/// The instant the server under test takes as "now".
pub fn fixed_now() -> DateTime<Utc> {
    let Ok(now) = "2026-10-17T05:00:00Z".parse::<DateTime<Utc>>() else {
        panic!("bad timestamp literal");
    };
    now
}

/// An instant inside the server's aggregation window.
pub fn today_at(offset_secs: i64) -> DateTime<Utc> {
    DailyBounds::containing(fixed_now(), &DEFAULT_STATS_TZ).start + TimeDelta::seconds(offset_secs)
}

pub fn event(listing: &str, kind: &str) -> ActivityEvent {
    ActivityEvent::new(listing, kind, today_at(60))
}

/// Starts the app and waits until the initial fetch has populated the
/// aggregate.
pub async fn spawn_server(events: Vec<ActivityEvent>) -> TestServer {
    let expect_data = !events.is_empty();
    let store = Arc::new(InMemoryActivityStore::with_events(events));
    let event_bus = EventBus::new(64);
    let aggregator = StatsAggregator::new(
        Arc::clone(&store) as Arc<dyn ActivityStore>,
        DEFAULT_STATS_TZ,
        RefreshZone::Named(DEFAULT_STATS_TZ),
        event_bus.clone(),
    )
    .with_clock(fixed_now);
    let schedule = RefreshSchedule {
        first_delay: FULL_DAY,
        period: FULL_DAY,
    };
    let subscription = tokio_test::assert_ok!(aggregator.attach_with_schedule(schedule).await);

    let mut stats = subscription.stats();
    let ready = tokio::time::timeout(
        Duration::from_secs(5),
        stats.wait_for(|snapshot| !expect_data || !snapshot.stats.is_empty()),
    )
    .await;
    if !matches!(ready, Ok(Ok(_))) {
        panic!("initial fetch did not complete");
    }

    let state = AppState {
        stats: subscription.stats(),
        event_bus,
        stats_time_zone: DEFAULT_STATS_TZ,
        refresh_zone: RefreshZone::HostLocal,
    };
    let app = api::build_app(state);

    let Ok(listener) = tokio::net::TcpListener::bind("127.0.0.1:0").await else {
        panic!("bind failed");
    };
    let Ok(addr) = listener.local_addr() else {
        panic!("no local addr");
    };
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });

    TestServer {
        addr,
        store,
        subscription,
    }
}
