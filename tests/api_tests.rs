//! REST surface over a live aggregate.

#![allow(clippy::panic)]

mod common;

use std::time::Duration;

use common::{event, spawn_server};
use serde_json::Value;

async fn get(url: String) -> (reqwest::StatusCode, Value) {
    let Ok(response) = reqwest::get(&url).await else {
        panic!("GET {url} failed");
    };
    let status = response.status();
    let Ok(body) = response.json::<Value>().await else {
        panic!("GET {url} returned non-JSON body");
    };
    (status, body)
}

#[tokio::test]
async fn health_reports_healthy() {
    let server = spawn_server(Vec::new()).await;
    let (status, body) = get(format!("http://{}/health", server.addr)).await;
    assert!(status.is_success());
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
async fn daily_stats_match_scenario() {
    let server = spawn_server(vec![
        event("A", "view"),
        event("A", "view"),
        event("A", "apply"),
        event("B", "view"),
        event("C", "reject"),
    ])
    .await;

    let (status, body) = get(format!("http://{}/api/v1/stats", server.addr)).await;
    assert!(status.is_success());
    assert_eq!(body["listings"], 2);
    assert_eq!(body["stats"]["A"]["views"], 2);
    assert_eq!(body["stats"]["A"]["applies"], 1);
    assert_eq!(body["stats"]["B"]["views"], 1);
    assert_eq!(body["stats"]["B"]["applies"], 0);
    assert!(body["stats"].get("C").is_none());
    assert_eq!(body["time_zone"], "Asia/Jakarta");
    assert_eq!(body["date"], "2026-10-17");
    assert_eq!(body["start"], "2026-10-16T17:00:00Z");
}

#[tokio::test]
async fn listing_endpoint_reads_zero_for_absent_listing() {
    let server = spawn_server(vec![event("A", "apply")]).await;

    let (_, body) = get(format!("http://{}/api/v1/stats/A", server.addr)).await;
    assert_eq!(body["applies"], 1);

    let (status, body) = get(format!("http://{}/api/v1/stats/unknown", server.addr)).await;
    assert!(status.is_success());
    assert_eq!(body["views"], 0);
    assert_eq!(body["applies"], 0);
}

#[tokio::test]
async fn insert_is_visible_after_refresh() {
    let server = spawn_server(vec![event("A", "view")]).await;
    let mut stats = server.subscription.stats();

    server.store.record(event("A", "view")).await;
    let updated = tokio::time::timeout(
        Duration::from_secs(5),
        stats.wait_for(|snapshot| snapshot.stats.get_or_zero("A").views == 2),
    )
    .await;
    assert!(matches!(updated, Ok(Ok(_))));
    drop(updated);

    let (_, body) = get(format!("http://{}/api/v1/stats/A", server.addr)).await;
    assert_eq!(body["views"], 2);
}

#[tokio::test]
async fn store_outage_serves_stale_counters() {
    let server = spawn_server(vec![event("A", "view")]).await;
    server.store.set_failing(true);
    server.store.record(event("A", "view")).await;

    for _ in 0..50 {
        if server.store.query_count() >= 2 {
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    assert!(server.store.query_count() >= 2);

    let (status, body) = get(format!("http://{}/api/v1/stats/A", server.addr)).await;
    assert!(status.is_success());
    assert_eq!(body["views"], 1);
}
