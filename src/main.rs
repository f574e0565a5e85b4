//! listing-pulse server entry point.
//!
//! Connects to PostgreSQL, attaches the live daily aggregate, and starts the
//! Axum HTTP server with REST and WebSocket endpoints.

use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use listing_pulse::api;
use listing_pulse::app_state::AppState;
use listing_pulse::config::{GatewayConfig, LogFormat};
use listing_pulse::domain::EventBus;
use listing_pulse::service::StatsAggregator;
use listing_pulse::store::{ActivityStore, PostgresActivityStore};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration
    let config = GatewayConfig::from_env()?;

    // Initialize tracing
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    match config.log_format {
        LogFormat::Json => tracing_subscriber::fmt().json().with_env_filter(filter).init(),
        LogFormat::Text => tracing_subscriber::fmt().with_env_filter(filter).init(),
    }

    tracing::info!(addr = %config.listen_addr, "starting listing-pulse");

    // Build store layer
    let pool = PostgresActivityStore::connect_pool(&config).await?;
    let store = PostgresActivityStore::new(pool, &config.activity_schema, &config.notify_channel)?;
    if config.run_migrations {
        store.run_migrations().await?;
        tracing::info!("migrations applied");
    }
    let store: Arc<dyn ActivityStore> = Arc::new(store);

    // Build domain and service layers
    let event_bus = EventBus::new(config.event_bus_capacity);
    let aggregator = StatsAggregator::new(
        store,
        config.stats_time_zone,
        config.refresh_zone,
        event_bus.clone(),
    );
    let subscription = aggregator.attach().await?;

    // Build application state
    let app_state = AppState {
        stats: subscription.stats(),
        event_bus,
        stats_time_zone: config.stats_time_zone,
        refresh_zone: config.refresh_zone,
    };

    // Start server
    let app = api::build_app(app_state);
    let listener = tokio::net::TcpListener::bind(config.listen_addr).await?;
    tracing::info!(addr = %config.listen_addr, "server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    subscription.detach();
    tracing::info!("server shutdown complete");

    Ok(())
}

/// Resolves on Ctrl-C.
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("graceful shutdown initiated");
}
