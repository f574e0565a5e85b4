//! PostgreSQL implementation of the activity store.

use std::time::Duration;

use async_trait::async_trait;
use sqlx::PgPool;
use sqlx::postgres::{PgListener, PgPoolOptions};
use tokio::sync::mpsc;

use super::{ActivityStore, InsertFeed};
use crate::config::{GatewayConfig, validate_identifier};
use crate::domain::{ActivityRow, DailyBounds};
use crate::error::GatewayError;

/// PostgreSQL-backed activity store using `sqlx::PgPool`.
///
/// Reads `<schema>.activity_logs` and listens on a `NOTIFY` channel raised by
/// the insert trigger installed with the bundled migrations. Each inserted
/// row produces one notification with payload `<table schema>:<row id>`;
/// only those whose schema matches `schema` are forwarded.
#[derive(Debug, Clone)]
pub struct PostgresActivityStore {
    pool: PgPool,
    schema: String,
    channel: String,
    fetch_sql: String,
}

impl PostgresActivityStore {
    /// Creates a store over the given connection pool.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::InvalidConfig`] if `schema` or `channel` is
    /// not a plain SQL identifier.
    pub fn new(pool: PgPool, schema: &str, channel: &str) -> Result<Self, GatewayError> {
        validate_identifier(schema)?;
        validate_identifier(channel)?;

        let fetch_sql = format!(
            "SELECT internship_id::text, event::text FROM {schema}.activity_logs \
             WHERE created_at >= $1 AND created_at <= $2"
        );

        Ok(Self {
            pool,
            schema: schema.to_string(),
            channel: channel.to_string(),
            fetch_sql,
        })
    }

    /// Opens a connection pool sized from the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::StoreError`] if the database is unreachable.
    pub async fn connect_pool(config: &GatewayConfig) -> Result<PgPool, GatewayError> {
        let pool = PgPoolOptions::new()
            .max_connections(config.database_max_connections)
            .min_connections(config.database_min_connections)
            .acquire_timeout(Duration::from_secs(config.database_connect_timeout_secs))
            .connect(&config.database_url)
            .await?;
        Ok(pool)
    }

    /// Applies the bundled migrations (table, index, insert trigger).
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::StoreError`] on migration failure.
    pub async fn run_migrations(&self) -> Result<(), GatewayError> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| GatewayError::StoreError(e.to_string()))
    }
}

#[async_trait]
impl ActivityStore for PostgresActivityStore {
    async fn fetch_activity(
        &self,
        bounds: &DailyBounds,
    ) -> Result<Vec<ActivityRow>, GatewayError> {
        let rows = sqlx::query_as::<_, (String, String)>(&self.fetch_sql)
            .bind(bounds.start)
            .bind(bounds.end)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows
            .into_iter()
            .map(|(listing_id, event)| ActivityRow::new(listing_id, event))
            .collect())
    }

    async fn subscribe_inserts(&self) -> Result<InsertFeed, GatewayError> {
        let mut listener = PgListener::connect_with(&self.pool)
            .await
            .map_err(|e| GatewayError::SubscriptionError(e.to_string()))?;
        listener
            .listen(&self.channel)
            .await
            .map_err(|e| GatewayError::SubscriptionError(e.to_string()))?;

        tracing::info!(
            channel = %self.channel,
            schema = %self.schema,
            "listening for activity inserts"
        );

        let (tx, rx) = mpsc::unbounded_channel();
        let schema = self.schema.clone();
        let handle = tokio::spawn(async move {
            loop {
                match listener.try_recv().await {
                    Ok(Some(notification)) => {
                        if !is_local_insert(notification.payload(), &schema) {
                            continue;
                        }
                        if tx.send(()).is_err() {
                            break;
                        }
                    }
                    Ok(None) => {
                        tracing::warn!("activity listener connection lost, reconnecting");
                    }
                    Err(e) => {
                        tracing::warn!(error = %e, "activity listener stopped");
                        break;
                    }
                }
            }
        });

        Ok(InsertFeed::new(rx, Some(handle)))
    }
}

/// Returns `true` if an insert notification was raised by the table in
/// `schema`. The payload is `<schema>:<row id>`; a bare `<schema>` is also
/// accepted.
fn is_local_insert(payload: &str, schema: &str) -> bool {
    let source = payload
        .split_once(':')
        .map_or(payload, |(source, _)| source);
    source == schema
}
