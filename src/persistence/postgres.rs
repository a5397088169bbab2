//! PostgreSQL implementation of the persistence layer.

use std::time::Duration;

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use uuid::Uuid;

use super::models::{JournalEntry, StoredSnapshot};
use crate::config::GatewayConfig;
use crate::domain::Notification;
use crate::error::TicketingError;

type JournalRow = (
    i64,
    Uuid,
    Option<Uuid>,
    String,
    serde_json::Value,
    DateTime<Utc>,
);

/// PostgreSQL-backed persistence layer using `sqlx::PgPool`.
#[derive(Debug, Clone)]
pub struct PostgresPersistence {
    pool: PgPool,
}

impl PostgresPersistence {
    /// Creates a new persistence layer with the given connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connects using the configured pool limits and applies the embedded
    /// migrations.
    ///
    /// # Errors
    ///
    /// Returns [`TicketingError::PersistenceError`] if the database is
    /// unreachable or a migration fails.
    pub async fn connect(config: &GatewayConfig) -> Result<Self, TicketingError> {
        let pool = PgPoolOptions::new()
            .max_connections(config.database_max_connections)
            .min_connections(config.database_min_connections)
            .acquire_timeout(Duration::from_secs(config.database_connect_timeout_secs))
            .connect(&config.database_url)
            .await?;

        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .map_err(|e| TicketingError::PersistenceError(e.to_string()))?;

        Ok(Self::new(pool))
    }

    /// Appends a notification to the journal.
    ///
    /// # Errors
    ///
    /// Returns a [`TicketingError::PersistenceError`] on database failure.
    pub async fn save_entry(&self, notification: &Notification) -> Result<i64, TicketingError> {
        let payload = serde_json::to_value(notification)
            .map_err(|e| TicketingError::Internal(e.to_string()))?;

        let id = sqlx::query_scalar::<_, i64>(
            "INSERT INTO journal (entity_id, event_id, kind, payload) VALUES ($1, $2, $3, $4) RETURNING id",
        )
        .bind(notification.entity_id())
        .bind(notification.event_id().map(Uuid::from))
        .bind(notification.kind_str())
        .bind(&payload)
        .fetch_one(&self.pool)
        .await?;

        Ok(id)
    }

    /// Saves a full store snapshot.
    ///
    /// # Errors
    ///
    /// Returns a [`TicketingError::PersistenceError`] on database failure.
    pub async fn save_snapshot(&self, state: &serde_json::Value) -> Result<i64, TicketingError> {
        let id = sqlx::query_scalar::<_, i64>(
            "INSERT INTO store_snapshots (state) VALUES ($1) RETURNING id",
        )
        .bind(state)
        .fetch_one(&self.pool)
        .await?;

        Ok(id)
    }

    /// Loads the most recent snapshot, if any.
    ///
    /// # Errors
    ///
    /// Returns a [`TicketingError::PersistenceError`] on database failure.
    pub async fn load_latest_snapshot(&self) -> Result<Option<StoredSnapshot>, TicketingError> {
        let row = sqlx::query_as::<_, (i64, serde_json::Value, DateTime<Utc>)>(
            "SELECT id, state, snapshot_at FROM store_snapshots ORDER BY snapshot_at DESC, id DESC LIMIT 1",
        )
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|(id, state, snapshot_at)| StoredSnapshot {
            id,
            state,
            snapshot_at,
        }))
    }

    /// Loads journal entries after the given timestamp, optionally
    /// restricted to one entity or one event, oldest first.
    ///
    /// # Errors
    ///
    /// Returns a [`TicketingError::PersistenceError`] on database failure.
    pub async fn load_entries_after(
        &self,
        after: DateTime<Utc>,
        entity_id: Option<Uuid>,
        limit: i64,
    ) -> Result<Vec<JournalEntry>, TicketingError> {
        let rows = if let Some(id) = entity_id {
            sqlx::query_as::<_, JournalRow>(
                "SELECT id, entity_id, event_id, kind, payload, created_at FROM journal \
                 WHERE created_at > $1 AND (entity_id = $2 OR event_id = $2) \
                 ORDER BY created_at ASC, id ASC LIMIT $3",
            )
            .bind(after)
            .bind(id)
            .bind(limit)
            .fetch_all(&self.pool)
            .await
        } else {
            sqlx::query_as::<_, JournalRow>(
                "SELECT id, entity_id, event_id, kind, payload, created_at FROM journal \
                 WHERE created_at > $1 ORDER BY created_at ASC, id ASC LIMIT $2",
            )
            .bind(after)
            .bind(limit)
            .fetch_all(&self.pool)
            .await
        }?;

        Ok(rows
            .into_iter()
            .map(
                |(id, entity_id, event_id, kind, payload, created_at)| JournalEntry {
                    id,
                    entity_id,
                    event_id,
                    kind,
                    payload,
                    created_at,
                },
            )
            .collect())
    }

    /// Deletes snapshots older than the given number of days, always
    /// keeping the newest one.
    ///
    /// # Errors
    ///
    /// Returns a [`TicketingError::PersistenceError`] on database failure.
    pub async fn delete_old_snapshots(&self, before_days: u64) -> Result<u64, TicketingError> {
        let Some(cutoff) = i64::try_from(before_days)
            .ok()
            .and_then(chrono::Duration::try_days)
            .and_then(|age| Utc::now().checked_sub_signed(age))
        else {
            return Ok(0);
        };

        let result = sqlx::query(
            "DELETE FROM store_snapshots WHERE snapshot_at < $1 \
             AND id <> (SELECT id FROM store_snapshots ORDER BY snapshot_at DESC, id DESC LIMIT 1)",
        )
        .bind(cutoff)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }
}
