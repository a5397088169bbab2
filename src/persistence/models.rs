//! Database models for the journal and store snapshots.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// A stored row from the `journal` table.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct JournalEntry {
    /// Auto-increment row ID.
    pub id: i64,
    /// Primary entity the notification is about.
    pub entity_id: Uuid,
    /// Event the notification concerns, if any.
    pub event_id: Option<Uuid>,
    /// Notification kind (e.g. `"tickets_purchased"`).
    pub kind: String,
    /// JSONB payload with the full notification.
    #[schema(value_type = Object)]
    pub payload: serde_json::Value,
    /// Server-side creation timestamp.
    pub created_at: DateTime<Utc>,
}

/// A row from the `store_snapshots` table.
#[derive(Debug, Clone)]
pub struct StoredSnapshot {
    /// Auto-increment row ID.
    pub id: i64,
    /// Serialized [`crate::domain::store::StoreSnapshot`].
    pub state: serde_json::Value,
    /// Snapshot timestamp.
    pub snapshot_at: DateTime<Utc>,
}
