//! Journal read DTOs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::persistence::models::JournalEntry;

/// Default number of journal entries per request.
pub const DEFAULT_JOURNAL_LIMIT: u32 = 100;

/// Maximum number of journal entries per request.
pub const MAX_JOURNAL_LIMIT: u32 = 1000;

/// Query parameters for `GET /journal`.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct JournalQuery {
    /// Only entries strictly newer than this instant. Defaults to the epoch.
    #[serde(default)]
    pub after: Option<DateTime<Utc>>,
    /// Only entries about this entity, or concerning this event.
    #[serde(default)]
    pub entity_id: Option<uuid::Uuid>,
    /// Maximum entries to return (1..=1000, default 100).
    #[serde(default)]
    pub limit: Option<u32>,
}

impl JournalQuery {
    /// Effective row limit after clamping.
    #[must_use]
    pub fn effective_limit(&self) -> i64 {
        i64::from(
            self.limit
                .unwrap_or(DEFAULT_JOURNAL_LIMIT)
                .clamp(1, MAX_JOURNAL_LIMIT),
        )
    }
}

/// Response body for `GET /journal`, oldest entry first.
#[derive(Debug, Serialize, ToSchema)]
pub struct JournalResponse {
    /// Journal entries.
    pub data: Vec<JournalEntry>,
}
