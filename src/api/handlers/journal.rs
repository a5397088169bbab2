//! Journal handler: read back persisted notifications.

use axum::extract::{Query, State};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use chrono::{DateTime, Utc};

use crate::api::dto::{JournalQuery, JournalResponse};
use crate::app_state::AppState;
use crate::error::{ErrorResponse, TicketingError};

/// `GET /journal` — Persisted notifications, oldest first.
///
/// # Errors
///
/// Returns [`TicketingError::PersistenceUnavailable`] in memory-only mode
/// and [`TicketingError::PersistenceError`] on database failure.
#[utoipa::path(
    get,
    path = "/api/v1/journal",
    tag = "Journal",
    summary = "Read the journal",
    description = "Returns journal entries newer than `after`, optionally restricted to one entity id (user, event, ticket, contact) or to everything concerning one event.",
    params(JournalQuery),
    responses(
        (status = 200, description = "Journal entries", body = JournalResponse),
        (status = 503, description = "Persistence disabled", body = ErrorResponse),
    )
)]
pub async fn list_journal(
    State(state): State<AppState>,
    Query(query): Query<JournalQuery>,
) -> Result<impl IntoResponse, TicketingError> {
    let persistence = state
        .persistence
        .as_ref()
        .ok_or(TicketingError::PersistenceUnavailable)?;
    let after = query.after.unwrap_or(DateTime::<Utc>::UNIX_EPOCH);
    let data = persistence
        .load_entries_after(after, query.entity_id, query.effective_limit())
        .await?;
    Ok(Json(JournalResponse { data }))
}

/// Journal routes.
pub fn routes() -> Router<AppState> {
    Router::new().route("/journal", get(list_journal))
}
