//! System endpoints: health check and catalog configuration.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use chrono::Utc;
use serde::Serialize;
use utoipa::ToSchema;

use crate::app_state::AppState;

/// Health check response.
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    status: String,
    timestamp: String,
    version: String,
    persistence: bool,
    bus_subscribers: usize,
}

/// `GET /health` — Service health status.
#[utoipa::path(
    get,
    path = "/health",
    tag = "System",
    summary = "Health check",
    description = "Returns service health status, version, current timestamp, whether the journal is backed by PostgreSQL, and the number of live bus subscribers.",
    responses(
        (status = 200, description = "Service is healthy", body = HealthResponse),
    )
)]
pub async fn health_handler(State(state): State<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(HealthResponse {
            status: "healthy".to_string(),
            timestamp: Utc::now().to_rfc3339(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            persistence: state.persistence.is_some(),
            bus_subscribers: state.event_bus.receiver_count(),
        }),
    )
}

/// One category in use by the catalog.
#[derive(Debug, Serialize, ToSchema)]
pub struct CategoryInfo {
    category: String,
    scheduled_events: usize,
}

/// `GET /config/categories` — Categories of scheduled events.
#[utoipa::path(
    get,
    path = "/config/categories",
    tag = "System",
    summary = "List event categories",
    description = "Returns every category used by a scheduled event, alphabetically, with its event count.",
    responses(
        (status = 200, description = "Category catalog", body = Vec<CategoryInfo>),
    )
)]
pub async fn categories_handler(State(state): State<AppState>) -> impl IntoResponse {
    let categories: Vec<CategoryInfo> = state
        .event_service
        .categories()
        .await
        .into_iter()
        .map(|(category, scheduled_events)| CategoryInfo {
            category,
            scheduled_events,
        })
        .collect();
    (StatusCode::OK, Json(categories))
}

/// System routes mounted at the root level (not under /api/v1).
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health_handler))
        .route("/config/categories", get(categories_handler))
}
