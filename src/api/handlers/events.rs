//! Event handlers: catalog CRUD, cancellation, availability.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::Utc;

use crate::api::dto::{
    AvailabilityResponse, CreateEventRequest, EventListResponse, EventQuery, EventResponse,
    PaginationParams, UpdateEventRequest,
};
use crate::app_state::AppState;
use crate::domain::EventId;
use crate::domain::event::EventDraft;
use crate::error::{ErrorResponse, TicketingError};
use crate::service::{EventFilter, EventPatch};

/// `POST /events` — Publish an event with its venue and tiers.
///
/// # Errors
///
/// Returns [`TicketingError::UserNotFound`] for an unknown organizer and
/// [`TicketingError::InvalidRequest`] for invalid fields or an organizer
/// whose role may not publish.
#[utoipa::path(
    post,
    path = "/api/v1/events",
    tag = "Events",
    summary = "Create an event",
    description = "Creates a scheduled event. Every tier starts with `remaining == capacity`.",
    request_body = CreateEventRequest,
    responses(
        (status = 201, description = "Event created", body = EventResponse),
        (status = 400, description = "Invalid event, venue or tiers", body = ErrorResponse),
        (status = 404, description = "Organizer not found", body = ErrorResponse),
    )
)]
pub async fn create_event(
    State(state): State<AppState>,
    Json(req): Json<CreateEventRequest>,
) -> Result<impl IntoResponse, TicketingError> {
    let event = state
        .event_service
        .create_event(EventDraft::from(req))
        .await?;
    Ok((StatusCode::CREATED, Json(EventResponse::from(event))))
}

/// `GET /events` — List events.
#[utoipa::path(
    get,
    path = "/api/v1/events",
    tag = "Events",
    summary = "List events",
    description = "Paginated, soonest first. Filter by category, organizer, title substring, status, or `upcoming=true`.",
    params(PaginationParams, EventQuery),
    responses(
        (status = 200, description = "Paginated event list", body = EventListResponse),
    )
)]
pub async fn list_events(
    State(state): State<AppState>,
    Query(page): Query<PaginationParams>,
    Query(query): Query<EventQuery>,
) -> Json<EventListResponse> {
    let events = state
        .event_service
        .list_events(&EventFilter::from(query), Utc::now())
        .await;
    let (data, pagination) = page.paginate(events, EventResponse::from);
    Json(EventListResponse { data, pagination })
}

/// `GET /events/{id}` — Get an event.
///
/// # Errors
///
/// Returns [`TicketingError::EventNotFound`] if the event does not exist.
#[utoipa::path(
    get,
    path = "/api/v1/events/{id}",
    tag = "Events",
    summary = "Get an event",
    params(("id" = uuid::Uuid, Path, description = "Event UUID")),
    responses(
        (status = 200, description = "Event with live tier counters", body = EventResponse),
        (status = 404, description = "Event not found", body = ErrorResponse),
    )
)]
pub async fn get_event(
    State(state): State<AppState>,
    Path(id): Path<uuid::Uuid>,
) -> Result<impl IntoResponse, TicketingError> {
    let event = state.event_service.get_event(EventId::from_uuid(id)).await?;
    Ok(Json(EventResponse::from(event)))
}

/// `PATCH /events/{id}` — Update an event and edit its tiers.
///
/// # Errors
///
/// Returns [`TicketingError::EventNotFound`], [`TicketingError::TierNotFound`],
/// [`TicketingError::InvalidRequest`], or [`TicketingError::Conflict`] for a
/// cancelled event or a tier edit that would drop sold tickets.
#[utoipa::path(
    patch,
    path = "/api/v1/events/{id}",
    tag = "Events",
    summary = "Update an event",
    description = "Partial update. `tiers` holds `add`, `update` and `remove` operations applied in order; the whole patch is rejected if any operation fails.",
    params(("id" = uuid::Uuid, Path, description = "Event UUID")),
    request_body = UpdateEventRequest,
    responses(
        (status = 200, description = "Updated event", body = EventResponse),
        (status = 400, description = "Invalid field", body = ErrorResponse),
        (status = 404, description = "Event or tier not found", body = ErrorResponse),
        (status = 409, description = "Event cancelled or tier has sales", body = ErrorResponse),
    )
)]
pub async fn update_event(
    State(state): State<AppState>,
    Path(id): Path<uuid::Uuid>,
    Json(req): Json<UpdateEventRequest>,
) -> Result<impl IntoResponse, TicketingError> {
    let event = state
        .event_service
        .update_event(EventId::from_uuid(id), EventPatch::from(req))
        .await?;
    Ok(Json(EventResponse::from(event)))
}

/// `DELETE /events/{id}` — Delete an event that has sold nothing.
///
/// # Errors
///
/// Returns [`TicketingError::EventNotFound`], or [`TicketingError::Conflict`]
/// while any tier has sold tickets.
#[utoipa::path(
    delete,
    path = "/api/v1/events/{id}",
    tag = "Events",
    summary = "Delete an event",
    params(("id" = uuid::Uuid, Path, description = "Event UUID")),
    responses(
        (status = 204, description = "Event deleted"),
        (status = 404, description = "Event not found", body = ErrorResponse),
        (status = 409, description = "Event has sold tickets", body = ErrorResponse),
    )
)]
pub async fn delete_event(
    State(state): State<AppState>,
    Path(id): Path<uuid::Uuid>,
) -> Result<impl IntoResponse, TicketingError> {
    state
        .event_service
        .delete_event(EventId::from_uuid(id))
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// `POST /events/{id}/cancel` — Cancel an event and stop sales.
///
/// # Errors
///
/// Returns [`TicketingError::EventNotFound`], or [`TicketingError::Conflict`]
/// if it is already cancelled.
#[utoipa::path(
    post,
    path = "/api/v1/events/{id}/cancel",
    tag = "Events",
    summary = "Cancel an event",
    params(("id" = uuid::Uuid, Path, description = "Event UUID")),
    responses(
        (status = 200, description = "Cancelled event", body = EventResponse),
        (status = 404, description = "Event not found", body = ErrorResponse),
        (status = 409, description = "Already cancelled", body = ErrorResponse),
    )
)]
pub async fn cancel_event(
    State(state): State<AppState>,
    Path(id): Path<uuid::Uuid>,
) -> Result<impl IntoResponse, TicketingError> {
    let event = state
        .event_service
        .cancel_event(EventId::from_uuid(id))
        .await?;
    Ok(Json(EventResponse::from(event)))
}

/// `GET /events/{id}/availability` — Per-tier inventory.
///
/// # Errors
///
/// Returns [`TicketingError::EventNotFound`] if the event does not exist.
#[utoipa::path(
    get,
    path = "/api/v1/events/{id}/availability",
    tag = "Events",
    summary = "Tier availability",
    params(("id" = uuid::Uuid, Path, description = "Event UUID")),
    responses(
        (status = 200, description = "Per-tier counters", body = AvailabilityResponse),
        (status = 404, description = "Event not found", body = ErrorResponse),
    )
)]
pub async fn get_availability(
    State(state): State<AppState>,
    Path(id): Path<uuid::Uuid>,
) -> Result<impl IntoResponse, TicketingError> {
    let event_id = EventId::from_uuid(id);
    let levels = state.ticket_service.availability(event_id).await?;
    Ok(Json(AvailabilityResponse::new(event_id, levels)))
}

/// Event routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/events", post(create_event).get(list_events))
        .route(
            "/events/{id}",
            get(get_event).patch(update_event).delete(delete_event),
        )
        .route("/events/{id}/cancel", post(cancel_event))
        .route("/events/{id}/availability", get(get_availability))
}
