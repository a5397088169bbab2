//! Ticket handlers: purchase, lookup, cancellation.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};

use crate::api::dto::{PaginationParams, PurchaseRequest, TicketListResponse, TicketResponse};
use crate::app_state::AppState;
use crate::domain::{EventId, TicketId};
use crate::error::{ErrorResponse, TicketingError};

/// `POST /events/{id}/tickets` — Buy tickets.
///
/// All line items are checked against the tier counters under the
/// event's lock; either all are honored or none.
///
/// # Errors
///
/// - [`TicketingError::UserNotFound`], [`TicketingError::EventNotFound`],
///   [`TicketingError::TierNotFound`]
/// - [`TicketingError::InsufficientInventory`],
///   [`TicketingError::OrderLimitExceeded`], [`TicketingError::SalesClosed`]
/// - [`TicketingError::InvalidRequest`] for empty or zero-quantity items
#[utoipa::path(
    post,
    path = "/api/v1/events/{id}/tickets",
    tag = "Tickets",
    summary = "Purchase tickets",
    description = "Atomically reserves every line item. If any tier lacks inventory or exceeds its per-order limit, the purchase is rejected and no counter changes.",
    params(("id" = uuid::Uuid, Path, description = "Event UUID")),
    request_body = PurchaseRequest,
    responses(
        (status = 201, description = "Ticket issued", body = TicketResponse),
        (status = 400, description = "Malformed line items", body = ErrorResponse),
        (status = 404, description = "Buyer, event or tier not found", body = ErrorResponse),
        (status = 422, description = "Sold out, over the order limit, or sales closed", body = ErrorResponse),
    )
)]
pub async fn purchase_tickets(
    State(state): State<AppState>,
    Path(id): Path<uuid::Uuid>,
    Json(req): Json<PurchaseRequest>,
) -> Result<impl IntoResponse, TicketingError> {
    let ticket = state
        .ticket_service
        .purchase(EventId::from_uuid(id), req.buyer_id, &req.items)
        .await?;
    Ok((StatusCode::CREATED, Json(TicketResponse::from(ticket))))
}

/// `GET /events/{id}/tickets` — Tickets sold for an event.
///
/// # Errors
///
/// Returns [`TicketingError::EventNotFound`] if the event does not exist.
#[utoipa::path(
    get,
    path = "/api/v1/events/{id}/tickets",
    tag = "Tickets",
    summary = "List an event's tickets",
    params(("id" = uuid::Uuid, Path, description = "Event UUID"), PaginationParams),
    responses(
        (status = 200, description = "Paginated ticket list", body = TicketListResponse),
        (status = 404, description = "Event not found", body = ErrorResponse),
    )
)]
pub async fn list_event_tickets(
    State(state): State<AppState>,
    Path(id): Path<uuid::Uuid>,
    Query(page): Query<PaginationParams>,
) -> Result<impl IntoResponse, TicketingError> {
    let tickets = state
        .ticket_service
        .list_for_event(EventId::from_uuid(id))
        .await?;
    let (data, pagination) = page.paginate(tickets, TicketResponse::from);
    Ok(Json(TicketListResponse { data, pagination }))
}

/// `GET /tickets/{id}` — Get a ticket.
///
/// # Errors
///
/// Returns [`TicketingError::TicketNotFound`] if the ticket does not exist.
#[utoipa::path(
    get,
    path = "/api/v1/tickets/{id}",
    tag = "Tickets",
    summary = "Get a ticket",
    params(("id" = uuid::Uuid, Path, description = "Ticket UUID")),
    responses(
        (status = 200, description = "Ticket", body = TicketResponse),
        (status = 404, description = "Ticket not found", body = ErrorResponse),
    )
)]
pub async fn get_ticket(
    State(state): State<AppState>,
    Path(id): Path<uuid::Uuid>,
) -> Result<impl IntoResponse, TicketingError> {
    let ticket = state
        .ticket_service
        .get_ticket(TicketId::from_uuid(id))
        .await?;
    Ok(Json(TicketResponse::from(ticket)))
}

/// `POST /tickets/{id}/cancel` — Cancel a ticket and release its seats.
///
/// # Errors
///
/// Returns [`TicketingError::TicketNotFound`], or [`TicketingError::Conflict`]
/// if it is already cancelled or the event has started.
#[utoipa::path(
    post,
    path = "/api/v1/tickets/{id}/cancel",
    tag = "Tickets",
    summary = "Cancel a ticket",
    description = "Marks the ticket cancelled and returns its quantities to the tiers. A ticket can be cancelled once.",
    params(("id" = uuid::Uuid, Path, description = "Ticket UUID")),
    responses(
        (status = 200, description = "Cancelled ticket", body = TicketResponse),
        (status = 404, description = "Ticket not found", body = ErrorResponse),
        (status = 409, description = "Already cancelled or event started", body = ErrorResponse),
    )
)]
pub async fn cancel_ticket(
    State(state): State<AppState>,
    Path(id): Path<uuid::Uuid>,
) -> Result<impl IntoResponse, TicketingError> {
    let ticket = state
        .ticket_service
        .cancel_ticket(TicketId::from_uuid(id))
        .await?;
    Ok(Json(TicketResponse::from(ticket)))
}

/// Ticket routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route(
            "/events/{id}/tickets",
            post(purchase_tickets).get(list_event_tickets),
        )
        .route("/tickets/{id}", get(get_ticket))
        .route("/tickets/{id}/cancel", post(cancel_ticket))
}
