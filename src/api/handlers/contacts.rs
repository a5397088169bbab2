//! Contact form handlers.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};

use crate::api::dto::{
    ContactListResponse, ContactQuery, ContactResponse, CreateContactRequest, PaginationParams,
    UpdateContactRequest,
};
use crate::app_state::AppState;
use crate::domain::ContactId;
use crate::error::{ErrorResponse, TicketingError};

/// `POST /contacts` — Submit the contact form.
///
/// # Errors
///
/// Returns [`TicketingError::InvalidRequest`] for invalid fields.
#[utoipa::path(
    post,
    path = "/api/v1/contacts",
    tag = "Contacts",
    summary = "Submit a contact message",
    request_body = CreateContactRequest,
    responses(
        (status = 201, description = "Message stored", body = ContactResponse),
        (status = 400, description = "Invalid field", body = ErrorResponse),
    )
)]
pub async fn create_contact(
    State(state): State<AppState>,
    Json(req): Json<CreateContactRequest>,
) -> Result<impl IntoResponse, TicketingError> {
    let contact = state
        .contact_service
        .submit(&req.name, &req.email, &req.subject, &req.message)
        .await?;
    Ok((StatusCode::CREATED, Json(ContactResponse::from(contact))))
}

/// `GET /contacts` — List messages, newest first.
#[utoipa::path(
    get,
    path = "/api/v1/contacts",
    tag = "Contacts",
    summary = "List contact messages",
    params(PaginationParams, ContactQuery),
    responses(
        (status = 200, description = "Paginated message list", body = ContactListResponse),
    )
)]
pub async fn list_contacts(
    State(state): State<AppState>,
    Query(page): Query<PaginationParams>,
    Query(query): Query<ContactQuery>,
) -> Json<ContactListResponse> {
    let contacts = state.contact_service.list(query.resolved).await;
    let (data, pagination) = page.paginate(contacts, ContactResponse::from);
    Json(ContactListResponse { data, pagination })
}

/// `GET /contacts/{id}` — Get a message.
///
/// # Errors
///
/// Returns [`TicketingError::ContactNotFound`] if it does not exist.
#[utoipa::path(
    get,
    path = "/api/v1/contacts/{id}",
    tag = "Contacts",
    summary = "Get a contact message",
    params(("id" = uuid::Uuid, Path, description = "Contact message UUID")),
    responses(
        (status = 200, description = "Message", body = ContactResponse),
        (status = 404, description = "Message not found", body = ErrorResponse),
    )
)]
pub async fn get_contact(
    State(state): State<AppState>,
    Path(id): Path<uuid::Uuid>,
) -> Result<impl IntoResponse, TicketingError> {
    let contact = state.contact_service.get(ContactId::from_uuid(id)).await?;
    Ok(Json(ContactResponse::from(contact)))
}

/// `PATCH /contacts/{id}` — Mark a message resolved or open.
///
/// # Errors
///
/// Returns [`TicketingError::ContactNotFound`] if it does not exist.
#[utoipa::path(
    patch,
    path = "/api/v1/contacts/{id}",
    tag = "Contacts",
    summary = "Resolve or reopen a contact message",
    params(("id" = uuid::Uuid, Path, description = "Contact message UUID")),
    request_body = UpdateContactRequest,
    responses(
        (status = 200, description = "Updated message", body = ContactResponse),
        (status = 404, description = "Message not found", body = ErrorResponse),
    )
)]
pub async fn update_contact(
    State(state): State<AppState>,
    Path(id): Path<uuid::Uuid>,
    Json(req): Json<UpdateContactRequest>,
) -> Result<impl IntoResponse, TicketingError> {
    let contact = state
        .contact_service
        .set_resolved(ContactId::from_uuid(id), req.resolved)
        .await?;
    Ok(Json(ContactResponse::from(contact)))
}

/// `DELETE /contacts/{id}` — Delete a message.
///
/// # Errors
///
/// Returns [`TicketingError::ContactNotFound`] if it does not exist.
#[utoipa::path(
    delete,
    path = "/api/v1/contacts/{id}",
    tag = "Contacts",
    summary = "Delete a contact message",
    params(("id" = uuid::Uuid, Path, description = "Contact message UUID")),
    responses(
        (status = 204, description = "Message deleted"),
        (status = 404, description = "Message not found", body = ErrorResponse),
    )
)]
pub async fn delete_contact(
    State(state): State<AppState>,
    Path(id): Path<uuid::Uuid>,
) -> Result<impl IntoResponse, TicketingError> {
    state
        .contact_service
        .delete(ContactId::from_uuid(id))
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Contact routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/contacts", post(create_contact).get(list_contacts))
        .route(
            "/contacts/{id}",
            get(get_contact).patch(update_contact).delete(delete_contact),
        )
}
