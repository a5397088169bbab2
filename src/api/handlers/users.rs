//! User handlers: register, list, get, update, delete, tickets of a user.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};

use crate::api::dto::{
    CreateUserRequest, PaginationParams, TicketListResponse, TicketResponse, UpdateUserRequest,
    UserListResponse, UserQuery, UserResponse,
};
use crate::app_state::AppState;
use crate::domain::UserId;
use crate::error::{ErrorResponse, TicketingError};
use crate::service::{UserFilter, UserPatch};

/// `POST /users` — Register a user.
///
/// # Errors
///
/// Returns [`TicketingError::InvalidRequest`] for invalid fields and
/// [`TicketingError::EmailTaken`] for a duplicate email.
#[utoipa::path(
    post,
    path = "/api/v1/users",
    tag = "Users",
    summary = "Register a user",
    request_body = CreateUserRequest,
    responses(
        (status = 201, description = "User created", body = UserResponse),
        (status = 400, description = "Invalid name or email", body = ErrorResponse),
        (status = 409, description = "Email already registered", body = ErrorResponse),
    )
)]
pub async fn create_user(
    State(state): State<AppState>,
    Json(req): Json<CreateUserRequest>,
) -> Result<impl IntoResponse, TicketingError> {
    let user = state
        .user_service
        .create_user(&req.name, &req.email, req.role)
        .await?;
    Ok((StatusCode::CREATED, Json(UserResponse::from(user))))
}

/// `GET /users` — List users.
#[utoipa::path(
    get,
    path = "/api/v1/users",
    tag = "Users",
    summary = "List users",
    description = "Paginated, oldest first, optionally filtered by role or a name/email substring.",
    params(PaginationParams, UserQuery),
    responses(
        (status = 200, description = "Paginated user list", body = UserListResponse),
    )
)]
pub async fn list_users(
    State(state): State<AppState>,
    Query(page): Query<PaginationParams>,
    Query(query): Query<UserQuery>,
) -> Json<UserListResponse> {
    let users = state
        .user_service
        .list_users(&UserFilter::from(query))
        .await;
    let (data, pagination) = page.paginate(users, UserResponse::from);
    Json(UserListResponse { data, pagination })
}

/// `GET /users/{id}` — Get a user.
///
/// # Errors
///
/// Returns [`TicketingError::UserNotFound`] if the user does not exist.
#[utoipa::path(
    get,
    path = "/api/v1/users/{id}",
    tag = "Users",
    summary = "Get a user",
    params(("id" = uuid::Uuid, Path, description = "User UUID")),
    responses(
        (status = 200, description = "User", body = UserResponse),
        (status = 404, description = "User not found", body = ErrorResponse),
    )
)]
pub async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<uuid::Uuid>,
) -> Result<impl IntoResponse, TicketingError> {
    let user = state.user_service.get_user(UserId::from_uuid(id)).await?;
    Ok(Json(UserResponse::from(user)))
}

/// `PATCH /users/{id}` — Update a user.
///
/// # Errors
///
/// Returns [`TicketingError::UserNotFound`], [`TicketingError::InvalidRequest`]
/// or [`TicketingError::EmailTaken`].
#[utoipa::path(
    patch,
    path = "/api/v1/users/{id}",
    tag = "Users",
    summary = "Update a user",
    params(("id" = uuid::Uuid, Path, description = "User UUID")),
    request_body = UpdateUserRequest,
    responses(
        (status = 200, description = "Updated user", body = UserResponse),
        (status = 400, description = "Invalid field", body = ErrorResponse),
        (status = 404, description = "User not found", body = ErrorResponse),
        (status = 409, description = "Email already registered", body = ErrorResponse),
    )
)]
pub async fn update_user(
    State(state): State<AppState>,
    Path(id): Path<uuid::Uuid>,
    Json(req): Json<UpdateUserRequest>,
) -> Result<impl IntoResponse, TicketingError> {
    let user = state
        .user_service
        .update_user(UserId::from_uuid(id), UserPatch::from(req))
        .await?;
    Ok(Json(UserResponse::from(user)))
}

/// `DELETE /users/{id}` — Delete a user.
///
/// # Errors
///
/// Returns [`TicketingError::UserNotFound`], or [`TicketingError::Conflict`]
/// while the user organizes events or holds active tickets.
#[utoipa::path(
    delete,
    path = "/api/v1/users/{id}",
    tag = "Users",
    summary = "Delete a user",
    params(("id" = uuid::Uuid, Path, description = "User UUID")),
    responses(
        (status = 204, description = "User deleted"),
        (status = 404, description = "User not found", body = ErrorResponse),
        (status = 409, description = "User still organizes events or holds tickets", body = ErrorResponse),
    )
)]
pub async fn delete_user(
    State(state): State<AppState>,
    Path(id): Path<uuid::Uuid>,
) -> Result<impl IntoResponse, TicketingError> {
    state.user_service.delete_user(UserId::from_uuid(id)).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// `GET /users/{id}/tickets` — Tickets bought by a user.
///
/// # Errors
///
/// Returns [`TicketingError::UserNotFound`] if the user does not exist.
#[utoipa::path(
    get,
    path = "/api/v1/users/{id}/tickets",
    tag = "Users",
    summary = "List a user's tickets",
    params(("id" = uuid::Uuid, Path, description = "User UUID"), PaginationParams),
    responses(
        (status = 200, description = "Paginated ticket list", body = TicketListResponse),
        (status = 404, description = "User not found", body = ErrorResponse),
    )
)]
pub async fn list_user_tickets(
    State(state): State<AppState>,
    Path(id): Path<uuid::Uuid>,
    Query(page): Query<PaginationParams>,
) -> Result<impl IntoResponse, TicketingError> {
    let tickets = state
        .ticket_service
        .list_for_user(UserId::from_uuid(id))
        .await?;
    let (data, pagination) = page.paginate(tickets, TicketResponse::from);
    Ok(Json(TicketListResponse { data, pagination }))
}

/// User routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/users", post(create_user).get(list_users))
        .route(
            "/users/{id}",
            get(get_user).patch(update_user).delete(delete_user),
        )
        .route("/users/{id}/tickets", get(list_user_tickets))
}
