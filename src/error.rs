//! Ticketing error types with HTTP status code mapping.
//!
//! [`TicketingError`] is the central error type for the gateway. Each
//! variant maps to a specific HTTP status code and structured JSON error
//! response.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use utoipa::ToSchema;

use crate::domain::{ContactId, EventId, TicketId, TierId, UserId};

/// Structured JSON error response body.
///
/// All error responses follow this shape:
/// ```json
/// {
///   "error": {
///     "code": 4001,
///     "message": "insufficient inventory for tier VIP: requested 3, remaining 1",
///     "details": null
///   }
/// }
/// ```
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    /// Structured error payload.
    pub error: ErrorBody,
}

/// Inner error body with numeric code and human-readable message.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorBody {
    /// Numeric error code (see the code range table on [`TicketingError`]).
    pub code: u32,
    /// Human-readable error message.
    pub message: String,
    /// Optional additional details.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

/// Server-side error enum with HTTP status code mapping.
///
/// # Error Code Ranges
///
/// | Range     | Category        | HTTP Status                  |
/// |-----------|-----------------|------------------------------|
/// | 1000–1999 | Validation      | 400 Bad Request              |
/// | 2000–2099 | Not Found       | 404 Not Found                |
/// | 2100–2199 | Conflict        | 409 Conflict                 |
/// | 3000–3999 | Server          | 500 / 503                    |
/// | 4000–4999 | Purchase rules  | 422 Unprocessable Entity     |
#[derive(Debug, thiserror::Error)]
pub enum TicketingError {
    /// Request validation failed.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// User with the given ID was not found.
    #[error("user not found: {0}")]
    UserNotFound(UserId),

    /// Event with the given ID was not found.
    #[error("event not found: {0}")]
    EventNotFound(EventId),

    /// Tier does not belong to the event.
    #[error("tier {tier_id} not found in event {event_id}")]
    TierNotFound {
        /// Event that was searched.
        event_id: EventId,
        /// Missing tier.
        tier_id: TierId,
    },

    /// Ticket with the given ID was not found.
    #[error("ticket not found: {0}")]
    TicketNotFound(TicketId),

    /// Contact message with the given ID was not found.
    #[error("contact message not found: {0}")]
    ContactNotFound(ContactId),

    /// Another user already registered this email address.
    #[error("email already registered: {0}")]
    EmailTaken(String),

    /// The operation conflicts with the current state of the resource.
    #[error("conflict: {0}")]
    Conflict(String),

    /// A tier holds fewer tickets than the purchase asks for.
    #[error(
        "insufficient inventory for tier {tier_name}: requested {requested}, remaining {remaining}"
    )]
    InsufficientInventory {
        /// Tier that would be oversold.
        tier_id: TierId,
        /// Tier display name.
        tier_name: String,
        /// Quantity requested across all line items for the tier.
        requested: u32,
        /// Tickets still available in the tier.
        remaining: u32,
    },

    /// A single order asks for more tickets of a tier than allowed.
    #[error("order limit exceeded for tier {tier_name}: requested {requested}, limit {limit}")]
    OrderLimitExceeded {
        /// Tier display name.
        tier_name: String,
        /// Quantity requested across all line items for the tier.
        requested: u32,
        /// Maximum tickets per order.
        limit: u32,
    },

    /// Ticket sales for the event are closed.
    #[error("sales closed for event {event_id}: {reason}")]
    SalesClosed {
        /// Event the purchase targeted.
        event_id: EventId,
        /// Why sales are closed.
        reason: String,
    },

    /// Persistence layer failure.
    #[error("persistence error: {0}")]
    PersistenceError(String),

    /// Persistence is switched off or the database was unreachable.
    #[error("persistence unavailable")]
    PersistenceUnavailable,

    /// Internal server error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl TicketingError {
    /// Returns the numeric error code for this variant.
    #[must_use]
    pub const fn error_code(&self) -> u32 {
        match self {
            Self::InvalidRequest(_) => 1001,
            Self::UserNotFound(_) => 2001,
            Self::EventNotFound(_) => 2002,
            Self::TierNotFound { .. } => 2003,
            Self::TicketNotFound(_) => 2004,
            Self::ContactNotFound(_) => 2005,
            Self::EmailTaken(_) => 2101,
            Self::Conflict(_) => 2102,
            Self::InsufficientInventory { .. } => 4001,
            Self::OrderLimitExceeded { .. } => 4002,
            Self::SalesClosed { .. } => 4003,
            Self::Internal(_) => 3000,
            Self::PersistenceError(_) => 3001,
            Self::PersistenceUnavailable => 3002,
        }
    }

    /// Returns the HTTP status code for this variant.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            Self::UserNotFound(_)
            | Self::EventNotFound(_)
            | Self::TierNotFound { .. }
            | Self::TicketNotFound(_)
            | Self::ContactNotFound(_) => StatusCode::NOT_FOUND,
            Self::EmailTaken(_) | Self::Conflict(_) => StatusCode::CONFLICT,
            Self::InsufficientInventory { .. }
            | Self::OrderLimitExceeded { .. }
            | Self::SalesClosed { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            Self::PersistenceError(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::PersistenceUnavailable => StatusCode::SERVICE_UNAVAILABLE,
        }
    }
}

impl From<sqlx::Error> for TicketingError {
    fn from(err: sqlx::Error) -> Self {
        Self::PersistenceError(err.to_string())
    }
}

impl IntoResponse for TicketingError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        }
        let body = ErrorResponse {
            error: ErrorBody {
                code: self.error_code(),
                message: self.to_string(),
                details: None,
            },
        };
        let mut response = axum::Json(body).into_response();
        *response.status_mut() = status;
        response
    }
}
