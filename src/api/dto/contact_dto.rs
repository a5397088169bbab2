//! Contact form DTOs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use super::common_dto::PaginationMeta;
use crate::domain::ContactId;
use crate::domain::contact::ContactMessage;

/// Request body for `POST /contacts`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateContactRequest {
    /// Sender name.
    pub name: String,
    /// Reply-to address.
    pub email: String,
    /// Subject line.
    pub subject: String,
    /// Message body (max 5000 chars).
    pub message: String,
}

/// Request body for `PATCH /contacts/{id}`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateContactRequest {
    /// Whether the message has been handled.
    pub resolved: bool,
}

/// Filters for `GET /contacts`.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ContactQuery {
    /// Only resolved (`true`) or open (`false`) messages.
    #[serde(default)]
    pub resolved: Option<bool>,
}

/// A contact message as returned by the API.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ContactResponse {
    /// Message identifier.
    pub id: ContactId,
    /// Sender name.
    pub name: String,
    /// Reply-to address.
    pub email: String,
    /// Subject line.
    pub subject: String,
    /// Message body.
    pub message: String,
    /// Whether the message has been handled.
    pub resolved: bool,
    /// Submission timestamp.
    pub created_at: DateTime<Utc>,
}

impl From<ContactMessage> for ContactResponse {
    fn from(contact: ContactMessage) -> Self {
        Self {
            id: contact.id,
            name: contact.name,
            email: contact.email,
            subject: contact.subject,
            message: contact.message,
            resolved: contact.resolved,
            created_at: contact.created_at,
        }
    }
}

/// Paginated list response for `GET /contacts`.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ContactListResponse {
    /// Messages on this page.
    pub data: Vec<ContactResponse>,
    /// Pagination metadata.
    pub pagination: PaginationMeta,
}
