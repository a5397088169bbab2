//! User DTOs for registration, profile edits and listing.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use super::common_dto::PaginationMeta;
use crate::domain::UserId;
use crate::domain::user::{Role, User};
use crate::service::{UserFilter, UserPatch};

/// Request body for `POST /users`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateUserRequest {
    /// Display name (max 100 chars).
    pub name: String,
    /// Email address; unique, case-insensitive.
    pub email: String,
    /// Account role. Defaults to `attendee`.
    #[serde(default)]
    pub role: Role,
}

/// Request body for `PATCH /users/{id}`. Absent fields are left as is.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct UpdateUserRequest {
    /// New display name.
    #[serde(default)]
    pub name: Option<String>,
    /// New email address.
    #[serde(default)]
    pub email: Option<String>,
    /// New role.
    #[serde(default)]
    pub role: Option<Role>,
}

impl From<UpdateUserRequest> for UserPatch {
    fn from(req: UpdateUserRequest) -> Self {
        Self {
            name: req.name,
            email: req.email,
            role: req.role,
        }
    }
}

/// Filters for `GET /users`.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct UserQuery {
    /// Only users with this role.
    #[serde(default)]
    pub role: Option<Role>,
    /// Case-insensitive substring of name or email.
    #[serde(default)]
    pub q: Option<String>,
}

impl From<UserQuery> for UserFilter {
    fn from(query: UserQuery) -> Self {
        Self {
            role: query.role,
            query: query.q,
        }
    }
}

/// A user as returned by the API.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UserResponse {
    /// User identifier.
    pub id: UserId,
    /// Display name.
    pub name: String,
    /// Normalized email address.
    pub email: String,
    /// Account role.
    pub role: Role,
    /// Registration timestamp.
    pub created_at: DateTime<Utc>,
    /// Last modification timestamp.
    pub updated_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
            role: user.role,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

/// Paginated list response for `GET /users`.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UserListResponse {
    /// Users on this page.
    pub data: Vec<UserResponse>,
    /// Pagination metadata.
    pub pagination: PaginationMeta,
}
