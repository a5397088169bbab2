//! Registered users.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::UserId;
use crate::error::TicketingError;

/// Maximum length of a display name.
pub const MAX_NAME_LEN: usize = 100;

/// What a user is allowed to do in the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Buys tickets.
    #[default]
    Attendee,
    /// Publishes events and buys tickets.
    Organizer,
    /// Operator account.
    Admin,
}

impl Role {
    /// Returns `true` if the role may publish events.
    #[must_use]
    pub const fn can_organize(self) -> bool {
        matches!(self, Self::Organizer | Self::Admin)
    }
}

/// A registered user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    /// Unique identifier.
    pub id: UserId,
    /// Display name.
    pub name: String,
    /// Normalized (trimmed, lower-cased) email address.
    pub email: String,
    /// Account role.
    pub role: Role,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last modification timestamp.
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Builds a new user after validating its fields.
    ///
    /// # Errors
    ///
    /// Returns [`TicketingError::InvalidRequest`] for an empty or
    /// over-long name or a malformed email.
    pub fn new(name: &str, email: &str, role: Role) -> Result<Self, TicketingError> {
        let now = Utc::now();
        Ok(Self {
            id: UserId::new(),
            name: validate_name(name)?,
            email: normalize_email(email)?,
            role,
            created_at: now,
            updated_at: now,
        })
    }
}

/// Trims and length-checks a display name.
///
/// # Errors
///
/// Returns [`TicketingError::InvalidRequest`] if the trimmed name is empty
/// or longer than [`MAX_NAME_LEN`] characters.
pub fn validate_name(name: &str) -> Result<String, TicketingError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(TicketingError::InvalidRequest(
            "name must not be empty".to_string(),
        ));
    }
    if name.chars().count() > MAX_NAME_LEN {
        return Err(TicketingError::InvalidRequest(format!(
            "name must be at most {MAX_NAME_LEN} characters"
        )));
    }
    Ok(name.to_string())
}

/// Normalizes an email address for storage and uniqueness checks.
///
/// Accepts `local@domain` where both parts are non-empty, the domain
/// contains a dot that is neither first nor last, and there is no
/// whitespace.
///
/// # Errors
///
/// Returns [`TicketingError::InvalidRequest`] for anything else.
pub fn normalize_email(email: &str) -> Result<String, TicketingError> {
    let email = email.trim().to_lowercase();
    let invalid = || TicketingError::InvalidRequest(format!("invalid email: {email}"));

    let Some((local, domain)) = email.split_once('@') else {
        return Err(invalid());
    };
    let domain_ok = domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
        && !domain.contains('@');
    if local.is_empty() || !domain_ok || email.chars().any(char::is_whitespace) {
        return Err(invalid());
    }
    Ok(email)
}
