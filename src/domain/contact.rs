//! Contact-form messages.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::ContactId;
use super::user::{normalize_email, validate_name};
use crate::error::TicketingError;

/// Maximum length of a message body.
pub const MAX_MESSAGE_LEN: usize = 5_000;

/// A message submitted through the public contact form.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContactMessage {
    /// Unique identifier.
    pub id: ContactId,
    /// Sender name.
    pub name: String,
    /// Sender email.
    pub email: String,
    /// Subject line (may be empty).
    pub subject: String,
    /// Message body.
    pub message: String,
    /// Whether staff has handled the message.
    pub resolved: bool,
    /// Submission timestamp.
    pub created_at: DateTime<Utc>,
}

impl ContactMessage {
    /// Validates and builds a new unresolved message.
    ///
    /// # Errors
    ///
    /// Returns [`TicketingError::InvalidRequest`] for a bad name or email,
    /// or an empty or over-long body.
    pub fn new(
        name: &str,
        email: &str,
        subject: &str,
        message: &str,
    ) -> Result<Self, TicketingError> {
        let message = message.trim();
        if message.is_empty() || message.chars().count() > MAX_MESSAGE_LEN {
            return Err(TicketingError::InvalidRequest(format!(
                "message must be 1..={MAX_MESSAGE_LEN} characters"
            )));
        }
        Ok(Self {
            id: ContactId::new(),
            name: validate_name(name)?,
            email: normalize_email(email)?,
            subject: subject.trim().to_string(),
            message: message.to_string(),
            resolved: false,
            created_at: Utc::now(),
        })
    }
}
