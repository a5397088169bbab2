//! WebSocket message types: envelope, commands, and events.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::EventId;

/// Top-level WebSocket message envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WsMessage {
    /// Client-provided ID for requests; server-generated for events.
    #[serde(default)]
    pub id: String,
    /// Message type discriminator.
    #[serde(rename = "type")]
    pub msg_type: WsMessageType,
    /// ISO-8601 timestamp.
    #[serde(default = "Utc::now")]
    pub timestamp: DateTime<Utc>,
    /// Variant-specific payload.
    #[serde(default)]
    pub payload: serde_json::Value,
}

impl WsMessage {
    /// Builds a server-side message stamped with the current time.
    #[must_use]
    pub fn new(id: String, msg_type: WsMessageType, payload: serde_json::Value) -> Self {
        Self {
            id,
            msg_type,
            timestamp: Utc::now(),
            payload,
        }
    }

    /// Builds an error reply.
    #[must_use]
    pub fn error(id: String, code: u32, message: &str) -> Self {
        Self::new(
            id,
            WsMessageType::Error,
            serde_json::json!({ "code": code, "message": message }),
        )
    }

    /// Serializes the envelope; `None` only if a payload fails to encode.
    #[must_use]
    pub fn to_json(&self) -> Option<String> {
        serde_json::to_string(self).ok()
    }
}

/// Discriminator for WebSocket message types.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum WsMessageType {
    /// Client → Server command.
    Command,
    /// Server → Client response to a command.
    Response,
    /// Server → Client broadcast notification.
    Event,
    /// Server → Client error.
    Error,
}

/// Commands a client can send in the payload of a `command` message.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum WsCommand {
    /// Follow notifications for specific events.
    Subscribe {
        /// Event IDs to follow. `"*"` follows everything.
        event_ids: Vec<String>,
    },
    /// Stop following events.
    Unsubscribe {
        /// Event IDs to drop. `"*"` drops the wildcard.
        event_ids: Vec<String>,
    },
    /// Read the current tier counters of one event.
    Availability {
        /// Target event.
        event_id: EventId,
    },
}

/// Why a command payload could not be decoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandError {
    /// The `command` tag is missing or names no known command.
    Unknown,
    /// The command is known but its arguments do not parse.
    InvalidArguments(String),
}

impl CommandError {
    /// Error code sent back in the `error` envelope.
    #[must_use]
    pub const fn code(&self) -> u32 {
        match self {
            Self::Unknown => 404,
            Self::InvalidArguments(_) => 400,
        }
    }

    /// Human-readable message for the `error` envelope.
    #[must_use]
    pub fn message(&self) -> String {
        match self {
            Self::Unknown => "unknown command".to_string(),
            Self::InvalidArguments(reason) => format!("invalid command arguments: {reason}"),
        }
    }
}

impl WsCommand {
    /// Values accepted in the `command` field.
    pub const NAMES: [&'static str; 3] = ["subscribe", "unsubscribe", "availability"];

    /// Decodes a command payload, telling unknown commands apart from
    /// known ones with bad arguments.
    ///
    /// # Errors
    ///
    /// Returns [`CommandError`] when the payload is not a valid command.
    pub fn decode(payload: serde_json::Value) -> Result<Self, CommandError> {
        let known = payload
            .get("command")
            .and_then(serde_json::Value::as_str)
            .is_some_and(|name| Self::NAMES.contains(&name));
        serde_json::from_value(payload).map_err(|err| {
            if known {
                CommandError::InvalidArguments(err.to_string())
            } else {
                CommandError::Unknown
            }
        })
    }
}

/// Splits raw subscription targets into event IDs and the wildcard flag.
///
/// Entries that are neither `"*"` nor a UUID are returned as rejected.
#[must_use]
pub fn parse_targets(raw: &[String]) -> (Vec<EventId>, bool, Vec<String>) {
    let mut ids = Vec::with_capacity(raw.len());
    let mut wildcard = false;
    let mut rejected = Vec::new();
    for target in raw {
        if target == "*" {
            wildcard = true;
        } else if let Ok(uuid) = target.parse::<uuid::Uuid>() {
            ids.push(EventId::from_uuid(uuid));
        } else {
            rejected.push(target.clone());
        }
    }
    (ids, wildcard, rejected)
}
