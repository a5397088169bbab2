//! Domain notifications reflecting catalog mutations.
//!
//! Every state change emits a [`Notification`] through the
//! [`super::EventBus`]. Notifications are broadcast to WebSocket
//! subscribers and, when persistence is enabled, appended to the
//! PostgreSQL journal.

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::{ContactId, EventId, TicketId, TierId, UserId};

/// Counter state of one tier after an inventory change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TierLevel {
    /// Tier identifier.
    pub tier_id: TierId,
    /// Tier display name.
    pub name: String,
    /// Tickets still available.
    pub remaining: u32,
    /// Tier capacity.
    pub capacity: u32,
}

/// Why an event's inventory moved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum InventoryReason {
    /// Tickets were bought.
    Purchase,
    /// A ticket was cancelled and its quantities released.
    Cancellation,
    /// The organizer edited tiers.
    TierEdit,
}

/// Domain notification emitted after every state mutation.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Notification {
    /// A user account was created.
    UserRegistered {
        /// New user.
        user_id: UserId,
        /// Normalized email.
        email: String,
        /// Timestamp.
        timestamp: DateTime<Utc>,
    },
    /// A user account was changed.
    UserUpdated {
        /// Changed user.
        user_id: UserId,
        /// Timestamp.
        timestamp: DateTime<Utc>,
    },
    /// A user account was deleted.
    UserRemoved {
        /// Deleted user.
        user_id: UserId,
        /// Timestamp.
        timestamp: DateTime<Utc>,
    },
    /// An event was published.
    EventCreated {
        /// New event.
        event_id: EventId,
        /// Organizer.
        organizer_id: UserId,
        /// Title.
        title: String,
        /// Timestamp.
        timestamp: DateTime<Utc>,
    },
    /// Event details or tiers changed.
    EventUpdated {
        /// Changed event.
        event_id: EventId,
        /// Timestamp.
        timestamp: DateTime<Utc>,
    },
    /// An event was called off.
    EventCancelled {
        /// Cancelled event.
        event_id: EventId,
        /// Timestamp.
        timestamp: DateTime<Utc>,
    },
    /// An event was deleted.
    EventDeleted {
        /// Deleted event.
        event_id: EventId,
        /// Timestamp.
        timestamp: DateTime<Utc>,
    },
    /// A purchase succeeded.
    TicketsPurchased {
        /// Event the tickets are for.
        event_id: EventId,
        /// Issued ticket.
        ticket_id: TicketId,
        /// Buyer.
        buyer_id: UserId,
        /// Admissions bought.
        quantity: u32,
        /// Amount charged in minor units.
        total_cents: u64,
        /// Timestamp.
        timestamp: DateTime<Utc>,
    },
    /// A ticket was cancelled.
    TicketCancelled {
        /// Event the ticket was for.
        event_id: EventId,
        /// Cancelled ticket.
        ticket_id: TicketId,
        /// Admissions returned to inventory.
        released: u32,
        /// Timestamp.
        timestamp: DateTime<Utc>,
    },
    /// Tier counters of an event changed.
    InventoryChanged {
        /// Event whose counters moved.
        event_id: EventId,
        /// Counter levels after the change.
        tiers: Vec<TierLevel>,
        /// Cause of the change.
        reason: InventoryReason,
        /// Timestamp.
        timestamp: DateTime<Utc>,
    },
    /// A contact-form message arrived.
    ContactReceived {
        /// New message.
        contact_id: ContactId,
        /// Subject line.
        subject: String,
        /// Timestamp.
        timestamp: DateTime<Utc>,
    },
}

impl Notification {
    /// Returns the event this notification concerns, if any.
    #[must_use]
    pub const fn event_id(&self) -> Option<EventId> {
        match self {
            Self::EventCreated { event_id, .. }
            | Self::EventUpdated { event_id, .. }
            | Self::EventCancelled { event_id, .. }
            | Self::EventDeleted { event_id, .. }
            | Self::TicketsPurchased { event_id, .. }
            | Self::TicketCancelled { event_id, .. }
            | Self::InventoryChanged { event_id, .. } => Some(*event_id),
            Self::UserRegistered { .. }
            | Self::UserUpdated { .. }
            | Self::UserRemoved { .. }
            | Self::ContactReceived { .. } => None,
        }
    }

    /// Returns the UUID of the primary entity the notification is about.
    #[must_use]
    pub fn entity_id(&self) -> uuid::Uuid {
        match self {
            Self::UserRegistered { user_id, .. }
            | Self::UserUpdated { user_id, .. }
            | Self::UserRemoved { user_id, .. } => (*user_id).into(),
            Self::TicketsPurchased { ticket_id, .. } | Self::TicketCancelled { ticket_id, .. } => {
                (*ticket_id).into()
            }
            Self::ContactReceived { contact_id, .. } => (*contact_id).into(),
            Self::EventCreated { event_id, .. }
            | Self::EventUpdated { event_id, .. }
            | Self::EventCancelled { event_id, .. }
            | Self::EventDeleted { event_id, .. }
            | Self::InventoryChanged { event_id, .. } => (*event_id).into(),
        }
    }

    /// Returns the notification kind as a static string slice.
    #[must_use]
    pub const fn kind_str(&self) -> &'static str {
        match self {
            Self::UserRegistered { .. } => "user_registered",
            Self::UserUpdated { .. } => "user_updated",
            Self::UserRemoved { .. } => "user_removed",
            Self::EventCreated { .. } => "event_created",
            Self::EventUpdated { .. } => "event_updated",
            Self::EventCancelled { .. } => "event_cancelled",
            Self::EventDeleted { .. } => "event_deleted",
            Self::TicketsPurchased { .. } => "tickets_purchased",
            Self::TicketCancelled { .. } => "ticket_cancelled",
            Self::InventoryChanged { .. } => "inventory_changed",
            Self::ContactReceived { .. } => "contact_received",
        }
    }
}
