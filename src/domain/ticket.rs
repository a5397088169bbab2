//! Purchased tickets.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::{EventId, TicketId, TierId, UserId};
use super::inventory::Reservation;

/// Tier data frozen at purchase time.
///
/// Later renames or price changes on the event do not alter tickets that
/// were already sold.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct TierSnapshot {
    /// Tier the tickets were taken from.
    pub tier_id: TierId,
    /// Tier name at purchase time.
    pub tier_name: String,
    /// Unit price at purchase time.
    pub unit_price_cents: u64,
    /// Number of tickets.
    pub quantity: u32,
    /// `unit_price_cents * quantity`.
    pub subtotal_cents: u64,
}

/// Ticket lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum TicketStatus {
    /// Valid for entry; counted against inventory.
    Active,
    /// Cancelled; inventory was released.
    Cancelled,
}

/// One purchase: a set of tier snapshots for a single event and buyer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ticket {
    /// Unique identifier.
    pub id: TicketId,
    /// Event the ticket admits to.
    pub event_id: EventId,
    /// Purchasing user.
    pub buyer_id: UserId,
    /// Purchased tiers.
    pub items: Vec<TierSnapshot>,
    /// Total number of admissions.
    pub quantity: u32,
    /// Total price in minor currency units.
    pub total_cents: u64,
    /// Currency of `total_cents`.
    pub currency: String,
    /// Lifecycle state.
    pub status: TicketStatus,
    /// Purchase timestamp.
    pub purchased_at: DateTime<Utc>,
    /// Cancellation timestamp, if cancelled.
    pub cancelled_at: Option<DateTime<Utc>>,
}

impl Ticket {
    /// Creates an active ticket from a successful reservation.
    #[must_use]
    pub fn issue(
        event_id: EventId,
        buyer_id: UserId,
        currency: &str,
        reservation: Reservation,
    ) -> Self {
        Self {
            id: TicketId::new(),
            event_id,
            buyer_id,
            quantity: reservation.quantity,
            total_cents: reservation.total_cents,
            items: reservation.items,
            currency: currency.to_string(),
            status: TicketStatus::Active,
            purchased_at: Utc::now(),
            cancelled_at: None,
        }
    }

    /// Returns `true` while the ticket holds inventory.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.status == TicketStatus::Active
    }
}
