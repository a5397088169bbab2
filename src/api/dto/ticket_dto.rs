//! Ticket DTOs for purchase requests and ticket views.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::common_dto::PaginationMeta;
use crate::domain::inventory::LineItem;
use crate::domain::ticket::{Ticket, TicketStatus, TierSnapshot};
use crate::domain::{EventId, TicketId, UserId};

/// Request body for `POST /events/{id}/tickets`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct PurchaseRequest {
    /// Buying user.
    pub buyer_id: UserId,
    /// One or more `(tier_id, quantity)` line items. Duplicates for the
    /// same tier are merged.
    pub items: Vec<LineItem>,
}

/// A ticket as returned by the API.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TicketResponse {
    /// Ticket identifier.
    pub id: TicketId,
    /// Event the ticket admits to.
    pub event_id: EventId,
    /// Buying user.
    pub buyer_id: UserId,
    /// Per-tier lines frozen at purchase time.
    pub items: Vec<TierSnapshot>,
    /// Total number of admissions.
    pub quantity: u32,
    /// Total price in minor currency units.
    pub total_cents: u64,
    /// Currency code of the event.
    pub currency: String,
    /// Lifecycle state.
    pub status: TicketStatus,
    /// Purchase timestamp.
    pub purchased_at: DateTime<Utc>,
    /// Cancellation timestamp, if cancelled.
    pub cancelled_at: Option<DateTime<Utc>>,
}

impl From<Ticket> for TicketResponse {
    fn from(ticket: Ticket) -> Self {
        Self {
            id: ticket.id,
            event_id: ticket.event_id,
            buyer_id: ticket.buyer_id,
            items: ticket.items,
            quantity: ticket.quantity,
            total_cents: ticket.total_cents,
            currency: ticket.currency,
            status: ticket.status,
            purchased_at: ticket.purchased_at,
            cancelled_at: ticket.cancelled_at,
        }
    }
}

/// Paginated list of tickets.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct TicketListResponse {
    /// Tickets on this page.
    pub data: Vec<TicketResponse>,
    /// Pagination metadata.
    pub pagination: PaginationMeta,
}
