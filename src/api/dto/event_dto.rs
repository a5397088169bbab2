//! Event DTOs: creation, partial updates, listing and availability.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use super::common_dto::PaginationMeta;
use crate::domain::event::{Event, EventDraft, EventStatus, NewTier, TicketTier, TierEdit, Venue};
use crate::domain::notification::TierLevel;
use crate::domain::{EventId, TierId, UserId};
use crate::service::{EventFilter, EventPatch};

/// Request body for `POST /events`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateEventRequest {
    /// Publishing user; must be an organizer or admin.
    pub organizer_id: UserId,
    /// Title (1..=200 chars).
    pub title: String,
    /// Free-form description.
    #[serde(default)]
    pub description: String,
    /// Category label, e.g. `"concert"`.
    pub category: String,
    /// Three-letter currency code for every tier price.
    pub currency: String,
    /// Start time.
    pub starts_at: DateTime<Utc>,
    /// End time; must be after `starts_at`.
    pub ends_at: DateTime<Utc>,
    /// Where the event takes place.
    pub venue: Venue,
    /// At least one ticket tier.
    pub tiers: Vec<NewTier>,
}

impl From<CreateEventRequest> for EventDraft {
    fn from(req: CreateEventRequest) -> Self {
        Self {
            organizer_id: req.organizer_id,
            title: req.title,
            description: req.description,
            category: req.category,
            currency: req.currency,
            starts_at: req.starts_at,
            ends_at: req.ends_at,
            venue: req.venue,
            tiers: req.tiers,
        }
    }
}

/// Request body for `PATCH /events/{id}`.
///
/// `tiers` is a list of edit operations applied in order, e.g.
/// `{"op":"update","tier_id":"…","capacity":250}`.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct UpdateEventRequest {
    /// New title.
    #[serde(default)]
    pub title: Option<String>,
    /// New description.
    #[serde(default)]
    pub description: Option<String>,
    /// New category.
    #[serde(default)]
    pub category: Option<String>,
    /// New start time.
    #[serde(default)]
    pub starts_at: Option<DateTime<Utc>>,
    /// New end time.
    #[serde(default)]
    pub ends_at: Option<DateTime<Utc>>,
    /// Replacement venue.
    #[serde(default)]
    pub venue: Option<Venue>,
    /// Tier edit operations.
    #[serde(default)]
    pub tiers: Vec<TierEdit>,
}

impl From<UpdateEventRequest> for EventPatch {
    fn from(req: UpdateEventRequest) -> Self {
        Self {
            title: req.title,
            description: req.description,
            category: req.category,
            starts_at: req.starts_at,
            ends_at: req.ends_at,
            venue: req.venue,
            tiers: req.tiers,
        }
    }
}

/// Filters for `GET /events`.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct EventQuery {
    /// Only events in this category.
    #[serde(default)]
    pub category: Option<String>,
    /// Only events published by this user.
    #[serde(default)]
    pub organizer_id: Option<UserId>,
    /// Case-insensitive substring of the title.
    #[serde(default)]
    pub q: Option<String>,
    /// Hide events that have already started.
    #[serde(default)]
    pub upcoming: Option<bool>,
    /// Only events in this state.
    #[serde(default)]
    pub status: Option<EventStatus>,
}

impl From<EventQuery> for EventFilter {
    fn from(query: EventQuery) -> Self {
        Self {
            category: query.category,
            organizer_id: query.organizer_id,
            query: query.q,
            upcoming: query.upcoming.unwrap_or(false),
            status: query.status,
        }
    }
}

/// A ticket tier with its live counters.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TierResponse {
    /// Tier identifier.
    pub id: TierId,
    /// Display name.
    pub name: String,
    /// Unit price in minor currency units.
    pub price_cents: u64,
    /// Total tickets in the tier.
    pub capacity: u32,
    /// Tickets still available.
    pub remaining: u32,
    /// Tickets sold and not cancelled.
    pub sold: u32,
    /// Per-order cap, if the tier overrides the default.
    pub max_per_order: Option<u32>,
}

impl From<TicketTier> for TierResponse {
    fn from(tier: TicketTier) -> Self {
        Self {
            sold: tier.sold(),
            id: tier.id,
            name: tier.name,
            price_cents: tier.price_cents,
            capacity: tier.capacity,
            remaining: tier.remaining,
            max_per_order: tier.max_per_order,
        }
    }
}

/// An event as returned by the API.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct EventResponse {
    /// Event identifier.
    pub id: EventId,
    /// Publishing user.
    pub organizer_id: UserId,
    /// Title.
    pub title: String,
    /// Description.
    pub description: String,
    /// Normalized category label.
    pub category: String,
    /// Currency code.
    pub currency: String,
    /// Start time.
    pub starts_at: DateTime<Utc>,
    /// End time.
    pub ends_at: DateTime<Utc>,
    /// Venue.
    pub venue: Venue,
    /// Ticket tiers.
    pub tiers: Vec<TierResponse>,
    /// Lifecycle state.
    pub status: EventStatus,
    /// Sum of tier capacities.
    pub total_capacity: u64,
    /// Tickets sold across all tiers.
    pub total_sold: u64,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last modification timestamp.
    pub updated_at: DateTime<Utc>,
}

impl From<Event> for EventResponse {
    fn from(event: Event) -> Self {
        Self {
            total_capacity: event.total_capacity(),
            total_sold: event.total_sold(),
            id: event.id,
            organizer_id: event.organizer_id,
            title: event.title,
            description: event.description,
            category: event.category,
            currency: event.currency,
            starts_at: event.starts_at,
            ends_at: event.ends_at,
            venue: event.venue,
            tiers: event.tiers.into_iter().map(TierResponse::from).collect(),
            status: event.status,
            created_at: event.created_at,
            updated_at: event.updated_at,
        }
    }
}

/// Paginated list response for `GET /events`.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct EventListResponse {
    /// Events on this page.
    pub data: Vec<EventResponse>,
    /// Pagination metadata.
    pub pagination: PaginationMeta,
}

/// Counter state of one tier.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TierAvailability {
    /// Tier identifier.
    pub tier_id: TierId,
    /// Display name.
    pub name: String,
    /// Total tickets in the tier.
    pub capacity: u32,
    /// Tickets sold and not cancelled.
    pub sold: u32,
    /// Tickets still available.
    pub remaining: u32,
    /// `true` when nothing is left.
    pub sold_out: bool,
}

impl From<TierLevel> for TierAvailability {
    fn from(level: TierLevel) -> Self {
        Self {
            sold: level.capacity.saturating_sub(level.remaining),
            sold_out: level.remaining == 0,
            tier_id: level.tier_id,
            name: level.name,
            capacity: level.capacity,
            remaining: level.remaining,
        }
    }
}

/// Response body for `GET /events/{id}/availability`.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AvailabilityResponse {
    /// Event identifier.
    pub event_id: EventId,
    /// Tickets left across all tiers.
    pub total_remaining: u64,
    /// Per-tier counters.
    pub tiers: Vec<TierAvailability>,
}

impl AvailabilityResponse {
    /// Builds the response from the tier levels of one event.
    #[must_use]
    pub fn new(event_id: EventId, levels: Vec<TierLevel>) -> Self {
        let tiers: Vec<TierAvailability> = levels.into_iter().map(TierAvailability::from).collect();
        Self {
            event_id,
            total_remaining: tiers.iter().map(|t| u64::from(t.remaining)).sum(),
            tiers,
        }
    }
}
