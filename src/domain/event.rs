//! Event aggregate: schedule, embedded venue and ticket tiers.
//!
//! The tier counters inside an [`Event`] are the ticket inventory. They
//! are only mutated while the event's write lock in
//! [`super::EventRegistry`] is held.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::{EventId, TierId, UserId};
use crate::error::TicketingError;

/// Maximum length of an event title.
pub const MAX_TITLE_LEN: usize = 200;

/// Lifecycle state of an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum EventStatus {
    /// Open for sales until it starts.
    #[default]
    Scheduled,
    /// Called off by the organizer; no further sales.
    Cancelled,
}

/// Where an event takes place.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Venue {
    /// Venue name.
    pub name: String,
    /// Street address.
    pub address: String,
    /// City.
    pub city: String,
    /// Country, if known.
    #[serde(default)]
    pub country: Option<String>,
    /// Physical capacity; tier capacities may not exceed it in total.
    #[serde(default)]
    pub capacity: Option<u32>,
}

impl Venue {
    fn validate(&self) -> Result<(), TicketingError> {
        for (field, value) in [
            ("venue.name", &self.name),
            ("venue.address", &self.address),
            ("venue.city", &self.city),
        ] {
            if value.trim().is_empty() {
                return Err(TicketingError::InvalidRequest(format!(
                    "{field} must not be empty"
                )));
            }
        }
        if self.capacity == Some(0) {
            return Err(TicketingError::InvalidRequest(
                "venue.capacity must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

/// A priced class of tickets with its own inventory counter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TicketTier {
    /// Tier identifier, unique within the event.
    pub id: TierId,
    /// Display name, unique within the event (case-insensitive).
    pub name: String,
    /// Unit price in minor currency units.
    pub price_cents: u64,
    /// Total number of tickets ever sellable in this tier.
    pub capacity: u32,
    /// Tickets still available. Always `<= capacity`.
    pub remaining: u32,
    /// Per-order cap overriding the service default.
    pub max_per_order: Option<u32>,
}

impl TicketTier {
    /// Creates a fresh tier with `remaining == capacity`.
    ///
    /// # Errors
    ///
    /// Returns [`TicketingError::InvalidRequest`] for an empty name, zero
    /// capacity, or a zero per-order cap.
    pub fn new(
        name: &str,
        price_cents: u64,
        capacity: u32,
        max_per_order: Option<u32>,
    ) -> Result<Self, TicketingError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(TicketingError::InvalidRequest(
                "tier name must not be empty".to_string(),
            ));
        }
        if capacity == 0 {
            return Err(TicketingError::InvalidRequest(format!(
                "tier {name}: capacity must be positive"
            )));
        }
        if max_per_order == Some(0) {
            return Err(TicketingError::InvalidRequest(format!(
                "tier {name}: max_per_order must be positive"
            )));
        }
        Ok(Self {
            id: TierId::new(),
            name: name.to_string(),
            price_cents,
            capacity,
            remaining: capacity,
            max_per_order,
        })
    }

    /// Tickets sold (and not cancelled) from this tier.
    #[must_use]
    pub const fn sold(&self) -> u32 {
        self.capacity.saturating_sub(self.remaining)
    }
}

/// Tier definition as supplied when creating an event or adding a tier.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct NewTier {
    /// Display name.
    pub name: String,
    /// Unit price in minor currency units.
    pub price_cents: u64,
    /// Number of tickets.
    pub capacity: u32,
    /// Optional per-order cap.
    #[serde(default)]
    pub max_per_order: Option<u32>,
}

/// One edit applied to an event's tier list during an update.
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum TierEdit {
    /// Append a new tier.
    Add(NewTier),
    /// Change an existing tier.
    Update {
        /// Tier to change.
        tier_id: TierId,
        /// New display name.
        #[serde(default)]
        name: Option<String>,
        /// New unit price.
        #[serde(default)]
        price_cents: Option<u64>,
        /// New capacity; may not drop below the sold count.
        #[serde(default)]
        capacity: Option<u32>,
        /// New per-order cap.
        #[serde(default)]
        max_per_order: Option<u32>,
    },
    /// Remove a tier that has not sold anything.
    Remove {
        /// Tier to remove.
        tier_id: TierId,
    },
}

/// An event with its venue and ticket inventory.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    /// Unique identifier.
    pub id: EventId,
    /// User who published the event.
    pub organizer_id: UserId,
    /// Title.
    pub title: String,
    /// Free-form description.
    pub description: String,
    /// Category label (e.g. `"concert"`).
    pub category: String,
    /// Three-letter currency code for all tier prices.
    pub currency: String,
    /// Start time; sales close when it is reached.
    pub starts_at: DateTime<Utc>,
    /// End time, strictly after `starts_at`.
    pub ends_at: DateTime<Utc>,
    /// Where the event takes place.
    pub venue: Venue,
    /// Ticket tiers. Never empty.
    pub tiers: Vec<TicketTier>,
    /// Lifecycle state.
    pub status: EventStatus,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last modification timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Validated input for [`Event::new`].
#[derive(Debug, Clone)]
pub struct EventDraft {
    /// Publishing user.
    pub organizer_id: UserId,
    /// Title.
    pub title: String,
    /// Description.
    pub description: String,
    /// Category label.
    pub category: String,
    /// Currency code.
    pub currency: String,
    /// Start time.
    pub starts_at: DateTime<Utc>,
    /// End time.
    pub ends_at: DateTime<Utc>,
    /// Venue.
    pub venue: Venue,
    /// Initial tiers.
    pub tiers: Vec<NewTier>,
}

impl Event {
    /// Builds a new scheduled event from a draft.
    ///
    /// # Errors
    ///
    /// Returns [`TicketingError::InvalidRequest`] if any field or tier is
    /// invalid, tier names collide, or tier capacities exceed the venue.
    pub fn new(draft: EventDraft) -> Result<Self, TicketingError> {
        let tiers = draft
            .tiers
            .iter()
            .map(|t| TicketTier::new(&t.name, t.price_cents, t.capacity, t.max_per_order))
            .collect::<Result<Vec<_>, _>>()?;

        let now = Utc::now();
        let event = Self {
            id: EventId::new(),
            organizer_id: draft.organizer_id,
            title: draft.title.trim().to_string(),
            description: draft.description.trim().to_string(),
            category: normalize_category(&draft.category),
            currency: draft.currency.trim().to_ascii_uppercase(),
            starts_at: draft.starts_at,
            ends_at: draft.ends_at,
            venue: draft.venue,
            tiers,
            status: EventStatus::Scheduled,
            created_at: now,
            updated_at: now,
        };
        event.validate()?;
        Ok(event)
    }

    /// Checks every invariant of the aggregate.
    ///
    /// # Errors
    ///
    /// Returns [`TicketingError::InvalidRequest`] naming the first
    /// violated rule.
    pub fn validate(&self) -> Result<(), TicketingError> {
        if self.title.is_empty() || self.title.chars().count() > MAX_TITLE_LEN {
            return Err(TicketingError::InvalidRequest(format!(
                "title must be 1..={MAX_TITLE_LEN} characters"
            )));
        }
        if self.category.is_empty() {
            return Err(TicketingError::InvalidRequest(
                "category must not be empty".to_string(),
            ));
        }
        if self.currency.len() != 3 || !self.currency.chars().all(|c| c.is_ascii_uppercase()) {
            return Err(TicketingError::InvalidRequest(format!(
                "invalid currency code: {}",
                self.currency
            )));
        }
        if self.ends_at <= self.starts_at {
            return Err(TicketingError::InvalidRequest(
                "ends_at must be after starts_at".to_string(),
            ));
        }
        self.venue.validate()?;

        if self.tiers.is_empty() {
            return Err(TicketingError::InvalidRequest(
                "an event needs at least one ticket tier".to_string(),
            ));
        }
        let mut names: Vec<String> = Vec::with_capacity(self.tiers.len());
        for tier in &self.tiers {
            let key = tier.name.to_lowercase();
            if names.contains(&key) {
                return Err(TicketingError::InvalidRequest(format!(
                    "duplicate tier name: {}",
                    tier.name
                )));
            }
            names.push(key);
        }
        if let Some(venue_capacity) = self.venue.capacity {
            let total = self.total_capacity();
            if total > u64::from(venue_capacity) {
                return Err(TicketingError::InvalidRequest(format!(
                    "tier capacities ({total}) exceed venue capacity ({venue_capacity})"
                )));
            }
        }
        Ok(())
    }

    /// Looks up a tier by id.
    #[must_use]
    pub fn tier(&self, tier_id: TierId) -> Option<&TicketTier> {
        self.tiers.iter().find(|t| t.id == tier_id)
    }

    /// Sum of all tier capacities.
    #[must_use]
    pub fn total_capacity(&self) -> u64 {
        self.tiers.iter().map(|t| u64::from(t.capacity)).sum()
    }

    /// Tickets sold across all tiers.
    #[must_use]
    pub fn total_sold(&self) -> u64 {
        self.tiers.iter().map(|t| u64::from(t.sold())).sum()
    }

    /// Returns `Err` unless tickets may currently be bought.
    ///
    /// # Errors
    ///
    /// Returns [`TicketingError::SalesClosed`] for a cancelled event or
    /// one that has already started at `now`.
    pub fn ensure_on_sale(&self, now: DateTime<Utc>) -> Result<(), TicketingError> {
        let reason = match self.status {
            EventStatus::Cancelled => "event is cancelled",
            EventStatus::Scheduled if self.starts_at <= now => "event has already started",
            EventStatus::Scheduled => return Ok(()),
        };
        Err(TicketingError::SalesClosed {
            event_id: self.id,
            reason: reason.to_string(),
        })
    }

    /// Applies tier edits in order. The whole batch is rejected if any
    /// edit fails; the caller should apply to a clone and swap it in.
    ///
    /// # Errors
    ///
    /// Returns [`TicketingError::TierNotFound`] for unknown tiers and
    /// [`TicketingError::Conflict`] when an edit would drop capacity
    /// below sold tickets or remove a tier with sales.
    pub fn apply_tier_edits(&mut self, edits: &[TierEdit]) -> Result<(), TicketingError> {
        for edit in edits {
            match edit {
                TierEdit::Add(new) => {
                    let tier = TicketTier::new(
                        &new.name,
                        new.price_cents,
                        new.capacity,
                        new.max_per_order,
                    )?;
                    self.tiers.push(tier);
                }
                TierEdit::Update {
                    tier_id,
                    name,
                    price_cents,
                    capacity,
                    max_per_order,
                } => {
                    let event_id = self.id;
                    let tier = self
                        .tiers
                        .iter_mut()
                        .find(|t| t.id == *tier_id)
                        .ok_or(TicketingError::TierNotFound {
                            event_id,
                            tier_id: *tier_id,
                        })?;
                    if let Some(name) = name {
                        let name = name.trim();
                        if name.is_empty() {
                            return Err(TicketingError::InvalidRequest(
                                "tier name must not be empty".to_string(),
                            ));
                        }
                        tier.name = name.to_string();
                    }
                    if let Some(price) = price_cents {
                        tier.price_cents = *price;
                    }
                    if let Some(limit) = max_per_order {
                        if *limit == 0 {
                            return Err(TicketingError::InvalidRequest(
                                "max_per_order must be positive".to_string(),
                            ));
                        }
                        tier.max_per_order = Some(*limit);
                    }
                    if let Some(capacity) = capacity {
                        let sold = tier.sold();
                        if *capacity == 0 {
                            return Err(TicketingError::InvalidRequest(
                                "tier capacity must be positive".to_string(),
                            ));
                        }
                        if *capacity < sold {
                            return Err(TicketingError::Conflict(format!(
                                "tier {} has {sold} tickets sold; capacity {capacity} is too low",
                                tier.name
                            )));
                        }
                        tier.capacity = *capacity;
                        tier.remaining = capacity - sold;
                    }
                }
                TierEdit::Remove { tier_id } => {
                    let tier = self.tier(*tier_id).ok_or(TicketingError::TierNotFound {
                        event_id: self.id,
                        tier_id: *tier_id,
                    })?;
                    if tier.sold() > 0 {
                        return Err(TicketingError::Conflict(format!(
                            "tier {} has sold tickets and cannot be removed",
                            tier.name
                        )));
                    }
                    self.tiers.retain(|t| t.id != *tier_id);
                }
            }
        }
        self.validate()
    }
}

/// Lower-cases and trims a category label.
#[must_use]
pub fn normalize_category(category: &str) -> String {
    category.trim().to_lowercase()
}

#[cfg(test)]
#[allow(clippy::panic, clippy::indexing_slicing)]
pub(crate) mod tests {
    use super::*;
    use chrono::Duration;

    pub(crate) fn venue() -> Venue {
        Venue {
            name: "Blue Hall".to_string(),
            address: "1 Main St".to_string(),
            city: "Lisbon".to_string(),
            country: Some("PT".to_string()),
            capacity: None,
        }
    }

    pub(crate) fn draft(tiers: Vec<NewTier>) -> EventDraft {
        let starts_at = Utc::now() + Duration::days(30);
        EventDraft {
            organizer_id: UserId::new(),
            title: "Night Jazz".to_string(),
            description: "Quartet".to_string(),
            category: " Concert ".to_string(),
            currency: "eur".to_string(),
            starts_at,
            ends_at: starts_at + Duration::hours(3),
            venue: venue(),
            tiers,
        }
    }

    pub(crate) fn tier(name: &str, capacity: u32) -> NewTier {
        NewTier {
            name: name.to_string(),
            price_cents: 2_500,
            capacity,
            max_per_order: None,
        }
    }

    fn event(tiers: Vec<NewTier>) -> Event {
        let Ok(event) = Event::new(draft(tiers)) else {
            panic!("valid event");
        };
        event
    }

    #[test]
    fn new_normalizes_fields() {
        let e = event(vec![tier("General", 100)]);
        assert_eq!(e.category, "concert");
        assert_eq!(e.currency, "EUR");
        assert_eq!(e.tiers[0].remaining, 100);
        assert_eq!(e.status, EventStatus::Scheduled);
    }

    #[test]
    fn rejects_event_without_tiers() {
        assert!(Event::new(draft(vec![])).is_err());
    }

    #[test]
    fn rejects_duplicate_tier_names() {
        let result = Event::new(draft(vec![tier("VIP", 10), tier("vip", 5)]));
        assert!(result.is_err());
    }

    #[test]
    fn rejects_inverted_schedule() {
        let mut d = draft(vec![tier("General", 10)]);
        d.ends_at = d.starts_at;
        assert!(Event::new(d).is_err());
    }

    #[test]
    fn tiers_must_fit_the_venue() {
        let mut d = draft(vec![tier("A", 60), tier("B", 50)]);
        d.venue.capacity = Some(100);
        assert!(Event::new(d).is_err());
    }

    #[test]
    fn capacity_cannot_drop_below_sold() {
        let mut e = event(vec![tier("General", 10)]);
        e.tiers[0].remaining = 4;
        let tier_id = e.tiers[0].id;

        let lower = TierEdit::Update {
            tier_id,
            name: None,
            price_cents: None,
            capacity: Some(5),
            max_per_order: None,
        };
        assert!(matches!(
            e.apply_tier_edits(&[lower]),
            Err(TicketingError::Conflict(_))
        ));

        let ok = TierEdit::Update {
            tier_id,
            name: None,
            price_cents: None,
            capacity: Some(8),
            max_per_order: None,
        };
        assert!(e.apply_tier_edits(&[ok]).is_ok());
        assert_eq!(e.tiers[0].capacity, 8);
        assert_eq!(e.tiers[0].remaining, 2);
    }

    #[test]
    fn tier_with_sales_cannot_be_removed() {
        let mut e = event(vec![tier("A", 10), tier("B", 10)]);
        e.tiers[0].remaining = 9;
        let sold_tier = e.tiers[0].id;
        let unsold_tier = e.tiers[1].id;

        let mut attempt = e.clone();
        assert!(
            attempt
                .apply_tier_edits(&[TierEdit::Remove { tier_id: sold_tier }])
                .is_err()
        );

        assert!(
            e.apply_tier_edits(&[TierEdit::Remove {
                tier_id: unsold_tier
            }])
            .is_ok()
        );
        assert_eq!(e.tiers.len(), 1);
        assert!(e.tier(unsold_tier).is_none());
        assert_eq!(e.tier(sold_tier).map(TicketTier::sold), Some(1));
    }

    #[test]
    fn removing_unknown_tier_is_not_found() {
        let mut e = event(vec![tier("A", 10), tier("B", 10)]);
        let missing = TierId::new();
        assert!(matches!(
            e.apply_tier_edits(&[TierEdit::Remove { tier_id: missing }]),
            Err(TicketingError::TierNotFound { tier_id, .. }) if tier_id == missing
        ));
        assert_eq!(e.tiers.len(), 2);
    }

    #[test]
    fn last_tier_cannot_be_removed() {
        let mut e = event(vec![tier("Only", 10)]);
        let tier_id = e.tiers[0].id;
        assert!(e.apply_tier_edits(&[TierEdit::Remove { tier_id }]).is_err());
    }

    #[test]
    fn sales_close_at_start_and_on_cancel() {
        let mut e = event(vec![tier("General", 10)]);
        assert!(e.ensure_on_sale(Utc::now()).is_ok());
        assert!(e.ensure_on_sale(e.starts_at).is_err());

        e.status = EventStatus::Cancelled;
        assert!(matches!(
            e.ensure_on_sale(Utc::now()),
            Err(TicketingError::SalesClosed { .. })
        ));
    }
}
