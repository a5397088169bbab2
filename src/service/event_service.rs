//! Event service: publishing, editing, cancelling and deleting events.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::domain::event::{Event, EventDraft, EventStatus, TierEdit, Venue, normalize_category};
use crate::domain::notification::InventoryReason;
use crate::domain::{EventBus, EventId, Notification, Store, UserId};
use crate::error::TicketingError;

use super::ticket_service::tier_levels;

/// Partial update of an event. `None` fields are left unchanged.
#[derive(Debug, Clone, Default)]
pub struct EventPatch {
    /// New title.
    pub title: Option<String>,
    /// New description.
    pub description: Option<String>,
    /// New category.
    pub category: Option<String>,
    /// New start time.
    pub starts_at: Option<DateTime<Utc>>,
    /// New end time.
    pub ends_at: Option<DateTime<Utc>>,
    /// Replacement venue.
    pub venue: Option<Venue>,
    /// Tier edits applied in order.
    pub tiers: Vec<TierEdit>,
}

/// Filters for [`EventService::list_events`].
#[derive(Debug, Clone, Default)]
pub struct EventFilter {
    /// Only events in this category.
    pub category: Option<String>,
    /// Only events published by this user.
    pub organizer_id: Option<UserId>,
    /// Case-insensitive substring of the title.
    pub query: Option<String>,
    /// Hide events that have already started.
    pub upcoming: bool,
    /// Only events in this state.
    pub status: Option<EventStatus>,
}

/// Orchestrates event lifecycle operations.
#[derive(Debug, Clone)]
pub struct EventService {
    store: Arc<Store>,
    event_bus: EventBus,
}

impl EventService {
    /// Creates a new `EventService`.
    #[must_use]
    pub fn new(store: Arc<Store>, event_bus: EventBus) -> Self {
        Self { store, event_bus }
    }

    /// Publishes a new event.
    ///
    /// # Errors
    ///
    /// Returns [`TicketingError::UserNotFound`] for an unknown organizer,
    /// [`TicketingError::InvalidRequest`] if the organizer's role may not
    /// publish events or the draft is invalid.
    pub async fn create_event(&self, draft: EventDraft) -> Result<Event, TicketingError> {
        // The organizer stays locked in until the event is registered.
        let users = self.store.users.read_lock().await;
        let organizer = users
            .get(&draft.organizer_id)
            .ok_or(TicketingError::UserNotFound(draft.organizer_id))?;
        if !organizer.role.can_organize() {
            return Err(TicketingError::InvalidRequest(format!(
                "user {} is not allowed to organize events",
                organizer.id
            )));
        }

        let event = Event::new(draft)?;
        self.store.events.insert(event.clone()).await?;
        drop(users);

        self.event_bus.publish(Notification::EventCreated {
            event_id: event.id,
            organizer_id: event.organizer_id,
            title: event.title.clone(),
            timestamp: Utc::now(),
        });
        tracing::info!(
            event_id = %event.id,
            organizer_id = %event.organizer_id,
            tiers = event.tiers.len(),
            capacity = event.total_capacity(),
            "event created"
        );
        Ok(event)
    }

    /// Fetches an event.
    ///
    /// # Errors
    ///
    /// Returns [`TicketingError::EventNotFound`] if it does not exist.
    pub async fn get_event(&self, event_id: EventId) -> Result<Event, TicketingError> {
        self.store.events.snapshot(event_id).await
    }

    /// Lists events matching `filter`, soonest first.
    pub async fn list_events(&self, filter: &EventFilter, now: DateTime<Utc>) -> Vec<Event> {
        let category = filter.category.as_deref().map(normalize_category);
        let query = filter.query.as_deref().map(str::to_lowercase);
        let mut events = self
            .store
            .events
            .list(|e| {
                category.as_deref().is_none_or(|c| e.category == c)
                    && filter.organizer_id.is_none_or(|id| e.organizer_id == id)
                    && query
                        .as_deref()
                        .is_none_or(|q| e.title.to_lowercase().contains(q))
                    && (!filter.upcoming || e.starts_at > now)
                    && filter.status.is_none_or(|s| e.status == s)
            })
            .await;
        events.sort_by(|a, b| a.starts_at.cmp(&b.starts_at).then(a.id.cmp(&b.id)));
        events
    }

    /// Counts scheduled events per category, alphabetically.
    pub async fn categories(&self) -> Vec<(String, usize)> {
        let mut counts: BTreeMap<String, usize> = BTreeMap::new();
        for event in self
            .store
            .events
            .list(|e| e.status == EventStatus::Scheduled)
            .await
        {
            *counts.entry(event.category).or_default() += 1;
        }
        counts.into_iter().collect()
    }

    /// Applies a partial update atomically.
    ///
    /// The patch is applied to a copy under the event's write lock and
    /// swapped in only if the result is valid.
    ///
    /// # Errors
    ///
    /// Returns [`TicketingError::EventNotFound`], [`TicketingError::Conflict`]
    /// for cancelled events or tier edits that would lose sold tickets, and
    /// [`TicketingError::InvalidRequest`] / [`TicketingError::TierNotFound`]
    /// for invalid edits.
    pub async fn update_event(
        &self,
        event_id: EventId,
        patch: EventPatch,
    ) -> Result<Event, TicketingError> {
        let entry = self.store.events.get(event_id).await?;
        let mut event = entry.write().await;
        if event.status == EventStatus::Cancelled {
            return Err(TicketingError::Conflict(format!(
                "event {event_id} is cancelled"
            )));
        }

        let mut next = event.clone();
        if let Some(title) = patch.title {
            next.title = title.trim().to_string();
        }
        if let Some(description) = patch.description {
            next.description = description.trim().to_string();
        }
        if let Some(category) = patch.category {
            next.category = normalize_category(&category);
        }
        if let Some(starts_at) = patch.starts_at {
            next.starts_at = starts_at;
        }
        if let Some(ends_at) = patch.ends_at {
            next.ends_at = ends_at;
        }
        if let Some(venue) = patch.venue {
            next.venue = venue;
        }
        next.apply_tier_edits(&patch.tiers)?;
        next.updated_at = Utc::now();

        *event = next.clone();
        drop(event);

        self.event_bus.publish(Notification::EventUpdated {
            event_id,
            timestamp: Utc::now(),
        });
        if !patch.tiers.is_empty() {
            self.event_bus.publish(Notification::InventoryChanged {
                event_id,
                tiers: tier_levels(&next),
                reason: InventoryReason::TierEdit,
                timestamp: Utc::now(),
            });
        }
        tracing::info!(%event_id, tier_edits = patch.tiers.len(), "event updated");
        Ok(next)
    }

    /// Calls an event off. Issued tickets stay on record; no further
    /// purchases are accepted.
    ///
    /// # Errors
    ///
    /// Returns [`TicketingError::EventNotFound`] or
    /// [`TicketingError::Conflict`] if it is already cancelled.
    pub async fn cancel_event(&self, event_id: EventId) -> Result<Event, TicketingError> {
        let entry = self.store.events.get(event_id).await?;
        let mut event = entry.write().await;
        if event.status == EventStatus::Cancelled {
            return Err(TicketingError::Conflict(format!(
                "event {event_id} is already cancelled"
            )));
        }
        event.status = EventStatus::Cancelled;
        event.updated_at = Utc::now();
        let cancelled = event.clone();
        drop(event);

        self.event_bus.publish(Notification::EventCancelled {
            event_id,
            timestamp: Utc::now(),
        });
        tracing::info!(%event_id, sold = cancelled.total_sold(), "event cancelled");
        Ok(cancelled)
    }

    /// Deletes an event that has no sold tickets.
    ///
    /// # Errors
    ///
    /// Returns [`TicketingError::EventNotFound`] or
    /// [`TicketingError::Conflict`] while any tier has sales.
    pub async fn delete_event(&self, event_id: EventId) -> Result<(), TicketingError> {
        self.store
            .events
            .remove_if(event_id, |event| {
                let sold = event.total_sold();
                if sold > 0 {
                    return Err(TicketingError::Conflict(format!(
                        "event {event_id} has {sold} tickets sold"
                    )));
                }
                Ok(())
            })
            .await?;

        self.event_bus.publish(Notification::EventDeleted {
            event_id,
            timestamp: Utc::now(),
        });
        tracing::info!(%event_id, "event deleted");
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::panic, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::domain::event::tests::{draft, tier};
    use crate::domain::user::{Role, User};

    async fn setup(role: Role) -> (EventService, UserId) {
        let store = Arc::new(Store::new());
        let Ok(user) = User::new("Olga", "olga@example.com", role) else {
            panic!("valid user");
        };
        let user_id = user.id;
        store.users.insert(user_id, user).await;
        (EventService::new(store, EventBus::new(100)), user_id)
    }

    async fn create(service: &EventService, organizer_id: UserId) -> Event {
        let mut d = draft(vec![tier("General", 10), tier("VIP", 2)]);
        d.organizer_id = organizer_id;
        let Ok(event) = service.create_event(d).await else {
            panic!("create failed");
        };
        event
    }

    #[tokio::test]
    async fn categories_count_scheduled_events() {
        let (service, organizer) = setup(Role::Organizer).await;
        let first = create(&service, organizer).await;
        create(&service, organizer).await;
        assert_eq!(service.categories().await, vec![("concert".to_string(), 2)]);

        let Ok(_) = service.cancel_event(first.id).await else {
            panic!("cancel failed");
        };
        assert_eq!(service.categories().await, vec![("concert".to_string(), 1)]);
    }

    #[tokio::test]
    async fn attendee_cannot_organize() {
        let (service, user_id) = setup(Role::Attendee).await;
        let mut d = draft(vec![tier("General", 10)]);
        d.organizer_id = user_id;
        assert!(matches!(
            service.create_event(d).await,
            Err(TicketingError::InvalidRequest(_))
        ));
    }

    #[tokio::test]
    async fn unknown_organizer_is_not_found() {
        let (service, _) = setup(Role::Organizer).await;
        let d = draft(vec![tier("General", 10)]);
        assert!(matches!(
            service.create_event(d).await,
            Err(TicketingError::UserNotFound(_))
        ));
    }

    #[tokio::test]
    async fn update_emits_inventory_change_for_tier_edits() {
        let (service, user_id) = setup(Role::Organizer).await;
        let event = create(&service, user_id).await;
        let mut rx = service.event_bus.subscribe();

        let patch = EventPatch {
            title: Some("Late Jazz".to_string()),
            tiers: vec![TierEdit::Update {
                tier_id: event.tiers[0].id,
                name: None,
                price_cents: Some(3_000),
                capacity: Some(20),
                max_per_order: None,
            }],
            ..EventPatch::default()
        };
        let Ok(updated) = service.update_event(event.id, patch).await else {
            panic!("update failed");
        };
        assert_eq!(updated.title, "Late Jazz");
        assert_eq!(updated.tiers[0].remaining, 20);

        let kinds: Vec<&str> = [rx.recv().await, rx.recv().await]
            .iter()
            .filter_map(|r| r.as_ref().ok().map(Notification::kind_str))
            .collect();
        assert_eq!(kinds, vec!["event_updated", "inventory_changed"]);
    }

    #[tokio::test]
    async fn invalid_patch_leaves_event_untouched() {
        let (service, user_id) = setup(Role::Organizer).await;
        let event = create(&service, user_id).await;

        let patch = EventPatch {
            title: Some("Renamed".to_string()),
            ends_at: Some(event.starts_at),
            ..EventPatch::default()
        };
        assert!(service.update_event(event.id, patch).await.is_err());

        let Ok(stored) = service.get_event(event.id).await else {
            panic!("event exists");
        };
        assert_eq!(stored.title, event.title);
    }

    #[tokio::test]
    async fn cancel_twice_conflicts() {
        let (service, user_id) = setup(Role::Organizer).await;
        let event = create(&service, user_id).await;

        let Ok(cancelled) = service.cancel_event(event.id).await else {
            panic!("cancel failed");
        };
        assert_eq!(cancelled.status, EventStatus::Cancelled);
        assert!(matches!(
            service.cancel_event(event.id).await,
            Err(TicketingError::Conflict(_))
        ));
        assert!(matches!(
            service.update_event(event.id, EventPatch::default()).await,
            Err(TicketingError::Conflict(_))
        ));
    }

    #[tokio::test]
    async fn delete_refused_after_sales() {
        let (service, user_id) = setup(Role::Organizer).await;
        let event = create(&service, user_id).await;

        let Ok(entry) = service.store.events.get(event.id).await else {
            panic!("event exists");
        };
        entry.write().await.tiers[0].remaining -= 1;

        assert!(matches!(
            service.delete_event(event.id).await,
            Err(TicketingError::Conflict(_))
        ));

        entry.write().await.tiers[0].remaining += 1;
        assert!(service.delete_event(event.id).await.is_ok());
        assert!(matches!(
            service.get_event(event.id).await,
            Err(TicketingError::EventNotFound(_))
        ));
    }

    #[tokio::test]
    async fn list_applies_filters() {
        let (service, user_id) = setup(Role::Organizer).await;
        let first = create(&service, user_id).await;
        let _second = create(&service, user_id).await;
        let _ = service.cancel_event(first.id).await;

        let all = service.list_events(&EventFilter::default(), Utc::now()).await;
        assert_eq!(all.len(), 2);

        let scheduled = service
            .list_events(
                &EventFilter {
                    status: Some(EventStatus::Scheduled),
                    category: Some("CONCERT".to_string()),
                    ..EventFilter::default()
                },
                Utc::now(),
            )
            .await;
        assert_eq!(scheduled.len(), 1);

        let past = service
            .list_events(
                &EventFilter {
                    upcoming: true,
                    ..EventFilter::default()
                },
                first.starts_at + chrono::Duration::days(1),
            )
            .await;
        assert!(past.is_empty());
    }

    #[tokio::test]
    async fn lifecycle_emits_created_cancelled_and_deleted() {
        let (service, user_id) = setup(Role::Organizer).await;
        let mut rx = service.event_bus.subscribe();

        let kept = create(&service, user_id).await;
        let Ok(Notification::EventCreated {
            event_id,
            organizer_id,
            ..
        }) = rx.recv().await
        else {
            panic!("expected event_created");
        };
        assert_eq!(event_id, kept.id);
        assert_eq!(organizer_id, user_id);

        let Ok(_) = service.cancel_event(kept.id).await else {
            panic!("cancel failed");
        };
        let Ok(Notification::EventCancelled { event_id, .. }) = rx.recv().await else {
            panic!("expected event_cancelled");
        };
        assert_eq!(event_id, kept.id);

        let dropped = create(&service, user_id).await;
        let Ok(Notification::EventCreated { .. }) = rx.recv().await else {
            panic!("expected event_created");
        };
        assert!(service.delete_event(dropped.id).await.is_ok());
        let Ok(Notification::EventDeleted { event_id, .. }) = rx.recv().await else {
            panic!("expected event_deleted");
        };
        assert_eq!(event_id, dropped.id);

        // Refused mutations publish nothing.
        assert!(service.cancel_event(kept.id).await.is_err());
        assert!(service.delete_event(dropped.id).await.is_err());
        assert!(rx.try_recv().is_err());
    }
}
