//! Concurrent event storage with per-event fine-grained locking.
//!
//! [`EventRegistry`] stores all events in a `HashMap` where each entry is
//! individually protected by a [`tokio::sync::RwLock`]. Ticket purchases
//! hold one event's write lock for the whole check-and-decrement, which
//! serializes purchases on that event while leaving other events free.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;

use super::EventId;
use super::event::Event;
use crate::error::TicketingError;

/// Central store for all events and their tier inventory.
///
/// # Concurrency
///
/// - Multiple tasks may read the same event concurrently.
/// - Writes to different events are concurrent.
/// - Writes to the same event are serialized.
/// - Lock order is always map, then entry.
#[derive(Debug)]
pub struct EventRegistry {
    events: RwLock<HashMap<EventId, Arc<RwLock<Event>>>>,
}

impl EventRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            events: RwLock::new(HashMap::new()),
        }
    }

    /// Inserts a new event.
    ///
    /// # Errors
    ///
    /// Returns [`TicketingError::Conflict`] if an event with the same ID
    /// already exists (should never happen with UUID v4).
    pub async fn insert(&self, event: Event) -> Result<EventId, TicketingError> {
        let event_id = event.id;
        let mut map = self.events.write().await;
        if map.contains_key(&event_id) {
            return Err(TicketingError::Conflict(format!(
                "event {event_id} already exists"
            )));
        }
        map.insert(event_id, Arc::new(RwLock::new(event)));
        Ok(event_id)
    }

    /// Returns the event behind its per-event lock.
    ///
    /// # Errors
    ///
    /// Returns [`TicketingError::EventNotFound`] if no event with the given
    /// ID exists.
    pub async fn get(&self, event_id: EventId) -> Result<Arc<RwLock<Event>>, TicketingError> {
        let map = self.events.read().await;
        map.get(&event_id)
            .map(Arc::clone)
            .ok_or(TicketingError::EventNotFound(event_id))
    }

    /// Returns a point-in-time clone of the event.
    ///
    /// # Errors
    ///
    /// Returns [`TicketingError::EventNotFound`] if the event does not exist.
    pub async fn snapshot(&self, event_id: EventId) -> Result<Event, TicketingError> {
        let entry = self.get(event_id).await?;
        let event = entry.read().await;
        Ok(event.clone())
    }

    /// Removes an event, but only if `allow` approves it while both the map
    /// and the entry are write-locked.
    ///
    /// Holding both locks means no purchase can land between the check and
    /// the removal.
    ///
    /// # Errors
    ///
    /// Returns [`TicketingError::EventNotFound`] if the event does not
    /// exist, or the error produced by `allow`.
    pub async fn remove_if(
        &self,
        event_id: EventId,
        allow: impl FnOnce(&Event) -> Result<(), TicketingError>,
    ) -> Result<Event, TicketingError> {
        let mut map = self.events.write().await;
        let entry = map
            .get(&event_id)
            .map(Arc::clone)
            .ok_or(TicketingError::EventNotFound(event_id))?;
        let event = entry.write().await;
        allow(&event)?;
        let removed = event.clone();
        drop(event);
        map.remove(&event_id);
        Ok(removed)
    }

    /// Returns clones of all events matching `pred`.
    pub async fn list(&self, pred: impl Fn(&Event) -> bool) -> Vec<Event> {
        let map = self.events.read().await;
        let mut events = Vec::with_capacity(map.len());
        for entry in map.values() {
            let event = entry.read().await;
            if pred(&event) {
                events.push(event.clone());
            }
        }
        events
    }

    /// Clones every event and awaits `during` while all of them are still
    /// read-locked.
    ///
    /// No event can be inserted, removed or mutated until `during`
    /// completes, so whatever it reads agrees with the returned counters.
    pub async fn freeze<F, R>(&self, during: impl FnOnce() -> F) -> (Vec<Event>, R)
    where
        F: Future<Output = R>,
    {
        let map = self.events.read().await;
        let mut guards = Vec::with_capacity(map.len());
        for entry in map.values() {
            guards.push(entry.read().await);
        }
        let events = guards.iter().map(|event| (**event).clone()).collect();
        let extra = during().await;
        drop(guards);
        drop(map);
        (events, extra)
    }

    /// Returns `true` if any event matches `pred`.
    pub async fn any(&self, pred: impl Fn(&Event) -> bool) -> bool {
        let map = self.events.read().await;
        for entry in map.values() {
            if pred(&*entry.read().await) {
                return true;
            }
        }
        false
    }

    /// Replaces every event, used when restoring a snapshot.
    pub async fn replace_all(&self, events: Vec<Event>) {
        let mut map = self.events.write().await;
        map.clear();
        for event in events {
            map.insert(event.id, Arc::new(RwLock::new(event)));
        }
    }

    /// Returns the number of events in the registry.
    pub async fn len(&self) -> usize {
        self.events.read().await.len()
    }

    /// Returns `true` if the registry contains no events.
    pub async fn is_empty(&self) -> bool {
        self.events.read().await.is_empty()
    }
}

impl Default for EventRegistry {
    fn default() -> Self {
        Self::new()
    }
}
