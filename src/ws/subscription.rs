//! Per-connection subscription manager.
//!
//! Tracks which events a WebSocket client follows and decides which
//! notifications are forwarded to it.

use std::collections::HashSet;

use crate::domain::EventId;

/// Manages the set of event subscriptions for a single WebSocket connection.
#[derive(Debug, Default)]
pub struct SubscriptionManager {
    /// Followed events. Ignored while `subscribe_all` is set.
    event_ids: HashSet<EventId>,
    /// Whether the client follows everything (wildcard `"*"`).
    subscribe_all: bool,
}

impl SubscriptionManager {
    /// Creates a new empty subscription manager.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds events to the subscription set; `wildcard` follows everything.
    pub fn subscribe(&mut self, ids: &[EventId], wildcard: bool) {
        if wildcard {
            self.subscribe_all = true;
        }
        self.event_ids.extend(ids.iter().copied());
    }

    /// Removes events from the subscription set; `wildcard` drops the
    /// follow-everything flag.
    pub fn unsubscribe(&mut self, ids: &[EventId], wildcard: bool) {
        if wildcard {
            self.subscribe_all = false;
        }
        for id in ids {
            self.event_ids.remove(id);
        }
    }

    /// Returns `true` if a notification about `event_id` should be
    /// forwarded. Notifications not tied to an event (users, contacts)
    /// only reach wildcard subscribers.
    #[must_use]
    pub fn matches(&self, event_id: Option<EventId>) -> bool {
        self.subscribe_all || event_id.is_some_and(|id| self.event_ids.contains(&id))
    }

    /// Returns the number of explicitly followed events.
    #[must_use]
    pub fn count(&self) -> usize {
        self.event_ids.len()
    }

    /// Returns `true` if the wildcard subscription is active.
    #[must_use]
    pub fn is_subscribed_all(&self) -> bool {
        self.subscribe_all
    }
}
