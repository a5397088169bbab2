//! The in-memory catalog shared by every service.
//!
//! Lock order, whenever more than one is held: users table, events map,
//! event entry, tickets table.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::contact::ContactMessage;
use super::event::Event;
use super::table::Table;
use super::ticket::Ticket;
use super::user::User;
use super::{ContactId, EventRegistry, TicketId, UserId};

/// All catalog data held by the running service.
#[derive(Debug, Default)]
pub struct Store {
    /// Registered users.
    pub users: Table<UserId, User>,
    /// Events and their tier inventory.
    pub events: EventRegistry,
    /// Issued tickets, active and cancelled.
    pub tickets: Table<TicketId, Ticket>,
    /// Contact-form inbox.
    pub contacts: Table<ContactId, ContactMessage>,
}

/// Serializable copy of a whole [`Store`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreSnapshot {
    /// When the snapshot was taken.
    pub taken_at: DateTime<Utc>,
    /// Users.
    pub users: Vec<User>,
    /// Events.
    pub events: Vec<Event>,
    /// Tickets.
    pub tickets: Vec<Ticket>,
    /// Contact messages.
    pub contacts: Vec<ContactMessage>,
}

impl Store {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Copies the whole catalog.
    ///
    /// Users, events and tickets form one consistent cut: the users table
    /// stays read-locked while every event is frozen and the tickets are
    /// copied, and a purchase stores its ticket under the event's write
    /// lock, so every tier's sold count equals the quantities of its
    /// active tickets. Contacts are independent and copied afterwards.
    pub async fn snapshot(&self) -> StoreSnapshot {
        let user_rows = self.users.read_lock().await;
        let (events, tickets) = self
            .events
            .freeze(|| self.tickets.filter(|_| true))
            .await;
        let users = user_rows.values().cloned().collect();
        drop(user_rows);

        StoreSnapshot {
            taken_at: Utc::now(),
            users,
            events,
            tickets,
            contacts: self.contacts.filter(|_| true).await,
        }
    }

    /// Replaces the whole catalog with the snapshot's content.
    pub async fn restore(&self, snapshot: StoreSnapshot) {
        self.users
            .replace_all(snapshot.users.into_iter().map(|u| (u.id, u)))
            .await;
        self.events.replace_all(snapshot.events).await;
        self.tickets
            .replace_all(snapshot.tickets.into_iter().map(|t| (t.id, t)))
            .await;
        self.contacts
            .replace_all(snapshot.contacts.into_iter().map(|c| (c.id, c)))
            .await;
    }
}
