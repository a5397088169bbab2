//! Domain layer: catalog records, tier inventory, and the notification
//! system.
//!
//! This module contains the server-side domain model: typed identifiers,
//! users, events with their venue and ticket tiers, tickets, contact
//! messages, the all-or-nothing inventory logic, the per-event locked
//! registry, and the event bus that broadcasts every change.

pub mod contact;
pub mod event;
pub mod event_bus;
pub mod event_registry;
pub mod ids;
pub mod inventory;
pub mod notification;
pub mod store;
pub mod table;
pub mod ticket;
pub mod user;

pub use event_bus::EventBus;
pub use event_registry::EventRegistry;
pub use ids::{ContactId, EventId, TicketId, TierId, UserId};
pub use notification::Notification;
pub use store::Store;
