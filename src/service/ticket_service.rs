//! Ticket service: the purchase flow and ticket cancellation.
//!
//! A purchase holds the event's write lock from the sales check through
//! the inventory decrement and the ticket insert, so concurrent buyers of
//! the same event are serialized and a tier can never be oversold.

use std::sync::Arc;

use chrono::Utc;

use crate::domain::event::Event;
use crate::domain::inventory::{self, LineItem};
use crate::domain::notification::{InventoryReason, TierLevel};
use crate::domain::ticket::{Ticket, TicketStatus};
use crate::domain::{EventBus, EventId, Notification, Store, TicketId, UserId};
use crate::error::TicketingError;

/// Orchestrates ticket purchases and cancellations.
#[derive(Debug, Clone)]
pub struct TicketService {
    store: Arc<Store>,
    event_bus: EventBus,
    max_per_order: u32,
}

impl TicketService {
    /// Creates a new `TicketService`.
    ///
    /// `max_per_order` caps the tickets of one tier in a single purchase
    /// unless the tier sets its own limit.
    #[must_use]
    pub fn new(store: Arc<Store>, event_bus: EventBus, max_per_order: u32) -> Self {
        Self {
            store,
            event_bus,
            max_per_order,
        }
    }

    /// Buys tickets for one event across one or more tiers.
    ///
    /// Either every line item is honored or nothing changes.
    ///
    /// # Errors
    ///
    /// - [`TicketingError::UserNotFound`] / [`TicketingError::EventNotFound`]
    /// - [`TicketingError::SalesClosed`] for cancelled or started events
    /// - any error of [`inventory::reserve`]
    pub async fn purchase(
        &self,
        event_id: EventId,
        buyer_id: UserId,
        items: &[LineItem],
    ) -> Result<Ticket, TicketingError> {
        // Held until the ticket is stored so the buyer cannot be deleted
        // in between.
        let users = self.store.users.read_lock().await;
        if !users.contains_key(&buyer_id) {
            return Err(TicketingError::UserNotFound(buyer_id));
        }

        let entry = self.store.events.get(event_id).await?;
        let mut event = entry.write().await;
        event.ensure_on_sale(Utc::now())?;

        let reservation =
            match inventory::reserve(event_id, &mut event.tiers, items, self.max_per_order) {
                Ok(reservation) => reservation,
                Err(err) => {
                    tracing::info!(%event_id, %buyer_id, error = %err, "purchase rejected");
                    return Err(err);
                }
            };
        event.updated_at = Utc::now();

        let ticket = Ticket::issue(event_id, buyer_id, &event.currency, reservation);
        self.store.tickets.insert(ticket.id, ticket.clone()).await;
        let levels = tier_levels(&event);
        drop(event);
        drop(users);

        self.event_bus.publish(Notification::TicketsPurchased {
            event_id,
            ticket_id: ticket.id,
            buyer_id,
            quantity: ticket.quantity,
            total_cents: ticket.total_cents,
            timestamp: Utc::now(),
        });
        self.event_bus.publish(Notification::InventoryChanged {
            event_id,
            tiers: levels,
            reason: InventoryReason::Purchase,
            timestamp: Utc::now(),
        });
        tracing::info!(
            %event_id,
            %buyer_id,
            ticket_id = %ticket.id,
            quantity = ticket.quantity,
            total_cents = ticket.total_cents,
            "tickets purchased"
        );
        Ok(ticket)
    }

    /// Fetches a ticket.
    ///
    /// # Errors
    ///
    /// Returns [`TicketingError::TicketNotFound`] if it does not exist.
    pub async fn get_ticket(&self, ticket_id: TicketId) -> Result<Ticket, TicketingError> {
        self.store
            .tickets
            .get(ticket_id)
            .await
            .ok_or(TicketingError::TicketNotFound(ticket_id))
    }

    /// Lists every ticket issued for an event, oldest first.
    ///
    /// # Errors
    ///
    /// Returns [`TicketingError::EventNotFound`] if the event does not exist.
    pub async fn list_for_event(&self, event_id: EventId) -> Result<Vec<Ticket>, TicketingError> {
        self.store.events.get(event_id).await?;
        Ok(self.sorted(|t| t.event_id == event_id).await)
    }

    /// Lists every ticket bought by a user, oldest first.
    ///
    /// # Errors
    ///
    /// Returns [`TicketingError::UserNotFound`] if the user does not exist.
    pub async fn list_for_user(&self, user_id: UserId) -> Result<Vec<Ticket>, TicketingError> {
        if self.store.users.get(user_id).await.is_none() {
            return Err(TicketingError::UserNotFound(user_id));
        }
        Ok(self.sorted(|t| t.buyer_id == user_id).await)
    }

    /// Cancels an active ticket and returns its quantities to inventory.
    ///
    /// The start-time check, the status transition and the release all run
    /// under the event's write lock.
    ///
    /// # Errors
    ///
    /// Returns [`TicketingError::TicketNotFound`], or
    /// [`TicketingError::Conflict`] if the ticket is already cancelled or
    /// its event has started.
    pub async fn cancel_ticket(&self, ticket_id: TicketId) -> Result<Ticket, TicketingError> {
        let event_id = self.get_ticket(ticket_id).await?.event_id;
        let mut event = match self.store.events.get(event_id).await {
            Ok(entry) => Some(entry.write_owned().await),
            Err(_) => None,
        };
        if let Some(event) = &event
            && event.starts_at <= Utc::now()
        {
            return Err(TicketingError::Conflict(format!(
                "event {event_id} has already started"
            )));
        }

        // Only one caller can win the active -> cancelled transition.
        let ticket = self
            .store
            .tickets
            .update(ticket_id, |t| {
                if !t.is_active() {
                    return Err(TicketingError::Conflict(format!(
                        "ticket {ticket_id} is already cancelled"
                    )));
                }
                t.status = TicketStatus::Cancelled;
                t.cancelled_at = Some(Utc::now());
                Ok(t.clone())
            })
            .await
            .ok_or(TicketingError::TicketNotFound(ticket_id))??;

        let (released, levels) = match event.as_mut() {
            Some(event) => {
                let released = inventory::release(&mut event.tiers, &ticket.items);
                event.updated_at = Utc::now();
                (released, Some(tier_levels(event)))
            }
            None => {
                tracing::warn!(%event_id, %ticket_id, "cancelled ticket of a deleted event");
                (0, None)
            }
        };
        drop(event);

        self.event_bus.publish(Notification::TicketCancelled {
            event_id,
            ticket_id,
            released,
            timestamp: Utc::now(),
        });
        if let Some(tiers) = levels {
            self.event_bus.publish(Notification::InventoryChanged {
                event_id,
                tiers,
                reason: InventoryReason::Cancellation,
                timestamp: Utc::now(),
            });
        }
        tracing::info!(%event_id, %ticket_id, released, "ticket cancelled");
        Ok(ticket)
    }

    /// Returns the current counter of every tier of an event.
    ///
    /// # Errors
    ///
    /// Returns [`TicketingError::EventNotFound`] if the event does not exist.
    pub async fn availability(&self, event_id: EventId) -> Result<Vec<TierLevel>, TicketingError> {
        let entry = self.store.events.get(event_id).await?;
        let event = entry.read().await;
        Ok(tier_levels(&event))
    }

    async fn sorted(&self, pred: impl Fn(&Ticket) -> bool) -> Vec<Ticket> {
        let mut tickets = self.store.tickets.filter(pred).await;
        tickets.sort_by(|a, b| a.purchased_at.cmp(&b.purchased_at).then(a.id.cmp(&b.id)));
        tickets
    }
}

/// Current counter levels of every tier, in tier order.
#[must_use]
pub fn tier_levels(event: &Event) -> Vec<TierLevel> {
    event
        .tiers
        .iter()
        .map(|t| TierLevel {
            tier_id: t.id,
            name: t.name.clone(),
            remaining: t.remaining,
            capacity: t.capacity,
        })
        .collect()
}
