//! Contact service: the public contact-form inbox.

use std::sync::Arc;

use chrono::Utc;

use crate::domain::contact::ContactMessage;
use crate::domain::{ContactId, EventBus, Notification, Store};
use crate::error::TicketingError;

/// Orchestrates contact-form messages.
#[derive(Debug, Clone)]
pub struct ContactService {
    store: Arc<Store>,
    event_bus: EventBus,
}

impl ContactService {
    /// Creates a new `ContactService`.
    #[must_use]
    pub fn new(store: Arc<Store>, event_bus: EventBus) -> Self {
        Self { store, event_bus }
    }

    /// Stores a submitted message.
    ///
    /// # Errors
    ///
    /// Returns [`TicketingError::InvalidRequest`] for invalid fields.
    pub async fn submit(
        &self,
        name: &str,
        email: &str,
        subject: &str,
        message: &str,
    ) -> Result<ContactMessage, TicketingError> {
        let contact = ContactMessage::new(name, email, subject, message)?;
        self.store.contacts.insert(contact.id, contact.clone()).await;

        self.event_bus.publish(Notification::ContactReceived {
            contact_id: contact.id,
            subject: contact.subject.clone(),
            timestamp: Utc::now(),
        });
        tracing::info!(contact_id = %contact.id, "contact message received");
        Ok(contact)
    }

    /// Fetches a message.
    ///
    /// # Errors
    ///
    /// Returns [`TicketingError::ContactNotFound`] if it does not exist.
    pub async fn get(&self, contact_id: ContactId) -> Result<ContactMessage, TicketingError> {
        self.store
            .contacts
            .get(contact_id)
            .await
            .ok_or(TicketingError::ContactNotFound(contact_id))
    }

    /// Lists messages, newest first, optionally by resolution state.
    pub async fn list(&self, resolved: Option<bool>) -> Vec<ContactMessage> {
        let mut messages = self
            .store
            .contacts
            .filter(|c| resolved.is_none_or(|r| c.resolved == r))
            .await;
        messages.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(a.id.cmp(&b.id)));
        messages
    }

    /// Marks a message as handled or reopens it.
    ///
    /// # Errors
    ///
    /// Returns [`TicketingError::ContactNotFound`] if it does not exist.
    pub async fn set_resolved(
        &self,
        contact_id: ContactId,
        resolved: bool,
    ) -> Result<ContactMessage, TicketingError> {
        let contact = self
            .store
            .contacts
            .update(contact_id, |c| {
                c.resolved = resolved;
                c.clone()
            })
            .await
            .ok_or(TicketingError::ContactNotFound(contact_id))?;
        tracing::debug!(%contact_id, resolved, "contact message updated");
        Ok(contact)
    }

    /// Deletes a message.
    ///
    /// # Errors
    ///
    /// Returns [`TicketingError::ContactNotFound`] if it does not exist.
    pub async fn delete(&self, contact_id: ContactId) -> Result<(), TicketingError> {
        self.store
            .contacts
            .remove(contact_id)
            .await
            .ok_or(TicketingError::ContactNotFound(contact_id))?;
        tracing::info!(%contact_id, "contact message deleted");
        Ok(())
    }
}
