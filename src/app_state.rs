//! Shared application state injected into all Axum handlers.

use std::sync::Arc;

use crate::config::GatewayConfig;
use crate::domain::{EventBus, Store};
use crate::persistence::PostgresPersistence;
use crate::service::{ContactService, EventService, TicketService, UserService};

/// Shared application state available to all handlers via Axum's
/// `State` extractor.
#[derive(Debug, Clone)]
pub struct AppState {
    /// User accounts.
    pub user_service: Arc<UserService>,
    /// Event catalog and tier edits.
    pub event_service: Arc<EventService>,
    /// Purchases, cancellations and availability.
    pub ticket_service: Arc<TicketService>,
    /// Contact form inbox.
    pub contact_service: Arc<ContactService>,
    /// Event bus for WebSocket subscriptions.
    pub event_bus: EventBus,
    /// Journal reader; `None` when running in memory-only mode.
    pub persistence: Option<PostgresPersistence>,
}

impl AppState {
    /// Wires every service over one store and one event bus.
    #[must_use]
    pub fn new(
        config: &GatewayConfig,
        store: Arc<Store>,
        event_bus: EventBus,
        persistence: Option<PostgresPersistence>,
    ) -> Self {
        Self {
            user_service: Arc::new(UserService::new(Arc::clone(&store), event_bus.clone())),
            event_service: Arc::new(EventService::new(Arc::clone(&store), event_bus.clone())),
            ticket_service: Arc::new(TicketService::new(
                Arc::clone(&store),
                event_bus.clone(),
                config.max_tickets_per_order,
            )),
            contact_service: Arc::new(ContactService::new(store, event_bus.clone())),
            event_bus,
            persistence,
        }
    }
}
