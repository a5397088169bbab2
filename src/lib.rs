//! # ticket-gateway
//!
//! REST API and WebSocket gateway for event ticketing.
//!
//! The service manages users, events (with an embedded venue and priced
//! ticket tiers), tickets and contact messages. Its one piece of real
//! logic is the tier inventory: a purchase of several line items either
//! decrements every tier counter it touches or none of them, and
//! concurrent purchases against one event are serialized so a tier can
//! never be oversold.
//!
//! ## Architecture
//!
//! ```text
//! Clients (HTTP, WebSocket)
//!     │
//!     ├── REST Handlers (api/)
//!     ├── WS Handler (ws/)
//!     │
//!     ├── User / Event / Ticket / Contact services (service/)
//!     ├── EventBus (domain/)
//!     │
//!     ├── Store: users, EventRegistry, tickets, contacts (domain/)
//!     ├── inventory::reserve / release (domain/)
//!     │
//!     └── PostgreSQL journal + snapshots (persistence/)
//! ```

pub mod api;
pub mod app_state;
pub mod config;
pub mod domain;
pub mod error;
pub mod persistence;
pub mod service;
pub mod ws;
