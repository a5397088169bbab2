//! WebSocket layer: connection handling, message routing, subscriptions.
//!
//! The WebSocket endpoint at `/ws` streams catalog and inventory
//! notifications to clients that subscribe to specific events (or to
//! `"*"`), and answers availability queries.

pub mod connection;
pub mod handler;
pub mod messages;
pub mod subscription;
