//! Service layer: business logic orchestration.
//!
//! Each service coordinates one resource over the shared
//! [`crate::domain::Store`] and emits notifications through the
//! [`crate::domain::EventBus`]. Every mutation follows the pattern:
//! acquire lock → validate and mutate → release → publish → log.

pub mod contact_service;
pub mod event_service;
pub mod ticket_service;
pub mod user_service;

pub use contact_service::ContactService;
pub use event_service::{EventFilter, EventPatch, EventService};
pub use ticket_service::TicketService;
pub use user_service::{UserFilter, UserPatch, UserService};
