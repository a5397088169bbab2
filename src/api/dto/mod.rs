//! Data Transfer Objects for REST request/response serialization.
//!
//! Domain records are never serialized directly; each resource has its
//! own response type so the wire shape can evolve independently. Money
//! is always an integer amount of minor units plus a currency code.

pub mod common_dto;
pub mod contact_dto;
pub mod event_dto;
pub mod journal_dto;
pub mod ticket_dto;
pub mod user_dto;

pub use common_dto::*;
pub use contact_dto::*;
pub use event_dto::*;
pub use journal_dto::*;
pub use ticket_dto::*;
pub use user_dto::*;
