//! Persistence layer: PostgreSQL journal and store snapshots.
//!
//! The in-memory [`crate::domain::Store`] is authoritative while the
//! process runs. This layer appends every notification to a journal,
//! periodically saves the whole store, and restores the newest snapshot
//! at startup. The concrete implementation uses `sqlx::PgPool`.

pub mod models;
pub mod postgres;
pub mod tasks;

pub use postgres::PostgresPersistence;
