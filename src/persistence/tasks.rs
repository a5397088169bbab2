//! Background tasks that keep PostgreSQL in step with the in-memory store.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::broadcast;
use tokio::task::JoinHandle;

use super::postgres::PostgresPersistence;
use crate::domain::store::StoreSnapshot;
use crate::domain::{EventBus, Store};
use crate::error::TicketingError;

/// Restores the store from the newest snapshot, if one exists.
///
/// Returns `true` when a snapshot was applied.
///
/// # Errors
///
/// Returns [`TicketingError::PersistenceError`] on database failure or
/// [`TicketingError::Internal`] if the stored JSON no longer matches the
/// snapshot schema.
pub async fn restore_latest(
    persistence: &PostgresPersistence,
    store: &Store,
) -> Result<bool, TicketingError> {
    let Some(row) = persistence.load_latest_snapshot().await? else {
        tracing::info!("no snapshot found, starting with an empty store");
        return Ok(false);
    };
    let snapshot: StoreSnapshot = serde_json::from_value(row.state)
        .map_err(|e| TicketingError::Internal(format!("corrupt snapshot {}: {e}", row.id)))?;
    tracing::info!(
        snapshot_id = row.id,
        snapshot_at = %row.snapshot_at,
        users = snapshot.users.len(),
        events = snapshot.events.len(),
        tickets = snapshot.tickets.len(),
        "restoring store from snapshot"
    );
    store.restore(snapshot).await;
    Ok(true)
}

/// Appends every notification published on the bus to the journal.
///
/// Subscribes before returning so that nothing published after this call
/// is missed. The task ends when the bus is closed.
pub fn spawn_journal(persistence: PostgresPersistence, event_bus: &EventBus) -> JoinHandle<()> {
    let mut rx = event_bus.subscribe();
    tokio::spawn(async move {
        loop {
            match rx.recv().await {
                Ok(notification) => {
                    if let Err(err) = persistence.save_entry(&notification).await {
                        tracing::error!(
                            kind = notification.kind_str(),
                            error = %err,
                            "failed to journal notification"
                        );
                    }
                }
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    tracing::warn!(lagged = n, "journal lagged behind event bus");
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
        tracing::debug!("journal task stopped");
    })
}

/// Saves a full snapshot every `interval_secs` and prunes snapshots older
/// than `cleanup_after_days` (0 disables pruning).
pub fn spawn_snapshots(
    persistence: PostgresPersistence,
    store: Arc<Store>,
    interval_secs: u64,
    cleanup_after_days: u64,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(Duration::from_secs(interval_secs.max(1)));
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        // The first tick completes immediately; the restored state needs no copy.
        ticker.tick().await;
        loop {
            ticker.tick().await;
            if let Err(err) = snapshot_once(&persistence, &store, cleanup_after_days).await {
                tracing::error!(error = %err, "snapshot failed");
            }
        }
    })
}

/// Saves one last snapshot after the server stopped taking requests, so a
/// restart resumes from the final state instead of the last periodic tick.
///
/// Returns the snapshot id, or `None` if it could not be saved (logged).
pub async fn final_snapshot(persistence: &PostgresPersistence, store: &Store) -> Option<i64> {
    match snapshot_once(persistence, store, 0).await {
        Ok(id) => {
            tracing::info!(snapshot_id = id, "final snapshot saved");
            Some(id)
        }
        Err(err) => {
            tracing::error!(
                error = %err,
                "final snapshot failed; changes since the last snapshot are lost"
            );
            None
        }
    }
}

/// Takes and stores one snapshot, then prunes old ones.
///
/// # Errors
///
/// Returns [`TicketingError::PersistenceError`] on database failure.
pub async fn snapshot_once(
    persistence: &PostgresPersistence,
    store: &Store,
    cleanup_after_days: u64,
) -> Result<i64, TicketingError> {
    let snapshot = store.snapshot().await;
    let state =
        serde_json::to_value(&snapshot).map_err(|e| TicketingError::Internal(e.to_string()))?;
    let id = persistence.save_snapshot(&state).await?;
    tracing::debug!(snapshot_id = id, "store snapshot saved");

    if cleanup_after_days > 0 {
        let deleted = persistence.delete_old_snapshots(cleanup_after_days).await?;
        if deleted > 0 {
            tracing::info!(deleted, "old snapshots pruned");
        }
    }
    Ok(id)
}
