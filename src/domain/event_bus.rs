//! Broadcast channel for domain notifications.
//!
//! [`EventBus`] wraps a [`tokio::sync::broadcast`] channel. Every state
//! mutation publishes a [`Notification`] through the bus; WebSocket
//! connections and the persistence journal subscribe to it.

use tokio::sync::broadcast;

use super::Notification;

/// Fan-out of [`Notification`]s to every live subscriber.
///
/// Capacity comes from `EVENT_BUS_CAPACITY`. A receiver that falls more
/// than that many notifications behind loses the oldest ones and sees
/// `RecvError::Lagged` on its next `recv`.
#[derive(Debug, Clone)]
pub struct EventBus {
    sender: broadcast::Sender<Notification>,
}

impl EventBus {
    /// Creates a bus buffering up to `capacity` notifications (at least one).
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Publishes a notification and returns how many receivers got it.
    ///
    /// A bus with no receivers (no WebSocket clients, journal disabled)
    /// drops the notification.
    pub fn publish(&self, notification: Notification) -> usize {
        let kind = notification.kind_str();
        let event_id = notification.event_id();
        let delivered = self.sender.send(notification).unwrap_or(0);
        tracing::trace!(kind, event_id = ?event_id, delivered, "notification published");
        delivered
    }

    /// Returns a receiver for notifications published from now on.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<Notification> {
        self.sender.subscribe()
    }

    /// Number of live receivers, reported by `/health`.
    #[must_use]
    pub fn receiver_count(&self) -> usize {
        self.sender.receiver_count()
    }
}
