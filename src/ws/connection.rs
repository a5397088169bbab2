//! WebSocket connection state machine.
//!
//! Handles the read/write loop for a single WebSocket connection,
//! dispatching incoming commands and forwarding filtered notifications.

use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket};
use futures_util::{SinkExt, StreamExt};
use tokio::sync::broadcast;

use super::messages::{WsCommand, WsMessage, WsMessageType, parse_targets};
use super::subscription::SubscriptionManager;
use crate::domain::Notification;
use crate::service::TicketService;

/// Runs the read/write loop for a single WebSocket connection.
///
/// - Reads commands from the client and replies to each one.
/// - Forwards notifications from the [`broadcast::Receiver`] that match
///   the client's subscriptions.
pub async fn run_connection(
    socket: WebSocket,
    mut event_rx: broadcast::Receiver<Notification>,
    ticket_service: Arc<TicketService>,
) {
    let (mut ws_tx, mut ws_rx) = socket.split();
    let mut subs = SubscriptionManager::new();

    loop {
        tokio::select! {
            msg = ws_rx.next() => {
                match msg {
                    Some(Ok(Message::Text(text))) => {
                        let reply = handle_text_message(&text, &mut subs, &ticket_service).await;
                        if let Some(json) = reply.to_json()
                            && ws_tx.send(Message::text(json)).await.is_err() {
                                break;
                            }
                    }
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Err(err)) => {
                        tracing::debug!(error = %err, "ws read failed");
                        break;
                    }
                    _ => {}
                }
            }
            notification = event_rx.recv() => {
                match notification {
                    Ok(notification) => {
                        if !subs.matches(notification.event_id()) {
                            continue;
                        }
                        let Ok(payload) = serde_json::to_value(&notification) else {
                            continue;
                        };
                        let msg = WsMessage::new(
                            uuid::Uuid::new_v4().to_string(),
                            WsMessageType::Event,
                            payload,
                        );
                        if let Some(json) = msg.to_json()
                            && ws_tx.send(Message::text(json)).await.is_err() {
                                break;
                            }
                    }
                    Err(broadcast::error::RecvError::Lagged(n)) => {
                        tracing::warn!(lagged = n, "ws client lagged behind event bus");
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        }
    }

    tracing::debug!("ws connection closed");
}

/// Handles a text message from the client and builds the reply.
async fn handle_text_message(
    text: &str,
    subs: &mut SubscriptionManager,
    ticket_service: &TicketService,
) -> WsMessage {
    let Ok(msg) = serde_json::from_str::<WsMessage>(text) else {
        return WsMessage::error(String::new(), 400, "malformed JSON");
    };
    if msg.msg_type != WsMessageType::Command {
        return WsMessage::error(msg.id, 400, "expected a command message");
    }
    let command = match WsCommand::decode(msg.payload) {
        Ok(command) => command,
        Err(err) => return WsMessage::error(msg.id, err.code(), &err.message()),
    };

    match command {
        WsCommand::Subscribe { event_ids } => {
            let (ids, wildcard, rejected) = parse_targets(&event_ids);
            subs.subscribe(&ids, wildcard);
            WsMessage::new(
                msg.id,
                WsMessageType::Response,
                serde_json::json!({
                    "subscribed": ids,
                    "rejected": rejected,
                    "count": subs.count(),
                    "wildcard": subs.is_subscribed_all(),
                }),
            )
        }
        WsCommand::Unsubscribe { event_ids } => {
            let (ids, wildcard, rejected) = parse_targets(&event_ids);
            subs.unsubscribe(&ids, wildcard);
            WsMessage::new(
                msg.id,
                WsMessageType::Response,
                serde_json::json!({
                    "unsubscribed": ids,
                    "rejected": rejected,
                    "remaining_count": subs.count(),
                    "wildcard": subs.is_subscribed_all(),
                }),
            )
        }
        WsCommand::Availability { event_id } => match ticket_service.availability(event_id).await {
            Ok(tiers) => WsMessage::new(
                msg.id,
                WsMessageType::Response,
                serde_json::json!({ "event_id": event_id, "tiers": tiers }),
            ),
            Err(err) => WsMessage::error(msg.id, err.error_code(), &err.to_string()),
        },
    }
}
