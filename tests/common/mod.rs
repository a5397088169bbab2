//! Shared harness: starts the real router on an ephemeral port.

#![allow(dead_code, clippy::panic)]

use std::net::SocketAddr;
use std::sync::Arc;

use chrono::{Duration, Utc};
use reqwest::StatusCode;
use serde_json::{Value, json};

use ticket_gateway::api;
use ticket_gateway::app_state::AppState;
use ticket_gateway::config::GatewayConfig;
use ticket_gateway::domain::{EventBus, Store};

/// A running gateway plus an HTTP client pointed at it.
#[derive(Debug)]
pub struct TestApp {
    /// Bound address of the server.
    pub addr: SocketAddr,
    client: reqwest::Client,
}

impl TestApp {
    /// Starts a memory-only gateway with default limits.
    pub async fn spawn() -> Self {
        let config = GatewayConfig::default();
        let state = AppState::new(&config, Arc::new(Store::new()), EventBus::new(1024), None);
        let app = api::build_app(state, &config);

        let Ok(listener) = tokio::net::TcpListener::bind("127.0.0.1:0").await else {
            panic!("bind failed");
        };
        let Ok(addr) = listener.local_addr() else {
            panic!("no local addr");
        };
        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        Self {
            addr,
            client: reqwest::Client::new(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("http://{}{path}", self.addr)
    }

    async fn send(&self, request: reqwest::RequestBuilder) -> (StatusCode, Value) {
        let Ok(response) = request.send().await else {
            panic!("request failed");
        };
        let status = response.status();
        let Ok(text) = response.text().await else {
            panic!("unreadable body");
        };
        let body = if text.is_empty() {
            Value::Null
        } else {
            serde_json::from_str(&text).unwrap_or(Value::String(text))
        };
        (status, body)
    }

    /// `GET path`.
    pub async fn get(&self, path: &str) -> (StatusCode, Value) {
        self.send(self.client.get(self.url(path))).await
    }

    /// `POST path` with a JSON body.
    pub async fn post(&self, path: &str, body: &Value) -> (StatusCode, Value) {
        self.send(self.client.post(self.url(path)).json(body)).await
    }

    /// `PATCH path` with a JSON body.
    pub async fn patch(&self, path: &str, body: &Value) -> (StatusCode, Value) {
        self.send(self.client.patch(self.url(path)).json(body)).await
    }

    /// `DELETE path`.
    pub async fn delete(&self, path: &str) -> (StatusCode, Value) {
        self.send(self.client.delete(self.url(path))).await
    }

    /// Registers a user and returns its id.
    pub async fn create_user(&self, name: &str, email: &str, role: &str) -> String {
        let (status, body) = self
            .post(
                "/api/v1/users",
                &json!({ "name": name, "email": email, "role": role }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "{body}");
        id_of(&body)
    }

    /// Publishes an event a month from now with the given
    /// `(name, capacity)` tiers and returns the event body.
    pub async fn create_event(&self, organizer_id: &str, tiers: &[(&str, u32)]) -> Value {
        let starts_at = Utc::now() + Duration::days(30);
        let tiers: Vec<Value> = tiers
            .iter()
            .map(|(name, capacity)| {
                json!({ "name": name, "price_cents": 2500, "capacity": capacity })
            })
            .collect();
        let (status, body) = self
            .post(
                "/api/v1/events",
                &json!({
                    "organizer_id": organizer_id,
                    "title": "Rust Fest",
                    "description": "Two days of talks",
                    "category": "Conference",
                    "currency": "eur",
                    "starts_at": starts_at,
                    "ends_at": starts_at + Duration::hours(8),
                    "venue": {
                        "name": "Main Hall",
                        "address": "1 Harbour Street",
                        "city": "Lisbon",
                        "capacity": 500
                    },
                    "tiers": tiers,
                }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "{body}");
        body
    }
}

/// Extracts the `id` field of a response body.
pub fn id_of(body: &Value) -> String {
    let Some(id) = body.get("id").and_then(Value::as_str) else {
        panic!("no id in {body}");
    };
    id.to_string()
}

/// Finds the id of the tier named `name` in an event body.
pub fn tier_id(event: &Value, name: &str) -> String {
    let found = event
        .get("tiers")
        .and_then(Value::as_array)
        .and_then(|tiers| {
            tiers
                .iter()
                .find(|t| t.get("name").and_then(Value::as_str) == Some(name))
        })
        .and_then(|t| t.get("id"))
        .and_then(Value::as_str);
    let Some(id) = found else {
        panic!("no tier {name} in {event}");
    };
    id.to_string()
}
