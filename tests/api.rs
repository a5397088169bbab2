//! End-to-end REST tests against a live, memory-only gateway.

#![allow(clippy::panic, clippy::indexing_slicing)]

mod common;

use reqwest::StatusCode;
use serde_json::{Value, json};

use common::{TestApp, id_of, tier_id};

fn remaining(availability: &Value, name: &str) -> u64 {
    let Some(tiers) = availability["tiers"].as_array() else {
        panic!("no tiers in {availability}");
    };
    let Some(tier) = tiers.iter().find(|t| t["name"] == name) else {
        panic!("no tier {name}");
    };
    let Some(n) = tier["remaining"].as_u64() else {
        panic!("remaining not a number");
    };
    n
}

#[tokio::test]
async fn health_reports_memory_only_mode() {
    let app = TestApp::spawn().await;
    let (status, body) = app.get("/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["persistence"], false);
}

#[tokio::test]
async fn purchase_and_cancel_round_trip() {
    let app = TestApp::spawn().await;
    let organizer = app
        .create_user("Olga", "olga@example.com", "organizer")
        .await;
    let buyer = app.create_user("Ben", "ben@example.com", "attendee").await;
    let event = app
        .create_event(&organizer, &[("General", 5), ("VIP", 2)])
        .await;
    let event_id = id_of(&event);
    let general = tier_id(&event, "General");
    let vip = tier_id(&event, "VIP");
    assert_eq!(event["currency"], "EUR");
    assert_eq!(event["category"], "conference");

    let (status, ticket) = app
        .post(
            &format!("/api/v1/events/{event_id}/tickets"),
            &json!({
                "buyer_id": buyer,
                "items": [
                    { "tier_id": general, "quantity": 1 },
                    { "tier_id": vip, "quantity": 1 },
                    { "tier_id": general, "quantity": 1 }
                ]
            }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "{ticket}");
    assert_eq!(ticket["quantity"], 3);
    assert_eq!(ticket["total_cents"], 7500);
    assert_eq!(ticket["status"], "active");
    assert_eq!(ticket["items"].as_array().map(Vec::len), Some(2));
    let ticket_id = id_of(&ticket);

    let (_, availability) = app
        .get(&format!("/api/v1/events/{event_id}/availability"))
        .await;
    assert_eq!(remaining(&availability, "General"), 3);
    assert_eq!(remaining(&availability, "VIP"), 1);

    let (status, body) = app.get(&format!("/api/v1/users/{buyer}/tickets")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["pagination"]["total"], 1);

    let (status, cancelled) = app
        .post(&format!("/api/v1/tickets/{ticket_id}/cancel"), &json!({}))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(cancelled["status"], "cancelled");

    let (status, body) = app
        .post(&format!("/api/v1/tickets/{ticket_id}/cancel"), &json!({}))
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"]["code"], 2102);

    let (_, availability) = app
        .get(&format!("/api/v1/events/{event_id}/availability"))
        .await;
    assert_eq!(remaining(&availability, "General"), 5);
    assert_eq!(remaining(&availability, "VIP"), 2);
    assert_eq!(availability["total_remaining"], 7);
}

#[tokio::test]
async fn failed_line_item_rejects_whole_purchase() {
    let app = TestApp::spawn().await;
    let organizer = app
        .create_user("Olga", "olga@example.com", "organizer")
        .await;
    let buyer = app.create_user("Ben", "ben@example.com", "attendee").await;
    let event = app
        .create_event(&organizer, &[("General", 5), ("VIP", 2)])
        .await;
    let event_id = id_of(&event);

    let (status, body) = app
        .post(
            &format!("/api/v1/events/{event_id}/tickets"),
            &json!({
                "buyer_id": buyer,
                "items": [
                    { "tier_id": tier_id(&event, "General"), "quantity": 2 },
                    { "tier_id": tier_id(&event, "VIP"), "quantity": 3 }
                ]
            }),
        )
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"]["code"], 4001);

    let (_, availability) = app
        .get(&format!("/api/v1/events/{event_id}/availability"))
        .await;
    assert_eq!(remaining(&availability, "General"), 5);
    assert_eq!(remaining(&availability, "VIP"), 2);
}

#[tokio::test]
async fn concurrent_purchases_never_oversell() {
    let app = TestApp::spawn().await;
    let organizer = app
        .create_user("Olga", "olga@example.com", "organizer")
        .await;
    let buyer = app.create_user("Ben", "ben@example.com", "attendee").await;
    let event = app.create_event(&organizer, &[("General", 5)]).await;
    let event_id = id_of(&event);
    let general = tier_id(&event, "General");

    let app = std::sync::Arc::new(app);
    let mut handles = Vec::new();
    for _ in 0..20 {
        let app = std::sync::Arc::clone(&app);
        let path = format!("/api/v1/events/{event_id}/tickets");
        let body = json!({ "buyer_id": buyer, "items": [{ "tier_id": general, "quantity": 1 }] });
        handles.push(tokio::spawn(async move { app.post(&path, &body).await.0 }));
    }

    let mut created = 0;
    let mut rejected = 0;
    for handle in handles {
        let Ok(status) = handle.await else {
            panic!("task panicked");
        };
        match status {
            StatusCode::CREATED => created += 1,
            StatusCode::UNPROCESSABLE_ENTITY => rejected += 1,
            other => panic!("unexpected status {other}"),
        }
    }
    assert_eq!(created, 5);
    assert_eq!(rejected, 15);

    let (_, availability) = app
        .get(&format!("/api/v1/events/{event_id}/availability"))
        .await;
    assert_eq!(remaining(&availability, "General"), 0);
    assert_eq!(availability["tiers"][0]["sold_out"], true);
}

#[tokio::test]
async fn order_limit_and_closed_sales_are_unprocessable() {
    let app = TestApp::spawn().await;
    let organizer = app
        .create_user("Olga", "olga@example.com", "organizer")
        .await;
    let buyer = app.create_user("Ben", "ben@example.com", "attendee").await;
    let event = app.create_event(&organizer, &[("General", 50)]).await;
    let event_id = id_of(&event);
    let general = tier_id(&event, "General");
    let path = format!("/api/v1/events/{event_id}/tickets");

    let (status, body) = app
        .post(
            &path,
            &json!({ "buyer_id": buyer, "items": [{ "tier_id": general, "quantity": 11 }] }),
        )
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"]["code"], 4002);

    let (status, cancelled) = app
        .post(&format!("/api/v1/events/{event_id}/cancel"), &json!({}))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(cancelled["status"], "cancelled");

    let (status, body) = app
        .post(
            &path,
            &json!({ "buyer_id": buyer, "items": [{ "tier_id": general, "quantity": 1 }] }),
        )
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"]["code"], 4003);
}

#[tokio::test]
async fn sold_inventory_blocks_destructive_edits() {
    let app = TestApp::spawn().await;
    let organizer = app
        .create_user("Olga", "olga@example.com", "organizer")
        .await;
    let buyer = app.create_user("Ben", "ben@example.com", "attendee").await;
    let event = app.create_event(&organizer, &[("General", 5)]).await;
    let event_id = id_of(&event);
    let general = tier_id(&event, "General");

    let (status, _) = app
        .post(
            &format!("/api/v1/events/{event_id}/tickets"),
            &json!({ "buyer_id": buyer, "items": [{ "tier_id": general, "quantity": 3 }] }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, _) = app
        .patch(
            &format!("/api/v1/events/{event_id}"),
            &json!({ "tiers": [{ "op": "update", "tier_id": general, "capacity": 2 }] }),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, updated) = app
        .patch(
            &format!("/api/v1/events/{event_id}"),
            &json!({
                "title": "Rust Fest 2026",
                "tiers": [
                    { "op": "update", "tier_id": general, "capacity": 8 },
                    { "op": "add", "name": "VIP", "price_cents": 9000, "capacity": 2 }
                ]
            }),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{updated}");
    assert_eq!(updated["title"], "Rust Fest 2026");
    assert_eq!(updated["total_capacity"], 10);
    assert_eq!(updated["total_sold"], 3);

    let (status, _) = app.delete(&format!("/api/v1/events/{event_id}")).await;
    assert_eq!(status, StatusCode::CONFLICT);
    let (status, _) = app.delete(&format!("/api/v1/users/{buyer}")).await;
    assert_eq!(status, StatusCode::CONFLICT);
    let (status, _) = app.delete(&format!("/api/v1/users/{organizer}")).await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn unsold_event_can_be_deleted() {
    let app = TestApp::spawn().await;
    let organizer = app
        .create_user("Olga", "olga@example.com", "organizer")
        .await;
    let event = app.create_event(&organizer, &[("General", 5)]).await;
    let event_id = id_of(&event);

    let (status, _) = app.delete(&format!("/api/v1/events/{event_id}")).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, body) = app.get(&format!("/api/v1/events/{event_id}")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], 2002);

    let (status, _) = app.delete(&format!("/api/v1/users/{organizer}")).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn attendees_cannot_publish_events() {
    let app = TestApp::spawn().await;
    let attendee = app.create_user("Ben", "ben@example.com", "attendee").await;
    let (status, body) = app
        .post(
            "/api/v1/events",
            &json!({
                "organizer_id": attendee,
                "title": "Garage Show",
                "category": "concert",
                "currency": "USD",
                "starts_at": "2099-01-01T20:00:00Z",
                "ends_at": "2099-01-01T23:00:00Z",
                "venue": { "name": "Garage", "address": "2 Side St", "city": "Porto" },
                "tiers": [{ "name": "Door", "price_cents": 1000, "capacity": 30 }]
            }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], 1001);
}

#[tokio::test]
async fn emails_are_unique_ignoring_case() {
    let app = TestApp::spawn().await;
    app.create_user("Ben", "ben@example.com", "attendee").await;
    let (status, body) = app
        .post(
            "/api/v1/users",
            &json!({ "name": "Benjamin", "email": "  BEN@Example.com " }),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"]["code"], 2101);

    let (status, body) = app.get("/api/v1/users?q=BEN").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["pagination"]["total"], 1);
    assert_eq!(body["data"][0]["role"], "attendee");
}

#[tokio::test]
async fn contacts_paginate_and_resolve() {
    let app = TestApp::spawn().await;
    let mut last = String::new();
    for n in 0..5 {
        let (status, body) = app
            .post(
                "/api/v1/contacts",
                &json!({
                    "name": "Visitor",
                    "email": "visitor@example.com",
                    "subject": format!("Question {n}"),
                    "message": "Is there parking at the venue?"
                }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);
        last = id_of(&body);
    }

    let (status, page) = app.get("/api/v1/contacts?page=3&per_page=2").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(page["data"].as_array().map(Vec::len), Some(1));
    assert_eq!(page["pagination"]["total"], 5);
    assert_eq!(page["pagination"]["total_pages"], 3);

    let (status, resolved) = app
        .patch(&format!("/api/v1/contacts/{last}"), &json!({ "resolved": true }))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(resolved["resolved"], true);

    let (_, open) = app.get("/api/v1/contacts?resolved=false").await;
    assert_eq!(open["pagination"]["total"], 4);

    let (status, _) = app.delete(&format!("/api/v1/contacts/{last}")).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, body) = app.get(&format!("/api/v1/contacts/{last}")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], 2005);
}

#[tokio::test]
async fn journal_requires_persistence() {
    let app = TestApp::spawn().await;
    let (status, body) = app.get("/api/v1/journal").await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["error"]["code"], 3002);
}

#[tokio::test]
async fn categories_reflect_scheduled_events() {
    let app = TestApp::spawn().await;
    let organizer = app
        .create_user("Olga", "olga@example.com", "organizer")
        .await;
    app.create_event(&organizer, &[("General", 5)]).await;

    let (status, body) = app.get("/config/categories").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!([{ "category": "conference", "scheduled_events": 1 }])
    );

    let (status, body) = app.get("/api/v1/events?category=CONFERENCE&upcoming=true").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["pagination"]["total"], 1);
}
