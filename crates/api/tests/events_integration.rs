//! Integration tests for event lifecycle and ownership.

mod common;

use axum::http::{Method, StatusCode};
use common::*;
use serde_json::{json, Value};
use tower::ServiceExt;

#[tokio::test]
async fn test_organizer_creates_draft_event() {
    let pool = create_test_pool().await;
    run_migrations(&pool).await;
    let app = create_test_app(pool.clone());

    let organizer = create_organizer(&pool, &app).await;
    let event = create_event(&app, &organizer, event_payload("Draft Fair")).await;

    assert_eq!(event["status"], "draft");
    assert_eq!(event["eventType"], "standard");
    assert_eq!(event["organizerId"], organizer.id.to_string());
}

#[tokio::test]
async fn test_participant_cannot_create_event() {
    let pool = create_test_pool().await;
    run_migrations(&pool).await;
    let app = create_test_app(pool.clone());

    let participant = signup_participant(&app).await;
    let response = app
        .clone()
        .oneshot(json_request_auth(
            Method::POST,
            "/api/events",
            event_payload("Nope"),
            &participant.token,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_event_rejects_reversed_schedule() {
    let pool = create_test_pool().await;
    run_migrations(&pool).await;
    let app = create_test_app(pool.clone());

    let organizer = create_organizer(&pool, &app).await;
    let response = app
        .clone()
        .oneshot(json_request_auth(
            Method::POST,
            "/api/events",
            json!({
                "name": "Backwards",
                "eventType": "standard",
                "startDate": "2030-06-02T09:00:00Z",
                "endDate": "2030-06-01T09:00:00Z",
            }),
            &organizer.token,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_draft_hidden_from_browse_until_published() {
    let pool = create_test_pool().await;
    run_migrations(&pool).await;
    let app = create_test_app(pool.clone());

    let organizer = create_organizer(&pool, &app).await;
    let event = create_event(&app, &organizer, event_payload("Hidden Until Published")).await;
    let event_id = event["id"].as_str().unwrap();

    let listed = |events: &Value, id: &str| {
        events
            .as_array()
            .unwrap()
            .iter()
            .any(|e| e["id"] == id)
    };

    let response = app
        .clone()
        .oneshot(request(Method::GET, "/api/events"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let browse: Value = parse_body(response).await;
    assert!(!listed(&browse, event_id));

    advance_status(&app, &organizer, event_id, "published").await;

    let response = app
        .clone()
        .oneshot(request(Method::GET, "/api/events"))
        .await
        .unwrap();
    let browse: Value = parse_body(response).await;
    assert!(listed(&browse, event_id));
}

#[tokio::test]
async fn test_status_cannot_skip_stages() {
    let pool = create_test_pool().await;
    run_migrations(&pool).await;
    let app = create_test_app(pool.clone());

    let organizer = create_organizer(&pool, &app).await;
    let event = create_event(&app, &organizer, event_payload("No Skipping")).await;
    let event_id = event["id"].as_str().unwrap();

    let response = app
        .clone()
        .oneshot(json_request_auth(
            Method::POST,
            &format!("/api/events/{}/status", event_id),
            json!({ "status": "completed" }),
            &organizer.token,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_only_owner_advances_status() {
    let pool = create_test_pool().await;
    run_migrations(&pool).await;
    let app = create_test_app(pool.clone());

    let organizer = create_organizer(&pool, &app).await;
    let other = create_organizer(&pool, &app).await;
    let event = create_event(&app, &organizer, event_payload("Not Yours")).await;
    let event_id = event["id"].as_str().unwrap();

    let response = app
        .clone()
        .oneshot(json_request_auth(
            Method::POST,
            &format!("/api/events/{}/status", event_id),
            json!({ "status": "published" }),
            &other.token,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_update_only_while_draft() {
    let pool = create_test_pool().await;
    run_migrations(&pool).await;
    let app = create_test_app(pool.clone());

    let organizer = create_organizer(&pool, &app).await;
    let event = create_event(&app, &organizer, event_payload("Editable")).await;
    let event_id = event["id"].as_str().unwrap();

    let mut update = event_payload("Edited");
    update["venue"] = json!("New Venue");
    let response = app
        .clone()
        .oneshot(json_request_auth(
            Method::PUT,
            &format!("/api/events/{}", event_id),
            update.clone(),
            &organizer.token,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let updated: Value = parse_body(response).await;
    assert_eq!(updated["name"], "Edited");
    assert_eq!(updated["venue"], "New Venue");

    advance_status(&app, &organizer, event_id, "published").await;

    let response = app
        .clone()
        .oneshot(json_request_auth(
            Method::PUT,
            &format!("/api/events/{}", event_id),
            update,
            &organizer.token,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_merchandise_event_detail_lists_items() {
    let pool = create_test_pool().await;
    run_migrations(&pool).await;
    let app = create_test_app(pool.clone());

    let organizer = create_organizer(&pool, &app).await;
    let event = create_event(
        &app,
        &organizer,
        json!({
            "name": "Merch Fair",
            "eventType": "merchandise",
            "startDate": "2030-06-01T09:00:00Z",
            "endDate": "2030-06-01T18:00:00Z",
            "merchandise": [
                {
                    "name": "T-Shirt",
                    "price": "25.00",
                    "quantity": 10,
                    "maxPerParticipant": 2,
                    "sizes": ["S", "M", "L"],
                },
            ],
        }),
    )
    .await;

    let detail = event_detail(&app, &organizer, event["id"].as_str().unwrap()).await;
    let items = detail["merchandise"].as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["name"], "T-Shirt");
    assert_eq!(items[0]["quantity"], 10);
    assert_eq!(items[0]["maxPerParticipant"], 2);
}

#[tokio::test]
async fn test_merchandise_items_rejected_on_standard_event() {
    let pool = create_test_pool().await;
    run_migrations(&pool).await;
    let app = create_test_app(pool.clone());

    let organizer = create_organizer(&pool, &app).await;
    let response = app
        .clone()
        .oneshot(json_request_auth(
            Method::POST,
            "/api/events",
            json!({
                "name": "Standard With Items",
                "eventType": "standard",
                "startDate": "2030-06-01T09:00:00Z",
                "endDate": "2030-06-01T18:00:00Z",
                "merchandise": [
                    { "name": "Mug", "price": "10.00", "quantity": 5, "maxPerParticipant": 1 },
                ],
            }),
            &organizer.token,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
