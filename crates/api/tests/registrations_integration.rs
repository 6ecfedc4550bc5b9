//! Integration tests for registration, tickets, CSV export, and attendance
//! scanning.

mod common;

use axum::http::{header, Method, StatusCode};
use common::*;
use serde_json::{json, Value};
use tower::ServiceExt;

/// Helper: a published standard event ready for registrations.
async fn published_event(app: &axum::Router, organizer: &TestAccount, name: &str) -> String {
    let event = create_event(app, organizer, event_payload(name)).await;
    let event_id = event["id"].as_str().unwrap().to_string();
    advance_status(app, organizer, &event_id, "published").await;
    event_id
}

#[tokio::test]
async fn test_register_issues_ticket() {
    let pool = create_test_pool().await;
    run_migrations(&pool).await;
    let app = create_test_app(pool.clone());

    let organizer = create_organizer(&pool, &app).await;
    let participant = signup_participant(&app).await;
    let event_id = published_event(&app, &organizer, "Ticketed").await;

    let registration = register_for_event(&app, &participant, &event_id).await;

    assert!(registration["ticketCode"]
        .as_str()
        .unwrap()
        .starts_with("TKT-"));
    assert_eq!(registration["status"], "confirmed");
    assert_eq!(registration["event"]["id"], event_id);
    assert_eq!(registration["participant"]["id"], participant.id.to_string());
}

#[tokio::test]
async fn test_register_draft_event_rejected() {
    let pool = create_test_pool().await;
    run_migrations(&pool).await;
    let app = create_test_app(pool.clone());

    let organizer = create_organizer(&pool, &app).await;
    let participant = signup_participant(&app).await;
    let event = create_event(&app, &organizer, event_payload("Still Draft")).await;

    let response = app
        .clone()
        .oneshot(json_request_auth(
            Method::POST,
            "/api/registrations",
            json!({ "eventId": event["id"] }),
            &participant.token,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_register_twice_conflicts() {
    let pool = create_test_pool().await;
    run_migrations(&pool).await;
    let app = create_test_app(pool.clone());

    let organizer = create_organizer(&pool, &app).await;
    let participant = signup_participant(&app).await;
    let event_id = published_event(&app, &organizer, "Once Only").await;

    register_for_event(&app, &participant, &event_id).await;

    let response = app
        .clone()
        .oneshot(json_request_auth(
            Method::POST,
            "/api/registrations",
            json!({ "eventId": event_id }),
            &participant.token,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_registration_limit_enforced() {
    let pool = create_test_pool().await;
    run_migrations(&pool).await;
    let app = create_test_app(pool.clone());

    let organizer = create_organizer(&pool, &app).await;
    let mut payload = event_payload("Tiny Event");
    payload["registrationLimit"] = json!(1);
    let event = create_event(&app, &organizer, payload).await;
    let event_id = event["id"].as_str().unwrap().to_string();
    advance_status(&app, &organizer, &event_id, "published").await;

    let first = signup_participant(&app).await;
    register_for_event(&app, &first, &event_id).await;

    let second = signup_participant(&app).await;
    let response = app
        .clone()
        .oneshot(json_request_auth(
            Method::POST,
            "/api/registrations",
            json!({ "eventId": event_id }),
            &second.token,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_ticket_qr_is_stable_across_fetches() {
    let pool = create_test_pool().await;
    run_migrations(&pool).await;
    let app = create_test_app(pool.clone());

    let organizer = create_organizer(&pool, &app).await;
    let participant = signup_participant(&app).await;
    let event_id = published_event(&app, &organizer, "QR Event").await;
    let registration = register_for_event(&app, &participant, &event_id).await;
    let uri = format!(
        "/api/registrations/{}/ticket",
        registration["id"].as_str().unwrap()
    );

    let response = app
        .clone()
        .oneshot(request_auth(Method::GET, &uri, &participant.token))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let first: Value = parse_body(response).await;
    let qr = first["qrCode"].as_str().unwrap();
    assert!(qr.starts_with("data:image/svg+xml;base64,"));

    let response = app
        .clone()
        .oneshot(request_auth(Method::GET, &uri, &participant.token))
        .await
        .unwrap();
    let second: Value = parse_body(response).await;

    assert_eq!(first["qrCode"], second["qrCode"]);
}

#[tokio::test]
async fn test_ticket_of_another_participant_forbidden() {
    let pool = create_test_pool().await;
    run_migrations(&pool).await;
    let app = create_test_app(pool.clone());

    let organizer = create_organizer(&pool, &app).await;
    let owner = signup_participant(&app).await;
    let intruder = signup_participant(&app).await;
    let event_id = published_event(&app, &organizer, "Private Ticket").await;
    let registration = register_for_event(&app, &owner, &event_id).await;

    let response = app
        .clone()
        .oneshot(request_auth(
            Method::GET,
            &format!(
                "/api/registrations/{}/ticket",
                registration["id"].as_str().unwrap()
            ),
            &intruder.token,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_csv_row_count_matches_registrations() {
    let pool = create_test_pool().await;
    run_migrations(&pool).await;
    let app = create_test_app(pool.clone());

    let organizer = create_organizer(&pool, &app).await;
    let event_id = published_event(&app, &organizer, "CSV Event").await;

    for _ in 0..3 {
        let participant = signup_participant(&app).await;
        register_for_event(&app, &participant, &event_id).await;
    }

    let response = app
        .clone()
        .oneshot(request_auth(
            Method::GET,
            &format!("/api/registrations/event/{}/csv", event_id),
            &organizer.token,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get(header::CONTENT_TYPE).unwrap(),
        "text/csv; charset=utf-8"
    );
    assert!(response
        .headers()
        .get(header::CONTENT_DISPOSITION)
        .and_then(|v| v.to_str().ok())
        .unwrap()
        .starts_with("attachment"));

    let csv = body_string(response).await;
    let data_rows = csv.trim_end().lines().count() - 1;
    assert_eq!(data_rows, 3);
}

#[tokio::test]
async fn test_csv_export_requires_ownership() {
    let pool = create_test_pool().await;
    run_migrations(&pool).await;
    let app = create_test_app(pool.clone());

    let organizer = create_organizer(&pool, &app).await;
    let other = create_organizer(&pool, &app).await;
    let event_id = published_event(&app, &organizer, "Someone Else's CSV").await;

    let response = app
        .clone()
        .oneshot(request_auth(
            Method::GET,
            &format!("/api/registrations/event/{}/csv", event_id),
            &other.token,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_verify_qr_marks_attendance() {
    let pool = create_test_pool().await;
    run_migrations(&pool).await;
    let app = create_test_app(pool.clone());

    let organizer = create_organizer(&pool, &app).await;
    let participant = signup_participant(&app).await;
    let event_id = published_event(&app, &organizer, "Scanned Event").await;
    let registration = register_for_event(&app, &participant, &event_id).await;
    let ticket_code = registration["ticketCode"].as_str().unwrap();

    let response = app
        .clone()
        .oneshot(json_request_auth(
            Method::POST,
            "/api/registrations/verify-qr",
            json!({ "ticketCode": ticket_code }),
            &organizer.token,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let first: Value = parse_body(response).await;
    assert_eq!(first["alreadyCheckedIn"], false);

    // Second scan reports the earlier check-in
    let response = app
        .clone()
        .oneshot(json_request_auth(
            Method::POST,
            "/api/registrations/verify-qr",
            json!({ "ticketCode": ticket_code }),
            &organizer.token,
        ))
        .await
        .unwrap();
    let second: Value = parse_body(response).await;
    assert_eq!(second["alreadyCheckedIn"], true);
}

#[tokio::test]
async fn test_verify_qr_unknown_ticket_not_found() {
    let pool = create_test_pool().await;
    run_migrations(&pool).await;
    let app = create_test_app(pool.clone());

    let organizer = create_organizer(&pool, &app).await;

    let response = app
        .clone()
        .oneshot(json_request_auth(
            Method::POST,
            "/api/registrations/verify-qr",
            json!({ "ticketCode": "TKT-DOESNOTEXIST" }),
            &organizer.token,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_verify_qr_foreign_event_forbidden() {
    let pool = create_test_pool().await;
    run_migrations(&pool).await;
    let app = create_test_app(pool.clone());

    let organizer = create_organizer(&pool, &app).await;
    let other = create_organizer(&pool, &app).await;
    let participant = signup_participant(&app).await;
    let event_id = published_event(&app, &organizer, "Wrong Scanner").await;
    let registration = register_for_event(&app, &participant, &event_id).await;

    let response = app
        .clone()
        .oneshot(json_request_auth(
            Method::POST,
            "/api/registrations/verify-qr",
            json!({ "ticketCode": registration["ticketCode"] }),
            &other.token,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}
