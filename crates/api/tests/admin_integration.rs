//! Integration tests for the admin surface.

mod common;

use axum::http::{Method, StatusCode};
use common::*;
use serde_json::{json, Value};
use tower::ServiceExt;

#[tokio::test]
async fn test_admin_routes_reject_other_roles() {
    let pool = create_test_pool().await;
    run_migrations(&pool).await;
    let app = create_test_app(pool.clone());

    let participant = signup_participant(&app).await;
    let response = app
        .clone()
        .oneshot(request_auth(
            Method::GET,
            "/api/admin/organizers",
            &participant.token,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let organizer = create_organizer(&pool, &app).await;
    let response = app
        .clone()
        .oneshot(request_auth(Method::GET, "/api/admin/stats", &organizer.token))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_created_organizer_can_sign_in_with_initial_password() {
    let pool = create_test_pool().await;
    run_migrations(&pool).await;
    let app = create_test_app(pool.clone());

    // create_organizer logs in with the returned initial password.
    let organizer = create_organizer(&pool, &app).await;

    let response = app
        .clone()
        .oneshot(request_auth(Method::GET, "/api/organizers/me", &organizer.token))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let profile: Value = parse_body(response).await;
    assert_eq!(profile["organizationName"], "Rust Club");
}

#[tokio::test]
async fn test_create_organizer_duplicate_email_conflicts() {
    let pool = create_test_pool().await;
    run_migrations(&pool).await;
    let app = create_test_app(pool.clone());

    let admin = create_admin(&pool, &app).await;
    let organizer = create_organizer(&pool, &app).await;

    let response = app
        .clone()
        .oneshot(json_request_auth(
            Method::POST,
            "/api/admin/organizers",
            json!({ "email": organizer.email, "organizationName": "Copy Club" }),
            &admin.token,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_deactivated_organizer_cannot_sign_in() {
    let pool = create_test_pool().await;
    run_migrations(&pool).await;
    let app = create_test_app(pool.clone());

    let admin = create_admin(&pool, &app).await;
    let organizer = create_organizer(&pool, &app).await;

    let response = app
        .clone()
        .oneshot(json_request_auth(
            Method::PATCH,
            &format!("/api/admin/organizers/{}", organizer.id),
            json!({ "isActive": false }),
            &admin.token,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .clone()
        .oneshot(json_request(
            Method::POST,
            "/api/auth/login",
            json!({ "email": organizer.email, "password": organizer.password }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    // Reactivation restores access
    let response = app
        .clone()
        .oneshot(json_request_auth(
            Method::PATCH,
            &format!("/api/admin/organizers/{}", organizer.id),
            json!({ "isActive": true }),
            &admin.token,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    login(&app, &organizer.email, &organizer.password).await;
}

#[tokio::test]
async fn test_deactivate_participant_id_not_found() {
    let pool = create_test_pool().await;
    run_migrations(&pool).await;
    let app = create_test_app(pool.clone());

    let admin = create_admin(&pool, &app).await;
    let participant = signup_participant(&app).await;

    let response = app
        .clone()
        .oneshot(json_request_auth(
            Method::PATCH,
            &format!("/api/admin/organizers/{}", participant.id),
            json!({ "isActive": false }),
            &admin.token,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_password_reset_approval_applies_new_password() {
    let pool = create_test_pool().await;
    run_migrations(&pool).await;
    let app = create_test_app(pool.clone());

    let admin = create_admin(&pool, &app).await;
    let participant = signup_participant(&app).await;
    let new_password = "Fresh3rSecret";

    let response = app
        .clone()
        .oneshot(json_request(
            Method::POST,
            "/api/auth/password-reset",
            json!({ "email": participant.email, "newPassword": new_password }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::ACCEPTED);

    // The request shows up in the pending list
    let response = app
        .clone()
        .oneshot(request_auth(
            Method::GET,
            "/api/admin/password-resets",
            &admin.token,
        ))
        .await
        .unwrap();
    let pending: Value = parse_body(response).await;
    let request = pending
        .as_array()
        .unwrap()
        .iter()
        .find(|r| r["userEmail"] == participant.email)
        .expect("reset request not listed");

    let response = app
        .clone()
        .oneshot(json_request_auth(
            Method::POST,
            &format!(
                "/api/admin/password-resets/{}/approve",
                request["id"].as_str().unwrap()
            ),
            json!({}),
            &admin.token,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    // New password works, old one does not.
    login(&app, &participant.email, new_password).await;
    let response = app
        .clone()
        .oneshot(json_request(
            Method::POST,
            "/api/auth/login",
            json!({ "email": participant.email, "password": participant.password }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_password_reset_rejection_keeps_old_password() {
    let pool = create_test_pool().await;
    run_migrations(&pool).await;
    let app = create_test_app(pool.clone());

    let admin = create_admin(&pool, &app).await;
    let participant = signup_participant(&app).await;

    let response = app
        .clone()
        .oneshot(json_request(
            Method::POST,
            "/api/auth/password-reset",
            json!({ "email": participant.email, "newPassword": "Den1edSecret" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::ACCEPTED);

    let response = app
        .clone()
        .oneshot(request_auth(
            Method::GET,
            "/api/admin/password-resets",
            &admin.token,
        ))
        .await
        .unwrap();
    let pending: Value = parse_body(response).await;
    let request = pending
        .as_array()
        .unwrap()
        .iter()
        .find(|r| r["userEmail"] == participant.email)
        .expect("reset request not listed");
    let request_id = request["id"].as_str().unwrap();

    let response = app
        .clone()
        .oneshot(json_request_auth(
            Method::POST,
            &format!("/api/admin/password-resets/{}/reject", request_id),
            json!({}),
            &admin.token,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    // Old password still works; resolving twice is a 404.
    login(&app, &participant.email, &participant.password).await;
    let response = app
        .clone()
        .oneshot(json_request_auth(
            Method::POST,
            &format!("/api/admin/password-resets/{}/approve", request_id),
            json!({}),
            &admin.token,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_stats_reflect_created_data() {
    let pool = create_test_pool().await;
    run_migrations(&pool).await;
    let app = create_test_app(pool.clone());

    let admin = create_admin(&pool, &app).await;
    let organizer = create_organizer(&pool, &app).await;
    let participant = signup_participant(&app).await;

    let event = create_event(&app, &organizer, event_payload("Counted Event")).await;
    let event_id = event["id"].as_str().unwrap().to_string();
    advance_status(&app, &organizer, &event_id, "published").await;
    register_for_event(&app, &participant, &event_id).await;

    let response = app
        .clone()
        .oneshot(request_auth(Method::GET, "/api/admin/stats", &admin.token))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let stats: Value = parse_body(response).await;
    assert!(stats["participants"].as_i64().unwrap() >= 1);
    assert!(stats["organizers"].as_i64().unwrap() >= 1);
    assert!(stats["events"].as_i64().unwrap() >= 1);
    assert!(stats["registrations"].as_i64().unwrap() >= 1);
}
