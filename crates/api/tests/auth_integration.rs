//! Integration tests for the auth endpoints.
//!
//! Requires PostgreSQL; set TEST_DATABASE_URL or use the default local
//! test database.

mod common;

use axum::http::{header, Method, StatusCode};
use common::*;
use serde_json::{json, Value};
use tower::ServiceExt;

#[tokio::test]
async fn test_signup_sets_session_and_returns_account() {
    let pool = create_test_pool().await;
    run_migrations(&pool).await;
    let app = create_test_app(pool.clone());

    let email = unique_email("signup");
    let response = app
        .clone()
        .oneshot(json_request(
            Method::POST,
            "/api/auth/signup",
            json!({
                "email": email,
                "password": TEST_PASSWORD,
                "firstName": "Ada",
                "lastName": "Lovelace",
            }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CREATED);
    let cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .and_then(|v| v.to_str().ok())
        .unwrap()
        .to_string();
    assert!(cookie.starts_with("eventhub_session="));
    assert!(cookie.contains("HttpOnly"));

    let body: Value = parse_body(response).await;
    assert_eq!(body["email"], email);
    assert_eq!(body["role"], "participant");
    assert_eq!(body["firstName"], "Ada");
}

#[tokio::test]
async fn test_signup_duplicate_email_conflicts() {
    let pool = create_test_pool().await;
    run_migrations(&pool).await;
    let app = create_test_app(pool.clone());

    let account = signup_participant(&app).await;

    let response = app
        .clone()
        .oneshot(json_request(
            Method::POST,
            "/api/auth/signup",
            json!({
                "email": account.email,
                "password": TEST_PASSWORD,
                "firstName": "Ada",
                "lastName": "Lovelace",
            }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_signup_rejects_weak_password() {
    let pool = create_test_pool().await;
    run_migrations(&pool).await;
    let app = create_test_app(pool.clone());

    for password in ["short1A", "alllowercase1", "NODIGITSORLOWER"] {
        let response = app
            .clone()
            .oneshot(json_request(
                Method::POST,
                "/api/auth/signup",
                json!({
                    "email": unique_email("weak"),
                    "password": password,
                    "firstName": "Ada",
                    "lastName": "Lovelace",
                }),
            ))
            .await
            .unwrap();
        assert_eq!(
            response.status(),
            StatusCode::BAD_REQUEST,
            "password {:?} accepted",
            password
        );
    }
}

#[tokio::test]
async fn test_login_wrong_password_unauthorized() {
    let pool = create_test_pool().await;
    run_migrations(&pool).await;
    let app = create_test_app(pool.clone());

    let account = signup_participant(&app).await;

    let response = app
        .clone()
        .oneshot(json_request(
            Method::POST,
            "/api/auth/login",
            json!({ "email": account.email, "password": "WrongPassw0rd" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_login_unknown_email_unauthorized() {
    let pool = create_test_pool().await;
    run_migrations(&pool).await;
    let app = create_test_app(pool.clone());

    let response = app
        .clone()
        .oneshot(json_request(
            Method::POST,
            "/api/auth/login",
            json!({ "email": unique_email("ghost"), "password": TEST_PASSWORD }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_me_returns_current_account() {
    let pool = create_test_pool().await;
    run_migrations(&pool).await;
    let app = create_test_app(pool.clone());

    let account = signup_participant(&app).await;
    let token = login(&app, &account.email, &account.password).await;

    let response = app
        .clone()
        .oneshot(request_auth(Method::GET, "/api/auth/me", &token))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body: Value = parse_body(response).await;
    assert_eq!(body["id"], account.id.to_string());
    assert_eq!(body["email"], account.email);
}

#[tokio::test]
async fn test_me_without_session_unauthorized() {
    let pool = create_test_pool().await;
    run_migrations(&pool).await;
    let app = create_test_app(pool.clone());

    let response = app
        .clone()
        .oneshot(
            axum::http::Request::builder()
                .method(Method::GET)
                .uri("/api/auth/me")
                .body(axum::body::Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_bearer_token_accepted_as_fallback() {
    let pool = create_test_pool().await;
    run_migrations(&pool).await;
    let app = create_test_app(pool.clone());

    let account = signup_participant(&app).await;

    let response = app
        .clone()
        .oneshot(
            axum::http::Request::builder()
                .method(Method::GET)
                .uri("/api/auth/me")
                .header("Authorization", format!("Bearer {}", account.token))
                .body(axum::body::Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_logout_clears_cookie() {
    let pool = create_test_pool().await;
    run_migrations(&pool).await;
    let app = create_test_app(pool.clone());

    let response = app
        .clone()
        .oneshot(json_request(Method::POST, "/api/auth/logout", json!({})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .and_then(|v| v.to_str().ok())
        .unwrap();
    assert!(cookie.contains("Max-Age=0"));
}

#[tokio::test]
async fn test_participant_updates_profile() {
    let pool = create_test_pool().await;
    run_migrations(&pool).await;
    let app = create_test_app(pool.clone());

    let account = signup_participant(&app).await;

    let response = app
        .clone()
        .oneshot(json_request_auth(
            Method::PUT,
            "/api/participants/me",
            json!({ "college": "Analytical Engine U", "onboarded": true }),
            &account.token,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body: Value = parse_body(response).await;
    assert_eq!(body["college"], "Analytical Engine U");
    assert_eq!(body["onboarded"], true);
    // Untouched fields keep their values
    assert_eq!(body["firstName"], "Ada");
}

#[tokio::test]
async fn test_organizer_profile_rejects_participant_session() {
    let pool = create_test_pool().await;
    run_migrations(&pool).await;
    let app = create_test_app(pool.clone());

    let account = signup_participant(&app).await;
    let response = app
        .clone()
        .oneshot(request_auth(
            Method::GET,
            "/api/organizers/me",
            &account.token,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_password_reset_request_is_always_accepted() {
    let pool = create_test_pool().await;
    run_migrations(&pool).await;
    let app = create_test_app(pool.clone());

    let account = signup_participant(&app).await;

    // Existing account
    let response = app
        .clone()
        .oneshot(json_request(
            Method::POST,
            "/api/auth/password-reset",
            json!({ "email": account.email, "newPassword": "NewPassw0rd" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::ACCEPTED);

    // Unknown account gets the same answer
    let response = app
        .clone()
        .oneshot(json_request(
            Method::POST,
            "/api/auth/password-reset",
            json!({ "email": unique_email("ghost"), "newPassword": "NewPassw0rd" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::ACCEPTED);
}
