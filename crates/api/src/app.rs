use axum::{
    middleware,
    routing::{delete, get, patch, post},
    Router,
};
use sqlx::PgPool;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{compression::CompressionLayer, timeout::TimeoutLayer, trace::TraceLayer};

use crate::config::Config;
use crate::middleware::{
    build_cors_layer, security_headers_middleware, trace_id, RateLimiterState,
};
use crate::routes::{
    admin, auth, chat, events, health, organizers, participants, registrations, teams,
};
use crate::services::{CookieHelper, EmailService};
use shared::token::TokenConfig;

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub config: Arc<Config>,
    pub tokens: Arc<TokenConfig>,
    pub cookies: CookieHelper,
    pub email: EmailService,
    pub rate_limiter: Option<Arc<RateLimiterState>>,
}

pub fn create_app(config: Config, pool: PgPool) -> anyhow::Result<Router> {
    let tokens = TokenConfig::with_leeway(
        &config.auth.private_key,
        &config.auth.public_key,
        config.auth.session_ttl_secs,
        config.auth.leeway_secs,
    )?;

    let cookies = CookieHelper::new(config.auth.cookie.clone(), config.auth.session_ttl_secs);
    let email = EmailService::new(config.email.clone());

    // auth_rate_limit_per_minute = 0 disables limiting (used in tests)
    let rate_limiter = if config.security.auth_rate_limit_per_minute > 0 {
        Some(Arc::new(RateLimiterState::new(
            config.security.auth_rate_limit_per_minute,
        )))
    } else {
        None
    };

    let config = Arc::new(config);
    let cors = build_cors_layer(&config.security);
    let request_timeout = config.server.request_timeout_secs;

    let state = AppState {
        pool,
        config,
        tokens: Arc::new(tokens),
        cookies,
        email,
        rate_limiter,
    };

    let api_routes = Router::new()
        // Health
        .route("/api/health", get(health::health_check))
        .route("/api/health/live", get(health::live))
        .route("/api/health/ready", get(health::ready))
        // Auth
        .route("/api/auth/signup", post(auth::signup))
        .route("/api/auth/login", post(auth::login))
        .route("/api/auth/logout", post(auth::logout))
        .route("/api/auth/me", get(auth::me))
        .route("/api/auth/password-reset", post(auth::request_password_reset))
        // Participant profile
        .route(
            "/api/participants/me",
            get(participants::get_profile).put(participants::update_profile),
        )
        .route(
            "/api/participants/me/registrations",
            get(participants::list_registrations),
        )
        // Organizer profile
        .route(
            "/api/organizers/me",
            get(organizers::get_profile).put(organizers::update_profile),
        )
        .route("/api/organizers/me/events", get(organizers::list_events))
        // Events
        .route("/api/events", get(events::browse).post(events::create))
        .route("/api/events/:event_id", get(events::detail).put(events::update))
        .route("/api/events/:event_id/status", post(events::advance_status))
        .route(
            "/api/events/:event_id/registrations",
            get(events::list_registrations),
        )
        // Registrations & tickets
        .route("/api/registrations", post(registrations::register))
        .route(
            "/api/registrations/:registration_id",
            get(registrations::detail),
        )
        .route(
            "/api/registrations/:registration_id/ticket",
            get(registrations::ticket),
        )
        .route(
            "/api/registrations/event/:event_id/csv",
            get(registrations::export_csv),
        )
        .route("/api/registrations/verify-qr", post(registrations::verify_qr))
        .route(
            "/api/registrations/:registration_id/merchandise",
            post(registrations::purchase_merchandise),
        )
        // Teams
        .route("/api/teams", post(teams::create))
        .route("/api/teams/mine", get(teams::list_mine))
        .route("/api/teams/join", post(teams::join))
        .route("/api/teams/:team_id", get(teams::detail))
        .route(
            "/api/teams/:team_id/members/:user_id",
            delete(teams::remove_member),
        )
        // Team chat history
        .route(
            "/api/chat/teams/:team_id/messages",
            get(chat::list_messages).post(chat::post_message),
        )
        // Admin
        .route(
            "/api/admin/organizers",
            get(admin::list_organizers).post(admin::create_organizer),
        )
        .route("/api/admin/organizers/:organizer_id", patch(admin::set_organizer_active))
        .route("/api/admin/password-resets", get(admin::list_password_resets))
        .route(
            "/api/admin/password-resets/:request_id/approve",
            post(admin::approve_password_reset),
        )
        .route(
            "/api/admin/password-resets/:request_id/reject",
            post(admin::reject_password_reset),
        )
        .route("/api/admin/stats", get(admin::stats));

    // Global middleware (bottom layers run first)
    Ok(api_routes
        .layer(middleware::from_fn(security_headers_middleware))
        .layer(CompressionLayer::new())
        .layer(TimeoutLayer::new(Duration::from_secs(request_timeout)))
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(trace_id))
        .layer(cors)
        .with_state(state))
}
