//! Authentication routes: signup, login, logout, session introspection, and
//! password-reset requests.

use axum::{extract::State, http::HeaderMap, http::StatusCode, Json};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;
use validator::Validate;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::Session;
use domain::models::UserRole;
use persistence::entities::UserEntity;
use persistence::repositories::{PasswordResetRepository, UserRepository};
use shared::password::{hash_password, verify_password};

/// Participant self-registration request.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SignupRequest {
    #[validate(email(message = "Invalid email address"))]
    pub email: String,

    #[validate(custom(function = "shared::validation::validate_password_strength"))]
    pub password: String,

    #[validate(length(min = 1, max = 100, message = "First name must be 1-100 characters"))]
    pub first_name: String,

    #[validate(length(min = 1, max = 100, message = "Last name must be 1-100 characters"))]
    pub last_name: String,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    #[validate(email(message = "Invalid email address"))]
    pub email: String,

    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// Password reset filed for admin approval. Carries the desired new
/// password; it is applied only when an admin approves the request.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct PasswordResetRequest {
    #[validate(email(message = "Invalid email address"))]
    pub email: String,

    #[validate(custom(function = "shared::validation::validate_password_strength"))]
    pub new_password: String,
}

/// Current account, as returned by signup, login, and `/auth/me`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountResponse {
    pub id: Uuid,
    pub email: String,
    pub role: UserRole,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub organization_name: Option<String>,
    pub onboarded: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageResponse {
    pub message: String,
}

impl From<UserEntity> for AccountResponse {
    fn from(user: UserEntity) -> Self {
        Self {
            id: user.id,
            email: user.email,
            role: user.role.into(),
            first_name: user.first_name,
            last_name: user.last_name,
            organization_name: user.organization_name,
            onboarded: user.onboarded,
        }
    }
}

/// Applies the per-account auth rate limit when configured.
fn check_auth_rate(state: &AppState, key: &str) -> Result<(), ApiError> {
    if let Some(limiter) = &state.rate_limiter {
        limiter.check(key).map_err(|_| ApiError::RateLimited)?;
    }
    Ok(())
}

fn session_headers(state: &AppState, user_id: Uuid, role: UserRole) -> Result<HeaderMap, ApiError> {
    let (token, _jti) = state
        .tokens
        .generate_session_token(user_id, role.as_str())
        .map_err(|e| ApiError::Internal(format!("Failed to issue session: {}", e)))?;

    let mut headers = HeaderMap::new();
    state.cookies.add_session_cookie(&mut headers, &token);
    Ok(headers)
}

/// POST /api/auth/signup
pub async fn signup(
    State(state): State<AppState>,
    Json(request): Json<SignupRequest>,
) -> Result<(StatusCode, HeaderMap, Json<AccountResponse>), ApiError> {
    request.validate()?;
    check_auth_rate(&state, &request.email)?;

    let repo = UserRepository::new(state.pool.clone());

    if repo.find_by_email(&request.email).await?.is_some() {
        return Err(ApiError::Conflict("Email is already registered".to_string()));
    }

    let password_hash = hash_password(&request.password)?;
    let user = repo
        .create_participant(
            &request.email,
            &password_hash,
            &request.first_name,
            &request.last_name,
        )
        .await
        .map_err(|e| match e {
            // The email unique index can still fire under a concurrent signup.
            sqlx::Error::Database(ref db) if db.code().as_deref() == Some("23505") => {
                ApiError::Conflict("Email is already registered".to_string())
            }
            other => other.into(),
        })?;

    info!(user_id = %user.id, "Participant signed up");

    let headers = session_headers(&state, user.id, UserRole::Participant)?;
    Ok((StatusCode::CREATED, headers, Json(user.into())))
}

/// POST /api/auth/login
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<(HeaderMap, Json<AccountResponse>), ApiError> {
    request.validate()?;
    check_auth_rate(&state, &request.email)?;

    let repo = UserRepository::new(state.pool.clone());
    let user = repo
        .find_by_email(&request.email)
        .await?
        .ok_or_else(|| ApiError::Unauthorized("Invalid email or password".to_string()))?;

    if !verify_password(&request.password, &user.password_hash)? {
        return Err(ApiError::Unauthorized(
            "Invalid email or password".to_string(),
        ));
    }

    if !user.is_active {
        return Err(ApiError::Forbidden("Account is deactivated".to_string()));
    }

    let role: UserRole = user.role.into();
    info!(user_id = %user.id, role = %role, "Signed in");

    let headers = session_headers(&state, user.id, role)?;
    Ok((headers, Json(user.into())))
}

/// POST /api/auth/logout
pub async fn logout(State(state): State<AppState>) -> (HeaderMap, Json<MessageResponse>) {
    let mut headers = HeaderMap::new();
    state.cookies.add_clear_cookie(&mut headers);
    (
        headers,
        Json(MessageResponse {
            message: "Signed out".to_string(),
        }),
    )
}

/// GET /api/auth/me
pub async fn me(
    State(state): State<AppState>,
    session: Session,
) -> Result<Json<AccountResponse>, ApiError> {
    let repo = UserRepository::new(state.pool.clone());
    let user = repo
        .find_by_id(session.user_id)
        .await?
        .ok_or_else(|| ApiError::Unauthorized("Account no longer exists".to_string()))?;

    Ok(Json(user.into()))
}

/// POST /api/auth/password-reset
///
/// Responds 202 whether or not the email exists, so the endpoint cannot be
/// used to probe for accounts.
pub async fn request_password_reset(
    State(state): State<AppState>,
    Json(request): Json<PasswordResetRequest>,
) -> Result<(StatusCode, Json<MessageResponse>), ApiError> {
    request.validate()?;
    check_auth_rate(&state, &request.email)?;

    let users = UserRepository::new(state.pool.clone());
    if let Some(user) = users.find_by_email(&request.email).await? {
        let hash = hash_password(&request.new_password)?;
        let resets = PasswordResetRepository::new(state.pool.clone());
        let filed = resets.create(user.id, &hash).await?;
        info!(request_id = %filed.id, user_id = %user.id, "Password reset request filed");
    }

    Ok((
        StatusCode::ACCEPTED,
        Json(MessageResponse {
            message: "If the account exists, the reset request awaits admin approval".to_string(),
        }),
    ))
}
