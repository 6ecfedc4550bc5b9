//! Session authentication extractors.
//!
//! The session token is a signed JWT carried in an httpOnly cookie; an
//! `Authorization: Bearer` header is accepted as a fallback for non-browser
//! clients. Role-specific wrappers reject with 403 so route signatures state
//! who may call them.

use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use uuid::Uuid;

use crate::app::AppState;
use crate::error::ApiError;
use domain::models::UserRole;

/// Authenticated session extracted from the cookie or bearer token.
#[derive(Debug, Clone)]
pub struct Session {
    /// Account id from the token subject claim.
    pub user_id: Uuid,
    /// Account role embedded in the token.
    pub role: UserRole,
}

#[async_trait]
impl FromRequestParts<AppState> for Session {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let cookie_token = state.cookies.extract_session_token(&parts.headers);

        let bearer_token = parts
            .headers
            .get("Authorization")
            .and_then(|v| v.to_str().ok())
            .and_then(|h| h.strip_prefix("Bearer "));

        let token = cookie_token
            .or(bearer_token)
            .ok_or_else(|| ApiError::Unauthorized("Not signed in".to_string()))?;

        let claims = state
            .tokens
            .validate_session_token(token)
            .map_err(|_| ApiError::Unauthorized("Invalid or expired session".to_string()))?;

        let user_id = Uuid::parse_str(&claims.sub)
            .map_err(|_| ApiError::Unauthorized("Invalid session".to_string()))?;

        let role = UserRole::parse(&claims.role)
            .ok_or_else(|| ApiError::Unauthorized("Invalid session".to_string()))?;

        Ok(Session { user_id, role })
    }
}

/// Session restricted to participant accounts.
#[derive(Debug, Clone)]
pub struct Participant(pub Session);

#[async_trait]
impl FromRequestParts<AppState> for Participant {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let session = Session::from_request_parts(parts, state).await?;
        if session.role != UserRole::Participant {
            return Err(ApiError::Forbidden(
                "Participant account required".to_string(),
            ));
        }
        Ok(Participant(session))
    }
}

/// Session restricted to organizer accounts.
#[derive(Debug, Clone)]
pub struct Organizer(pub Session);

#[async_trait]
impl FromRequestParts<AppState> for Organizer {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let session = Session::from_request_parts(parts, state).await?;
        if session.role != UserRole::Organizer {
            return Err(ApiError::Forbidden(
                "Organizer account required".to_string(),
            ));
        }
        Ok(Organizer(session))
    }
}

/// Session restricted to admin accounts.
#[derive(Debug, Clone)]
pub struct Admin(pub Session);

#[async_trait]
impl FromRequestParts<AppState> for Admin {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let session = Session::from_request_parts(parts, state).await?;
        if session.role != UserRole::Admin {
            return Err(ApiError::Forbidden("Admin account required".to_string()));
        }
        Ok(Admin(session))
    }
}
