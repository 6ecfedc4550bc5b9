//! Admin routes: organizer account management, password-reset approvals,
//! and platform stats.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;
use validator::Validate;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::Admin;
use domain::models::{ResetStatus, UserRole};
use domain::services::ticketing::generate_initial_password;
use persistence::entities::{
    OrganizerWithEventCountEntity, PasswordResetWithUserEntity, UserRoleDb,
};
use persistence::repositories::{
    EventRepository, PasswordResetRepository, RegistrationRepository, UserRepository,
};
use shared::password::hash_password;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrganizerAccountResponse {
    pub id: Uuid,
    pub email: String,
    pub organization_name: Option<String>,
    pub category: Option<String>,
    pub is_active: bool,
    pub event_count: i64,
    pub created_at: DateTime<Utc>,
}

impl From<OrganizerWithEventCountEntity> for OrganizerAccountResponse {
    fn from(o: OrganizerWithEventCountEntity) -> Self {
        Self {
            id: o.id,
            email: o.email,
            organization_name: o.organization_name,
            category: o.category,
            is_active: o.is_active,
            event_count: o.event_count,
            created_at: o.created_at,
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrganizerRequest {
    #[validate(email(message = "Invalid email address"))]
    pub email: String,

    #[validate(length(min = 1, max = 200, message = "Organization name must be 1-200 characters"))]
    pub organization_name: String,

    #[validate(length(max = 100, message = "Category must be at most 100 characters"))]
    pub category: Option<String>,
}

/// Response to organizer creation. The initial password is shown exactly
/// once, here; only its hash is stored.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedOrganizerResponse {
    pub id: Uuid,
    pub email: String,
    pub organization_name: Option<String>,
    pub initial_password: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetActiveRequest {
    pub is_active: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PasswordResetResponse {
    pub id: Uuid,
    pub user_id: Uuid,
    pub user_email: String,
    pub user_role: UserRole,
    pub status: ResetStatus,
    pub requested_at: DateTime<Utc>,
}

impl From<PasswordResetWithUserEntity> for PasswordResetResponse {
    fn from(r: PasswordResetWithUserEntity) -> Self {
        Self {
            id: r.id,
            user_id: r.user_id,
            user_email: r.user_email,
            user_role: r.user_role.into(),
            status: r.status.into(),
            requested_at: r.requested_at,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsResponse {
    pub participants: i64,
    pub organizers: i64,
    pub events: i64,
    pub registrations: i64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageResponse {
    pub message: String,
}

/// GET /api/admin/organizers
pub async fn list_organizers(
    State(state): State<AppState>,
    Admin(_session): Admin,
) -> Result<Json<Vec<OrganizerAccountResponse>>, ApiError> {
    let repo = UserRepository::new(state.pool.clone());
    let organizers = repo.list_organizers().await?;

    Ok(Json(organizers.into_iter().map(Into::into).collect()))
}

/// POST /api/admin/organizers
///
/// Creates an organizer account (a club) with a generated initial password.
pub async fn create_organizer(
    State(state): State<AppState>,
    Admin(session): Admin,
    Json(request): Json<CreateOrganizerRequest>,
) -> Result<(StatusCode, Json<CreatedOrganizerResponse>), ApiError> {
    request.validate()?;

    let repo = UserRepository::new(state.pool.clone());
    if repo.find_by_email(&request.email).await?.is_some() {
        return Err(ApiError::Conflict("Email is already registered".to_string()));
    }

    let initial_password = generate_initial_password();
    let password_hash = hash_password(&initial_password)?;

    let user = repo
        .create_organizer(
            &request.email,
            &password_hash,
            &request.organization_name,
            request.category.as_deref(),
        )
        .await?;

    info!(
        organizer_id = %user.id,
        admin_id = %session.user_id,
        "Organizer account created"
    );

    Ok((
        StatusCode::CREATED,
        Json(CreatedOrganizerResponse {
            id: user.id,
            email: user.email,
            organization_name: user.organization_name,
            initial_password,
        }),
    ))
}

/// PATCH /api/admin/organizers/:organizer_id
///
/// Activate or deactivate an organizer account. Deactivated accounts cannot
/// sign in.
pub async fn set_organizer_active(
    State(state): State<AppState>,
    Admin(session): Admin,
    Path(organizer_id): Path<Uuid>,
    Json(request): Json<SetActiveRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    let repo = UserRepository::new(state.pool.clone());
    let user = repo
        .find_by_id(organizer_id)
        .await?
        .filter(|u| u.role == UserRoleDb::Organizer)
        .ok_or_else(|| ApiError::NotFound("Organizer not found".to_string()))?;

    repo.set_active(user.id, request.is_active).await?;

    info!(
        organizer_id = %user.id,
        admin_id = %session.user_id,
        is_active = request.is_active,
        "Organizer active flag changed"
    );

    Ok(Json(MessageResponse {
        message: if request.is_active {
            "Organizer activated".to_string()
        } else {
            "Organizer deactivated".to_string()
        },
    }))
}

/// GET /api/admin/password-resets
pub async fn list_password_resets(
    State(state): State<AppState>,
    Admin(_session): Admin,
) -> Result<Json<Vec<PasswordResetResponse>>, ApiError> {
    let repo = PasswordResetRepository::new(state.pool.clone());
    let pending = repo.list_pending().await?;

    Ok(Json(pending.into_iter().map(Into::into).collect()))
}

/// POST /api/admin/password-resets/:request_id/approve
///
/// Applies the stored hash to the account and resolves the request.
pub async fn approve_password_reset(
    State(state): State<AppState>,
    Admin(session): Admin,
    Path(request_id): Path<Uuid>,
) -> Result<Json<MessageResponse>, ApiError> {
    let repo = PasswordResetRepository::new(state.pool.clone());
    let approved = repo.approve(request_id, session.user_id).await?;

    if !approved {
        return Err(ApiError::NotFound(
            "No pending reset request with that id".to_string(),
        ));
    }

    info!(request_id = %request_id, admin_id = %session.user_id, "Password reset approved");
    Ok(Json(MessageResponse {
        message: "Password reset approved".to_string(),
    }))
}

/// POST /api/admin/password-resets/:request_id/reject
pub async fn reject_password_reset(
    State(state): State<AppState>,
    Admin(session): Admin,
    Path(request_id): Path<Uuid>,
) -> Result<Json<MessageResponse>, ApiError> {
    let repo = PasswordResetRepository::new(state.pool.clone());
    let rejected = repo.reject(request_id, session.user_id).await?;

    if !rejected {
        return Err(ApiError::NotFound(
            "No pending reset request with that id".to_string(),
        ));
    }

    info!(request_id = %request_id, admin_id = %session.user_id, "Password reset rejected");
    Ok(Json(MessageResponse {
        message: "Password reset rejected".to_string(),
    }))
}

/// GET /api/admin/stats
pub async fn stats(
    State(state): State<AppState>,
    Admin(_session): Admin,
) -> Result<Json<StatsResponse>, ApiError> {
    let users = UserRepository::new(state.pool.clone());
    let events = EventRepository::new(state.pool.clone());
    let registrations = RegistrationRepository::new(state.pool.clone());

    Ok(Json(StatsResponse {
        participants: users.count_by_role(UserRoleDb::Participant).await?,
        organizers: users.count_by_role(UserRoleDb::Organizer).await?,
        events: events.count_all().await?,
        registrations: registrations.count_all().await?,
    }))
}
