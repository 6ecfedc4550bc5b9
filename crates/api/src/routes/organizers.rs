//! Organizer profile routes.

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::Organizer;
use crate::routes::events::EventResponse;
use persistence::entities::UserEntity;
use persistence::repositories::{EventRepository, OrganizerProfilePatch, UserRepository};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrganizerProfileResponse {
    pub id: Uuid,
    pub email: String,
    pub organization_name: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub is_active: bool,
}

impl From<UserEntity> for OrganizerProfileResponse {
    fn from(user: UserEntity) -> Self {
        Self {
            id: user.id,
            email: user.email,
            organization_name: user.organization_name,
            description: user.description,
            category: user.category,
            is_active: user.is_active,
        }
    }
}

/// Profile update; absent fields keep their current value.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfileRequest {
    #[validate(length(min = 1, max = 200, message = "Organization name must be 1-200 characters"))]
    pub organization_name: Option<String>,

    #[validate(length(max = 2000, message = "Description must be at most 2000 characters"))]
    pub description: Option<String>,

    #[validate(length(max = 100, message = "Category must be at most 100 characters"))]
    pub category: Option<String>,
}

/// GET /api/organizers/me
pub async fn get_profile(
    State(state): State<AppState>,
    Organizer(session): Organizer,
) -> Result<Json<OrganizerProfileResponse>, ApiError> {
    let repo = UserRepository::new(state.pool.clone());
    let user = repo
        .find_by_id(session.user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Account not found".to_string()))?;

    Ok(Json(user.into()))
}

/// PUT /api/organizers/me
pub async fn update_profile(
    State(state): State<AppState>,
    Organizer(session): Organizer,
    Json(request): Json<UpdateProfileRequest>,
) -> Result<Json<OrganizerProfileResponse>, ApiError> {
    request.validate()?;

    let patch = OrganizerProfilePatch {
        organization_name: request.organization_name,
        description: request.description,
        category: request.category,
    };

    let repo = UserRepository::new(state.pool.clone());
    let user = repo
        .update_organizer_profile(session.user_id, &patch)
        .await?
        .ok_or_else(|| ApiError::NotFound("Account not found".to_string()))?;

    Ok(Json(user.into()))
}

/// GET /api/organizers/me/events
pub async fn list_events(
    State(state): State<AppState>,
    Organizer(session): Organizer,
) -> Result<Json<Vec<EventResponse>>, ApiError> {
    let repo = EventRepository::new(state.pool.clone());
    let events = repo.list_by_organizer(session.user_id).await?;

    Ok(Json(events.into_iter().map(Into::into).collect()))
}
