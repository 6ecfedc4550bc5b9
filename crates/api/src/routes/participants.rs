//! Participant profile routes.

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::Participant;
use crate::routes::registrations::RegistrationSummary;
use persistence::entities::UserEntity;
use persistence::repositories::{ParticipantProfilePatch, RegistrationRepository, UserRepository};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParticipantProfileResponse {
    pub id: Uuid,
    pub email: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub college: Option<String>,
    pub contact_number: Option<String>,
    pub onboarded: bool,
}

impl From<UserEntity> for ParticipantProfileResponse {
    fn from(user: UserEntity) -> Self {
        Self {
            id: user.id,
            email: user.email,
            first_name: user.first_name,
            last_name: user.last_name,
            college: user.college,
            contact_number: user.contact_number,
            onboarded: user.onboarded,
        }
    }
}

/// Profile update; absent fields keep their current value.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfileRequest {
    #[validate(length(min = 1, max = 100, message = "First name must be 1-100 characters"))]
    pub first_name: Option<String>,

    #[validate(length(min = 1, max = 100, message = "Last name must be 1-100 characters"))]
    pub last_name: Option<String>,

    #[validate(length(max = 200, message = "College must be at most 200 characters"))]
    pub college: Option<String>,

    #[validate(length(max = 20, message = "Contact number must be at most 20 characters"))]
    pub contact_number: Option<String>,

    pub onboarded: Option<bool>,
}

/// GET /api/participants/me
pub async fn get_profile(
    State(state): State<AppState>,
    Participant(session): Participant,
) -> Result<Json<ParticipantProfileResponse>, ApiError> {
    let repo = UserRepository::new(state.pool.clone());
    let user = repo
        .find_by_id(session.user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Account not found".to_string()))?;

    Ok(Json(user.into()))
}

/// PUT /api/participants/me
pub async fn update_profile(
    State(state): State<AppState>,
    Participant(session): Participant,
    Json(request): Json<UpdateProfileRequest>,
) -> Result<Json<ParticipantProfileResponse>, ApiError> {
    request.validate()?;

    let patch = ParticipantProfilePatch {
        first_name: request.first_name,
        last_name: request.last_name,
        college: request.college,
        contact_number: request.contact_number,
        onboarded: request.onboarded,
    };

    let repo = UserRepository::new(state.pool.clone());
    let user = repo
        .update_participant_profile(session.user_id, &patch)
        .await?
        .ok_or_else(|| ApiError::NotFound("Account not found".to_string()))?;

    Ok(Json(user.into()))
}

/// GET /api/participants/me/registrations
pub async fn list_registrations(
    State(state): State<AppState>,
    Participant(session): Participant,
) -> Result<Json<Vec<RegistrationSummary>>, ApiError> {
    let repo = RegistrationRepository::new(state.pool.clone());
    let registrations = repo.list_for_participant(session.user_id).await?;

    Ok(Json(
        registrations.into_iter().map(Into::into).collect(),
    ))
}
