//! Team routes for team-enabled events.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::info;
use uuid::Uuid;
use validator::Validate;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::Participant;
use domain::models::{CreateTeamRequest, JoinTeamRequest};
use domain::services::ticketing::generate_invite_code;
use persistence::entities::{TeamMemberWithUserEntity, TeamWithEventEntity};
use persistence::repositories::{EventRepository, RegistrationRepository, TeamRepository};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamResponse {
    pub id: Uuid,
    pub event_id: Uuid,
    pub event_name: String,
    pub name: String,
    pub leader_id: Uuid,
    pub invite_code: String,
    pub member_count: i64,
    pub max_team_size: Option<i32>,
    pub created_at: DateTime<Utc>,
}

impl From<TeamWithEventEntity> for TeamResponse {
    fn from(t: TeamWithEventEntity) -> Self {
        Self {
            id: t.id,
            event_id: t.event_id,
            event_name: t.event_name,
            name: t.name,
            leader_id: t.leader_id,
            invite_code: t.invite_code,
            member_count: t.member_count,
            max_team_size: t.max_team_size,
            created_at: t.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamMemberResponse {
    pub user_id: Uuid,
    pub email: String,
    pub name: String,
    pub joined_at: DateTime<Utc>,
}

impl From<TeamMemberWithUserEntity> for TeamMemberResponse {
    fn from(m: TeamMemberWithUserEntity) -> Self {
        let name = match (&m.first_name, &m.last_name) {
            (Some(first), Some(last)) => format!("{} {}", first, last),
            (Some(first), None) => first.clone(),
            (None, Some(last)) => last.clone(),
            (None, None) => String::new(),
        };
        Self {
            user_id: m.user_id,
            email: m.email,
            name,
            joined_at: m.joined_at,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamDetailResponse {
    #[serde(flatten)]
    pub team: TeamResponse,
    pub members: Vec<TeamMemberResponse>,
}

/// Team membership requires a live registration for the team's event.
async fn ensure_registered(
    state: &AppState,
    event_id: Uuid,
    user_id: Uuid,
) -> Result<(), ApiError> {
    let registrations = RegistrationRepository::new(state.pool.clone());
    let registered = registrations
        .find_for_event_and_participant(event_id, user_id)
        .await?
        .map(|r| r.status != persistence::entities::RegistrationStatusDb::Cancelled)
        .unwrap_or(false);

    if registered {
        Ok(())
    } else {
        Err(ApiError::Validation(
            "You must be registered for the event to join a team".to_string(),
        ))
    }
}

/// POST /api/teams
///
/// Participant creates a team for a team-enabled event they are registered
/// for, becoming its leader and first member.
pub async fn create(
    State(state): State<AppState>,
    Participant(session): Participant,
    Json(request): Json<CreateTeamRequest>,
) -> Result<(StatusCode, Json<TeamResponse>), ApiError> {
    request.validate()?;

    let events = EventRepository::new(state.pool.clone());
    let event = events
        .find_by_id(request.event_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Event not found".to_string()))?;

    if !event.team_event {
        return Err(ApiError::Validation(
            "Event does not have teams".to_string(),
        ));
    }

    ensure_registered(&state, event.id, session.user_id).await?;

    let teams = TeamRepository::new(state.pool.clone());
    let invite_code = teams.generate_unique_invite_code(generate_invite_code).await?;
    let team = teams
        .create_with_leader(event.id, &request.name, session.user_id, &invite_code)
        .await?;

    info!(team_id = %team.id, event_id = %event.id, "Team created");

    let created = teams
        .find_by_id(team.id)
        .await?
        .ok_or_else(|| ApiError::Internal("Team vanished after insert".to_string()))?;
    Ok((StatusCode::CREATED, Json(created.into())))
}

/// GET /api/teams/mine
pub async fn list_mine(
    State(state): State<AppState>,
    Participant(session): Participant,
) -> Result<Json<Vec<TeamResponse>>, ApiError> {
    let teams = TeamRepository::new(state.pool.clone());
    let mine = teams.list_for_user(session.user_id).await?;

    Ok(Json(mine.into_iter().map(Into::into).collect()))
}

/// GET /api/teams/:team_id
///
/// Member-only view of a team and its roster.
pub async fn detail(
    State(state): State<AppState>,
    Participant(session): Participant,
    Path(team_id): Path<Uuid>,
) -> Result<Json<TeamDetailResponse>, ApiError> {
    let teams = TeamRepository::new(state.pool.clone());
    let team = teams
        .find_by_id(team_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Team not found".to_string()))?;

    if !teams.is_member(team_id, session.user_id).await? {
        return Err(ApiError::Forbidden(
            "Only team members can view the team".to_string(),
        ));
    }

    let members = teams.members(team_id).await?;
    Ok(Json(TeamDetailResponse {
        team: team.into(),
        members: members.into_iter().map(Into::into).collect(),
    }))
}

/// POST /api/teams/join
///
/// Join a team by invite code, subject to the event's team size cap.
pub async fn join(
    State(state): State<AppState>,
    Participant(session): Participant,
    Json(request): Json<JoinTeamRequest>,
) -> Result<Json<TeamResponse>, ApiError> {
    request.validate()?;

    let teams = TeamRepository::new(state.pool.clone());
    let team = teams
        .find_by_invite_code(&request.invite_code)
        .await?
        .ok_or_else(|| ApiError::NotFound("Invalid invite code".to_string()))?;

    ensure_registered(&state, team.event_id, session.user_id).await?;

    if teams.is_member(team.id, session.user_id).await? {
        return Err(ApiError::Conflict(
            "Already a member of this team".to_string(),
        ));
    }

    // The size cap rides inside the insert statement, so two concurrent
    // joins cannot push the roster past it.
    let added = teams
        .add_member(team.id, session.user_id, team.max_team_size)
        .await?;
    if !added {
        return Err(ApiError::Validation("Team is full".to_string()));
    }

    info!(team_id = %team.id, user_id = %session.user_id, "Joined team");

    let refreshed = teams
        .find_by_id(team.id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Team not found".to_string()))?;
    Ok(Json(refreshed.into()))
}

/// DELETE /api/teams/:team_id/members/:user_id
///
/// The leader removes a member, or a member removes themselves. The leader
/// cannot leave their own team.
pub async fn remove_member(
    State(state): State<AppState>,
    Participant(session): Participant,
    Path((team_id, user_id)): Path<(Uuid, Uuid)>,
) -> Result<StatusCode, ApiError> {
    let teams = TeamRepository::new(state.pool.clone());
    let team = teams
        .find_by_id(team_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Team not found".to_string()))?;

    if user_id == team.leader_id {
        return Err(ApiError::Validation(
            "The leader cannot be removed from the team".to_string(),
        ));
    }

    let leaving_self = session.user_id == user_id;
    if !leaving_self && session.user_id != team.leader_id {
        return Err(ApiError::Forbidden(
            "Only the leader can remove other members".to_string(),
        ));
    }

    let removed = teams.remove_member(team_id, user_id).await?;
    if removed == 0 {
        return Err(ApiError::NotFound(
            "Not a member of this team".to_string(),
        ));
    }

    info!(team_id = %team_id, user_id = %user_id, leaving_self, "Member removed");
    Ok(StatusCode::NO_CONTENT)
}
