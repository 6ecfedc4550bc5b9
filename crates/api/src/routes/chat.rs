//! Team chat history routes.
//!
//! History is newest-first with an opaque cursor over `(sent_at, id)`, so
//! pages stay stable while new messages arrive.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::Participant;
use persistence::entities::ChatMessageWithSenderEntity;
use persistence::repositories::{ChatRepository, TeamRepository};
use shared::pagination::{decode_cursor, encode_cursor};

const DEFAULT_PAGE_SIZE: i64 = 50;
const MAX_PAGE_SIZE: i64 = 100;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryQuery {
    pub cursor: Option<String>,
    pub limit: Option<i64>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessageResponse {
    pub id: i64,
    pub sender_id: Uuid,
    pub sender_name: String,
    pub body: String,
    pub sent_at: DateTime<Utc>,
}

impl From<ChatMessageWithSenderEntity> for ChatMessageResponse {
    fn from(m: ChatMessageWithSenderEntity) -> Self {
        let sender_name = match (&m.sender_first_name, &m.sender_last_name) {
            (Some(first), Some(last)) => format!("{} {}", first, last),
            (Some(first), None) => first.clone(),
            (None, Some(last)) => last.clone(),
            (None, None) => String::new(),
        };
        Self {
            id: m.id,
            sender_id: m.sender_id,
            sender_name,
            body: m.body,
            sent_at: m.sent_at,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryResponse {
    pub messages: Vec<ChatMessageResponse>,
    /// Cursor for the next (older) page; absent on the last page.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_cursor: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct PostMessageRequest {
    #[validate(length(min = 1, max = 2000, message = "Message must be 1-2000 characters"))]
    pub body: String,
}

async fn ensure_member(state: &AppState, team_id: Uuid, user_id: Uuid) -> Result<(), ApiError> {
    let teams = TeamRepository::new(state.pool.clone());
    if teams.find_by_id(team_id).await?.is_none() {
        return Err(ApiError::NotFound("Team not found".to_string()));
    }
    if !teams.is_member(team_id, user_id).await? {
        return Err(ApiError::Forbidden(
            "Only team members can use team chat".to_string(),
        ));
    }
    Ok(())
}

/// GET /api/chat/teams/:team_id/messages
pub async fn list_messages(
    State(state): State<AppState>,
    Participant(session): Participant,
    Path(team_id): Path<Uuid>,
    Query(query): Query<HistoryQuery>,
) -> Result<Json<HistoryResponse>, ApiError> {
    ensure_member(&state, team_id, session.user_id).await?;

    let limit = query
        .limit
        .unwrap_or(DEFAULT_PAGE_SIZE)
        .clamp(1, MAX_PAGE_SIZE);

    let before = match &query.cursor {
        None => None,
        Some(cursor) => Some(
            decode_cursor(cursor)
                .map_err(|_| ApiError::Validation("Invalid cursor".to_string()))?,
        ),
    };

    let repo = ChatRepository::new(state.pool.clone());
    // One extra row tells us whether another page exists.
    let mut rows = repo.list_page(team_id, before, limit + 1).await?;

    let next_cursor = if rows.len() as i64 > limit {
        rows.truncate(limit as usize);
        rows.last().map(|m| encode_cursor(m.sent_at, m.id))
    } else {
        None
    };

    Ok(Json(HistoryResponse {
        messages: rows.into_iter().map(Into::into).collect(),
        next_cursor,
    }))
}

/// POST /api/chat/teams/:team_id/messages
pub async fn post_message(
    State(state): State<AppState>,
    Participant(session): Participant,
    Path(team_id): Path<Uuid>,
    Json(request): Json<PostMessageRequest>,
) -> Result<(StatusCode, Json<ChatMessageResponse>), ApiError> {
    request.validate()?;
    ensure_member(&state, team_id, session.user_id).await?;

    let repo = ChatRepository::new(state.pool.clone());
    let message = repo.insert(team_id, session.user_id, &request.body).await?;

    let with_sender = repo
        .find_with_sender(message.id)
        .await?
        .ok_or_else(|| ApiError::Internal("Message vanished after insert".to_string()))?;

    Ok((StatusCode::CREATED, Json(with_sender.into())))
}
