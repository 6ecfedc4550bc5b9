//! Team entities (database row mappings).

use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

/// Database row mapping for the teams table.
#[derive(Debug, Clone, FromRow)]
pub struct TeamEntity {
    pub id: Uuid,
    pub event_id: Uuid,
    pub name: String,
    pub leader_id: Uuid,
    pub invite_code: String,
    pub created_at: DateTime<Utc>,
}

/// Team row with event info and member count, for team views.
#[derive(Debug, Clone, FromRow)]
pub struct TeamWithEventEntity {
    pub id: Uuid,
    pub event_id: Uuid,
    pub name: String,
    pub leader_id: Uuid,
    pub invite_code: String,
    pub created_at: DateTime<Utc>,
    pub event_name: String,
    pub max_team_size: Option<i32>,
    pub member_count: i64,
}

/// Team member joined with account profile, for member listings.
#[derive(Debug, Clone, FromRow)]
pub struct TeamMemberWithUserEntity {
    pub user_id: Uuid,
    pub email: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub joined_at: DateTime<Utc>,
}
