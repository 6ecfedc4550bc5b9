//! Chat message entities (database row mappings).

use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

/// Database row mapping for the chat_messages table.
#[derive(Debug, Clone, FromRow)]
pub struct ChatMessageEntity {
    pub id: i64,
    pub team_id: Uuid,
    pub sender_id: Uuid,
    pub body: String,
    pub sent_at: DateTime<Utc>,
}

/// Chat message joined with sender profile, for history listings.
#[derive(Debug, Clone, FromRow)]
pub struct ChatMessageWithSenderEntity {
    pub id: i64,
    pub team_id: Uuid,
    pub sender_id: Uuid,
    pub body: String,
    pub sent_at: DateTime<Utc>,
    pub sender_first_name: Option<String>,
    pub sender_last_name: Option<String>,
}
