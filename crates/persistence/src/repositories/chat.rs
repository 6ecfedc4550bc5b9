//! Chat message repository for database operations.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::entities::{ChatMessageEntity, ChatMessageWithSenderEntity};
use crate::metrics::QueryTimer;

/// Repository for team chat history.
#[derive(Clone)]
pub struct ChatRepository {
    pool: PgPool,
}

impl ChatRepository {
    /// Creates a new ChatRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Append a message to a team's history.
    pub async fn insert(
        &self,
        team_id: Uuid,
        sender_id: Uuid,
        body: &str,
    ) -> Result<ChatMessageEntity, sqlx::Error> {
        let timer = QueryTimer::new("insert_chat_message");
        let result = sqlx::query_as::<_, ChatMessageEntity>(
            r#"
            INSERT INTO chat_messages (team_id, sender_id, body)
            VALUES ($1, $2, $3)
            RETURNING id, team_id, sender_id, body, sent_at
            "#,
        )
        .bind(team_id)
        .bind(sender_id)
        .bind(body)
        .fetch_one(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Fetch one message with its sender's profile.
    pub async fn find_with_sender(
        &self,
        id: i64,
    ) -> Result<Option<ChatMessageWithSenderEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_chat_message");
        let result = sqlx::query_as::<_, ChatMessageWithSenderEntity>(
            r#"
            SELECT m.id, m.team_id, m.sender_id, m.body, m.sent_at,
                   u.first_name AS sender_first_name, u.last_name AS sender_last_name
            FROM chat_messages m
            JOIN users u ON m.sender_id = u.id
            WHERE m.id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// List a page of a team's history, newest first.
    ///
    /// The composite `(sent_at, id)` comparison keeps pagination stable when
    /// several messages share a timestamp.
    pub async fn list_page(
        &self,
        team_id: Uuid,
        before: Option<(DateTime<Utc>, i64)>,
        limit: i64,
    ) -> Result<Vec<ChatMessageWithSenderEntity>, sqlx::Error> {
        let timer = QueryTimer::new("list_chat_messages");
        let (before_ts, before_id) = match before {
            Some((ts, id)) => (Some(ts), Some(id)),
            None => (None, None),
        };
        let result = sqlx::query_as::<_, ChatMessageWithSenderEntity>(
            r#"
            SELECT m.id, m.team_id, m.sender_id, m.body, m.sent_at,
                   u.first_name AS sender_first_name, u.last_name AS sender_last_name
            FROM chat_messages m
            JOIN users u ON m.sender_id = u.id
            WHERE m.team_id = $1
              AND ($2::timestamptz IS NULL OR (m.sent_at, m.id) < ($2, $3))
            ORDER BY m.sent_at DESC, m.id DESC
            LIMIT $4
            "#,
        )
        .bind(team_id)
        .bind(before_ts)
        .bind(before_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result
    }
}
