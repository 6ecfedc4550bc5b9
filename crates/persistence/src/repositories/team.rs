//! Team repository for database operations.

use sqlx::PgPool;
use uuid::Uuid;

use crate::entities::{TeamEntity, TeamMemberWithUserEntity, TeamWithEventEntity};
use crate::metrics::QueryTimer;

const TEAM_WITH_EVENT_QUERY: &str = r#"
    SELECT
        t.id, t.event_id, t.name, t.leader_id, t.invite_code, t.created_at,
        e.name AS event_name, e.max_team_size,
        (SELECT COUNT(*) FROM team_members tm WHERE tm.team_id = t.id) AS member_count
    FROM teams t
    JOIN events e ON t.event_id = e.id
"#;

/// Repository for team-related database operations.
#[derive(Clone)]
pub struct TeamRepository {
    pool: PgPool,
}

impl TeamRepository {
    /// Creates a new TeamRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a team and add the leader as its first member.
    pub async fn create_with_leader(
        &self,
        event_id: Uuid,
        name: &str,
        leader_id: Uuid,
        invite_code: &str,
    ) -> Result<TeamEntity, sqlx::Error> {
        let timer = QueryTimer::new("create_team");
        let mut tx = self.pool.begin().await?;

        let team = sqlx::query_as::<_, TeamEntity>(
            r#"
            INSERT INTO teams (id, event_id, name, leader_id, invite_code)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, event_id, name, leader_id, invite_code, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(event_id)
        .bind(name)
        .bind(leader_id)
        .bind(invite_code)
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query("INSERT INTO team_members (team_id, user_id) VALUES ($1, $2)")
            .bind(team.id)
            .bind(leader_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        timer.record();
        Ok(team)
    }

    /// Find a team by id, with event info and member count.
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<TeamWithEventEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_team_by_id");
        let result = sqlx::query_as::<_, TeamWithEventEntity>(&format!(
            "{TEAM_WITH_EVENT_QUERY} WHERE t.id = $1",
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Find a team by invite code.
    pub async fn find_by_invite_code(
        &self,
        invite_code: &str,
    ) -> Result<Option<TeamWithEventEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_team_by_invite_code");
        let result = sqlx::query_as::<_, TeamWithEventEntity>(&format!(
            "{TEAM_WITH_EVENT_QUERY} WHERE t.invite_code = $1",
        ))
        .bind(invite_code)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Check whether an invite code is already taken.
    pub async fn invite_code_exists(&self, invite_code: &str) -> Result<bool, sqlx::Error> {
        let timer = QueryTimer::new("check_invite_code_exists");
        let result = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM teams WHERE invite_code = $1)",
        )
        .bind(invite_code)
        .fetch_one(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Generate a unique invite code, retrying on collision.
    pub async fn generate_unique_invite_code<F>(&self, generator: F) -> Result<String, sqlx::Error>
    where
        F: Fn() -> String,
    {
        loop {
            let code = generator();
            if !self.invite_code_exists(&code).await? {
                return Ok(code);
            }
        }
    }

    /// List the teams an account belongs to.
    pub async fn list_for_user(
        &self,
        user_id: Uuid,
    ) -> Result<Vec<TeamWithEventEntity>, sqlx::Error> {
        let timer = QueryTimer::new("list_teams_for_user");
        let result = sqlx::query_as::<_, TeamWithEventEntity>(&format!(
            r#"
            {TEAM_WITH_EVENT_QUERY}
            JOIN team_members me ON me.team_id = t.id AND me.user_id = $1
            ORDER BY t.created_at DESC
            "#,
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result
    }

    /// List a team's members with profile info, leader first.
    pub async fn members(
        &self,
        team_id: Uuid,
    ) -> Result<Vec<TeamMemberWithUserEntity>, sqlx::Error> {
        let timer = QueryTimer::new("list_team_members");
        let result = sqlx::query_as::<_, TeamMemberWithUserEntity>(
            r#"
            SELECT tm.user_id, u.email, u.first_name, u.last_name, tm.joined_at
            FROM team_members tm
            JOIN users u ON tm.user_id = u.id
            WHERE tm.team_id = $1
            ORDER BY tm.joined_at ASC
            "#,
        )
        .bind(team_id)
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Whether the account is a member of the team.
    pub async fn is_member(&self, team_id: Uuid, user_id: Uuid) -> Result<bool, sqlx::Error> {
        let timer = QueryTimer::new("check_team_membership");
        let result = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM team_members WHERE team_id = $1 AND user_id = $2)",
        )
        .bind(team_id)
        .bind(user_id)
        .fetch_one(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Add a member, enforcing the event's team size cap in the same
    /// statement. Returns false when the team is already full.
    pub async fn add_member(
        &self,
        team_id: Uuid,
        user_id: Uuid,
        max_size: Option<i32>,
    ) -> Result<bool, sqlx::Error> {
        let timer = QueryTimer::new("add_team_member");
        let result = sqlx::query(
            r#"
            INSERT INTO team_members (team_id, user_id)
            SELECT $1, $2
            WHERE $3::INT IS NULL
               OR (SELECT COUNT(*) FROM team_members WHERE team_id = $1) < $3
            "#,
        )
        .bind(team_id)
        .bind(user_id)
        .bind(max_size)
        .execute(&self.pool)
        .await?;
        timer.record();
        Ok(result.rows_affected() > 0)
    }

    /// Remove a member from a team.
    pub async fn remove_member(&self, team_id: Uuid, user_id: Uuid) -> Result<u64, sqlx::Error> {
        let timer = QueryTimer::new("remove_team_member");
        let result = sqlx::query("DELETE FROM team_members WHERE team_id = $1 AND user_id = $2")
            .bind(team_id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        timer.record();
        Ok(result.rows_affected())
    }
}
