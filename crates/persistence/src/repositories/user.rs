//! Account repository for database operations.

use sqlx::PgPool;
use uuid::Uuid;

use crate::entities::{OrganizerWithEventCountEntity, UserEntity, UserRoleDb};
use crate::metrics::QueryTimer;

const USER_COLUMNS: &str = "id, email, password_hash, role, first_name, last_name, college, \
    contact_number, onboarded, organization_name, description, category, is_active, \
    created_at, updated_at";

/// Partial update of a participant profile. `None` leaves a field untouched.
#[derive(Debug, Clone, Default)]
pub struct ParticipantProfilePatch {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub college: Option<String>,
    pub contact_number: Option<String>,
    pub onboarded: Option<bool>,
}

/// Partial update of an organizer profile.
#[derive(Debug, Clone, Default)]
pub struct OrganizerProfilePatch {
    pub organization_name: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
}

/// Repository for account-related database operations.
#[derive(Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    /// Creates a new UserRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a participant account.
    pub async fn create_participant(
        &self,
        email: &str,
        password_hash: &str,
        first_name: &str,
        last_name: &str,
    ) -> Result<UserEntity, sqlx::Error> {
        let timer = QueryTimer::new("create_participant");
        let result = sqlx::query_as::<_, UserEntity>(&format!(
            r#"
            INSERT INTO users (id, email, password_hash, role, first_name, last_name)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {USER_COLUMNS}
            "#,
        ))
        .bind(Uuid::new_v4())
        .bind(email)
        .bind(password_hash)
        .bind(UserRoleDb::Participant)
        .bind(first_name)
        .bind(last_name)
        .fetch_one(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Create an organizer account (admin-managed).
    pub async fn create_organizer(
        &self,
        email: &str,
        password_hash: &str,
        organization_name: &str,
        category: Option<&str>,
    ) -> Result<UserEntity, sqlx::Error> {
        let timer = QueryTimer::new("create_organizer");
        let result = sqlx::query_as::<_, UserEntity>(&format!(
            r#"
            INSERT INTO users (id, email, password_hash, role, organization_name, category)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {USER_COLUMNS}
            "#,
        ))
        .bind(Uuid::new_v4())
        .bind(email)
        .bind(password_hash)
        .bind(UserRoleDb::Organizer)
        .bind(organization_name)
        .bind(category)
        .fetch_one(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Create an admin account, used by startup bootstrap. No-op when the
    /// email is already taken.
    pub async fn create_admin_if_absent(
        &self,
        email: &str,
        password_hash: &str,
    ) -> Result<Option<UserEntity>, sqlx::Error> {
        let timer = QueryTimer::new("create_admin_if_absent");
        let result = sqlx::query_as::<_, UserEntity>(&format!(
            r#"
            INSERT INTO users (id, email, password_hash, role)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (email) DO NOTHING
            RETURNING {USER_COLUMNS}
            "#,
        ))
        .bind(Uuid::new_v4())
        .bind(email)
        .bind(password_hash)
        .bind(UserRoleDb::Admin)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Find an account by email (case-insensitive).
    pub async fn find_by_email(&self, email: &str) -> Result<Option<UserEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_user_by_email");
        let result = sqlx::query_as::<_, UserEntity>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE LOWER(email) = LOWER($1)",
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Find an account by id.
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<UserEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_user_by_id");
        let result = sqlx::query_as::<_, UserEntity>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1",
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Apply a participant profile patch; untouched fields keep their value.
    pub async fn update_participant_profile(
        &self,
        id: Uuid,
        patch: &ParticipantProfilePatch,
    ) -> Result<Option<UserEntity>, sqlx::Error> {
        let timer = QueryTimer::new("update_participant_profile");
        let result = sqlx::query_as::<_, UserEntity>(&format!(
            r#"
            UPDATE users
            SET first_name = COALESCE($2, first_name),
                last_name = COALESCE($3, last_name),
                college = COALESCE($4, college),
                contact_number = COALESCE($5, contact_number),
                onboarded = COALESCE($6, onboarded),
                updated_at = NOW()
            WHERE id = $1 AND role = 'participant'
            RETURNING {USER_COLUMNS}
            "#,
        ))
        .bind(id)
        .bind(&patch.first_name)
        .bind(&patch.last_name)
        .bind(&patch.college)
        .bind(&patch.contact_number)
        .bind(patch.onboarded)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Apply an organizer profile patch.
    pub async fn update_organizer_profile(
        &self,
        id: Uuid,
        patch: &OrganizerProfilePatch,
    ) -> Result<Option<UserEntity>, sqlx::Error> {
        let timer = QueryTimer::new("update_organizer_profile");
        let result = sqlx::query_as::<_, UserEntity>(&format!(
            r#"
            UPDATE users
            SET organization_name = COALESCE($2, organization_name),
                description = COALESCE($3, description),
                category = COALESCE($4, category),
                updated_at = NOW()
            WHERE id = $1 AND role = 'organizer'
            RETURNING {USER_COLUMNS}
            "#,
        ))
        .bind(id)
        .bind(&patch.organization_name)
        .bind(&patch.description)
        .bind(&patch.category)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Activate or deactivate an account.
    pub async fn set_active(&self, id: Uuid, active: bool) -> Result<u64, sqlx::Error> {
        let timer = QueryTimer::new("set_user_active");
        let result = sqlx::query(
            "UPDATE users SET is_active = $2, updated_at = NOW() WHERE id = $1",
        )
        .bind(id)
        .bind(active)
        .execute(&self.pool)
        .await?;
        timer.record();
        Ok(result.rows_affected())
    }

    /// Replace an account's password hash.
    pub async fn update_password_hash(&self, id: Uuid, hash: &str) -> Result<u64, sqlx::Error> {
        let timer = QueryTimer::new("update_password_hash");
        let result = sqlx::query(
            "UPDATE users SET password_hash = $2, updated_at = NOW() WHERE id = $1",
        )
        .bind(id)
        .bind(hash)
        .execute(&self.pool)
        .await?;
        timer.record();
        Ok(result.rows_affected())
    }

    /// List organizer accounts with their event counts, for the admin view.
    pub async fn list_organizers(
        &self,
    ) -> Result<Vec<OrganizerWithEventCountEntity>, sqlx::Error> {
        let timer = QueryTimer::new("list_organizers");
        let result = sqlx::query_as::<_, OrganizerWithEventCountEntity>(
            r#"
            SELECT
                u.id, u.email, u.organization_name, u.category, u.is_active, u.created_at,
                (SELECT COUNT(*) FROM events e WHERE e.organizer_id = u.id) AS event_count
            FROM users u
            WHERE u.role = 'organizer'
            ORDER BY u.created_at DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Count accounts with the given role.
    pub async fn count_by_role(&self, role: UserRoleDb) -> Result<i64, sqlx::Error> {
        let timer = QueryTimer::new("count_users_by_role");
        let result = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users WHERE role = $1")
            .bind(role)
            .fetch_one(&self.pool)
            .await;
        timer.record();
        result
    }
}
