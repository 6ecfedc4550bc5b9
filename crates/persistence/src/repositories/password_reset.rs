//! Password reset request repository.

use sqlx::PgPool;
use uuid::Uuid;

use crate::entities::{PasswordResetEntity, PasswordResetWithUserEntity};
use crate::metrics::QueryTimer;

const RESET_COLUMNS: &str =
    "id, user_id, new_password_hash, status, requested_at, resolved_at, resolved_by";

/// Repository for admin-moderated password reset requests.
#[derive(Clone)]
pub struct PasswordResetRepository {
    pool: PgPool,
}

impl PasswordResetRepository {
    /// Creates a new PasswordResetRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// File a reset request carrying the already-hashed new password.
    pub async fn create(
        &self,
        user_id: Uuid,
        new_password_hash: &str,
    ) -> Result<PasswordResetEntity, sqlx::Error> {
        let timer = QueryTimer::new("create_password_reset");
        let result = sqlx::query_as::<_, PasswordResetEntity>(&format!(
            r#"
            INSERT INTO password_reset_requests (id, user_id, new_password_hash)
            VALUES ($1, $2, $3)
            RETURNING {RESET_COLUMNS}
            "#,
        ))
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(new_password_hash)
        .fetch_one(&self.pool)
        .await;
        timer.record();
        result
    }

    /// List pending requests with the requesting account, oldest first.
    pub async fn list_pending(&self) -> Result<Vec<PasswordResetWithUserEntity>, sqlx::Error> {
        let timer = QueryTimer::new("list_pending_password_resets");
        let result = sqlx::query_as::<_, PasswordResetWithUserEntity>(
            r#"
            SELECT p.id, p.user_id, p.status, p.requested_at,
                   u.email AS user_email, u.role AS user_role
            FROM password_reset_requests p
            JOIN users u ON p.user_id = u.id
            WHERE p.status = 'pending'
            ORDER BY p.requested_at ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Approve a pending request: apply the stored hash to the account and
    /// mark the request resolved, in one transaction.
    ///
    /// Returns false when the request does not exist or is not pending.
    pub async fn approve(&self, id: Uuid, admin_id: Uuid) -> Result<bool, sqlx::Error> {
        let timer = QueryTimer::new("approve_password_reset");
        let mut tx = self.pool.begin().await?;

        let request = sqlx::query_as::<_, PasswordResetEntity>(&format!(
            r#"
            SELECT {RESET_COLUMNS}
            FROM password_reset_requests
            WHERE id = $1 AND status = 'pending'
            FOR UPDATE
            "#,
        ))
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(request) = request else {
            return Ok(false);
        };

        sqlx::query("UPDATE users SET password_hash = $2, updated_at = NOW() WHERE id = $1")
            .bind(request.user_id)
            .bind(&request.new_password_hash)
            .execute(&mut *tx)
            .await?;

        sqlx::query(
            r#"
            UPDATE password_reset_requests
            SET status = 'approved', resolved_at = NOW(), resolved_by = $2
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(admin_id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        timer.record();
        Ok(true)
    }

    /// Reject a pending request. Returns false when it is not pending.
    pub async fn reject(&self, id: Uuid, admin_id: Uuid) -> Result<bool, sqlx::Error> {
        let timer = QueryTimer::new("reject_password_reset");
        let result = sqlx::query(
            r#"
            UPDATE password_reset_requests
            SET status = 'rejected', resolved_at = NOW(), resolved_by = $2
            WHERE id = $1 AND status = 'pending'
            "#,
        )
        .bind(id)
        .bind(admin_id)
        .execute(&self.pool)
        .await?;
        timer.record();
        Ok(result.rows_affected() > 0)
    }
}
