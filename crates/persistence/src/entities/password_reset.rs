//! Password reset request entities (database row mappings).

use chrono::{DateTime, Utc};
use domain::models::ResetStatus;
use sqlx::FromRow;
use uuid::Uuid;

/// Database representation of the reset_status enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "reset_status", rename_all = "lowercase")]
pub enum ResetStatusDb {
    Pending,
    Approved,
    Rejected,
}

impl From<ResetStatusDb> for ResetStatus {
    fn from(status: ResetStatusDb) -> Self {
        match status {
            ResetStatusDb::Pending => ResetStatus::Pending,
            ResetStatusDb::Approved => ResetStatus::Approved,
            ResetStatusDb::Rejected => ResetStatus::Rejected,
        }
    }
}

/// Database row mapping for the password_reset_requests table.
#[derive(Debug, Clone, FromRow)]
pub struct PasswordResetEntity {
    pub id: Uuid,
    pub user_id: Uuid,
    pub new_password_hash: String,
    pub status: ResetStatusDb,
    pub requested_at: DateTime<Utc>,
    pub resolved_at: Option<DateTime<Utc>>,
    pub resolved_by: Option<Uuid>,
}

/// Reset request joined with the requesting account, for admin review.
#[derive(Debug, Clone, FromRow)]
pub struct PasswordResetWithUserEntity {
    pub id: Uuid,
    pub user_id: Uuid,
    pub status: ResetStatusDb,
    pub requested_at: DateTime<Utc>,
    pub user_email: String,
    pub user_role: super::UserRoleDb,
}
