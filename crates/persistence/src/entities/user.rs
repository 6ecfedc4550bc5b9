//! Account entity (database row mapping).

use chrono::{DateTime, Utc};
use domain::models::UserRole;
use sqlx::FromRow;
use uuid::Uuid;

/// Database representation of the user_role enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "user_role", rename_all = "lowercase")]
pub enum UserRoleDb {
    Participant,
    Organizer,
    Admin,
}

impl From<UserRoleDb> for UserRole {
    fn from(role: UserRoleDb) -> Self {
        match role {
            UserRoleDb::Participant => UserRole::Participant,
            UserRoleDb::Organizer => UserRole::Organizer,
            UserRoleDb::Admin => UserRole::Admin,
        }
    }
}

impl From<UserRole> for UserRoleDb {
    fn from(role: UserRole) -> Self {
        match role {
            UserRole::Participant => UserRoleDb::Participant,
            UserRole::Organizer => UserRoleDb::Organizer,
            UserRole::Admin => UserRoleDb::Admin,
        }
    }
}

/// Database row mapping for the users table.
///
/// Participant and organizer profile columns are both nullable; which set
/// is populated depends on the role.
#[derive(Debug, Clone, FromRow)]
pub struct UserEntity {
    pub id: Uuid,
    pub email: String,
    pub password_hash: String,
    pub role: UserRoleDb,
    // Participant profile
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub college: Option<String>,
    pub contact_number: Option<String>,
    pub onboarded: bool,
    // Organizer profile
    pub organization_name: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl UserEntity {
    /// Participant display name; falls back to the email local part.
    pub fn display_name(&self) -> String {
        match (&self.first_name, &self.last_name) {
            (Some(first), Some(last)) => format!("{} {}", first, last),
            (Some(first), None) => first.clone(),
            _ => self
                .email
                .split('@')
                .next()
                .unwrap_or(&self.email)
                .to_string(),
        }
    }
}

/// Organizer row with event count for admin listing.
#[derive(Debug, Clone, FromRow)]
pub struct OrganizerWithEventCountEntity {
    pub id: Uuid,
    pub email: String,
    pub organization_name: Option<String>,
    pub category: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub event_count: i64,
}
