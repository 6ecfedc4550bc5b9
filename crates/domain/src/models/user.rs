//! Account roles.

use serde::{Deserialize, Serialize};

/// Role of an account. One table holds all three identities; the role
/// decides which route groups an account may use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Participant,
    Organizer,
    Admin,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Participant => "participant",
            UserRole::Organizer => "organizer",
            UserRole::Admin => "admin",
        }
    }

    /// Parses a role from its wire form. Returns None for unknown values.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "participant" => Some(UserRole::Participant),
            "organizer" => Some(UserRole::Organizer),
            "admin" => Some(UserRole::Admin),
            _ => None,
        }
    }
}

impl std::fmt::Display for UserRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
