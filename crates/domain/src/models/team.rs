//! Team models for team-enabled events.

use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

lazy_static::lazy_static! {
    /// Invite codes are three dash-separated groups of three characters.
    pub static ref INVITE_CODE_REGEX: regex::Regex =
        regex::Regex::new(r"^[A-Z0-9]{3}-[A-Z0-9]{3}-[A-Z0-9]{3}$").unwrap();
}

/// Request to create a team for an event.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateTeamRequest {
    pub event_id: Uuid,

    #[validate(length(min = 1, max = 100, message = "Team name must be 1-100 characters"))]
    pub name: String,
}

/// Request to join a team using an invite code.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct JoinTeamRequest {
    #[validate(regex(
        path = *INVITE_CODE_REGEX,
        message = "Invalid invite code format. Expected XXX-XXX-XXX"
    ))]
    pub invite_code: String,
}
