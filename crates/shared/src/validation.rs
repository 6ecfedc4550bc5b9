//! Common validation utilities.

use chrono::{DateTime, Utc};
use validator::ValidationError;

/// Minimum password length accepted at signup.
pub const MIN_PASSWORD_LENGTH: usize = 8;

/// Validates password strength: at least 8 characters with one uppercase
/// letter, one lowercase letter, and one digit.
pub fn validate_password_strength(password: &str) -> Result<(), ValidationError> {
    if password.len() < MIN_PASSWORD_LENGTH {
        let mut err = ValidationError::new("password_length");
        err.message = Some("Password must be at least 8 characters".into());
        return Err(err);
    }

    let has_upper = password.chars().any(|c| c.is_ascii_uppercase());
    let has_lower = password.chars().any(|c| c.is_ascii_lowercase());
    let has_digit = password.chars().any(|c| c.is_ascii_digit());

    if has_upper && has_lower && has_digit {
        Ok(())
    } else {
        let mut err = ValidationError::new("password_strength");
        err.message =
            Some("Password must contain an uppercase letter, a lowercase letter, and a digit".into());
        Err(err)
    }
}

/// Validates that an event's schedule window is ordered (start before end).
pub fn validate_schedule_window(
    start: DateTime<Utc>,
    end: DateTime<Utc>,
) -> Result<(), ValidationError> {
    if start < end {
        Ok(())
    } else {
        let mut err = ValidationError::new("schedule_window");
        err.message = Some("Event start must be before event end".into());
        Err(err)
    }
}

/// Validates that a registration deadline does not fall after event start.
pub fn validate_registration_deadline(
    deadline: DateTime<Utc>,
    start: DateTime<Utc>,
) -> Result<(), ValidationError> {
    if deadline <= start {
        Ok(())
    } else {
        let mut err = ValidationError::new("registration_deadline");
        err.message = Some("Registration deadline must not be after event start".into());
        Err(err)
    }
}
