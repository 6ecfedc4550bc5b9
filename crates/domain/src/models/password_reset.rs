//! Password reset request status.

use serde::{Deserialize, Serialize};

/// Status of an admin-moderated password reset request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResetStatus {
    Pending,
    Approved,
    Rejected,
}

impl ResetStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResetStatus::Pending => "pending",
            ResetStatus::Approved => "approved",
            ResetStatus::Rejected => "rejected",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serde_lowercase() {
        assert_eq!(
            serde_json::to_string(&ResetStatus::Pending).unwrap(),
            "\"pending\""
        );
        let back: ResetStatus = serde_json::from_str("\"rejected\"").unwrap();
        assert_eq!(back, ResetStatus::Rejected);
    }
}
