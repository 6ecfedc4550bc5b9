//! Event types, statuses, and their lifecycle rules.

use serde::{Deserialize, Serialize};

/// Kind of event. Merchandise events carry a stocked item list and accept
/// purchases while ongoing; standard events only take registrations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventType {
    Standard,
    Merchandise,
}

impl EventType {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventType::Standard => "standard",
            EventType::Merchandise => "merchandise",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "standard" => Some(EventType::Standard),
            "merchandise" => Some(EventType::Merchandise),
            _ => None,
        }
    }
}

/// Lifecycle status of an event.
///
/// Status only moves forward: draft, published, ongoing, completed.
/// Which operations are permitted depends on the current status: fields are
/// editable while draft, registration opens at published, merchandise
/// purchases are accepted only while ongoing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventStatus {
    Draft,
    Published,
    Ongoing,
    Completed,
}

impl EventStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventStatus::Draft => "draft",
            EventStatus::Published => "published",
            EventStatus::Ongoing => "ongoing",
            EventStatus::Completed => "completed",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "draft" => Some(EventStatus::Draft),
            "published" => Some(EventStatus::Published),
            "ongoing" => Some(EventStatus::Ongoing),
            "completed" => Some(EventStatus::Completed),
            _ => None,
        }
    }

    /// Whether the status may transition to `next`. Only the single forward
    /// step is allowed; events never move backwards or skip a stage.
    pub fn can_transition_to(&self, next: EventStatus) -> bool {
        matches!(
            (self, next),
            (EventStatus::Draft, EventStatus::Published)
                | (EventStatus::Published, EventStatus::Ongoing)
                | (EventStatus::Ongoing, EventStatus::Completed)
        )
    }

    /// Whether participants may register while the event is in this status.
    pub fn accepts_registrations(&self) -> bool {
        matches!(self, EventStatus::Published | EventStatus::Ongoing)
    }
}

impl std::fmt::Display for EventStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::fmt::Display for EventType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_forward_transitions_allowed() {
        assert!(EventStatus::Draft.can_transition_to(EventStatus::Published));
        assert!(EventStatus::Published.can_transition_to(EventStatus::Ongoing));
        assert!(EventStatus::Ongoing.can_transition_to(EventStatus::Completed));
    }

    #[test]
    fn test_backward_transitions_rejected() {
        assert!(!EventStatus::Published.can_transition_to(EventStatus::Draft));
        assert!(!EventStatus::Ongoing.can_transition_to(EventStatus::Published));
        assert!(!EventStatus::Completed.can_transition_to(EventStatus::Ongoing));
    }

    #[test]
    fn test_skipping_transitions_rejected() {
        assert!(!EventStatus::Draft.can_transition_to(EventStatus::Ongoing));
        assert!(!EventStatus::Draft.can_transition_to(EventStatus::Completed));
        assert!(!EventStatus::Published.can_transition_to(EventStatus::Completed));
    }

    #[test]
    fn test_self_transition_rejected() {
        assert!(!EventStatus::Ongoing.can_transition_to(EventStatus::Ongoing));
    }

    #[test]
    fn test_registration_window() {
        assert!(!EventStatus::Draft.accepts_registrations());
        assert!(EventStatus::Published.accepts_registrations());
        assert!(EventStatus::Ongoing.accepts_registrations());
        assert!(!EventStatus::Completed.accepts_registrations());
    }

    #[test]
    fn test_parse_roundtrip() {
        for status in [
            EventStatus::Draft,
            EventStatus::Published,
            EventStatus::Ongoing,
            EventStatus::Completed,
        ] {
            assert_eq!(EventStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(EventStatus::parse("archived"), None);

        for ty in [EventType::Standard, EventType::Merchandise] {
            assert_eq!(EventType::parse(ty.as_str()), Some(ty));
        }
        assert_eq!(EventType::parse("workshop"), None);
    }
}
