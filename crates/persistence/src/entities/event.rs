//! Event entity (database row mapping).

use chrono::{DateTime, Utc};
use domain::models::{EventStatus, EventType};
use rust_decimal::Decimal;
use sqlx::FromRow;
use uuid::Uuid;

/// Database representation of the event_type enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "event_type", rename_all = "lowercase")]
pub enum EventTypeDb {
    Standard,
    Merchandise,
}

impl From<EventTypeDb> for EventType {
    fn from(ty: EventTypeDb) -> Self {
        match ty {
            EventTypeDb::Standard => EventType::Standard,
            EventTypeDb::Merchandise => EventType::Merchandise,
        }
    }
}

impl From<EventType> for EventTypeDb {
    fn from(ty: EventType) -> Self {
        match ty {
            EventType::Standard => EventTypeDb::Standard,
            EventType::Merchandise => EventTypeDb::Merchandise,
        }
    }
}

/// Database representation of the event_status enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "event_status", rename_all = "lowercase")]
pub enum EventStatusDb {
    Draft,
    Published,
    Ongoing,
    Completed,
}

impl From<EventStatusDb> for EventStatus {
    fn from(status: EventStatusDb) -> Self {
        match status {
            EventStatusDb::Draft => EventStatus::Draft,
            EventStatusDb::Published => EventStatus::Published,
            EventStatusDb::Ongoing => EventStatus::Ongoing,
            EventStatusDb::Completed => EventStatus::Completed,
        }
    }
}

impl From<EventStatus> for EventStatusDb {
    fn from(status: EventStatus) -> Self {
        match status {
            EventStatus::Draft => EventStatusDb::Draft,
            EventStatus::Published => EventStatusDb::Published,
            EventStatus::Ongoing => EventStatusDb::Ongoing,
            EventStatus::Completed => EventStatusDb::Completed,
        }
    }
}

/// Database row mapping for the events table.
#[derive(Debug, Clone, FromRow)]
pub struct EventEntity {
    pub id: Uuid,
    pub organizer_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub event_type: EventTypeDb,
    pub status: EventStatusDb,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub registration_deadline: Option<DateTime<Utc>>,
    pub venue: Option<String>,
    pub registration_limit: Option<i32>,
    pub registration_fee: Option<Decimal>,
    pub team_event: bool,
    pub max_team_size: Option<i32>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Event row with organizer name and registration count, for listings.
#[derive(Debug, Clone, FromRow)]
pub struct EventWithCountEntity {
    pub id: Uuid,
    pub organizer_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub event_type: EventTypeDb,
    pub status: EventStatusDb,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub registration_deadline: Option<DateTime<Utc>>,
    pub venue: Option<String>,
    pub registration_limit: Option<i32>,
    pub registration_fee: Option<Decimal>,
    pub team_event: bool,
    pub max_team_size: Option<i32>,
    pub organizer_name: Option<String>,
    pub registration_count: i64,
}

/// Column values for inserting a new event.
#[derive(Debug, Clone)]
pub struct NewEventRow {
    pub name: String,
    pub description: Option<String>,
    pub event_type: EventTypeDb,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub registration_deadline: Option<DateTime<Utc>>,
    pub venue: Option<String>,
    pub registration_limit: Option<i32>,
    pub registration_fee: Option<Decimal>,
    pub team_event: bool,
    pub max_team_size: Option<i32>,
}
