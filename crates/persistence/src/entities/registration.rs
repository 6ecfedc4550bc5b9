//! Registration entity (database row mapping).

use chrono::{DateTime, Utc};
use domain::models::{PaymentStatus, RegistrationStatus};
use rust_decimal::Decimal;
use sqlx::FromRow;
use uuid::Uuid;

/// Database representation of the registration_status enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "registration_status", rename_all = "lowercase")]
pub enum RegistrationStatusDb {
    Pending,
    Confirmed,
    Cancelled,
}

impl From<RegistrationStatusDb> for RegistrationStatus {
    fn from(status: RegistrationStatusDb) -> Self {
        match status {
            RegistrationStatusDb::Pending => RegistrationStatus::Pending,
            RegistrationStatusDb::Confirmed => RegistrationStatus::Confirmed,
            RegistrationStatusDb::Cancelled => RegistrationStatus::Cancelled,
        }
    }
}

/// Database representation of the payment_status enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "payment_status", rename_all = "lowercase")]
pub enum PaymentStatusDb {
    Pending,
    Paid,
}

impl From<PaymentStatusDb> for PaymentStatus {
    fn from(status: PaymentStatusDb) -> Self {
        match status {
            PaymentStatusDb::Pending => PaymentStatus::Pending,
            PaymentStatusDb::Paid => PaymentStatus::Paid,
        }
    }
}

/// Database row mapping for the registrations table.
#[derive(Debug, Clone, FromRow)]
pub struct RegistrationEntity {
    pub id: Uuid,
    pub event_id: Uuid,
    pub participant_id: Uuid,
    pub ticket_code: String,
    pub status: RegistrationStatusDb,
    pub registered_at: DateTime<Utc>,
    pub qr_code: Option<String>,
    pub attended: bool,
    pub attended_at: Option<DateTime<Utc>>,
    pub purchase_total: Decimal,
    pub payment_status: Option<PaymentStatusDb>,
}

/// Registration joined with its event and participant.
///
/// One shape serves the ticket view, attendance verification, CSV export,
/// and the participant's registration list.
#[derive(Debug, Clone, FromRow)]
pub struct RegistrationDetailEntity {
    pub id: Uuid,
    pub event_id: Uuid,
    pub participant_id: Uuid,
    pub ticket_code: String,
    pub status: RegistrationStatusDb,
    pub registered_at: DateTime<Utc>,
    pub qr_code: Option<String>,
    pub attended: bool,
    pub attended_at: Option<DateTime<Utc>>,
    pub purchase_total: Decimal,
    pub payment_status: Option<PaymentStatusDb>,
    // Event info
    pub event_name: String,
    pub event_type: super::EventTypeDb,
    pub event_status: super::EventStatusDb,
    pub event_start_date: DateTime<Utc>,
    pub event_venue: Option<String>,
    pub event_organizer_id: Uuid,
    // Participant info
    pub participant_email: String,
    pub participant_first_name: Option<String>,
    pub participant_last_name: Option<String>,
}

impl RegistrationDetailEntity {
    /// Participant full name for exports and scan responses.
    pub fn participant_name(&self) -> String {
        match (&self.participant_first_name, &self.participant_last_name) {
            (Some(first), Some(last)) => format!("{} {}", first, last),
            (Some(first), None) => first.clone(),
            (None, Some(last)) => last.clone(),
            (None, None) => String::new(),
        }
    }
}
