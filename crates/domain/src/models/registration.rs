//! Registration status enums and the ticket QR payload.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Status of a registration. Registrations are never hard-deleted;
/// cancellation is a status change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RegistrationStatus {
    Pending,
    Confirmed,
    Cancelled,
}

impl RegistrationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RegistrationStatus::Pending => "pending",
            RegistrationStatus::Confirmed => "confirmed",
            RegistrationStatus::Cancelled => "cancelled",
        }
    }
}

/// Payment status of a registration's merchandise order. Payment is
/// collected offline at pickup, so orders start pending.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Pending,
    Paid,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Pending => "pending",
            PaymentStatus::Paid => "paid",
        }
    }
}

/// The payload embedded in a ticket's QR code, serialized as JSON.
///
/// Generated once on first ticket view and persisted; the stored data URI
/// is returned unchanged on every later fetch.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TicketQrPayload {
    pub ticket_code: String,
    pub participant_id: Uuid,
    pub event_id: Uuid,
    pub registered_at: DateTime<Utc>,
}

impl TicketQrPayload {
    /// Serializes the payload to the JSON string encoded into the QR image.
    pub fn to_json(&self) -> String {
        // Serialization of this struct cannot fail: no maps, no non-string keys.
        serde_json::to_string(self).expect("ticket payload serialization")
    }
}
