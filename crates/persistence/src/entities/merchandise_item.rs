//! Merchandise item entity (database row mapping).

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::FromRow;
use uuid::Uuid;

/// Database row mapping for the merchandise_items table.
///
/// `quantity` is the live stock counter; a CHECK constraint keeps it from
/// ever going negative even if application-level guards are bypassed.
#[derive(Debug, Clone, FromRow)]
pub struct MerchandiseItemEntity {
    pub id: Uuid,
    pub event_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub price: Decimal,
    pub quantity: i32,
    pub max_per_participant: i32,
    pub sizes: Vec<String>,
    pub colors: Vec<String>,
    pub created_at: DateTime<Utc>,
}
