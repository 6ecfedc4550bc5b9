//! Purchase line entities for merchandise orders.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::FromRow;
use uuid::Uuid;

/// One validated purchase line, ready to be applied in the purchase
/// transaction. Unit price is captured here so later price edits do not
/// rewrite past orders.
#[derive(Debug, Clone)]
pub struct PurchaseLine {
    pub item_id: Uuid,
    pub quantity: i32,
    pub selected_size: Option<String>,
    pub selected_color: Option<String>,
    pub unit_price: Decimal,
}

/// Purchase line joined with the item name, for order summaries.
#[derive(Debug, Clone, FromRow)]
pub struct PurchaseItemWithNameEntity {
    pub id: i64,
    pub registration_id: Uuid,
    pub item_id: Uuid,
    pub item_name: String,
    pub quantity: i32,
    pub selected_size: Option<String>,
    pub selected_color: Option<String>,
    pub unit_price: Decimal,
    pub purchased_at: DateTime<Utc>,
}
