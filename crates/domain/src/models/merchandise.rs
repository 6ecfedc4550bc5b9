//! Merchandise item and purchase request models.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// A merchandise item supplied when creating a merchandise-type event.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NewMerchandiseItem {
    #[validate(length(min = 1, max = 100, message = "Item name must be 1-100 characters"))]
    pub name: String,

    #[validate(length(max = 1000, message = "Description must be at most 1000 characters"))]
    pub description: Option<String>,

    /// Unit price. Zero is allowed (giveaways), negative is not.
    pub price: Decimal,

    /// Initial quantity on hand.
    #[validate(range(min = 0, message = "Quantity must not be negative"))]
    pub quantity: i32,

    /// Per-participant purchase cap for a single order.
    #[validate(range(min = 1, message = "Purchase cap must be at least 1"))]
    pub max_per_participant: i32,

    #[serde(default)]
    pub sizes: Vec<String>,

    #[serde(default)]
    pub colors: Vec<String>,
}

impl NewMerchandiseItem {
    /// Price cannot be expressed as a `range` rule, so it is checked here.
    pub fn validate_price(&self) -> bool {
        self.price >= Decimal::ZERO
    }
}

/// One line of a merchandise purchase request.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseItemRequest {
    pub item_id: Uuid,

    #[validate(range(min = 1, message = "Quantity must be at least 1"))]
    pub quantity: i32,

    pub selected_size: Option<String>,
    pub selected_color: Option<String>,
}

/// A merchandise purchase request against an existing registration.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseRequest {
    #[validate(length(min = 1, message = "At least one item is required"))]
    #[validate(nested)]
    pub items: Vec<PurchaseItemRequest>,
}
