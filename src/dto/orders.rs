use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::{Order, OrderItem};

#[derive(Debug, Deserialize, ToSchema)]
pub struct CheckoutRequest {
    pub items: Vec<CartLine>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CartLine {
    pub product_id: String,
    pub quantity: i32,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderWithItems {
    pub order: Order,
    pub items: Vec<OrderItem>,
}

/// Display-time catalog snapshot attached to a historical order line. This
/// reflects the catalog *now*; the purchase-time price lives on the item.
#[derive(Debug, Serialize, ToSchema)]
pub struct ProductSnapshot {
    pub id: String,
    pub sku: String,
    pub name: String,
    pub category: String,
    pub price: Decimal,
    pub description: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct EnrichedOrderItem {
    pub id: Uuid,
    pub product_id: String,
    pub quantity: i32,
    pub price_at_purchase: Decimal,
    /// `price_at_purchase * quantity` rounded to 2 decimal places for
    /// display; the order total keeps full precision.
    pub subtotal: Decimal,
    /// `None` when the product no longer resolves in the catalog.
    pub product: Option<ProductSnapshot>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct EnrichedOrder {
    pub id: Uuid,
    pub user_id: Uuid,
    pub total: Decimal,
    pub created_at: DateTime<Utc>,
    pub items: Vec<EnrichedOrderItem>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderList {
    pub items: Vec<EnrichedOrder>,
}
