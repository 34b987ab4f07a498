use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub role: String,
    pub created_at: DateTime<Utc>,
}

/// A product as the catalog (document store) describes it. The id is the
/// catalog's own identifier and is opaque to the order ledger.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CatalogProduct {
    pub id: String,
    pub sku: String,
    pub name: String,
    pub description: String,
    pub price: Decimal,
    pub category: String,
    pub stock: i32,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct Order {
    pub id: Uuid,
    pub user_id: Uuid,
    /// Exact sum of line subtotals captured at checkout; never recomputed.
    pub total: Decimal,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct OrderItem {
    pub id: Uuid,
    pub order_id: Uuid,
    /// Cross-store reference into the catalog; may dangle if the product
    /// is deleted after purchase.
    pub product_id: String,
    pub line_no: i32,
    pub quantity: i32,
    /// Price snapshot taken at checkout; write-once.
    pub price_at_purchase: Decimal,
    pub created_at: DateTime<Utc>,
}

/// One row of the category-sales report, produced by the catalog's native
/// aggregation.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CategorySales {
    pub category: String,
    pub total_products: i64,
    pub avg_price: Decimal,
}
