use async_trait::async_trait;
use rust_decimal::Decimal;

use crate::{
    error::AppResult,
    models::{CatalogProduct, CategorySales},
};

pub mod memory;
pub mod mongo;

pub use memory::MemoryCatalog;
pub use mongo::MongoCatalog;

#[derive(Debug, Clone, Default)]
pub struct CatalogQuery {
    pub search: Option<String>,
    pub category: Option<String>,
    pub price_ascending: bool,
    pub limit: u64,
    pub offset: u64,
}

#[derive(Debug, Clone)]
pub struct NewProduct {
    pub sku: String,
    pub name: String,
    pub description: String,
    pub price: Decimal,
    pub category: String,
    pub stock: i32,
}

#[derive(Debug, Clone, Default)]
pub struct ProductPatch {
    pub sku: Option<String>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<Decimal>,
    pub category: Option<String>,
    pub stock: Option<i32>,
}

/// Client for the product document store. The order ledger never joins
/// against it; callers treat product ids as opaque strings and must cope
/// with lookups returning `None` for ids that used to resolve.
#[async_trait]
pub trait ProductCatalog: Send + Sync {
    async fn find_by_id(&self, product_id: &str) -> AppResult<Option<CatalogProduct>>;

    async fn find_by_sku(&self, sku: &str) -> AppResult<Option<CatalogProduct>>;

    /// Filtered page of products plus the total match count.
    async fn list(&self, query: &CatalogQuery) -> AppResult<(Vec<CatalogProduct>, u64)>;

    async fn insert(&self, product: NewProduct) -> AppResult<CatalogProduct>;

    /// Returns `None` when no product has this id.
    async fn update(&self, product_id: &str, patch: ProductPatch)
    -> AppResult<Option<CatalogProduct>>;

    /// Returns whether a product was actually removed.
    async fn delete(&self, product_id: &str) -> AppResult<bool>;

    /// Group products by category with count and average price, most
    /// populated category first.
    async fn aggregate_by_category(&self) -> AppResult<Vec<CategorySales>>;
}
