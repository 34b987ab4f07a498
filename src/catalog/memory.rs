use std::collections::BTreeMap;
use std::sync::{PoisonError, RwLock};

use async_trait::async_trait;
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::{
    error::AppResult,
    models::{CatalogProduct, CategorySales},
};

use super::{CatalogQuery, NewProduct, ProductCatalog, ProductPatch};

/// In-memory catalog used by tests and local development. Search is a
/// case-insensitive substring match rather than a real regex.
#[derive(Default)]
pub struct MemoryCatalog {
    products: RwLock<Vec<CatalogProduct>>,
}

impl MemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a product and return its generated id.
    pub fn add(&self, product: NewProduct) -> CatalogProduct {
        let stored = CatalogProduct {
            id: Uuid::new_v4().simple().to_string(),
            sku: product.sku,
            name: product.name,
            description: product.description,
            price: product.price,
            category: product.category,
            stock: product.stock,
        };
        self.write().push(stored.clone());
        stored
    }

    /// Overwrite the price of an existing product, as an external catalog
    /// writer would.
    pub fn set_price(&self, product_id: &str, price: Decimal) {
        let mut products = self.write();
        if let Some(product) = products.iter_mut().find(|p| p.id == product_id) {
            product.price = price;
        }
    }

    /// Remove a product out from under any orders that reference it.
    pub fn remove(&self, product_id: &str) {
        self.write().retain(|p| p.id != product_id);
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, Vec<CatalogProduct>> {
        self.products
            .read()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, Vec<CatalogProduct>> {
        self.products
            .write()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl ProductCatalog for MemoryCatalog {
    async fn find_by_id(&self, product_id: &str) -> AppResult<Option<CatalogProduct>> {
        Ok(self.read().iter().find(|p| p.id == product_id).cloned())
    }

    async fn find_by_sku(&self, sku: &str) -> AppResult<Option<CatalogProduct>> {
        Ok(self.read().iter().find(|p| p.sku == sku).cloned())
    }

    async fn list(&self, query: &CatalogQuery) -> AppResult<(Vec<CatalogProduct>, u64)> {
        let mut matches: Vec<CatalogProduct> = self
            .read()
            .iter()
            .filter(|p| {
                let search_hit = match query.search.as_ref().filter(|s| !s.is_empty()) {
                    Some(needle) => {
                        let needle = needle.to_lowercase();
                        p.name.to_lowercase().contains(&needle)
                            || p.sku.to_lowercase().contains(&needle)
                            || p.description.to_lowercase().contains(&needle)
                    }
                    None => true,
                };
                let category_hit = match query.category.as_ref().filter(|c| !c.is_empty()) {
                    Some(category) => &p.category == category,
                    None => true,
                };
                search_hit && category_hit
            })
            .cloned()
            .collect();

        if query.price_ascending {
            matches.sort_by(|a, b| a.price.cmp(&b.price));
        } else {
            matches.sort_by(|a, b| b.price.cmp(&a.price));
        }

        let total = matches.len() as u64;
        let items = matches
            .into_iter()
            .skip(query.offset as usize)
            .take(query.limit as usize)
            .collect();
        Ok((items, total))
    }

    async fn insert(&self, product: NewProduct) -> AppResult<CatalogProduct> {
        Ok(self.add(product))
    }

    async fn update(
        &self,
        product_id: &str,
        patch: ProductPatch,
    ) -> AppResult<Option<CatalogProduct>> {
        let mut products = self.write();
        let Some(product) = products.iter_mut().find(|p| p.id == product_id) else {
            return Ok(None);
        };
        if let Some(sku) = patch.sku {
            product.sku = sku;
        }
        if let Some(name) = patch.name {
            product.name = name;
        }
        if let Some(description) = patch.description {
            product.description = description;
        }
        if let Some(price) = patch.price {
            product.price = price;
        }
        if let Some(category) = patch.category {
            product.category = category;
        }
        if let Some(stock) = patch.stock {
            product.stock = stock;
        }
        Ok(Some(product.clone()))
    }

    async fn delete(&self, product_id: &str) -> AppResult<bool> {
        let mut products = self.write();
        let before = products.len();
        products.retain(|p| p.id != product_id);
        Ok(products.len() < before)
    }

    async fn aggregate_by_category(&self) -> AppResult<Vec<CategorySales>> {
        let mut groups: BTreeMap<String, (i64, Decimal)> = BTreeMap::new();
        for product in self.read().iter() {
            let entry = groups
                .entry(product.category.clone())
                .or_insert((0, Decimal::ZERO));
            entry.0 += 1;
            entry.1 += product.price;
        }

        let mut rows: Vec<CategorySales> = groups
            .into_iter()
            .map(|(category, (count, sum))| CategorySales {
                category,
                total_products: count,
                avg_price: sum / Decimal::from(count),
            })
            .collect();
        rows.sort_by(|a, b| b.total_products.cmp(&a.total_products));
        Ok(rows)
    }
}
