use std::str::FromStr;

use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::{
    Client, Collection,
    bson::{Bson, DateTime, Decimal128, Document, doc, oid::ObjectId},
    options::ReturnDocument,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{
    error::{AppError, AppResult},
    models::{CatalogProduct, CategorySales},
};

use super::{CatalogQuery, NewProduct, ProductCatalog, ProductPatch};

/// Product catalog backed by a MongoDB `products` collection. Prices are
/// stored as Decimal128 so aggregation stays exact.
#[derive(Clone)]
pub struct MongoCatalog {
    products: Collection<ProductDocument>,
}

#[derive(Debug, Serialize, Deserialize)]
struct ProductDocument {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    id: Option<ObjectId>,
    sku: String,
    name: String,
    #[serde(default)]
    description: String,
    #[serde(with = "price_bson")]
    price: Decimal,
    #[serde(default)]
    category: String,
    #[serde(default)]
    stock: i32,
    updated_at: DateTime,
}

impl MongoCatalog {
    pub fn new(client: &Client, db_name: &str) -> Self {
        Self {
            products: client.database(db_name).collection("products"),
        }
    }

    /// Insert-or-replace keyed on SKU; used by the seeder so reruns are
    /// harmless.
    pub async fn upsert_by_sku(&self, product: &NewProduct) -> AppResult<()> {
        self.products
            .update_one(
                doc! { "sku": &product.sku },
                doc! { "$set": {
                    "sku": &product.sku,
                    "name": &product.name,
                    "description": &product.description,
                    "price": to_decimal128(&product.price)?,
                    "category": &product.category,
                    "stock": product.stock,
                    "updated_at": DateTime::now(),
                }},
            )
            .upsert(true)
            .await?;
        Ok(())
    }
}

#[async_trait]
impl ProductCatalog for MongoCatalog {
    async fn find_by_id(&self, product_id: &str) -> AppResult<Option<CatalogProduct>> {
        // An unparseable id cannot reference any document.
        let oid = match ObjectId::parse_str(product_id) {
            Ok(oid) => oid,
            Err(_) => return Ok(None),
        };
        let found = self.products.find_one(doc! { "_id": oid }).await?;
        Ok(found.map(product_from_document))
    }

    async fn find_by_sku(&self, sku: &str) -> AppResult<Option<CatalogProduct>> {
        let found = self.products.find_one(doc! { "sku": sku }).await?;
        Ok(found.map(product_from_document))
    }

    async fn list(&self, query: &CatalogQuery) -> AppResult<(Vec<CatalogProduct>, u64)> {
        let mut filter = Document::new();
        if let Some(search) = query.search.as_ref().filter(|s| !s.is_empty()) {
            let pattern = doc! { "$regex": search, "$options": "i" };
            filter.insert(
                "$or",
                vec![
                    doc! { "name": pattern.clone() },
                    doc! { "sku": pattern.clone() },
                    doc! { "description": pattern },
                ],
            );
        }
        if let Some(category) = query.category.as_ref().filter(|c| !c.is_empty()) {
            filter.insert("category", category.clone());
        }

        let total = self.products.count_documents(filter.clone()).await?;

        let sort = if query.price_ascending {
            doc! { "price": 1 }
        } else {
            doc! { "price": -1 }
        };
        let mut cursor = self
            .products
            .find(filter)
            .sort(sort)
            .skip(query.offset)
            .limit(query.limit as i64)
            .await?;

        let mut items = Vec::new();
        while let Some(document) = cursor.try_next().await? {
            items.push(product_from_document(document));
        }
        Ok((items, total))
    }

    async fn insert(&self, product: NewProduct) -> AppResult<CatalogProduct> {
        let document = ProductDocument {
            id: None,
            sku: product.sku,
            name: product.name,
            description: product.description,
            price: product.price,
            category: product.category,
            stock: product.stock,
            updated_at: DateTime::now(),
        };
        let result = self.products.insert_one(&document).await?;
        let id = result
            .inserted_id
            .as_object_id()
            .map(|oid| oid.to_hex())
            .unwrap_or_default();
        Ok(CatalogProduct {
            id,
            sku: document.sku,
            name: document.name,
            description: document.description,
            price: document.price,
            category: document.category,
            stock: document.stock,
        })
    }

    async fn update(
        &self,
        product_id: &str,
        patch: ProductPatch,
    ) -> AppResult<Option<CatalogProduct>> {
        let oid = match ObjectId::parse_str(product_id) {
            Ok(oid) => oid,
            Err(_) => return Ok(None),
        };

        let mut set = doc! { "updated_at": DateTime::now() };
        if let Some(sku) = patch.sku {
            set.insert("sku", sku);
        }
        if let Some(name) = patch.name {
            set.insert("name", name);
        }
        if let Some(description) = patch.description {
            set.insert("description", description);
        }
        if let Some(price) = patch.price {
            set.insert("price", to_decimal128(&price)?);
        }
        if let Some(category) = patch.category {
            set.insert("category", category);
        }
        if let Some(stock) = patch.stock {
            set.insert("stock", stock);
        }

        let updated = self
            .products
            .find_one_and_update(doc! { "_id": oid }, doc! { "$set": set })
            .return_document(ReturnDocument::After)
            .await?;
        Ok(updated.map(product_from_document))
    }

    async fn delete(&self, product_id: &str) -> AppResult<bool> {
        let oid = match ObjectId::parse_str(product_id) {
            Ok(oid) => oid,
            Err(_) => return Ok(false),
        };
        let result = self.products.delete_one(doc! { "_id": oid }).await?;
        Ok(result.deleted_count == 1)
    }

    async fn aggregate_by_category(&self) -> AppResult<Vec<CategorySales>> {
        let pipeline = vec![
            doc! { "$group": {
                "_id": "$category",
                "total_products": { "$sum": 1 },
                "avg_price": { "$avg": "$price" },
            }},
            doc! { "$sort": { "total_products": -1 } },
        ];

        let mut cursor = self.products.aggregate(pipeline).await?;
        let mut rows = Vec::new();
        while let Some(document) = cursor.try_next().await? {
            let category = document.get_str("_id").unwrap_or_default().to_string();
            let total_products = match document.get("total_products") {
                Some(Bson::Int32(n)) => i64::from(*n),
                Some(Bson::Int64(n)) => *n,
                _ => 0,
            };
            let avg_price = document
                .get("avg_price")
                .and_then(decimal_from_bson)
                .unwrap_or(Decimal::ZERO);
            rows.push(CategorySales {
                category,
                total_products,
                avg_price,
            });
        }
        Ok(rows)
    }
}

fn product_from_document(document: ProductDocument) -> CatalogProduct {
    CatalogProduct {
        id: document.id.map(|oid| oid.to_hex()).unwrap_or_default(),
        sku: document.sku,
        name: document.name,
        description: document.description,
        price: document.price,
        category: document.category,
        stock: document.stock,
    }
}

fn to_decimal128(value: &Decimal) -> AppResult<Decimal128> {
    Decimal128::from_str(&value.to_string())
        .map_err(|e| AppError::Internal(anyhow::anyhow!("invalid decimal {value}: {e}")))
}

fn decimal_from_bson(value: &Bson) -> Option<Decimal> {
    match value {
        Bson::Decimal128(d) => {
            let text = d.to_string();
            // Decimal128 can carry more fractional digits than Decimal; fall
            // back through f64 for such averages rather than dropping the row.
            Decimal::from_str(&text)
                .ok()
                .or_else(|| text.parse::<f64>().ok().and_then(Decimal::from_f64_retain))
        }
        Bson::Double(f) => Decimal::from_f64_retain(*f),
        Bson::Int32(n) => Some(Decimal::from(*n)),
        Bson::Int64(n) => Some(Decimal::from(*n)),
        _ => None,
    }
}

/// Serialize `rust_decimal::Decimal` as BSON Decimal128 and back.
mod price_bson {
    use std::str::FromStr;

    use mongodb::bson::Decimal128;
    use rust_decimal::Decimal;
    use serde::{Deserialize, Deserializer, Serialize, Serializer, de};

    pub fn serialize<S: Serializer>(value: &Decimal, serializer: S) -> Result<S::Ok, S::Error> {
        let d128 =
            Decimal128::from_str(&value.to_string()).map_err(serde::ser::Error::custom)?;
        d128.serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Decimal, D::Error> {
        let d128 = Decimal128::deserialize(deserializer)?;
        Decimal::from_str(&d128.to_string()).map_err(de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;

    use super::*;

    #[test]
    fn decimal128_round_trips_exact_prices() {
        let d128 = to_decimal128(&dec!(10.005)).unwrap();
        let back = decimal_from_bson(&Bson::Decimal128(d128)).unwrap();
        assert_eq!(back, dec!(10.005));
    }

    #[test]
    fn bson_numbers_convert_to_decimal() {
        assert_eq!(decimal_from_bson(&Bson::Int32(7)), Some(dec!(7)));
        assert_eq!(decimal_from_bson(&Bson::Int64(12)), Some(dec!(12)));
        assert_eq!(
            decimal_from_bson(&Bson::Double(2.5)),
            Some(dec!(2.5))
        );
        assert_eq!(decimal_from_bson(&Bson::Null), None);
    }
}
