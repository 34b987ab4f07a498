use rust_decimal_macros::dec;

use storefront_api::catalog::{
    CatalogQuery, MemoryCatalog, NewProduct, ProductCatalog, ProductPatch,
};

fn product(sku: &str, name: &str, price: rust_decimal::Decimal, category: &str) -> NewProduct {
    NewProduct {
        sku: sku.to_string(),
        name: name.to_string(),
        description: format!("{name} description"),
        price,
        category: category.to_string(),
        stock: 10,
    }
}

fn sample_catalog() -> MemoryCatalog {
    let catalog = MemoryCatalog::new();
    catalog.add(product("SKU-1", "Headphones", dec!(120), "electronics"));
    catalog.add(product("SKU-2", "Keyboard", dec!(75), "electronics"));
    catalog.add(product("SKU-3", "Mug", dec!(12), "home"));
    catalog.add(product("SKU-4", "Desk Lamp", dec!(35), "home"));
    catalog.add(product("SKU-5", "Speaker", dec!(50), "electronics"));
    catalog
}

#[tokio::test]
async fn lookup_by_unknown_id_returns_none() {
    let catalog = sample_catalog();
    let found = catalog.find_by_id("no-such-id").await.unwrap();
    assert!(found.is_none());
}

#[tokio::test]
async fn list_defaults_to_price_descending() {
    let catalog = sample_catalog();
    let (items, total) = catalog
        .list(&CatalogQuery {
            limit: 100,
            ..Default::default()
        })
        .await
        .unwrap();

    assert_eq!(total, 5);
    let prices: Vec<_> = items.iter().map(|p| p.price).collect();
    assert_eq!(
        prices,
        vec![dec!(120), dec!(75), dec!(50), dec!(35), dec!(12)]
    );
}

#[tokio::test]
async fn list_filters_by_search_and_category() {
    let catalog = sample_catalog();

    let (items, total) = catalog
        .list(&CatalogQuery {
            search: Some("lamp".into()),
            limit: 100,
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(total, 1);
    assert_eq!(items[0].sku, "SKU-4");

    let (items, total) = catalog
        .list(&CatalogQuery {
            category: Some("electronics".into()),
            price_ascending: true,
            limit: 2,
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(total, 3);
    assert_eq!(items.len(), 2);
    assert_eq!(items[0].price, dec!(50));
}

#[tokio::test]
async fn update_patches_only_provided_fields() {
    let catalog = sample_catalog();
    let mug = catalog.find_by_sku("SKU-3").await.unwrap().unwrap();

    let updated = catalog
        .update(
            &mug.id,
            ProductPatch {
                price: Some(dec!(14.50)),
                ..Default::default()
            },
        )
        .await
        .unwrap()
        .unwrap();

    assert_eq!(updated.price, dec!(14.50));
    assert_eq!(updated.name, "Mug");
    assert_eq!(updated.category, "home");

    let missing = catalog
        .update("no-such-id", ProductPatch::default())
        .await
        .unwrap();
    assert!(missing.is_none());
}

#[tokio::test]
async fn delete_reports_whether_anything_was_removed() {
    let catalog = sample_catalog();
    let mug = catalog.find_by_sku("SKU-3").await.unwrap().unwrap();

    assert!(catalog.delete(&mug.id).await.unwrap());
    assert!(!catalog.delete(&mug.id).await.unwrap());
    assert!(catalog.find_by_id(&mug.id).await.unwrap().is_none());
}

#[tokio::test]
async fn category_aggregation_counts_and_averages() {
    let catalog = sample_catalog();
    let rows = catalog.aggregate_by_category().await.unwrap();

    assert_eq!(rows.len(), 2);
    // Most populated category first.
    assert_eq!(rows[0].category, "electronics");
    assert_eq!(rows[0].total_products, 3);
    // (120 + 75 + 50) / 3
    assert_eq!(rows[0].avg_price.round_dp(4), dec!(81.6667));

    assert_eq!(rows[1].category, "home");
    assert_eq!(rows[1].total_products, 2);
    assert_eq!(rows[1].avg_price, dec!(23.5));
}
