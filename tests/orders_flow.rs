use std::sync::Arc;

use chrono::{TimeZone, Utc};
use rust_decimal_macros::dec;
use sea_orm::ActiveValue::{NotSet, Set};
use sea_orm::{ActiveModelTrait, ConnectionTrait, EntityTrait, PaginatorTrait, Statement};
use uuid::Uuid;

use storefront_api::{
    catalog::{MemoryCatalog, NewProduct},
    db::{create_orm_conn, run_migrations},
    dto::orders::{CartLine, CheckoutRequest},
    entity::{orders::ActiveModel as OrderActive, orders::Entity as Orders, users},
    error::AppError,
    middleware::auth::AuthUser,
    services::{order_service, report_service},
    state::AppState,
};

fn test_database_url() -> Option<String> {
    std::env::var("TEST_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
        .ok()
}

async fn setup(catalog: Arc<MemoryCatalog>) -> Option<AppState> {
    let Some(url) = test_database_url() else {
        eprintln!("Skipping integration test: TEST_DATABASE_URL/DATABASE_URL not set");
        return None;
    };

    let orm = create_orm_conn(&url).await.expect("connect to postgres");
    run_migrations(&orm).await.expect("run migrations");

    let backend = orm.get_database_backend();
    orm.execute(Statement::from_string(
        backend,
        "TRUNCATE TABLE order_items, orders, audit_logs, users CASCADE",
    ))
    .await
    .expect("truncate tables");

    Some(AppState { orm, catalog })
}

async fn create_customer(state: &AppState) -> AuthUser {
    let user = users::ActiveModel {
        id: Set(Uuid::new_v4()),
        name: Set("Flow Customer".into()),
        email: Set(format!("{}@test.local", Uuid::new_v4().simple())),
        password_hash: Set("not-a-real-hash".into()),
        role: Set("customer".into()),
        created_at: NotSet,
    }
    .insert(&state.orm)
    .await
    .expect("insert user");

    AuthUser {
        user_id: user.id,
        role: user.role,
    }
}

fn cart(lines: &[(&str, i32)]) -> CheckoutRequest {
    CheckoutRequest {
        items: lines
            .iter()
            .map(|(product_id, quantity)| CartLine {
                product_id: product_id.to_string(),
                quantity: *quantity,
            })
            .collect(),
    }
}

#[tokio::test]
async fn checkout_history_and_reports_flow() {
    let catalog = Arc::new(MemoryCatalog::new());
    let Some(state) = setup(catalog.clone()).await else {
        return;
    };
    let customer = create_customer(&state).await;
    let admin = AuthUser {
        user_id: Uuid::new_v4(),
        role: "admin".into(),
    };

    let headphones = catalog.add(NewProduct {
        sku: "SKU-1".into(),
        name: "Headphones".into(),
        description: "Over-ear headphones".into(),
        price: dec!(10.005),
        category: "gadgets".into(),
        stock: 5,
    });
    let mug = catalog.add(NewProduct {
        sku: "SKU-2".into(),
        name: "Mug".into(),
        description: "Ceramic mug".into(),
        price: dec!(12),
        category: "home".into(),
        stock: 50,
    });
    catalog.add(NewProduct {
        sku: "SKU-3".into(),
        name: "Speaker".into(),
        description: "Portable speaker".into(),
        price: dec!(50),
        category: "gadgets".into(),
        stock: 8,
    });

    // An empty cart is rejected before anything touches the ledger.
    let err = order_service::checkout(&state, &customer, cart(&[]))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::EmptyCart));

    // A non-positive quantity is rejected the same way.
    let err = order_service::checkout(&state, &customer, cart(&[(&headphones.id, 0)]))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::BadRequest(_)));

    // One unknown product fails the whole checkout, even though the first
    // line resolves. No partial order may be left behind.
    let err = order_service::checkout(
        &state,
        &customer,
        cart(&[(&headphones.id, 1), ("missing-product", 1)]),
    )
    .await
    .unwrap_err();
    match err {
        AppError::ProductNotFound(id) => assert_eq!(id, "missing-product"),
        other => panic!("expected ProductNotFound, got {other:?}"),
    }
    assert_eq!(Orders::find().count(&state.orm).await.unwrap(), 0);

    // Totals accumulate exactly: 10.005 * 3 + 12 * 2 = 54.015, unrounded.
    let first = order_service::checkout(
        &state,
        &customer,
        cart(&[(&headphones.id, 3), (&mug.id, 2)]),
    )
    .await
    .unwrap()
    .data
    .expect("checkout data");
    assert_eq!(first.order.total, dec!(54.015));
    assert_eq!(first.items.len(), 2);
    assert_eq!(first.items[0].product_id, headphones.id);
    assert_eq!(first.items[0].price_at_purchase, dec!(10.005));
    assert_eq!(first.items[1].product_id, mug.id);

    // A later catalog price change must not rewrite history.
    catalog.set_price(&headphones.id, dec!(99));
    let second = order_service::checkout(&state, &customer, cart(&[(&headphones.id, 1)]))
        .await
        .unwrap()
        .data
        .expect("checkout data");
    assert_eq!(second.order.total, dec!(99));

    let fetched = order_service::get_order(&state, &customer, first.order.id)
        .await
        .unwrap()
        .data
        .expect("order data");
    assert_eq!(fetched.order.total, dec!(54.015));
    assert_eq!(fetched.items[0].price_at_purchase, dec!(10.005));

    // History is most recent first; lines carry a rounded display subtotal
    // and a live product snapshot at the current price.
    let history = order_service::list_orders(&state, &customer)
        .await
        .unwrap()
        .data
        .expect("order list");
    assert_eq!(history.items.len(), 2);
    assert_eq!(history.items[0].id, second.order.id);
    assert_eq!(history.items[1].id, first.order.id);

    let first_line = &history.items[1].items[0];
    assert_eq!(first_line.subtotal, dec!(30.02));
    let snapshot = first_line.product.as_ref().expect("live product");
    assert_eq!(snapshot.price, dec!(99));

    // Deleting a product leaves old orders readable with a null snapshot.
    catalog.remove(&mug.id);
    let history = order_service::list_orders(&state, &customer)
        .await
        .unwrap()
        .data
        .expect("order list");
    let mug_line = &history.items[1].items[1];
    assert_eq!(mug_line.product_id, mug.id);
    assert!(mug_line.product.is_none());
    assert_eq!(mug_line.price_at_purchase, dec!(12));

    // Reports are admin-only.
    let err = report_service::get_reports(&state, &customer)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Forbidden));

    // Backdated orders to pin down the daily grouping.
    for (day, total) in [(1, dec!(10)), (1, dec!(20)), (2, dec!(5))] {
        OrderActive {
            id: Set(Uuid::new_v4()),
            user_id: Set(customer.user_id),
            total: Set(total),
            created_at: Set(Utc.with_ymd_and_hms(2024, 1, day, 12, 0, 0).unwrap().into()),
        }
        .insert(&state.orm)
        .await
        .expect("insert backdated order");
    }

    let reports = report_service::get_reports(&state, &admin)
        .await
        .unwrap()
        .data
        .expect("reports data");

    let revenue_for = |y: i32, m: u32, d: u32| {
        let date = chrono::NaiveDate::from_ymd_opt(y, m, d).unwrap();
        reports
            .daily_revenue
            .iter()
            .find(|row| row.date == date)
            .map(|row| row.revenue)
    };
    assert_eq!(revenue_for(2024, 1, 1), Some(dec!(30)));
    assert_eq!(revenue_for(2024, 1, 2), Some(dec!(5)));
    assert!(
        reports
            .daily_revenue
            .windows(2)
            .all(|pair| pair[0].date > pair[1].date),
        "daily revenue must be sorted newest first"
    );

    // With the mug gone, only gadgets remain in the catalog aggregate.
    assert_eq!(reports.category_sales.len(), 1);
    assert_eq!(reports.category_sales[0].category, "gadgets");
    assert_eq!(reports.category_sales[0].total_products, 2);
}
