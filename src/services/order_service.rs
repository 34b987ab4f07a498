use chrono::Utc;
use futures::future::join_all;
use rust_decimal::Decimal;
use sea_orm::ActiveValue::NotSet;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, QueryFilter, QueryOrder, Set,
    TransactionTrait,
};
use uuid::Uuid;

use crate::{
    audit::log_audit,
    catalog::ProductCatalog,
    dto::orders::{
        CheckoutRequest, EnrichedOrder, EnrichedOrderItem, OrderList, OrderWithItems,
        ProductSnapshot,
    },
    entity::{
        order_items::{
            ActiveModel as OrderItemActive, Column as OrderItemCol, Entity as OrderItems,
            Model as OrderItemModel,
        },
        orders::{
            ActiveModel as OrderActive, Column as OrderCol, Entity as Orders, Model as OrderModel,
        },
    },
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    models::{Order, OrderItem},
    response::{ApiResponse, Meta},
    state::AppState,
};

/// Create an order from a cart. Every line is resolved against the catalog
/// before anything is written, so a missing product aborts the whole call;
/// the order and its items then go in under one transaction.
pub async fn checkout(
    state: &AppState,
    user: &AuthUser,
    payload: CheckoutRequest,
) -> AppResult<ApiResponse<OrderWithItems>> {
    if payload.items.is_empty() {
        return Err(AppError::EmptyCart);
    }

    // Phase one: resolve. The price read here becomes the permanent
    // price_at_purchase snapshot for the line.
    let mut resolved: Vec<(String, i32, Decimal)> = Vec::with_capacity(payload.items.len());
    let mut total = Decimal::ZERO;
    for line in &payload.items {
        if line.quantity <= 0 {
            return Err(AppError::BadRequest(
                "quantity must be greater than 0".into(),
            ));
        }
        let product = state
            .catalog
            .find_by_id(&line.product_id)
            .await?
            .ok_or_else(|| AppError::ProductNotFound(line.product_id.clone()))?;

        // Exact accumulation, no rounding; rounding only happens at display
        // time in list_orders.
        total += product.price * Decimal::from(line.quantity);
        resolved.push((line.product_id.clone(), line.quantity, product.price));
    }

    // Phase two: commit the aggregate.
    let txn = state.orm.begin().await?;

    let order = OrderActive {
        id: Set(Uuid::new_v4()),
        user_id: Set(user.user_id),
        total: Set(total),
        created_at: NotSet,
    }
    .insert(&txn)
    .await?;

    let mut items: Vec<OrderItem> = Vec::with_capacity(resolved.len());
    for (line_no, (product_id, quantity, price)) in resolved.into_iter().enumerate() {
        let item = OrderItemActive {
            id: Set(Uuid::new_v4()),
            order_id: Set(order.id),
            product_id: Set(product_id),
            line_no: Set(line_no as i32),
            quantity: Set(quantity),
            price_at_purchase: Set(price),
            created_at: NotSet,
        }
        .insert(&txn)
        .await?;
        items.push(order_item_from_entity(item));
    }

    txn.commit().await?;

    if let Err(err) = log_audit(
        &state.orm,
        Some(user.user_id),
        "checkout",
        Some("orders"),
        Some(serde_json::json!({ "order_id": order.id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Checkout success",
        OrderWithItems {
            order: order_from_entity(order),
            items,
        },
        Some(Meta::empty()),
    ))
}

/// All orders for a user, most recent first, with each stored line enriched
/// by a best-effort live catalog lookup.
pub async fn list_orders(state: &AppState, user: &AuthUser) -> AppResult<ApiResponse<OrderList>> {
    let orders = Orders::find()
        .filter(OrderCol::UserId.eq(user.user_id))
        .order_by_desc(OrderCol::CreatedAt)
        .order_by_desc(OrderCol::Id)
        .all(&state.orm)
        .await?;

    let mut enriched_orders = Vec::with_capacity(orders.len());
    for order in orders {
        let items = OrderItems::find()
            .filter(OrderItemCol::OrderId.eq(order.id))
            .order_by_asc(OrderItemCol::LineNo)
            .all(&state.orm)
            .await?;

        // Independent reads: issue the lookups concurrently. join_all keeps
        // the results in input order, so the persisted line order survives.
        let lookups = items
            .iter()
            .map(|item| state.catalog.find_by_id(&item.product_id));
        let snapshots = join_all(lookups).await;

        let enriched_items = items
            .into_iter()
            .zip(snapshots)
            .map(|(item, lookup)| enrich_item(item, lookup))
            .collect();

        enriched_orders.push(EnrichedOrder {
            id: order.id,
            user_id: order.user_id,
            total: order.total,
            created_at: order.created_at.with_timezone(&Utc),
            items: enriched_items,
        });
    }

    Ok(ApiResponse::success(
        "Ok",
        OrderList {
            items: enriched_orders,
        },
        Some(Meta::empty()),
    ))
}

pub async fn get_order(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<OrderWithItems>> {
    let order = Orders::find()
        .filter(
            Condition::all()
                .add(OrderCol::UserId.eq(user.user_id))
                .add(OrderCol::Id.eq(id)),
        )
        .one(&state.orm)
        .await?;
    let order = match order {
        Some(o) => o,
        None => return Err(AppError::NotFound),
    };

    let items = OrderItems::find()
        .filter(OrderItemCol::OrderId.eq(order.id))
        .order_by_asc(OrderItemCol::LineNo)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(order_item_from_entity)
        .collect();

    Ok(ApiResponse::success(
        "OK",
        OrderWithItems {
            order: order_from_entity(order),
            items,
        },
        Some(Meta::empty()),
    ))
}

/// Per-line display subtotal: purchase-time price times quantity, rounded
/// to 2 decimal places. The stored order total is never recomputed from
/// this.
pub fn display_subtotal(price_at_purchase: Decimal, quantity: i32) -> Decimal {
    (price_at_purchase * Decimal::from(quantity)).round_dp(2)
}

fn enrich_item(
    item: OrderItemModel,
    lookup: AppResult<Option<crate::models::CatalogProduct>>,
) -> EnrichedOrderItem {
    let product = match lookup {
        Ok(Some(p)) => Some(ProductSnapshot {
            id: p.id,
            sku: p.sku,
            name: p.name,
            category: p.category,
            price: p.price,
            description: p.description,
        }),
        Ok(None) => None,
        Err(err) => {
            // Degraded display data for this line only; the request as a
            // whole still succeeds.
            tracing::warn!(
                error = %err,
                product_id = %item.product_id,
                "catalog lookup failed during enrichment"
            );
            None
        }
    };

    EnrichedOrderItem {
        id: item.id,
        subtotal: display_subtotal(item.price_at_purchase, item.quantity),
        product_id: item.product_id,
        quantity: item.quantity,
        price_at_purchase: item.price_at_purchase,
        product,
    }
}

fn order_from_entity(model: OrderModel) -> Order {
    Order {
        id: model.id,
        user_id: model.user_id,
        total: model.total,
        created_at: model.created_at.with_timezone(&Utc),
    }
}

fn order_item_from_entity(model: OrderItemModel) -> OrderItem {
    OrderItem {
        id: model.id,
        order_id: model.order_id,
        product_id: model.product_id,
        line_no: model.line_no,
        quantity: model.quantity,
        price_at_purchase: model.price_at_purchase,
        created_at: model.created_at.with_timezone(&Utc),
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;

    use super::display_subtotal;

    #[test]
    fn subtotal_rounds_to_two_decimals() {
        assert_eq!(display_subtotal(dec!(10.005), 3), dec!(30.02));
        assert_eq!(display_subtotal(dec!(12), 2), dec!(24));
        assert_eq!(display_subtotal(dec!(0.333), 3), dec!(1.00));
    }
}
