use crate::{
    audit::log_audit,
    catalog::{CatalogQuery, NewProduct, ProductPatch},
    dto::products::{CreateProductRequest, ProductList, UpdateProductRequest},
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_admin},
    models::CatalogProduct,
    response::{ApiResponse, Meta},
    routes::params::{ProductQuery, SortOrder},
    state::AppState,
};

pub async fn list_products(
    state: &AppState,
    query: ProductQuery,
) -> AppResult<ApiResponse<ProductList>> {
    let (page, limit, offset) = query.pagination.normalize();

    let catalog_query = CatalogQuery {
        search: query.search,
        category: query.category,
        // Storefront default is most expensive first.
        price_ascending: matches!(query.sort_order, Some(SortOrder::Asc)),
        limit: limit as u64,
        offset: offset as u64,
    };

    let (items, total) = state.catalog.list(&catalog_query).await?;

    let meta = Meta::new(page, limit, total as i64);
    Ok(ApiResponse::success(
        "Products",
        ProductList { items },
        Some(meta),
    ))
}

pub async fn get_product(state: &AppState, id: &str) -> AppResult<ApiResponse<CatalogProduct>> {
    let product = state.catalog.find_by_id(id).await?;
    let product = match product {
        Some(p) => p,
        None => return Err(AppError::NotFound),
    };
    Ok(ApiResponse::success("Product", product, None))
}

pub async fn create_product(
    state: &AppState,
    user: &AuthUser,
    payload: CreateProductRequest,
) -> AppResult<ApiResponse<CatalogProduct>> {
    ensure_admin(user)?;

    if payload.sku.trim().is_empty() || payload.name.trim().is_empty() {
        return Err(AppError::BadRequest("sku and name required".into()));
    }

    if state.catalog.find_by_sku(&payload.sku).await?.is_some() {
        return Err(AppError::Conflict("SKU already exists".into()));
    }

    let product = state
        .catalog
        .insert(NewProduct {
            sku: payload.sku,
            name: payload.name,
            description: payload.description,
            price: payload.price,
            category: payload.category,
            stock: payload.stock,
        })
        .await?;

    if let Err(err) = log_audit(
        &state.orm,
        Some(user.user_id),
        "product_create",
        Some("products"),
        Some(serde_json::json!({ "product_id": product.id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Product created",
        product,
        Some(Meta::empty()),
    ))
}

pub async fn update_product(
    state: &AppState,
    user: &AuthUser,
    id: &str,
    payload: UpdateProductRequest,
) -> AppResult<ApiResponse<CatalogProduct>> {
    ensure_admin(user)?;

    // A changed SKU must stay unique across the catalog.
    if let Some(sku) = payload.sku.as_ref() {
        if let Some(other) = state.catalog.find_by_sku(sku).await? {
            if other.id != id {
                return Err(AppError::Conflict("SKU already exists".into()));
            }
        }
    }

    let patch = ProductPatch {
        sku: payload.sku,
        name: payload.name,
        description: payload.description,
        price: payload.price,
        category: payload.category,
        stock: payload.stock,
    };

    let product = match state.catalog.update(id, patch).await? {
        Some(p) => p,
        None => return Err(AppError::NotFound),
    };

    if let Err(err) = log_audit(
        &state.orm,
        Some(user.user_id),
        "product_update",
        Some("products"),
        Some(serde_json::json!({ "product_id": product.id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success("Updated", product, Some(Meta::empty())))
}

pub async fn delete_product(
    state: &AppState,
    user: &AuthUser,
    id: &str,
) -> AppResult<ApiResponse<serde_json::Value>> {
    ensure_admin(user)?;

    if !state.catalog.delete(id).await? {
        return Err(AppError::NotFound);
    }

    if let Err(err) = log_audit(
        &state.orm,
        Some(user.user_id),
        "product_delete",
        Some("products"),
        Some(serde_json::json!({ "product_id": id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Deleted",
        serde_json::json!({}),
        Some(Meta::empty()),
    ))
}
