use utoipa::{
    Modify, OpenApi,
    openapi::{
        self,
        OpenApi as OpenApiSpec,
        security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    },
};
use utoipa_scalar::{Scalar, Servable};

use crate::{
    dto::{
        auth::{LoginRequest, LoginResponse, RegisterRequest},
        orders::{
            CartLine, CheckoutRequest, EnrichedOrder, EnrichedOrderItem, OrderList,
            OrderWithItems, ProductSnapshot,
        },
        products,
        reports::{DailyRevenue, ReportsResponse},
    },
    models::{CatalogProduct, CategorySales, Order, OrderItem, User},
    response::{ApiResponse, Meta},
    routes::{admin, auth, health, orders, params, products as product_routes, reports},
};

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health_check,
        auth::register,
        auth::login,
        auth::me,
        product_routes::list_products,
        product_routes::get_product,
        product_routes::create_product,
        product_routes::update_product,
        product_routes::delete_product,
        orders::list_orders,
        orders::checkout,
        orders::get_order,
        reports::get_reports,
        admin::list_users,
        admin::list_all_orders
    ),
    components(
        schemas(
            User,
            CatalogProduct,
            CategorySales,
            Order,
            OrderItem,
            RegisterRequest,
            LoginRequest,
            LoginResponse,
            CheckoutRequest,
            CartLine,
            OrderWithItems,
            OrderList,
            EnrichedOrder,
            EnrichedOrderItem,
            ProductSnapshot,
            DailyRevenue,
            ReportsResponse,
            admin::UserList,
            admin::OrderSummaryList,
            params::Pagination,
            params::ProductQuery,
            products::ProductList,
            Meta,
            ApiResponse<CatalogProduct>,
            ApiResponse<products::ProductList>,
            ApiResponse<OrderWithItems>,
            ApiResponse<OrderList>,
            ApiResponse<ReportsResponse>
        )
    ),
    security(
        ("bearer_auth" = [])
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Health check endpoint"),
        (name = "Auth", description = "Authentication endpoints"),
        (name = "Products", description = "Product catalog endpoints"),
        (name = "Orders", description = "Checkout and order history endpoints"),
        (name = "Reports", description = "Admin reporting endpoints"),
        (name = "Admin", description = "Admin endpoints"),
    )
)]
pub struct ApiDoc;

pub fn scalar_docs() -> Scalar<OpenApiSpec> {
    Scalar::with_url("/docs", ApiDoc::openapi())
}
