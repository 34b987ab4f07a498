use chrono::NaiveDate;
use rust_decimal::Decimal;
use sea_orm::{ConnectionTrait, FromQueryResult, Statement};

use crate::{
    dto::reports::{DailyRevenue, ReportsResponse},
    error::AppResult,
    middleware::auth::{AuthUser, ensure_admin},
    response::{ApiResponse, Meta},
    state::AppState,
};

#[derive(Debug, FromQueryResult)]
struct DailyRevenueRow {
    date: NaiveDate,
    revenue: Decimal,
}

/// Admin dashboard aggregates: daily revenue from the order ledger and
/// category sales from the catalog. Nothing is cached; every call
/// recomputes from current data.
pub async fn get_reports(
    state: &AppState,
    user: &AuthUser,
) -> AppResult<ApiResponse<ReportsResponse>> {
    ensure_admin(user)?;

    let backend = state.orm.get_database_backend();
    let rows = DailyRevenueRow::find_by_statement(Statement::from_string(
        backend,
        "SELECT CAST(created_at AS DATE) AS date, SUM(total) AS revenue \
         FROM orders \
         GROUP BY CAST(created_at AS DATE) \
         ORDER BY CAST(created_at AS DATE) DESC",
    ))
    .all(&state.orm)
    .await?;

    let daily_revenue = rows
        .into_iter()
        .map(|row| DailyRevenue {
            date: row.date,
            revenue: row.revenue,
        })
        .collect();

    let category_sales = state.catalog.aggregate_by_category().await?;

    Ok(ApiResponse::success(
        "Reports",
        ReportsResponse {
            daily_revenue,
            category_sales,
        },
        Some(Meta::empty()),
    ))
}
