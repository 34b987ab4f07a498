use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;
use utoipa::ToSchema;

use crate::models::CategorySales;

#[derive(Debug, Serialize, ToSchema)]
pub struct DailyRevenue {
    pub date: NaiveDate,
    pub revenue: Decimal,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ReportsResponse {
    pub daily_revenue: Vec<DailyRevenue>,
    pub category_sales: Vec<CategorySales>,
}
