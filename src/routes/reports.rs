use axum::{Json, Router, extract::State, routing::get};

use crate::{
    dto::reports::ReportsResponse,
    error::AppResult,
    middleware::auth::AuthUser,
    response::ApiResponse,
    services::report_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new().route("/", get(get_reports))
}

#[utoipa::path(
    get,
    path = "/api/reports",
    responses(
        (status = 200, description = "Daily revenue and category sales", body = ApiResponse<ReportsResponse>),
        (status = 403, description = "Forbidden"),
    ),
    security(("bearer_auth" = [])),
    tag = "Reports"
)]
pub async fn get_reports(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<ApiResponse<ReportsResponse>>> {
    let resp = report_service::get_reports(&state, &user).await?;
    Ok(Json(resp))
}
