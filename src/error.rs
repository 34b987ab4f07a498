use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::response::ApiResponse;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not Found")]
    NotFound,

    #[error("Bad Request: {0}")]
    BadRequest(String),

    #[error("Forbidden")]
    Forbidden,

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Cart is empty")]
    EmptyCart,

    #[error("Product {0} not found")]
    ProductNotFound(String),

    #[error("Database error")]
    OrmError(#[from] sea_orm::DbErr),

    #[error("Catalog error")]
    CatalogError(#[from] mongodb::error::Error),

    #[error("Internal Server Error")]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::NotFound => StatusCode::NOT_FOUND,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Forbidden => StatusCode::FORBIDDEN,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::EmptyCart => StatusCode::BAD_REQUEST,
            AppError::ProductNotFound(_) => StatusCode::NOT_FOUND,
            AppError::OrmError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::CatalogError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = ApiResponse::<()>::error(self.to_string());
        (status, axum::Json(body)).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::AppError;

    #[test]
    fn payload_variants_separate_label_from_detail() {
        assert_eq!(
            AppError::BadRequest("quantity must be greater than 0".into()).to_string(),
            "Bad Request: quantity must be greater than 0"
        );
        assert_eq!(
            AppError::Conflict("SKU already exists".into()).to_string(),
            "Conflict: SKU already exists"
        );
        assert_eq!(
            AppError::ProductNotFound("abc123".into()).to_string(),
            "Product abc123 not found"
        );
    }
}
