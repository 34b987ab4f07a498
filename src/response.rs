use serde::Serialize;
use utoipa::ToSchema;

/// Pagination block for list endpoints (product browsing, admin listings).
/// All fields are null for single-resource responses.
#[derive(Debug, Serialize, ToSchema, Clone)]
pub struct Meta {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
    pub total: Option<i64>,
    pub total_pages: Option<i64>,
}

impl Meta {
    pub fn new(page: i64, per_page: i64, total: i64) -> Self {
        let per_page = per_page.max(1);
        Self {
            page: Some(page),
            per_page: Some(per_page),
            total: Some(total),
            total_pages: Some((total + per_page - 1) / per_page),
        }
    }

    pub fn empty() -> Self {
        Self {
            page: None,
            per_page: None,
            total: None,
            total_pages: None,
        }
    }
}

/// Uniform envelope for every endpoint. Errors use the same shape with
/// `data: null`, so clients can always read `message`.
#[derive(Debug, Serialize, ToSchema)]
pub struct ApiResponse<T> {
    pub message: String,
    pub data: Option<T>,
    pub meta: Option<Meta>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn success(message: impl Into<String>, data: T, meta: Option<Meta>) -> Self {
        Self {
            message: message.into(),
            data: Some(data),
            meta,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            data: None,
            meta: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Meta;

    #[test]
    fn meta_computes_total_pages() {
        let meta = Meta::new(1, 12, 25);
        assert_eq!(meta.total_pages, Some(3));

        let meta = Meta::new(1, 12, 0);
        assert_eq!(meta.total_pages, Some(0));

        let meta = Meta::new(2, 10, 20);
        assert_eq!(meta.total_pages, Some(2));
    }
}
