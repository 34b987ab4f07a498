use std::sync::Arc;

use sea_orm::DatabaseConnection;

use crate::catalog::ProductCatalog;

/// Shared application state: one relational connection for the order ledger
/// and users, one catalog client for the product document store. Both are
/// constructed at startup and injected; nothing is lazily initialized.
#[derive(Clone)]
pub struct AppState {
    pub orm: DatabaseConnection,
    pub catalog: Arc<dyn ProductCatalog>,
}
