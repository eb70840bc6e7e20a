//! HTTP route handlers.

pub mod catalog;

use std::sync::Arc;

use axum::Router;

use crate::server::AppState;

/// Catalog routes.
pub fn catalog_routes() -> Router<Arc<AppState>> {
    catalog::routes()
}
