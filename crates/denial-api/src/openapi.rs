//! `OpenAPI` (3.1) specification generation for `denial-api`.

use axum::Json;
use axum::response::IntoResponse;
use utoipa::OpenApi;

/// `OpenAPI` documentation for the denial catalog REST API.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Denial Catalog API",
        version = env!("CARGO_PKG_VERSION"),
        description = "Whole-document read and replace for the denial reason catalog"
    ),
    paths(
        crate::routes::catalog::get_catalog,
        crate::routes::catalog::put_catalog,
        crate::routes::catalog::post_catalog,
    ),
    components(
        schemas(
            crate::error::ApiErrorBody,
            crate::routes::catalog::SaveResponse,
            denial_core::Catalog,
            denial_core::Category,
            denial_core::Keyword,
        )
    ),
    tags(
        (name = "catalog", description = "Denial reason catalog"),
    ),
)]
pub struct ApiDoc;

/// Returns the generated `OpenAPI` spec.
#[must_use]
pub fn openapi() -> utoipa::openapi::OpenApi {
    ApiDoc::openapi()
}

/// Returns the generated `OpenAPI` spec serialized as pretty JSON.
///
/// # Errors
///
/// Returns an error if JSON serialization fails (should not happen).
pub fn openapi_json() -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(&openapi())
}

/// Handler for `/openapi.json`.
pub async fn serve_openapi() -> impl IntoResponse {
    Json(openapi())
}
