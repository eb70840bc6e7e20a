//! Catalog API routes.
//!
//! The catalog is read and written as one document; there is no per-item API.
//!
//! ## Routes
//!
//! - `GET  /catalog` - Fetch the whole catalog
//! - `PUT  /catalog` - Replace the whole catalog
//! - `POST /catalog` - Alias of `PUT`

use std::sync::Arc;

use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use bytes::Bytes;
use serde::Serialize;
use serde_json::Value;
use utoipa::ToSchema;

use denial_core::Catalog;

use crate::context::RequestContext;
use crate::error::{ApiError, ApiErrorBody, ApiResult};
use crate::server::AppState;

/// Response to a successful catalog replacement.
#[derive(Debug, Serialize, ToSchema)]
#[cfg_attr(test, derive(serde::Deserialize))]
pub struct SaveResponse {
    /// Always `true`.
    pub success: bool,
}

/// Creates catalog routes.
pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route(
        "/catalog",
        get(get_catalog).put(put_catalog).post(post_catalog),
    )
}

/// Fetch the catalog.
///
/// GET /catalog
#[utoipa::path(
    get,
    path = "/catalog",
    tag = "catalog",
    responses(
        (status = 200, description = "Current catalog", body = Catalog),
        (status = 500, description = "Catalog could not be read", body = ApiErrorBody),
    )
)]
pub(crate) async fn get_catalog(
    ctx: RequestContext,
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<Catalog>> {
    let catalog = state.service.fetch().await.map_err(|err| {
        tracing::error!(request_id = %ctx.request_id, error = %err, "catalog fetch failed");
        ApiError::load_failed().with_request_id(&ctx.request_id)
    })?;

    tracing::debug!(
        request_id = %ctx.request_id,
        categories = catalog.categories.len(),
        "Serving catalog"
    );
    Ok(Json(catalog))
}

/// Replace the catalog.
///
/// PUT /catalog
#[utoipa::path(
    put,
    path = "/catalog",
    tag = "catalog",
    request_body = Catalog,
    responses(
        (status = 200, description = "Catalog replaced", body = SaveResponse),
        (status = 400, description = "Candidate is not a valid catalog", body = ApiErrorBody),
        (status = 500, description = "Backend failure", body = ApiErrorBody),
    )
)]
pub(crate) async fn put_catalog(
    ctx: RequestContext,
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> ApiResult<Json<SaveResponse>> {
    save(&ctx, &state, &body).await
}

/// Replace the catalog (alias of `PUT`).
///
/// POST /catalog
#[utoipa::path(
    post,
    path = "/catalog",
    tag = "catalog",
    request_body = Catalog,
    responses(
        (status = 200, description = "Catalog replaced", body = SaveResponse),
        (status = 400, description = "Candidate is not a valid catalog", body = ApiErrorBody),
        (status = 500, description = "Backend failure", body = ApiErrorBody),
    )
)]
pub(crate) async fn post_catalog(
    ctx: RequestContext,
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> ApiResult<Json<SaveResponse>> {
    save(&ctx, &state, &body).await
}

async fn save(
    ctx: &RequestContext,
    state: &AppState,
    body: &[u8],
) -> ApiResult<Json<SaveResponse>> {
    // A body that is not JSON at all gets the same rejection as a bad shape.
    let candidate: Value = serde_json::from_slice(body).map_err(|err| {
        tracing::info!(request_id = %ctx.request_id, error = %err, "catalog body is not JSON");
        ApiError::invalid_schema().with_request_id(&ctx.request_id)
    })?;

    let catalog = state
        .service
        .replace(&candidate)
        .await
        .map_err(|err| ApiError::from(err).with_request_id(&ctx.request_id))?;

    tracing::info!(
        request_id = %ctx.request_id,
        categories = catalog.categories.len(),
        "Catalog saved"
    );
    Ok(Json(SaveResponse { success: true }))
}
