//! API integration tests.
//!
//! Tests the complete request flow: HTTP → routes → service → backends.

use std::sync::Arc;

use anyhow::{Context, Result};
use axum::body::Body;
use axum::http::{Method, Request, StatusCode, header};
use serde_json::{Value, json};
use tower::ServiceExt;

use denial_api::server::ServerBuilder;
use denial_catalog::credentials::StaticCredentialSource;
use denial_catalog::storage::FirestoreBackend;
use denial_catalog::storage::firestore::{FirestoreConfig, StaticToken};
use denial_catalog::{CatalogService, PersistenceAdapter};
use denial_core::Catalog;
use denial_test_utils::{
    FakeFirestore, RecordingBackend, TestContext, assert_image_quality_catalog,
    image_quality_catalog, image_quality_json, sample_catalog, test_credentials,
};

fn router_for(service: CatalogService) -> axum::Router {
    ServerBuilder::new()
        .debug(true)
        .service(service)
        .build()
        .test_router()
}

mod helpers {
    use super::*;

    pub fn make_request(method: Method, uri: &str, body: Option<Body>) -> Result<Request<Body>> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(body.unwrap_or_else(Body::empty))
            .context("build request")
    }

    pub async fn send(
        router: axum::Router,
        request: Request<Body>,
    ) -> Result<(StatusCode, Value)> {
        let response = router.oneshot(request).await.map_err(|err| match err {})?;
        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
            .await
            .context("read response body")?;
        let json = serde_json::from_slice(&body).with_context(|| {
            format!(
                "parse JSON response (status={status}): {}",
                String::from_utf8_lossy(&body)
            )
        })?;
        Ok((status, json))
    }

    pub async fn get_catalog(router: axum::Router) -> Result<(StatusCode, Value)> {
        send(router, make_request(Method::GET, "/catalog", None)?).await
    }

    pub async fn put_catalog(router: axum::Router, body: &Value) -> Result<(StatusCode, Value)> {
        let body = Body::from(serde_json::to_vec(body).context("serialize request body")?);
        send(router, make_request(Method::PUT, "/catalog", Some(body))?).await
    }
}

#[tokio::test]
async fn test_get_on_empty_store_returns_empty_catalog() -> Result<()> {
    let ctx = TestContext::file_only();
    let (status, body) = helpers::get_catalog(router_for(ctx.service.clone())).await?;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"categories": []}));
    Ok(())
}

#[tokio::test]
async fn test_put_then_get_returns_saved_catalog() -> Result<()> {
    let ctx = TestContext::file_only();
    let router = router_for(ctx.service.clone());

    let (status, body) = helpers::put_catalog(router.clone(), &image_quality_json()).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"success": true}));

    let (status, body) = helpers::get_catalog(router).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, image_quality_json());

    let fetched: Catalog = serde_json::from_value(body)?;
    assert_image_quality_catalog(&fetched);
    Ok(())
}

#[tokio::test]
async fn test_post_is_accepted_as_put_alias() -> Result<()> {
    let ctx = TestContext::file_only();
    let router = router_for(ctx.service.clone());

    let body = Body::from(serde_json::to_vec(&image_quality_json())?);
    let request = helpers::make_request(Method::POST, "/catalog", Some(body))?;
    let (status, body) = helpers::send(router, request).await?;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(ctx.file.stored(), Some(image_quality_catalog()));
    Ok(())
}

#[tokio::test]
async fn test_invalid_shape_is_rejected_and_store_unchanged() -> Result<()> {
    let ctx = TestContext::file_only();
    ctx.file.seed(sample_catalog());
    let router = router_for(ctx.service.clone());

    let (status, body) =
        helpers::put_catalog(router.clone(), &json!({"categories": [{"id": "x"}]})).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Invalid data: expected { categories: [...] }");
    assert_eq!(body["code"], "INVALID_SCHEMA");

    assert_eq!(ctx.file.write_count(), 0);
    let (_, body) = helpers::get_catalog(router).await?;
    assert_eq!(serde_json::from_value::<Catalog>(body)?, sample_catalog());
    Ok(())
}

#[tokio::test]
async fn test_malformed_json_is_rejected_as_invalid_schema() -> Result<()> {
    let ctx = TestContext::file_only();
    let router = router_for(ctx.service.clone());

    let request = helpers::make_request(
        Method::PUT,
        "/catalog",
        Some(Body::from("{\"categories\": [")),
    )?;
    let (status, body) = helpers::send(router, request).await?;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "INVALID_SCHEMA");
    assert!(ctx.file.operations().is_empty());
    Ok(())
}

#[tokio::test]
async fn test_read_only_file_reports_permission_denied() -> Result<()> {
    let ctx = TestContext::file_only();
    ctx.file.fail_writes(denial_test_utils::InjectedFailure::PermissionDenied(
        denial_catalog::storage::file::READ_ONLY_MESSAGE.to_string(),
    ));
    let router = router_for(ctx.service.clone());

    let (status, body) = helpers::put_catalog(router, &image_quality_json()).await?;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["code"], "PERMISSION_DENIED");
    assert!(
        body["error"]
            .as_str()
            .is_some_and(|m| m.starts_with("Cannot write to filesystem"))
    );
    Ok(())
}

#[tokio::test]
async fn test_load_failure_is_reported_generically() -> Result<()> {
    let ctx = TestContext::file_only();
    ctx.file.fail_reads(denial_test_utils::InjectedFailure::Backend(
        "disk on fire".to_string(),
    ));
    let router = router_for(ctx.service.clone());

    let (status, body) = helpers::get_catalog(router).await?;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, json!({"error": "Failed to load catalog", "code": "LOAD_FAILED"}));
    Ok(())
}

#[tokio::test]
async fn test_rejected_remote_credentials_keep_last_good_state() -> Result<()> {
    let server = FakeFirestore::start().await?;
    server.require_token("valid-token");

    let config = FirestoreConfig::new("test-project").with_base_url(server.base_url());
    let remote = FirestoreBackend::new(&config, Arc::new(StaticToken::new("revoked-token")))?;

    let file = RecordingBackend::file();
    file.seed(image_quality_catalog());
    let adapter = PersistenceAdapter::new(
        Arc::new(file.clone()),
        Arc::new(StaticCredentialSource::configured(test_credentials())),
    )
    .with_remote(Arc::new(remote));
    let router = router_for(CatalogService::new(Arc::new(adapter)));

    let (status, body) = helpers::put_catalog(router.clone(), &json!({"categories": []})).await?;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["code"], "BACKEND_ERROR");
    assert_eq!(
        body["error"],
        "Firestore: UNAUTHENTICATED Request had invalid authentication credentials."
    );
    assert!(server.fields().is_none());
    assert_eq!(file.write_count(), 0);

    let (status, body) = helpers::get_catalog(router).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, image_quality_json());
    Ok(())
}

#[tokio::test]
async fn test_remote_round_trip_through_http() -> Result<()> {
    let server = FakeFirestore::start().await?;
    let config = FirestoreConfig::new("test-project").with_base_url(server.base_url());
    let remote = FirestoreBackend::new(&config, Arc::new(StaticToken::anonymous()))?;

    let file = RecordingBackend::file();
    let adapter = PersistenceAdapter::new(
        Arc::new(file.clone()),
        Arc::new(StaticCredentialSource::configured(test_credentials())),
    )
    .with_remote(Arc::new(remote));
    let router = router_for(CatalogService::new(Arc::new(adapter)));

    let (status, _) = helpers::put_catalog(router.clone(), &image_quality_json()).await?;
    assert_eq!(status, StatusCode::OK);

    let (_, body) = helpers::get_catalog(router).await?;
    assert_eq!(body, image_quality_json());
    assert!(file.operations().is_empty());
    Ok(())
}

#[tokio::test]
async fn test_request_id_is_echoed() -> Result<()> {
    let router = ServerBuilder::new().build().test_router();

    let request = Request::builder()
        .uri("/catalog")
        .header("x-request-id", "trace-abc")
        .body(Body::empty())
        .context("build request")?;
    let response = router.oneshot(request).await.map_err(|err| match err {})?;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response
            .headers()
            .get("x-request-id")
            .and_then(|v| v.to_str().ok()),
        Some("trace-abc")
    );
    Ok(())
}

#[tokio::test]
async fn test_error_responses_carry_request_id() -> Result<()> {
    let router = ServerBuilder::new().build().test_router();

    let request = Request::builder()
        .method(Method::PUT)
        .uri("/catalog")
        .header("x-request-id", "trace-err")
        .body(Body::from("not json"))
        .context("build request")?;
    let response = router.oneshot(request).await.map_err(|err| match err {})?;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        response
            .headers()
            .get("x-request-id")
            .and_then(|v| v.to_str().ok()),
        Some("trace-err")
    );
    Ok(())
}

mod cors {
    use super::*;

    fn router_with_cors(allowed_origins: Vec<String>) -> axum::Router {
        ServerBuilder::new()
            .debug(true)
            .cors_allowed_origins(allowed_origins)
            .build()
            .test_router()
    }

    #[tokio::test]
    async fn test_cors_disabled_by_default() -> Result<()> {
        let router = ServerBuilder::new().build().test_router();

        let request = Request::builder()
            .uri("/health")
            .header("Origin", "http://localhost:3000")
            .body(Body::empty())
            .context("build request")?;
        let response = router.oneshot(request).await.map_err(|err| match err {})?;

        assert_eq!(response.status(), StatusCode::OK);
        assert!(
            !response
                .headers()
                .contains_key("access-control-allow-origin")
        );
        Ok(())
    }

    #[tokio::test]
    async fn test_cors_preflight_for_catalog_put() -> Result<()> {
        let router = router_with_cors(vec!["*".to_string()]);

        let request = Request::builder()
            .method(Method::OPTIONS)
            .uri("/catalog")
            .header("Origin", "http://localhost:3000")
            .header("Access-Control-Request-Method", "PUT")
            .header("Access-Control-Request-Headers", "content-type")
            .body(Body::empty())
            .context("build request")?;
        let response = router.oneshot(request).await.map_err(|err| match err {})?;

        assert_eq!(response.status(), StatusCode::OK);
        assert!(
            response
                .headers()
                .contains_key("access-control-allow-origin")
        );
        assert!(
            response
                .headers()
                .contains_key("access-control-allow-methods")
        );
        Ok(())
    }

    #[tokio::test]
    async fn test_cors_specific_origin_allows_matching_origin() -> Result<()> {
        let router = router_with_cors(vec!["https://admin.example".to_string()]);

        let request = Request::builder()
            .uri("/catalog")
            .header("Origin", "https://admin.example")
            .body(Body::empty())
            .context("build request")?;
        let response = router.oneshot(request).await.map_err(|err| match err {})?;

        let origin = response
            .headers()
            .get("access-control-allow-origin")
            .context("missing access-control-allow-origin")?;
        assert_eq!(origin, "https://admin.example");
        Ok(())
    }

    #[tokio::test]
    async fn test_cors_specific_origin_rejects_non_matching_origin() -> Result<()> {
        let router = router_with_cors(vec!["https://admin.example".to_string()]);

        let request = Request::builder()
            .uri("/catalog")
            .header("Origin", "https://elsewhere.example")
            .body(Body::empty())
            .context("build request")?;
        let response = router.oneshot(request).await.map_err(|err| match err {})?;

        assert_eq!(response.status(), StatusCode::OK);
        assert!(
            !response
                .headers()
                .contains_key("access-control-allow-origin")
        );
        Ok(())
    }
}

mod metrics {
    use super::*;

    #[tokio::test]
    async fn test_metrics_endpoint_renders_prometheus_text() -> Result<()> {
        denial_api::metrics::init_metrics();
        denial_catalog::metrics::register_metrics();
        let router = ServerBuilder::new().build().test_router();

        let _ = helpers::get_catalog(router.clone()).await?;

        let request = Request::builder()
            .uri("/metrics")
            .body(Body::empty())
            .context("build request")?;
        let response = router.oneshot(request).await.map_err(|err| match err {})?;
        assert_eq!(response.status(), StatusCode::OK);

        let body = axum::body::to_bytes(response.into_body(), 256 * 1024)
            .await
            .context("read response body")?;
        let text = String::from_utf8(body.to_vec())?;
        assert!(text.contains("denial_api_requests_total"));
        Ok(())
    }
}
