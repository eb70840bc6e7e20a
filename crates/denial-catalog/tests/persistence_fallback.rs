//! Integration tests for backend selection, read fallback, and write failures.
//!
//! These tests drive the adapter and service through recording backends so the
//! exact sequence of backend calls can be asserted.

use std::sync::Arc;

use anyhow::Result;
use denial_catalog::credentials::StaticCredentialSource;
use denial_catalog::persistence::BackendSelection;
use denial_catalog::storage::FileBackend;
use denial_catalog::{CatalogService, PersistenceAdapter, mutation};
use denial_core::{Catalog, Error};
use denial_test_utils::{
    BackendOp, InjectedFailure, TestContext, assert_catalog_invariants,
    assert_image_quality_catalog, image_quality_catalog, image_quality_json, sample_catalog,
    test_credentials,
};
use serde_json::json;

#[tokio::test]
async fn test_file_only_reads_and_writes_file() -> Result<()> {
    let ctx = TestContext::file_only();
    assert_eq!(ctx.adapter.selection(), BackendSelection::File);

    ctx.service.replace(&image_quality_json()).await?;
    assert_image_quality_catalog(&ctx.service.fetch().await?);

    assert_eq!(ctx.file.write_count(), 1);
    assert!(ctx.remote.operations().is_empty());
    Ok(())
}

#[tokio::test]
async fn test_remote_read_prefers_remote_document() -> Result<()> {
    let ctx = TestContext::with_remote();
    ctx.file.seed(sample_catalog());
    ctx.remote.seed(image_quality_catalog());

    assert_image_quality_catalog(&ctx.service.fetch().await?);
    assert!(ctx.file.operations().is_empty());
    Ok(())
}

#[tokio::test]
async fn test_remote_missing_document_falls_through_to_file() -> Result<()> {
    let ctx = TestContext::with_remote();
    ctx.file.seed(sample_catalog());

    assert_eq!(ctx.service.fetch().await?, sample_catalog());
    assert_eq!(ctx.remote.operations(), vec![BackendOp::Read]);
    assert_eq!(ctx.file.operations(), vec![BackendOp::Read]);
    Ok(())
}

#[tokio::test]
async fn test_remote_read_error_falls_back_to_file() -> Result<()> {
    let ctx = TestContext::with_remote();
    ctx.file.seed(sample_catalog());
    ctx.remote
        .fail_reads(InjectedFailure::Backend("Firestore: UNAVAILABLE".into()));

    assert_eq!(ctx.service.fetch().await?, sample_catalog());
    Ok(())
}

#[tokio::test]
async fn test_remote_write_failure_does_not_touch_file() -> Result<()> {
    let ctx = TestContext::with_remote();
    ctx.remote.seed(sample_catalog());
    ctx.remote.fail_writes(InjectedFailure::Backend(
        "Firestore: PERMISSION_DENIED Missing or insufficient permissions.".into(),
    ));

    let err = ctx.service.replace(&image_quality_json()).await.unwrap_err();
    assert!(matches!(err, Error::Backend { .. }));
    assert_eq!(
        err.to_string(),
        "Firestore: PERMISSION_DENIED Missing or insufficient permissions."
    );

    assert!(ctx.file.operations().is_empty());
    assert_eq!(ctx.remote.stored(), Some(sample_catalog()));
    assert_eq!(ctx.service.fetch().await?, sample_catalog());
    Ok(())
}

#[tokio::test]
async fn test_selection_is_rechecked_per_operation() -> Result<()> {
    let ctx = TestContext::with_remote();

    ctx.service.replace(&image_quality_json()).await?;
    assert_eq!(ctx.remote.write_count(), 1);

    ctx.credentials.set_enabled(false);
    ctx.service.replace(&json!({"categories": []})).await?;
    assert_eq!(ctx.file.write_count(), 1);
    assert_eq!(ctx.file.stored(), Some(Catalog::new()));
    assert_eq!(ctx.remote.stored(), Some(image_quality_catalog()));
    Ok(())
}

#[tokio::test]
async fn test_schema_rejection_reaches_no_backend() -> Result<()> {
    let ctx = TestContext::with_remote();

    let err = ctx
        .service
        .replace(&json!({"categories": [{"id": "x"}]}))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::InvalidSchema { .. }));
    assert!(ctx.remote.operations().is_empty());
    assert!(ctx.file.operations().is_empty());
    Ok(())
}

#[tokio::test]
async fn test_file_read_failure_surfaces_from_fetch() -> Result<()> {
    let ctx = TestContext::file_only();
    ctx.file
        .fail_reads(InjectedFailure::PermissionDenied("denied".into()));

    let err = ctx.service.fetch().await.unwrap_err();
    assert!(matches!(err, Error::PermissionDenied { .. }));
    Ok(())
}

#[tokio::test]
async fn test_mutations_through_real_file_backend() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let adapter = PersistenceAdapter::new(
        Arc::new(FileBackend::new(dir.path().join("data/denial-prompts.json"))),
        Arc::new(StaticCredentialSource::none()),
    );
    let service = CatalogService::new(Arc::new(adapter));

    let current = service.fetch().await?;
    assert!(current.is_empty());

    let next = mutation::add_category(&current, "Image Quality")?;
    service.replace(&serde_json::to_value(&next)?).await?;

    let current = service.fetch().await?;
    let next = mutation::add_keyword(&current, "image-quality", "Blurry", "Photo is blurry.")?;
    service.replace(&serde_json::to_value(&next)?).await?;

    let fetched = service.fetch().await?;
    assert_image_quality_catalog(&fetched);
    assert_catalog_invariants(&fetched);
    Ok(())
}

#[tokio::test]
async fn test_configured_credentials_without_handle_fail_writes() -> Result<()> {
    let ctx = TestContext::file_only();
    let adapter = PersistenceAdapter::new(
        Arc::new(ctx.file.clone()),
        Arc::new(StaticCredentialSource::configured(test_credentials())),
    );
    let service = CatalogService::new(Arc::new(adapter));

    let err = service.replace(&image_quality_json()).await.unwrap_err();
    assert!(err.to_string().contains("FIREBASE_PROJECT_ID"));
    assert_eq!(ctx.file.write_count(), 0);
    Ok(())
}
