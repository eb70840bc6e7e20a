//! Transport-agnostic catalog service.
//!
//! The service does no field-level editing. It hands out the current snapshot
//! and accepts a complete replacement, validating it before anything reaches
//! storage. Concurrent replacements are last-write-wins.

use std::sync::Arc;

use serde_json::Value;

use denial_core::{Catalog, Result};

use crate::metrics;
use crate::persistence::{BackendSelection, PersistenceAdapter};
use crate::schema;

/// Serves and replaces the catalog.
#[derive(Debug, Clone)]
pub struct CatalogService {
    adapter: Arc<PersistenceAdapter>,
}

impl CatalogService {
    /// Creates a service over `adapter`.
    #[must_use]
    pub fn new(adapter: Arc<PersistenceAdapter>) -> Self {
        Self { adapter }
    }

    /// Backend the next operation will use.
    #[must_use]
    pub fn selection(&self) -> BackendSelection {
        self.adapter.selection()
    }

    /// True when a remote backend handle is attached.
    #[must_use]
    pub fn has_remote(&self) -> bool {
        self.adapter.has_remote()
    }

    /// Returns the current catalog.
    ///
    /// When no document exists in any backend the catalog is empty.
    ///
    /// # Errors
    ///
    /// Returns the underlying read failure; callers report it generically.
    pub async fn fetch(&self) -> Result<Catalog> {
        match self.adapter.read().await {
            Ok(catalog) => Ok(catalog),
            Err(err) if err.is_not_found() => {
                tracing::info!(error = %err, "no catalog document stored; serving empty catalog");
                Ok(Catalog::new())
            }
            Err(err) => {
                tracing::error!(error = %err, "failed to load catalog");
                Err(err)
            }
        }
    }

    /// Validates `candidate` and stores it as the whole catalog.
    ///
    /// Returns the stored catalog, which is now authoritative.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidSchema` without touching storage when the
    /// candidate is malformed, or the backend's error when the write fails.
    pub async fn replace(&self, candidate: &Value) -> Result<Catalog> {
        let catalog = schema::validate(candidate).inspect_err(|err| {
            metrics::record_schema_rejection();
            tracing::info!(error = %err, "rejected candidate catalog");
        })?;

        self.adapter.write(&catalog).await.inspect_err(|err| {
            tracing::error!(error = %err, "failed to store catalog");
        })?;

        tracing::info!(
            categories = catalog.categories.len(),
            keywords = catalog.keyword_count(),
            backend = %self.adapter.selection().kind(),
            "catalog replaced"
        );
        Ok(catalog)
    }
}
