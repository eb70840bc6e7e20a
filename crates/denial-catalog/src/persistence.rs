//! Backend selection and fallback rules.
//!
//! The adapter owns one file backend and, optionally, one remote backend
//! handle built at process start. Which one serves an operation is decided
//! per call from the credential source:
//!
//! | Credentials | Read                                   | Write                  |
//! |-------------|----------------------------------------|------------------------|
//! | absent      | file                                   | file                   |
//! | present     | remote, falling back to file on error  | remote only, no fallback |
//!
//! A remote read that finds no document, or fails for any other reason,
//! falls through to the file. A remote write failure is returned to the
//! caller as-is and the file is never touched.

use std::sync::Arc;
use std::time::Instant;

use tracing::Instrument;

use denial_core::{Catalog, Error, Result, catalog_span};

use crate::credentials::{CredentialSource, NOT_CONFIGURED_MESSAGE};
use crate::metrics;
use crate::storage::{BackendKind, CatalogBackend};

/// Backend chosen for a single operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendSelection {
    /// Local JSON file.
    File,
    /// Remote document store.
    Remote,
}

impl BackendSelection {
    /// The matching backend kind.
    #[must_use]
    pub const fn kind(self) -> BackendKind {
        match self {
            Self::File => BackendKind::File,
            Self::Remote => BackendKind::Remote,
        }
    }
}

/// Routes catalog reads and writes to the selected backend.
pub struct PersistenceAdapter {
    file: Arc<dyn CatalogBackend>,
    remote: Option<Arc<dyn CatalogBackend>>,
    credentials: Arc<dyn CredentialSource>,
}

impl std::fmt::Debug for PersistenceAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PersistenceAdapter")
            .field("file", &"<CatalogBackend>")
            .field("remote", &self.remote.as_ref().map(|_| "<CatalogBackend>"))
            .field("credentials", &"<CredentialSource>")
            .finish()
    }
}

impl PersistenceAdapter {
    /// Creates an adapter with only a file backend.
    #[must_use]
    pub fn new(file: Arc<dyn CatalogBackend>, credentials: Arc<dyn CredentialSource>) -> Self {
        Self {
            file,
            remote: None,
            credentials,
        }
    }

    /// Attaches the remote backend handle.
    #[must_use]
    pub fn with_remote(mut self, remote: Arc<dyn CatalogBackend>) -> Self {
        self.remote = Some(remote);
        self
    }

    /// Backend that the next operation will use.
    #[must_use]
    pub fn selection(&self) -> BackendSelection {
        if self.credentials.is_configured() {
            BackendSelection::Remote
        } else {
            BackendSelection::File
        }
    }

    /// True when a remote handle was attached.
    #[must_use]
    pub fn has_remote(&self) -> bool {
        self.remote.is_some()
    }

    /// Reads the current catalog.
    ///
    /// # Errors
    ///
    /// Returns the file backend's error (`NotFound`, I/O, schema) when the
    /// file has to be consulted and fails.
    pub async fn read(&self) -> Result<Catalog> {
        let selection = self.selection();
        let span = catalog_span("read", selection.kind().as_str());

        async move {
            if selection == BackendSelection::Remote {
                match self.read_remote().await {
                    Ok(catalog) => return Ok(catalog),
                    Err(err) if err.is_not_found() => {
                        tracing::info!("remote catalog document missing; reading file");
                        metrics::record_fallback("not_found");
                    }
                    Err(err) => {
                        tracing::warn!(error = %err, "remote catalog read failed; reading file");
                        metrics::record_fallback("error");
                    }
                }
            }
            timed(BackendKind::File, "read", self.file.read()).await
        }
        .instrument(span)
        .await
    }

    /// Replaces the stored catalog.
    ///
    /// # Errors
    ///
    /// Returns the selected backend's error. A remote failure is never
    /// retried against the file.
    pub async fn write(&self, catalog: &Catalog) -> Result<()> {
        let selection = self.selection();
        let span = catalog_span("write", selection.kind().as_str());

        async move {
            match selection {
                BackendSelection::File => {
                    timed(BackendKind::File, "write", self.file.write(catalog)).await
                }
                BackendSelection::Remote => {
                    let remote = self.remote_handle()?;
                    timed(BackendKind::Remote, "write", remote.write(catalog)).await
                }
            }
        }
        .instrument(span)
        .await
    }

    async fn read_remote(&self) -> Result<Catalog> {
        let remote = self.remote_handle()?;
        timed(BackendKind::Remote, "read", remote.read()).await
    }

    fn remote_handle(&self) -> Result<&Arc<dyn CatalogBackend>> {
        self.remote
            .as_ref()
            .ok_or_else(|| Error::backend(NOT_CONFIGURED_MESSAGE))
    }
}

async fn timed<T>(
    backend: BackendKind,
    operation: &'static str,
    fut: impl std::future::Future<Output = Result<T>>,
) -> Result<T> {
    let start = Instant::now();
    let result = fut.await;
    let outcome = match &result {
        Ok(_) => "ok",
        Err(err) if err.is_not_found() => "not_found",
        Err(_) => "error",
    };
    metrics::record_backend_op(
        backend.as_str(),
        operation,
        outcome,
        start.elapsed().as_secs_f64(),
    );
    result
}
