//! Test storage implementation with operation recording.
//!
//! Wraps an in-memory document and records every read and write, with
//! per-operation failure injection for exercising fallback and error paths.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use denial_catalog::storage::{BackendKind, CatalogBackend};
use denial_core::{Catalog, Error, Result};

/// Record of a backend operation for test assertions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendOp {
    /// A read was attempted.
    Read,
    /// A write was attempted.
    Write {
        /// Number of categories in the written catalog.
        categories: usize,
    },
}

/// A failure to return instead of performing an operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InjectedFailure {
    /// Behave as if no document exists.
    NotFound,
    /// Fail like a remote store would.
    Backend(String),
    /// Fail like a read-only filesystem would.
    PermissionDenied(String),
}

impl InjectedFailure {
    fn to_error(&self) -> Error {
        match self {
            Self::NotFound => Error::NotFound("injected".to_string()),
            Self::Backend(message) => Error::backend(message.clone()),
            Self::PermissionDenied(message) => Error::PermissionDenied {
                message: message.clone(),
            },
        }
    }
}

/// In-memory catalog backend with operation recording.
#[derive(Debug, Clone)]
pub struct RecordingBackend {
    kind: BackendKind,
    document: Arc<Mutex<Option<Catalog>>>,
    operations: Arc<Mutex<Vec<BackendOp>>>,
    read_failure: Arc<Mutex<Option<InjectedFailure>>>,
    write_failure: Arc<Mutex<Option<InjectedFailure>>>,
}

impl RecordingBackend {
    /// Creates an empty backend reporting `kind`.
    #[must_use]
    pub fn new(kind: BackendKind) -> Self {
        Self {
            kind,
            document: Arc::new(Mutex::new(None)),
            operations: Arc::new(Mutex::new(Vec::new())),
            read_failure: Arc::new(Mutex::new(None)),
            write_failure: Arc::new(Mutex::new(None)),
        }
    }

    /// Creates an empty file-kind backend.
    #[must_use]
    pub fn file() -> Self {
        Self::new(BackendKind::File)
    }

    /// Creates an empty remote-kind backend.
    #[must_use]
    pub fn remote() -> Self {
        Self::new(BackendKind::Remote)
    }

    /// Seeds the stored document without recording an operation.
    pub fn seed(&self, catalog: Catalog) {
        *self.document.lock().expect("lock") = Some(catalog);
    }

    /// The stored document, bypassing recording and failures.
    #[must_use]
    pub fn stored(&self) -> Option<Catalog> {
        self.document.lock().expect("lock").clone()
    }

    /// Returns all recorded operations.
    #[must_use]
    pub fn operations(&self) -> Vec<BackendOp> {
        self.operations.lock().expect("lock").clone()
    }

    /// Number of recorded writes.
    #[must_use]
    pub fn write_count(&self) -> usize {
        self.operations()
            .iter()
            .filter(|op| matches!(op, BackendOp::Write { .. }))
            .count()
    }

    /// Clears recorded operations.
    pub fn clear_operations(&self) {
        self.operations.lock().expect("lock").clear();
    }

    /// Makes subsequent reads fail.
    pub fn fail_reads(&self, failure: InjectedFailure) {
        *self.read_failure.lock().expect("lock") = Some(failure);
    }

    /// Makes subsequent writes fail.
    pub fn fail_writes(&self, failure: InjectedFailure) {
        *self.write_failure.lock().expect("lock") = Some(failure);
    }

    /// Clears all injected failures.
    pub fn clear_failures(&self) {
        *self.read_failure.lock().expect("lock") = None;
        *self.write_failure.lock().expect("lock") = None;
    }

    fn record(&self, op: BackendOp) {
        self.operations.lock().expect("lock").push(op);
    }
}

#[async_trait]
impl CatalogBackend for RecordingBackend {
    fn kind(&self) -> BackendKind {
        self.kind
    }

    async fn read(&self) -> Result<Catalog> {
        self.record(BackendOp::Read);
        if let Some(failure) = self.read_failure.lock().expect("lock").as_ref() {
            return Err(failure.to_error());
        }
        self.stored()
            .ok_or_else(|| Error::NotFound(format!("no {} document", self.kind)))
    }

    async fn write(&self, catalog: &Catalog) -> Result<()> {
        self.record(BackendOp::Write {
            categories: catalog.categories.len(),
        });
        if let Some(failure) = self.write_failure.lock().expect("lock").as_ref() {
            return Err(failure.to_error());
        }
        *self.document.lock().expect("lock") = Some(catalog.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn records_operations_in_order() {
        let backend = RecordingBackend::file();
        let _ = backend.read().await;
        backend.write(&Catalog::new()).await.expect("write");
        assert_eq!(
            backend.operations(),
            vec![BackendOp::Read, BackendOp::Write { categories: 0 }]
        );
    }

    #[tokio::test]
    async fn injected_write_failure_keeps_document() {
        let backend = RecordingBackend::remote();
        backend.seed(Catalog::new());
        backend.fail_writes(InjectedFailure::Backend("Firestore: UNAVAILABLE".into()));

        let mut changed = Catalog::new();
        changed
            .categories
            .push(denial_core::Category::new("a", "A"));
        let err = backend.write(&changed).await.unwrap_err();
        assert_eq!(err.to_string(), "Firestore: UNAVAILABLE");
        assert_eq!(backend.stored(), Some(Catalog::new()));
    }
}
