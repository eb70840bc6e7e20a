//! In-memory catalog backend.

use std::sync::{Arc, RwLock};

use async_trait::async_trait;

use denial_core::{Catalog, Error, Result};

use super::{BackendKind, CatalogBackend};

/// In-process backend holding at most one catalog.
///
/// Clones share the same document. The reported kind is configurable so tests
/// can stand one in for either the file or the remote backend.
#[derive(Debug, Clone)]
pub struct MemoryBackend {
    kind: BackendKind,
    document: Arc<RwLock<Option<Catalog>>>,
}

impl Default for MemoryBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryBackend {
    /// Creates an empty backend reporting [`BackendKind::File`].
    #[must_use]
    pub fn new() -> Self {
        Self::with_kind(BackendKind::File)
    }

    /// Creates an empty backend reporting the given kind.
    #[must_use]
    pub fn with_kind(kind: BackendKind) -> Self {
        Self {
            kind,
            document: Arc::new(RwLock::new(None)),
        }
    }

    /// Creates a backend already holding `catalog`.
    #[must_use]
    pub fn with_catalog(kind: BackendKind, catalog: Catalog) -> Self {
        Self {
            kind,
            document: Arc::new(RwLock::new(Some(catalog))),
        }
    }
}

#[async_trait]
impl CatalogBackend for MemoryBackend {
    fn kind(&self) -> BackendKind {
        self.kind
    }

    async fn read(&self) -> Result<Catalog> {
        let document = self.document.read().map_err(|_| Error::Internal {
            message: "lock poisoned".into(),
        })?;

        document
            .clone()
            .ok_or_else(|| Error::NotFound(format!("no {} catalog document", self.kind)))
    }

    async fn write(&self, catalog: &Catalog) -> Result<()> {
        let mut document = self.document.write().map_err(|_| Error::Internal {
            message: "lock poisoned".into(),
        })?;
        *document = Some(catalog.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use denial_core::Category;

    #[tokio::test]
    async fn read_before_write_is_not_found() {
        let backend = MemoryBackend::new();
        let err = backend.read().await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn write_then_read_returns_catalog() {
        let backend = MemoryBackend::with_kind(BackendKind::Remote);
        let catalog = Catalog {
            categories: vec![Category::new("a", "A")],
        };
        backend.write(&catalog).await.expect("write");
        assert_eq!(backend.read().await.expect("read"), catalog);
        assert_eq!(backend.kind(), BackendKind::Remote);
    }

    #[tokio::test]
    async fn clones_share_document() {
        let backend = MemoryBackend::new();
        let other = backend.clone();
        backend.write(&Catalog::new()).await.expect("write");
        assert_eq!(other.read().await.expect("read"), Catalog::new());
    }
}
