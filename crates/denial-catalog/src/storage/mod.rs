//! Storage backends for the catalog document.
//!
//! Each backend stores exactly one document holding the whole catalog. The
//! contract is two calls: read the snapshot, replace the snapshot.
//!
//! - [`file::FileBackend`]: pretty-printed JSON on the local filesystem
//! - [`firestore::FirestoreBackend`]: a single remote Firestore document
//! - [`memory::MemoryBackend`]: in-process, for tests and local development

pub mod file;
pub mod firestore;
pub mod memory;

use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use denial_core::{Catalog, Result};

pub use file::FileBackend;
pub use firestore::FirestoreBackend;
pub use memory::MemoryBackend;

/// Which storage mechanism a backend represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// Local JSON document.
    File,
    /// Remote document store.
    Remote,
}

impl BackendKind {
    /// Label used in logs and metrics.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::File => "file",
            Self::Remote => "remote",
        }
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whole-snapshot storage for one catalog document.
#[async_trait]
pub trait CatalogBackend: Send + Sync + 'static {
    /// The mechanism this backend represents.
    fn kind(&self) -> BackendKind;

    /// Reads the stored catalog.
    ///
    /// Returns `Error::NotFound` if no document has been stored yet.
    async fn read(&self) -> Result<Catalog>;

    /// Replaces the stored catalog.
    ///
    /// Returns `Error::PermissionDenied` when the medium refuses writes and
    /// `Error::Backend` for remote failures. A failed write leaves the
    /// previously stored document in place.
    async fn write(&self, catalog: &Catalog) -> Result<()>;
}
