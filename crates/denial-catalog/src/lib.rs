//! # denial-catalog
//!
//! Validation, mutation, and persistence for the denial reason catalog.
//!
//! ## Components
//!
//! - [`schema`]: strict structural validation of candidate catalogs
//! - [`mutation`]: pure add/update/delete operations that keep ids unique
//! - [`storage`]: the file, remote (Firestore), and in-memory backends
//! - [`persistence`]: per-operation backend selection and read fallback
//! - [`service`]: whole-snapshot fetch and validated replace
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use denial_catalog::prelude::*;
//!
//! # async fn example() -> denial_core::Result<()> {
//! let adapter = PersistenceAdapter::new(
//!     Arc::new(FileBackend::default()),
//!     Arc::new(EnvCredentialSource),
//! );
//! let service = CatalogService::new(Arc::new(adapter));
//!
//! let current = service.fetch().await?;
//! let next = mutation::add_category(&current, "Image Quality").expect("valid label");
//! service.replace(&serde_json::to_value(&next)?).await?;
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(rust_2018_idioms)]
#![warn(clippy::pedantic)]

pub mod credentials;
pub mod metrics;
pub mod mutation;
pub mod persistence;
pub mod schema;
pub mod service;
pub mod storage;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::credentials::{
        CredentialSource, EnvCredentialSource, RemoteCredentials, StaticCredentialSource,
    };
    pub use crate::mutation::{self, CatalogMutation, MutationError};
    pub use crate::persistence::{BackendSelection, PersistenceAdapter};
    pub use crate::service::CatalogService;
    pub use crate::storage::{
        BackendKind, CatalogBackend, FileBackend, FirestoreBackend, MemoryBackend,
    };
}

pub use credentials::{CredentialSource, EnvCredentialSource, RemoteCredentials};
pub use mutation::{CatalogMutation, MutationError};
pub use persistence::{BackendSelection, PersistenceAdapter};
pub use service::CatalogService;
pub use storage::{BackendKind, CatalogBackend};
