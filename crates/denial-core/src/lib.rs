//! # denial-core
//!
//! Shared primitives for the denial reason catalog.
//!
//! This crate provides the types every other crate in the workspace builds on:
//!
//! - **Data Model**: [`Catalog`], [`Category`], [`Keyword`]
//! - **Identifiers**: deterministic id derivation from labels
//! - **Error Types**: the shared [`Error`] enum and [`Result`] alias
//! - **Observability**: logging initialization and span helpers
//!
//! ## Example
//!
//! ```rust
//! use denial_core::prelude::*;
//!
//! let mut category = Category::new(derive_id("Image Quality"), "Image Quality");
//! category.keywords.push(Keyword::new(derive_id("Blurry"), "Blurry", "Photo is blurry."));
//!
//! let catalog = Catalog { categories: vec![category] };
//! assert!(catalog.keyword_by_id("blurry").is_some());
//! ```

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(rust_2018_idioms)]
#![warn(clippy::pedantic)]

pub mod error;
pub mod id;
pub mod model;
pub mod observability;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::error::{Error, Result};
    pub use crate::id::derive_id;
    pub use crate::model::{Catalog, Category, Keyword};
}

pub use error::{Error, Result};
pub use id::derive_id;
pub use model::{Catalog, Category, Keyword};
pub use observability::{LogFormat, catalog_span, init_logging};
