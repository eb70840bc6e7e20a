//! Shared test utilities for denial catalog tests.
//!
//! This crate provides:
//! - [`RecordingBackend`]: in-memory catalog backend with operation recording
//! - [`FakeFirestore`]: an in-process Firestore document server
//! - [`TestContext`]: adapter and service pre-wired to recording backends
//! - Fixtures and invariant assertions
//!
//! # Example
//!
//! ```rust,ignore
//! use denial_test_utils::{TestContext, assert_catalog_invariants};
//!
//! #[tokio::test]
//! async fn test_example() {
//!     let ctx = TestContext::with_remote();
//!     let catalog = ctx.service.fetch().await.unwrap();
//!     assert_catalog_invariants(&catalog);
//! }
//! ```

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(rust_2018_idioms)]
#![warn(clippy::pedantic)]
#![allow(clippy::must_use_candidate)]
// Test utilities use expect/unwrap for cleaner test code - panics are acceptable in tests
#![allow(clippy::expect_used)]
#![allow(clippy::unwrap_used)]
#![allow(clippy::missing_panics_doc)]

pub mod assertions;
pub mod fake_firestore;
pub mod fixtures;
pub mod storage;

pub use assertions::*;
pub use fake_firestore::*;
pub use fixtures::*;
pub use storage::*;

/// Initialize test logging (call once per test module).
pub fn init_test_logging() {
    use tracing_subscriber::{EnvFilter, fmt};

    let _ = fmt()
        .with_env_filter(
            EnvFilter::from_default_env()
                .add_directive("denial=debug".parse().expect("valid directive")),
        )
        .with_test_writer()
        .try_init();
}
