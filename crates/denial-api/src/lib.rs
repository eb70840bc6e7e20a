//! # denial-api
//!
//! HTTP composition layer for the denial reason catalog.
//!
//! This crate wires the catalog service to an axum router and adds the
//! operational surface around it:
//!
//! - **Routing**: whole-document read and replace of the catalog
//! - **Errors**: stable `{ error, code }` bodies with request ID correlation
//! - **Observability**: request metrics, tracing, and health checks
//!
//! ## Design Principles
//!
//! This crate is a **thin composition layer** with no domain policy.
//! Validation and persistence live in `denial-catalog`.
//!
//! ## Endpoints
//!
//! ```text
//! GET  /health        - Health check
//! GET  /ready         - Readiness check and selected write backend
//! GET  /metrics       - Prometheus metrics
//! GET  /openapi.json  - OpenAPI document
//! GET  /catalog       - Fetch the catalog
//! PUT  /catalog       - Replace the catalog (POST is accepted as an alias)
//! ```
//!
//! ## Example
//!
//! ```rust,ignore
//! use denial_api::server::Server;
//!
//! let server = Server::builder().http_port(8080).build();
//! server.serve().await?;
//! ```

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(rust_2018_idioms)]
#![warn(clippy::pedantic)]

pub mod config;
pub mod context;
pub mod error;
pub mod metrics;
pub mod openapi;
pub mod routes;
pub mod server;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::config::Config;
    pub use crate::context::RequestContext;
    pub use crate::error::{ApiError, ApiResult};
    pub use crate::server::{Server, ServerBuilder};
}
