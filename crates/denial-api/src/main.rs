//! `denial-api` binary entrypoint.
//!
//! Loads configuration from environment variables and starts the HTTP server.

#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]

use std::sync::Arc;

use anyhow::Result;

use denial_api::config::Config;
use denial_api::server::Server;
use denial_catalog::credentials::{CredentialSource, EnvCredentialSource};
use denial_catalog::storage::{FileBackend, FirestoreBackend};
use denial_catalog::{CatalogService, PersistenceAdapter};
use denial_core::observability::{LogFormat, init_logging};

fn choose_log_format(config: &Config) -> LogFormat {
    if config.debug {
        LogFormat::Pretty
    } else {
        LogFormat::Json
    }
}

fn build_service(config: &Config) -> CatalogService {
    let credentials = EnvCredentialSource;
    let file = Arc::new(FileBackend::new(config.data_path.clone()));
    let mut adapter = PersistenceAdapter::new(file, Arc::new(credentials));

    if credentials.is_configured() {
        let remote = credentials.credentials().and_then(|creds| {
            FirestoreBackend::from_credentials(
                &creds,
                config.firestore.base_url.as_deref(),
                config.firestore.database.as_deref(),
            )
        });
        match remote {
            Ok(remote) => {
                tracing::info!(
                    document = %remote.document_url(),
                    "Using remote document store for catalog writes"
                );
                adapter = adapter.with_remote(Arc::new(remote));
            }
            Err(err) => {
                tracing::error!(
                    error = %err,
                    "Remote credentials are set but unusable; reads fall back to the file and saves will fail"
                );
            }
        }
    } else {
        tracing::warn!(
            path = %config.data_path.display(),
            "Remote document store not configured; using local file backend"
        );
    }

    CatalogService::new(Arc::new(adapter))
}

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;
    init_logging(choose_log_format(&config));

    let service = build_service(&config);
    let server = Server::with_service(config, service);
    server.serve().await?;
    Ok(())
}
