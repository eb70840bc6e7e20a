//! HTTP client for the catalog API.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::Deserialize;

use denial_core::Catalog;

use crate::Config;

/// Errors returned by a [`CatalogApi`] call.
///
/// The display text is what the editor shows to the operator.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ClientError {
    /// The server answered with a non-success status.
    #[error("{message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// The body's `error` field, or the raw body when it has none.
        message: String,
    },

    /// The request never produced a response.
    #[error("request failed: {0}")]
    Transport(String),

    /// The response body was not what the endpoint promises.
    #[error("invalid response: {0}")]
    Decode(String),
}

/// Whole-catalog transport used by the admin editor.
#[async_trait]
pub trait CatalogApi: Send + Sync {
    /// Fetches the authoritative catalog.
    async fn fetch(&self) -> Result<Catalog, ClientError>;

    /// Replaces the catalog with `catalog`.
    async fn replace(&self, catalog: &Catalog) -> Result<(), ClientError>;
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: String,
}

/// [`CatalogApi`] over `GET /catalog` and `PUT /catalog`.
#[derive(Debug, Clone)]
pub struct HttpCatalogClient {
    client: Client,
    base_url: String,
}

impl HttpCatalogClient {
    /// Creates a client for the server at `base_url`.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn new(base_url: impl Into<String>) -> Result<Self, ClientError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| ClientError::Transport(format!("failed to create HTTP client: {e}")))?;

        let base_url = base_url.into();
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Creates a client from CLI configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn from_config(config: &Config) -> Result<Self, ClientError> {
        Self::new(config.api_url.clone())
    }

    /// Base URL requests are sent to.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn catalog_url(&self) -> String {
        format!("{}/catalog", self.base_url)
    }
}

#[async_trait]
impl CatalogApi for HttpCatalogClient {
    async fn fetch(&self) -> Result<Catalog, ClientError> {
        let response = self
            .client
            .get(self.catalog_url())
            .send()
            .await
            .map_err(|e| ClientError::Transport(e.to_string()))?;

        let response = check_status(response).await?;
        response
            .json()
            .await
            .map_err(|e| ClientError::Decode(e.to_string()))
    }

    async fn replace(&self, catalog: &Catalog) -> Result<(), ClientError> {
        let response = self
            .client
            .put(self.catalog_url())
            .json(catalog)
            .send()
            .await
            .map_err(|e| ClientError::Transport(e.to_string()))?;

        check_status(response).await?;
        tracing::debug!(categories = catalog.categories.len(), "catalog replaced");
        Ok(())
    }
}

async fn check_status(response: Response) -> Result<Response, ClientError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    Err(ClientError::Api {
        status: status.as_u16(),
        message: error_message(status.as_u16(), &body),
    })
}

fn error_message(status: u16, body: &str) -> String {
    match serde_json::from_str::<ErrorBody>(body) {
        Ok(parsed) => parsed.error,
        Err(_) if body.trim().is_empty() => format!("API error ({status})"),
        Err(_) => format!("API error ({status}): {body}"),
    }
}
