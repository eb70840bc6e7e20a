//! Cloud Firestore backend over the REST API.
//!
//! The whole catalog lives in a single document, `config/denial-prompts`.
//! Reads `GET` the document; writes `PATCH` it without an update mask, which
//! replaces every field and so stores the snapshot atomically.
//!
//! A missing document is reported as `Error::NotFound` so the persistence
//! layer can fall back to the local file. Every other failure becomes
//! `Error::Backend` carrying Firestore's own status and message.

pub mod auth;
pub mod value;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::Deserialize;

use denial_core::{Catalog, Error, Result};

use super::{BackendKind, CatalogBackend};
use crate::credentials::RemoteCredentials;
use crate::schema;

pub use auth::{AccessTokenSource, ServiceAccountTokens, StaticToken};

/// Production Firestore endpoint.
pub const DEFAULT_BASE_URL: &str = "https://firestore.googleapis.com";
/// Default database id.
pub const DEFAULT_DATABASE: &str = "(default)";
/// Collection holding the catalog document.
pub const COLLECTION: &str = "config";
/// Catalog document id.
pub const DOCUMENT_ID: &str = "denial-prompts";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Where the catalog document lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FirestoreConfig {
    /// API base URL; override for the emulator.
    pub base_url: String,
    /// Cloud project id.
    pub project_id: String,
    /// Database id.
    pub database: String,
}

impl FirestoreConfig {
    /// Production endpoint and default database for `project_id`.
    #[must_use]
    pub fn new(project_id: impl Into<String>) -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            project_id: project_id.into(),
            database: DEFAULT_DATABASE.to_string(),
        }
    }

    /// Overrides the API base URL.
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Overrides the database id.
    #[must_use]
    pub fn with_database(mut self, database: impl Into<String>) -> Self {
        self.database = database.into();
        self
    }

    /// Full URL of the catalog document.
    #[must_use]
    pub fn document_url(&self) -> String {
        format!(
            "{}/v1/projects/{}/databases/{}/documents/{COLLECTION}/{DOCUMENT_ID}",
            self.base_url.trim_end_matches('/'),
            self.project_id,
            self.database
        )
    }
}

/// Remote backend storing the catalog in one Firestore document.
pub struct FirestoreBackend {
    client: Client,
    document_url: String,
    tokens: Arc<dyn AccessTokenSource>,
}

impl std::fmt::Debug for FirestoreBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FirestoreBackend")
            .field("document_url", &self.document_url)
            .field("tokens", &"<AccessTokenSource>")
            .finish_non_exhaustive()
    }
}

impl FirestoreBackend {
    /// Creates a backend with an explicit token source.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn new(config: &FirestoreConfig, tokens: Arc<dyn AccessTokenSource>) -> Result<Self> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| Error::backend(format!("Firestore: failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            document_url: config.document_url(),
            tokens,
        })
    }

    /// Creates a backend authenticated with a service account.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is unusable or the client cannot be built.
    pub fn from_credentials(
        credentials: &RemoteCredentials,
        base_url: Option<&str>,
        database: Option<&str>,
    ) -> Result<Self> {
        let mut config = FirestoreConfig::new(&credentials.project_id);
        if let Some(base_url) = base_url {
            config = config.with_base_url(base_url);
        }
        if let Some(database) = database {
            config = config.with_database(database);
        }
        let tokens = ServiceAccountTokens::from_credentials(credentials)?;
        Self::new(&config, Arc::new(tokens))
    }

    /// URL of the catalog document.
    #[must_use]
    pub fn document_url(&self) -> &str {
        &self.document_url
    }

    async fn authorized(&self, request: RequestBuilder) -> Result<RequestBuilder> {
        Ok(match self.tokens.access_token().await? {
            Some(token) => request.bearer_auth(token),
            None => request,
        })
    }
}

#[derive(Debug, Deserialize)]
struct Document {
    #[serde(default)]
    fields: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

async fn backend_error(response: Response) -> Error {
    let http_status = response.status();
    let body = response.text().await.unwrap_or_default();

    let (status, message) = match serde_json::from_str::<ErrorEnvelope>(&body) {
        Ok(envelope) => (
            envelope
                .error
                .status
                .unwrap_or_else(|| http_status.as_u16().to_string()),
            envelope.error.message.unwrap_or_default(),
        ),
        Err(_) => (http_status.as_u16().to_string(), body.trim().to_string()),
    };

    if message.is_empty() {
        Error::backend(format!("Firestore: {status}"))
    } else {
        Error::backend(format!("Firestore: {status} {message}"))
    }
}

fn transport_error(err: &reqwest::Error) -> Error {
    Error::backend(format!("Firestore: request failed: {err}"))
}

#[async_trait]
impl CatalogBackend for FirestoreBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Remote
    }

    async fn read(&self) -> Result<Catalog> {
        let request = self.authorized(self.client.get(&self.document_url)).await?;
        let response = request.send().await.map_err(|e| transport_error(&e))?;

        if response.status() == StatusCode::NOT_FOUND {
            return Err(Error::NotFound(format!(
                "Firestore document {COLLECTION}/{DOCUMENT_ID}"
            )));
        }
        if !response.status().is_success() {
            return Err(backend_error(response).await);
        }

        let document: Document = response
            .json()
            .await
            .map_err(|e| Error::backend(format!("Firestore: invalid document response: {e}")))?;
        let fields = document
            .fields
            .unwrap_or_else(|| serde_json::Value::Object(serde_json::Map::new()));
        let plain = value::decode_fields(&fields)?;
        schema::validate(&plain)
    }

    async fn write(&self, catalog: &Catalog) -> Result<()> {
        let body = serde_json::json!({ "fields": value::encode_fields(catalog)? });
        let request = self
            .authorized(self.client.patch(&self.document_url).json(&body))
            .await?;
        let response = request.send().await.map_err(|e| transport_error(&e))?;

        if !response.status().is_success() {
            return Err(backend_error(response).await);
        }

        tracing::debug!(document = %self.document_url, "Firestore document written");
        Ok(())
    }
}
