//! In-process stand-in for the Firestore document endpoints.
//!
//! Serves `GET` and `PATCH` for any `config/denial-prompts` document path on
//! `127.0.0.1:0`, storing the raw `fields` object. Responses follow the
//! Firestore REST shapes closely enough for the catalog's client: `404` with
//! an error envelope for a missing document, and error envelopes for any
//! forced failure or bearer-token mismatch.

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use denial_core::{Error, Result};
use serde_json::{Value, json};
use tokio::sync::oneshot;

const DOCUMENT_ROUTE: &str =
    "/v1/projects/:project/databases/:database/documents/config/denial-prompts";

#[derive(Debug, Clone)]
struct Forced {
    status: StatusCode,
    code: String,
    message: String,
}

#[derive(Debug, Default)]
struct Inner {
    fields: Option<Value>,
    forced: Option<Forced>,
    expected_token: Option<String>,
    requests: Vec<String>,
}

type Shared = Arc<Mutex<Inner>>;

/// A running fake Firestore server.
pub struct FakeFirestore {
    base_url: String,
    inner: Shared,
    shutdown_tx: Option<oneshot::Sender<()>>,
    _task: tokio::task::JoinHandle<()>,
}

impl std::fmt::Debug for FakeFirestore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FakeFirestore")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl FakeFirestore {
    /// Starts a server on `127.0.0.1:0`.
    ///
    /// # Errors
    ///
    /// Returns an error if the listener cannot be bound.
    pub async fn start() -> Result<Self> {
        let inner: Shared = Arc::new(Mutex::new(Inner::default()));

        let app = Router::new()
            .route(DOCUMENT_ROUTE, get(get_document).patch(patch_document))
            .with_state(Arc::clone(&inner));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .map_err(|e| Error::Internal {
                message: format!("failed to bind fake firestore listener: {e}"),
            })?;
        let addr: SocketAddr = listener.local_addr().map_err(|e| Error::Internal {
            message: format!("failed to read listener addr: {e}"),
        })?;

        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
        let task = tokio::spawn(async move {
            let server = axum::serve(listener, app).with_graceful_shutdown(async move {
                let _ = shutdown_rx.await;
            });
            let _ = server.await;
        });

        Ok(Self {
            base_url: format!("http://{addr}"),
            inner,
            shutdown_tx: Some(shutdown_tx),
            _task: task,
        })
    }

    /// Server base URL (e.g., `http://127.0.0.1:12345`).
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Stored document fields, if any.
    #[must_use]
    pub fn fields(&self) -> Option<Value> {
        self.inner.lock().expect("lock").fields.clone()
    }

    /// Seeds the stored document fields.
    pub fn set_fields(&self, fields: Value) {
        self.inner.lock().expect("lock").fields = Some(fields);
    }

    /// Requires `Authorization: Bearer <token>` on every request.
    pub fn require_token(&self, token: impl Into<String>) {
        self.inner.lock().expect("lock").expected_token = Some(token.into());
    }

    /// Makes every request fail with a Firestore error envelope.
    pub fn fail_with(&self, status: StatusCode, code: &str, message: &str) {
        self.inner.lock().expect("lock").forced = Some(Forced {
            status,
            code: code.to_string(),
            message: message.to_string(),
        });
    }

    /// Clears a forced failure.
    pub fn clear_failure(&self) {
        self.inner.lock().expect("lock").forced = None;
    }

    /// Methods of requests received so far, in order.
    #[must_use]
    pub fn requests(&self) -> Vec<String> {
        self.inner.lock().expect("lock").requests.clone()
    }
}

impl Drop for FakeFirestore {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

fn error_response(status: StatusCode, code: &str, message: &str) -> Response {
    (
        status,
        Json(json!({
            "error": {"code": status.as_u16(), "message": message, "status": code}
        })),
    )
        .into_response()
}

fn precheck(inner: &mut Inner, method: &str, headers: &HeaderMap) -> Option<Response> {
    inner.requests.push(method.to_string());

    if let Some(expected) = &inner.expected_token {
        let presented = headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "));
        if presented != Some(expected.as_str()) {
            return Some(error_response(
                StatusCode::UNAUTHORIZED,
                "UNAUTHENTICATED",
                "Request had invalid authentication credentials.",
            ));
        }
    }

    inner
        .forced
        .as_ref()
        .map(|f| error_response(f.status, &f.code, &f.message))
}

async fn get_document(State(inner): State<Shared>, headers: HeaderMap) -> Response {
    let mut inner = inner.lock().expect("lock");
    if let Some(response) = precheck(&mut inner, "GET", &headers) {
        return response;
    }

    match &inner.fields {
        Some(fields) => Json(json!({
            "name": "projects/test/databases/(default)/documents/config/denial-prompts",
            "fields": fields,
        }))
        .into_response(),
        None => error_response(
            StatusCode::NOT_FOUND,
            "NOT_FOUND",
            "Document not found.",
        ),
    }
}

async fn patch_document(
    State(inner): State<Shared>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    let mut inner = inner.lock().expect("lock");
    if let Some(response) = precheck(&mut inner, "PATCH", &headers) {
        return response;
    }

    let fields = body.get("fields").cloned().unwrap_or_else(|| json!({}));
    inner.fields = Some(fields.clone());
    Json(json!({ "fields": fields })).into_response()
}
