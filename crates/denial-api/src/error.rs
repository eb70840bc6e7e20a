//! API error types and HTTP response mapping.

use axum::Json;
use axum::http::header::HeaderName;
use axum::http::{HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use utoipa::ToSchema;

use denial_catalog::schema::INVALID_CATALOG_MESSAGE;
use denial_core::Error as CoreError;

use crate::context::REQUEST_ID_HEADER;

/// API result type.
pub type ApiResult<T> = Result<T, ApiError>;

/// Message reported when the catalog cannot be read.
pub const LOAD_FAILED_MESSAGE: &str = "Failed to load catalog";

/// Standard JSON error response body.
#[derive(Debug, Serialize, ToSchema)]
#[cfg_attr(test, derive(serde::Deserialize))]
pub struct ApiErrorBody {
    /// Human-readable message (safe for clients).
    pub error: String,
    /// Stable machine-readable error code.
    pub code: String,
}

/// HTTP API error with stable machine-readable code.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    code: &'static str,
    message: String,
    request_id: Option<String>,
}

impl ApiError {
    /// Returns the error for a candidate catalog that failed validation.
    #[must_use]
    pub fn invalid_schema() -> Self {
        Self::new(
            StatusCode::BAD_REQUEST,
            "INVALID_SCHEMA",
            INVALID_CATALOG_MESSAGE,
        )
    }

    /// Returns an error response for invalid input.
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, "BAD_REQUEST", message)
    }

    /// Returns an error response for missing resources.
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, "NOT_FOUND", message)
    }

    /// Returns the error for a storage medium that refuses writes.
    pub fn permission_denied(message: impl Into<String>) -> Self {
        Self::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            "PERMISSION_DENIED",
            message,
        )
    }

    /// Returns the error for a failed backend operation.
    pub fn backend(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, "BACKEND_ERROR", message)
    }

    /// Returns the generic error for a failed catalog read.
    #[must_use]
    pub fn load_failed() -> Self {
        Self::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            "LOAD_FAILED",
            LOAD_FAILED_MESSAGE,
        )
    }

    /// Returns an error response when the service cannot take the request.
    pub fn service_unavailable(message: impl Into<String>) -> Self {
        Self::new(
            StatusCode::SERVICE_UNAVAILABLE,
            "SERVICE_UNAVAILABLE",
            message,
        )
    }

    /// Returns an internal error response.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL", message)
    }

    /// Attaches a request ID for correlation.
    #[must_use]
    pub fn with_request_id(mut self, request_id: impl Into<String>) -> Self {
        self.request_id = Some(request_id.into());
        self
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        self.status
    }

    /// Returns the human-readable error message.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns the stable machine-readable error code.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        self.code
    }

    fn new(status: StatusCode, code: &'static str, message: impl Into<String>) -> Self {
        Self {
            status,
            code,
            message: message.into(),
            request_id: None,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let mut response = (
            self.status,
            Json(ApiErrorBody {
                error: self.message,
                code: self.code.to_string(),
            }),
        )
            .into_response();

        if let Some(request_id) = self.request_id {
            if let Ok(value) = HeaderValue::from_str(&request_id) {
                response
                    .headers_mut()
                    .insert(HeaderName::from_static(REQUEST_ID_HEADER), value);
            }
        }

        response
    }
}

impl From<CoreError> for ApiError {
    fn from(value: CoreError) -> Self {
        match value {
            CoreError::InvalidSchema { .. } => Self::invalid_schema(),
            CoreError::NotFound(message) => Self::not_found(message),
            CoreError::PermissionDenied { message } => Self::permission_denied(message),
            CoreError::Backend { message } => Self::backend(message),
            err @ CoreError::Io { .. } => Self::backend(err.to_string()),
            CoreError::InvalidInput(message) => Self::bad_request(message),
            CoreError::Serialization { message } | CoreError::Internal { message } => {
                Self::internal(message)
            }
        }
    }
}
