//! Error types and result aliases for the denial catalog.
//!
//! This module defines the shared error type used by every crate in the
//! workspace. Variants map one-to-one onto the HTTP status classes the API
//! reports, so callers can match on them without string inspection.

/// The result type used throughout the denial catalog.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in catalog operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A candidate catalog did not match the required shape.
    #[error("invalid catalog: {message}")]
    InvalidSchema {
        /// First offending path and what was expected there.
        message: String,
    },

    /// The requested document does not exist in the selected backend.
    #[error("not found: {0}")]
    NotFound(String),

    /// The backend refused the write (read-only filesystem, missing permission).
    #[error("{message}")]
    PermissionDenied {
        /// Actionable, user-facing description.
        message: String,
    },

    /// A local I/O operation failed.
    #[error("io error: {message}")]
    Io {
        /// Description of the failure.
        message: String,
        /// The underlying cause.
        #[source]
        source: std::io::Error,
    },

    /// The remote document store reported a failure.
    #[error("{message}")]
    Backend {
        /// Backend diagnostic, prefixed with the backend name.
        message: String,
    },

    /// A serialization or deserialization error occurred.
    #[error("serialization error: {message}")]
    Serialization {
        /// Description of the serialization failure.
        message: String,
    },

    /// Invalid input was provided (configuration, arguments).
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// An internal error occurred that should not happen in normal operation.
    #[error("internal error: {message}")]
    Internal {
        /// Description of the internal error.
        message: String,
    },
}

impl Error {
    /// Creates a new schema error with the given message.
    #[must_use]
    pub fn invalid_schema(message: impl Into<String>) -> Self {
        Self::InvalidSchema {
            message: message.into(),
        }
    }

    /// Creates a new backend error with the given message.
    #[must_use]
    pub fn backend(message: impl Into<String>) -> Self {
        Self::Backend {
            message: message.into(),
        }
    }

    /// Creates a new I/O error with context.
    #[must_use]
    pub fn io(message: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            message: message.into(),
            source,
        }
    }

    /// Returns true if this error means the document is absent.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

impl From<serde_json::Error> for Error {
    fn from(value: serde_json::Error) -> Self {
        Self::Serialization {
            message: value.to_string(),
        }
    }
}
