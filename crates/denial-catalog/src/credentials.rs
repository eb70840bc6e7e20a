//! Remote document store credentials.
//!
//! Whether the remote backend is used is decided by credential *presence*,
//! checked again on every operation. Values are not validated until a client
//! actually authenticates with them.
//!
//! ## Environment Variables
//!
//! - `FIREBASE_PROJECT_ID`
//! - `FIREBASE_CLIENT_EMAIL`
//! - `FIREBASE_PRIVATE_KEY`: PEM, literal `\n` sequences are expanded
//! - `FIREBASE_PRIVATE_KEY_BASE64`: base64 of the PEM; preferred when both are set

use std::sync::atomic::{AtomicBool, Ordering};

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;

use denial_core::{Error, Result};

/// Project id variable.
pub const PROJECT_ID_VAR: &str = "FIREBASE_PROJECT_ID";
/// Service account email variable.
pub const CLIENT_EMAIL_VAR: &str = "FIREBASE_CLIENT_EMAIL";
/// Raw PEM private key variable.
pub const PRIVATE_KEY_VAR: &str = "FIREBASE_PRIVATE_KEY";
/// Base64-encoded PEM private key variable.
pub const PRIVATE_KEY_BASE64_VAR: &str = "FIREBASE_PRIVATE_KEY_BASE64";

/// Message used when a remote operation is attempted without configuration.
pub const NOT_CONFIGURED_MESSAGE: &str = "Remote document store is not configured. Set \
     FIREBASE_PROJECT_ID, FIREBASE_CLIENT_EMAIL, and FIREBASE_PRIVATE_KEY \
     (or FIREBASE_PRIVATE_KEY_BASE64).";

const TOKEN_URI: &str = "https://oauth2.googleapis.com/token";

/// Resolved service account credentials.
#[derive(Clone, PartialEq, Eq)]
pub struct RemoteCredentials {
    /// Cloud project holding the document store.
    pub project_id: String,
    /// Service account email.
    pub client_email: String,
    /// PEM-encoded private key.
    pub private_key: String,
}

impl std::fmt::Debug for RemoteCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RemoteCredentials")
            .field("project_id", &self.project_id)
            .field("client_email", &self.client_email)
            .field("private_key", &"[REDACTED]")
            .finish()
    }
}

impl RemoteCredentials {
    /// Service account key JSON accepted by `gcp_auth`.
    #[must_use]
    pub fn service_account_json(&self) -> String {
        serde_json::json!({
            "type": "service_account",
            "project_id": self.project_id,
            "client_email": self.client_email,
            "private_key": self.private_key,
            "token_uri": TOKEN_URI,
        })
        .to_string()
    }
}

/// Unresolved credential values as found in the environment.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct CredentialValues {
    /// `FIREBASE_PROJECT_ID`.
    pub project_id: Option<String>,
    /// `FIREBASE_CLIENT_EMAIL`.
    pub client_email: Option<String>,
    /// `FIREBASE_PRIVATE_KEY`.
    pub private_key: Option<String>,
    /// `FIREBASE_PRIVATE_KEY_BASE64`.
    pub private_key_base64: Option<String>,
}

impl std::fmt::Debug for CredentialValues {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialValues")
            .field("project_id", &self.project_id)
            .field("client_email", &self.client_email)
            .field("private_key", &self.private_key.as_ref().map(|_| "[REDACTED]"))
            .field(
                "private_key_base64",
                &self.private_key_base64.as_ref().map(|_| "[REDACTED]"),
            )
            .finish()
    }
}

impl CredentialValues {
    /// Reads the values from the process environment.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Reads the values through an arbitrary lookup function.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
        Self {
            project_id: get(PROJECT_ID_VAR),
            client_email: get(CLIENT_EMAIL_VAR),
            private_key: get(PRIVATE_KEY_VAR),
            private_key_base64: get(PRIVATE_KEY_BASE64_VAR),
        }
    }

    /// True when every required value is present.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.project_id.is_some()
            && self.client_email.is_some()
            && (self.private_key.is_some() || self.private_key_base64.is_some())
    }

    /// Resolves the values into usable credentials.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidInput` if values are missing or the base64 key
    /// does not decode to UTF-8 text.
    pub fn resolve(&self) -> Result<RemoteCredentials> {
        let (Some(project_id), Some(client_email)) = (&self.project_id, &self.client_email) else {
            return Err(Error::InvalidInput(NOT_CONFIGURED_MESSAGE.to_string()));
        };

        let private_key = if let Some(encoded) = &self.private_key_base64 {
            decode_base64_key(encoded)?
        } else if let Some(raw) = &self.private_key {
            normalize_pem(raw)
        } else {
            return Err(Error::InvalidInput(NOT_CONFIGURED_MESSAGE.to_string()));
        };

        Ok(RemoteCredentials {
            project_id: project_id.trim().to_string(),
            client_email: client_email.trim().to_string(),
            private_key,
        })
    }
}

fn decode_base64_key(encoded: &str) -> Result<String> {
    let bytes = STANDARD.decode(encoded.trim()).map_err(|e| {
        Error::InvalidInput(format!("{PRIVATE_KEY_BASE64_VAR} is not valid base64: {e}"))
    })?;
    String::from_utf8(bytes)
        .map(|pem| pem.trim().to_string())
        .map_err(|_| Error::InvalidInput(format!("{PRIVATE_KEY_BASE64_VAR} is not UTF-8 text")))
}

fn normalize_pem(pem: &str) -> String {
    pem.trim().replace("\\n", "\n")
}

/// Source of remote credentials, consulted on every persistence operation.
pub trait CredentialSource: Send + Sync + 'static {
    /// True when all required values are present.
    fn is_configured(&self) -> bool;

    /// Resolves the credentials.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidInput` when values are missing or malformed.
    fn credentials(&self) -> Result<RemoteCredentials>;
}

/// Reads credentials from the process environment on every call.
#[derive(Debug, Clone, Copy, Default)]
pub struct EnvCredentialSource;

impl CredentialSource for EnvCredentialSource {
    fn is_configured(&self) -> bool {
        CredentialValues::from_env().is_complete()
    }

    fn credentials(&self) -> Result<RemoteCredentials> {
        CredentialValues::from_env().resolve()
    }
}

/// Fixed credentials whose presence can be toggled at runtime.
#[derive(Debug, Default)]
pub struct StaticCredentialSource {
    credentials: Option<RemoteCredentials>,
    enabled: AtomicBool,
}

impl StaticCredentialSource {
    /// A source that is never configured.
    #[must_use]
    pub fn none() -> Self {
        Self::default()
    }

    /// A source that is configured with `credentials`.
    #[must_use]
    pub fn configured(credentials: RemoteCredentials) -> Self {
        Self {
            credentials: Some(credentials),
            enabled: AtomicBool::new(true),
        }
    }

    /// Enables or disables the credentials without discarding them.
    pub fn set_enabled(&self, enabled: bool) {
        self.enabled.store(enabled, Ordering::SeqCst);
    }
}

impl CredentialSource for StaticCredentialSource {
    fn is_configured(&self) -> bool {
        self.credentials.is_some() && self.enabled.load(Ordering::SeqCst)
    }

    fn credentials(&self) -> Result<RemoteCredentials> {
        match &self.credentials {
            Some(credentials) if self.enabled.load(Ordering::SeqCst) => Ok(credentials.clone()),
            _ => Err(Error::InvalidInput(NOT_CONFIGURED_MESSAGE.to_string())),
        }
    }
}
