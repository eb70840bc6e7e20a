//! OAuth2 access tokens for the Firestore REST API.

use std::sync::Arc;

use async_trait::async_trait;
use gcp_auth::{CustomServiceAccount, TokenProvider};

use denial_core::{Error, Result};

use crate::credentials::RemoteCredentials;

/// Scope required for Firestore document reads and writes.
pub const DATASTORE_SCOPE: &str = "https://www.googleapis.com/auth/datastore";

/// Supplies bearer tokens for outgoing Firestore requests.
#[async_trait]
pub trait AccessTokenSource: Send + Sync + 'static {
    /// Returns a bearer token, or `None` to send unauthenticated requests.
    async fn access_token(&self) -> Result<Option<String>>;
}

/// Tokens minted from a service account key.
///
/// `gcp_auth` caches tokens and refreshes them shortly before expiry.
pub struct ServiceAccountTokens {
    provider: Arc<dyn TokenProvider>,
}

impl std::fmt::Debug for ServiceAccountTokens {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceAccountTokens")
            .field("provider", &"<TokenProvider>")
            .finish()
    }
}

impl ServiceAccountTokens {
    /// Builds a token source from resolved credentials.
    ///
    /// # Errors
    ///
    /// Returns `Error::Backend` if the key cannot be parsed.
    pub fn from_credentials(credentials: &RemoteCredentials) -> Result<Self> {
        let account = CustomServiceAccount::from_json(&credentials.service_account_json())
            .map_err(|e| Error::backend(format!("Firestore: invalid service account key: {e}")))?;
        Ok(Self {
            provider: Arc::new(account),
        })
    }
}

#[async_trait]
impl AccessTokenSource for ServiceAccountTokens {
    async fn access_token(&self) -> Result<Option<String>> {
        let token = self
            .provider
            .token(&[DATASTORE_SCOPE])
            .await
            .map_err(|e| Error::backend(format!("Firestore: failed to get access token: {e}")))?;
        Ok(Some(token.as_str().to_string()))
    }
}

/// A fixed token, or none at all; for the emulator and tests.
#[derive(Debug, Clone, Default)]
pub struct StaticToken(Option<String>);

impl StaticToken {
    /// Sends `Authorization: Bearer <token>` on every request.
    #[must_use]
    pub fn new(token: impl Into<String>) -> Self {
        Self(Some(token.into()))
    }

    /// Sends no authorization header.
    #[must_use]
    pub fn anonymous() -> Self {
        Self(None)
    }
}

#[async_trait]
impl AccessTokenSource for StaticToken {
    async fn access_token(&self) -> Result<Option<String>> {
        Ok(self.0.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn static_token_is_returned_verbatim() {
        assert_eq!(
            StaticToken::new("abc").access_token().await.expect("token"),
            Some("abc".to_string())
        );
        assert_eq!(StaticToken::anonymous().access_token().await.expect("token"), None);
    }
}
