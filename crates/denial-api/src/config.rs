//! Server configuration.
//!
//! Everything is read from `DENIAL_*` environment variables once at startup.
//! Remote document store credentials are not part of this struct; they are
//! consulted on every persistence operation by the credential source.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use denial_catalog::storage::file::DEFAULT_DATA_PATH;
use denial_core::{Error, Result};

/// Default HTTP port.
pub const DEFAULT_HTTP_PORT: u16 = 8080;

/// Default CORS preflight cache duration.
pub const DEFAULT_CORS_MAX_AGE_SECONDS: u64 = 3600;

/// Configuration for the denial catalog API server.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// HTTP server port.
    pub http_port: u16,

    /// Enable debug mode.
    ///
    /// When enabled:
    /// - logs are pretty-printed instead of JSON
    /// - a wildcard CORS origin is accepted
    pub debug: bool,

    /// Location of the local catalog document.
    pub data_path: PathBuf,

    /// CORS configuration.
    #[serde(default)]
    pub cors: CorsConfig,

    /// Per-request timeout in seconds. Disabled when `None`.
    #[serde(default)]
    pub request_timeout_secs: Option<u64>,

    /// Maximum number of in-flight requests. Disabled when `None`.
    #[serde(default)]
    pub concurrency_limit: Option<usize>,

    /// Remote document store endpoint overrides.
    #[serde(default)]
    pub firestore: FirestoreSettings,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            http_port: DEFAULT_HTTP_PORT,
            debug: false,
            data_path: PathBuf::from(DEFAULT_DATA_PATH),
            cors: CorsConfig::default(),
            request_timeout_secs: None,
            concurrency_limit: None,
            firestore: FirestoreSettings::default(),
        }
    }
}

/// CORS configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorsConfig {
    /// Allowed origins. Empty disables CORS; `["*"]` allows any origin.
    #[serde(default)]
    pub allowed_origins: Vec<String>,
    /// Preflight cache duration in seconds.
    #[serde(default = "default_cors_max_age")]
    pub max_age_seconds: u64,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allowed_origins: Vec::new(),
            max_age_seconds: DEFAULT_CORS_MAX_AGE_SECONDS,
        }
    }
}

fn default_cors_max_age() -> u64 {
    DEFAULT_CORS_MAX_AGE_SECONDS
}

/// Overrides for the remote document store endpoint.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FirestoreSettings {
    /// Base URL (emulator or test server). Production endpoint when `None`.
    #[serde(default)]
    pub base_url: Option<String>,
    /// Database name. `(default)` when `None`.
    #[serde(default)]
    pub database: Option<String>,
}

impl Config {
    /// Loads configuration from `DENIAL_*` environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if a variable is set to an unparseable value.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Loads configuration through `lookup`, which maps variable names to values.
    ///
    /// # Errors
    ///
    /// Returns an error if a variable is set to an unparseable value.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let env = Env(lookup);
        let mut config = Self::default();

        if let Some(port) = env.u16("DENIAL_HTTP_PORT")? {
            config.http_port = port;
        }
        if let Some(debug) = env.bool("DENIAL_DEBUG")? {
            config.debug = debug;
        }
        if let Some(path) = env.string("DENIAL_DATA_PATH") {
            config.data_path = PathBuf::from(path);
        }

        if let Some(origins) = env.string("DENIAL_CORS_ALLOWED_ORIGINS") {
            config.cors.allowed_origins = parse_cors_allowed_origins(&origins);
        }
        if let Some(max_age) = env.u64("DENIAL_CORS_MAX_AGE_SECONDS")? {
            config.cors.max_age_seconds = max_age;
        }

        if let Some(secs) = env.u64("DENIAL_REQUEST_TIMEOUT_SECS")? {
            if secs == 0 {
                return Err(Error::InvalidInput(
                    "DENIAL_REQUEST_TIMEOUT_SECS must be greater than zero".to_string(),
                ));
            }
            config.request_timeout_secs = Some(secs);
        }
        if let Some(limit) = env.usize("DENIAL_CONCURRENCY_LIMIT")? {
            if limit == 0 {
                return Err(Error::InvalidInput(
                    "DENIAL_CONCURRENCY_LIMIT must be greater than zero".to_string(),
                ));
            }
            config.concurrency_limit = Some(limit);
        }

        config.firestore.base_url = env
            .string("DENIAL_FIRESTORE_BASE_URL")
            .map(|url| url.trim_end_matches('/').to_string());
        config.firestore.database = env.string("DENIAL_FIRESTORE_DATABASE");

        Ok(config)
    }

    /// Request timeout, if enabled.
    #[must_use]
    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }
}

struct Env<F>(F);

impl<F: Fn(&str) -> Option<String>> Env<F> {
    fn string(&self, name: &str) -> Option<String> {
        (self.0)(name).and_then(|v| {
            let trimmed = v.trim();
            if trimmed.is_empty() {
                None
            } else {
                Some(trimmed.to_string())
            }
        })
    }

    fn u16(&self, name: &str) -> Result<Option<u16>> {
        let Some(v) = self.string(name) else {
            return Ok(None);
        };
        v.parse::<u16>()
            .map(Some)
            .map_err(|e| Error::InvalidInput(format!("{name} must be a u16: {e}")))
    }

    fn u64(&self, name: &str) -> Result<Option<u64>> {
        let Some(v) = self.string(name) else {
            return Ok(None);
        };
        v.parse::<u64>()
            .map(Some)
            .map_err(|e| Error::InvalidInput(format!("{name} must be a u64: {e}")))
    }

    fn usize(&self, name: &str) -> Result<Option<usize>> {
        let Some(v) = self.string(name) else {
            return Ok(None);
        };
        v.parse::<usize>()
            .map(Some)
            .map_err(|e| Error::InvalidInput(format!("{name} must be a usize: {e}")))
    }

    fn bool(&self, name: &str) -> Result<Option<bool>> {
        let Some(v) = self.string(name) else {
            return Ok(None);
        };
        parse_bool(name, &v).map(Some)
    }
}

fn parse_bool(name: &str, value: &str) -> Result<bool> {
    let value = value.trim().to_ascii_lowercase();
    match value.as_str() {
        "true" | "1" | "yes" | "y" => Ok(true),
        "false" | "0" | "no" | "n" => Ok(false),
        _ => Err(Error::InvalidInput(format!(
            "{name} must be a boolean (true/false/1/0)"
        ))),
    }
}

fn parse_cors_allowed_origins(value: &str) -> Vec<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Vec::new();
    }
    if trimmed == "*" {
        return vec!["*".to_string()];
    }

    trimmed
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
