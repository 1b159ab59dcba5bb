//! Error types for load-check
//!
//! Fatal errors stop a run before the first request is sent. Per-request
//! errors never leave the pool; they are carried inside results.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

/// Exit code for invalid configuration or unresolvable targets
pub const EXIT_CONFIG: u8 = 1;

/// Errors raised while validating run settings
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Number of requests (-n) must be greater than 0")]
    InvalidRequests,

    #[error("Concurrency (-c) must be greater than 0")]
    InvalidConcurrency,

    #[error("Request timeout must be greater than 0 seconds")]
    InvalidTimeout,
}

/// Errors raised while turning CLI input into a target list
#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("no URL provided. Use -u, -f, or a command-line argument")]
    MissingTarget,

    #[error("failed to read URL file {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Errors that abort a run before any request is issued
#[derive(Debug, Error)]
pub enum LoadError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Resolve(#[from] ResolveError),

    #[error("Failed to load configuration: {0}")]
    ConfigFile(String),

    #[error("Failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("Failed to render report: {0}")]
    Render(#[from] serde_json::Error),
}

impl LoadError {
    /// Process exit code for this error
    pub fn exit_code(&self) -> u8 {
        EXIT_CONFIG
    }
}

/// Failure of a single request
///
/// Stored as plain text so results stay cheap to clone and serialize.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[serde(tag = "kind", content = "message", rename_all = "snake_case")]
pub enum RequestError {
    #[error("invalid request URL: {0}")]
    InvalidUrl(String),

    #[error("connection error: {0}")]
    Connect(String),

    #[error("request timed out: {0}")]
    Timeout(String),

    #[error("failed to read response body: {0}")]
    BodyRead(String),
}

impl RequestError {
    /// Classify an error returned before the response headers arrived
    pub fn from_send(err: &reqwest::Error) -> Self {
        if err.is_builder() {
            Self::InvalidUrl(err.to_string())
        } else if err.is_timeout() {
            Self::Timeout(err.to_string())
        } else {
            Self::Connect(err.to_string())
        }
    }

    /// Classify an error returned while draining the body
    pub fn from_body(err: &reqwest::Error) -> Self {
        Self::BodyRead(err.to_string())
    }
}
