//! Configuration module for load-check
//!
//! Values are layered: built-in defaults, then an optional config file,
//! then `LOAD_CHECK_*` environment variables, then command-line flags.

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Config file base name picked up from the working directory (`load-check.toml`, `load-check.json`, ...)
pub const DEFAULT_CONFIG_FILE: &str = "load-check";

/// HTTP client configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    /// Per-request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// User-Agent header sent with every request
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

fn default_timeout_secs() -> u64 {
    15
}

fn default_user_agent() -> String {
    format!("load-check/{}", env!("CARGO_PKG_VERSION"))
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            user_agent: default_user_agent(),
        }
    }
}

/// Load run configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunConfig {
    /// Total number of requests
    #[serde(default = "default_requests")]
    pub requests: u32,
    /// Number of concurrent workers
    #[serde(default = "default_concurrency")]
    pub concurrency: u32,
    /// Single-worker runs up to this many requests print each response code
    #[serde(default = "default_sequential_threshold")]
    pub sequential_threshold: u32,
}

fn default_requests() -> u32 {
    1
}

fn default_concurrency() -> u32 {
    1
}

fn default_sequential_threshold() -> u32 {
    10
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            requests: default_requests(),
            concurrency: default_concurrency(),
            sequential_threshold: default_sequential_threshold(),
        }
    }
}

/// Report format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Report configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct OutputConfig {
    #[serde(default)]
    pub format: OutputFormat,
}

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub http: HttpConfig,
    #[serde(default)]
    pub run: RunConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

impl AppConfig {
    /// Load configuration from defaults, a config file and the environment
    ///
    /// An explicit `path` must exist; otherwise `load-check.{toml,json}` is used when present.
    /// Environment variables use a double underscore between section and key,
    /// e.g. `LOAD_CHECK_HTTP__TIMEOUT_SECS=5`.
    pub fn load(path: Option<&Path>) -> crate::Result<Self> {
        // Try to load .env file (ignore if not found)
        let _ = dotenvy::dotenv();

        let mut builder = config::Config::builder()
            .add_source(config::Config::try_from(&AppConfig::default())?);

        builder = match path {
            Some(path) => builder.add_source(config::File::from(path).required(true)),
            None => builder.add_source(config::File::with_name(DEFAULT_CONFIG_FILE).required(false)),
        };

        builder = builder.add_source(
            config::Environment::with_prefix("LOAD_CHECK")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let app_config: AppConfig = builder.build()?.try_deserialize()?;
        Ok(app_config)
    }
}

/// Values given on the command line, which win over the loaded configuration
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    /// `-n`
    pub requests: Option<i64>,
    /// `-c`
    pub concurrency: Option<i64>,
    /// `--timeout`
    pub timeout_secs: Option<u64>,
    /// `--json`
    pub json: bool,
    /// A bare URL was given without `-n` or `-c`: run exactly one request
    pub single_shot: bool,
}

/// Fully resolved, validated settings for one run
#[derive(Debug, Clone, PartialEq)]
pub struct RunSettings {
    pub requests: usize,
    pub concurrency: usize,
    pub timeout: Duration,
    pub user_agent: String,
    pub sequential_threshold: usize,
    pub format: OutputFormat,
}

impl RunSettings {
    /// Merge CLI overrides into the loaded configuration and validate the result
    pub fn resolve(config: &AppConfig, overrides: &CliOverrides) -> Result<Self, ConfigError> {
        let (requests, concurrency) = if overrides.single_shot {
            (1, 1)
        } else {
            (
                overrides
                    .requests
                    .unwrap_or_else(|| i64::from(config.run.requests)),
                overrides
                    .concurrency
                    .unwrap_or_else(|| i64::from(config.run.concurrency)),
            )
        };

        let requests = positive(requests).ok_or(ConfigError::InvalidRequests)?;
        let concurrency = positive(concurrency).ok_or(ConfigError::InvalidConcurrency)?;

        let timeout_secs = overrides.timeout_secs.unwrap_or(config.http.timeout_secs);
        if timeout_secs == 0 {
            return Err(ConfigError::InvalidTimeout);
        }

        let format = if overrides.json {
            OutputFormat::Json
        } else {
            config.output.format
        };

        Ok(Self {
            requests,
            concurrency,
            timeout: Duration::from_secs(timeout_secs),
            user_agent: config.http.user_agent.clone(),
            sequential_threshold: config.run.sequential_threshold as usize,
            format,
        })
    }

    /// Worker count actually used: never more workers than requests
    pub fn effective_concurrency(&self) -> usize {
        self.concurrency.min(self.requests)
    }

    /// Small single-worker runs report every response as it happens
    pub fn is_sequential(&self) -> bool {
        self.effective_concurrency() == 1 && self.requests <= self.sequential_threshold
    }
}

fn positive(value: i64) -> Option<usize> {
    usize::try_from(value).ok().filter(|v| *v > 0)
}
