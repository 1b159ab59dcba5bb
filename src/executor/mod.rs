//! Request execution
//!
//! Issues one GET per job and measures time to first and last byte.

use crate::error::{LoadError, RequestError};
use async_trait::async_trait;
use futures_util::StreamExt;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

/// Wall-clock timing of a request that produced a full response
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Timing {
    /// Start until status and headers were available
    pub ttfb: Duration,
    /// Start until the body was fully read; also the total request time
    pub ttlb: Duration,
}

/// Outcome of one executed request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    /// A complete response was read, whatever its status
    Response { status: u16, timing: Timing },
    /// No usable response; carries no timing
    Failed(RequestError),
}

impl Outcome {
    /// 2xx responses only
    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Response { status, .. } if (200..300).contains(status))
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            Outcome::Response { status, .. } => Some(*status),
            Outcome::Failed(_) => None,
        }
    }

    /// Timing for aggregation; `None` for failures without a full response
    pub fn timing(&self) -> Option<Timing> {
        match self {
            Outcome::Response { timing, .. } => Some(*timing),
            Outcome::Failed(_) => None,
        }
    }
}

/// Result of one job
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestResult {
    /// Job index in `0..requests`
    pub job: usize,
    /// URL requested for this job
    pub url: String,
    pub outcome: Outcome,
}

/// Something that can execute a single request
#[async_trait]
pub trait RequestExecutor: Send + Sync {
    async fn execute(&self, url: &str) -> Outcome;
}

/// HTTP client settings shared by every worker
#[derive(Debug, Clone)]
pub struct ClientSettings {
    pub timeout: Duration,
    pub user_agent: String,
    /// Idle connections kept per host; one per worker
    pub pool_size: usize,
}

/// Executor backed by a pooled reqwest client
#[derive(Debug, Clone)]
pub struct HttpExecutor {
    client: Client,
}

impl HttpExecutor {
    /// Build the shared client
    pub fn new(settings: &ClientSettings) -> Result<Self, LoadError> {
        let client = Client::builder()
            .timeout(settings.timeout)
            .user_agent(settings.user_agent.as_str())
            .pool_max_idle_per_host(settings.pool_size)
            .build()
            .map_err(LoadError::Client)?;

        Ok(Self { client })
    }
}

#[async_trait]
impl RequestExecutor for HttpExecutor {
    async fn execute(&self, url: &str) -> Outcome {
        let start = Instant::now();

        let response = match self.client.get(url).send().await {
            Ok(response) => response,
            Err(err) => {
                tracing::debug!(url = %url, error = %err, "Request failed before response");
                return Outcome::Failed(RequestError::from_send(&err));
            }
        };
        let ttfb = start.elapsed();
        let status = response.status().as_u16();

        // The body must be drained so the connection goes back to the pool
        let body_bytes = match drain_body(response).await {
            Ok(bytes) => bytes,
            Err(err) => {
                tracing::debug!(url = %url, status = %status, error = %err, "Failed to read response body");
                return Outcome::Failed(RequestError::from_body(&err));
            }
        };
        let ttlb = start.elapsed();

        tracing::debug!(
            url = %url,
            status = %status,
            body_bytes = body_bytes,
            ttfb_ms = %(ttfb.as_secs_f64() * 1000.0),
            ttlb_ms = %(ttlb.as_secs_f64() * 1000.0),
            "Request completed"
        );

        Outcome::Response {
            status,
            timing: Timing { ttfb, ttlb },
        }
    }
}

async fn drain_body(response: reqwest::Response) -> Result<u64, reqwest::Error> {
    let mut stream = response.bytes_stream();
    let mut total_bytes: u64 = 0;
    while let Some(chunk) = stream.next().await {
        total_bytes = total_bytes.saturating_add(chunk?.len() as u64);
    }
    Ok(total_bytes)
}
