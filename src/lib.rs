//! load-check - HTTP load generator
//!
//! Sends a fixed number of GET requests to one or more targets across a pool
//! of concurrent workers and reports:
//! - successful (2xx) and failed requests
//! - throughput in requests per second
//! - min, max and mean total time, time to first byte and time to last byte

pub mod config;
pub mod error;
pub mod executor;
pub mod metrics;
pub mod pool;
pub mod report;
pub mod targets;
pub mod testing;

pub use config::{AppConfig, CliOverrides, RunSettings};
pub use error::{LoadError, RequestError};
pub use executor::{HttpExecutor, Outcome, RequestExecutor, RequestResult};
pub use metrics::{aggregate, DurationStats, RunSummary};
pub use pool::{RunOutput, WorkerPool};
pub use targets::{resolve, TargetList, TargetSource};
pub use testing::{LoadTestReport, LoadTester};

/// Application result type
pub type Result<T> = anyhow::Result<T>;
