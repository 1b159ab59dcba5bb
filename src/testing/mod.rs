//! Load test orchestration
//!
//! Wires the HTTP executor, worker pool and aggregator together for one run.

use crate::config::RunSettings;
use crate::error::LoadError;
use crate::executor::{ClientSettings, HttpExecutor, RequestResult};
use crate::metrics::{aggregate, RunSummary};
use crate::pool::{RunOutput, WorkerPool};
use crate::targets::TargetList;

/// Output of a finished load test
#[derive(Debug, Clone)]
pub struct LoadTestReport {
    pub output: RunOutput,
    pub summary: RunSummary,
}

/// Load tester
pub struct LoadTester {
    settings: RunSettings,
    executor: HttpExecutor,
}

impl LoadTester {
    /// Create a load tester; the HTTP client is built once here and shared by all workers
    pub fn new(settings: RunSettings) -> Result<Self, LoadError> {
        let executor = HttpExecutor::new(&ClientSettings {
            timeout: settings.timeout,
            user_agent: settings.user_agent.clone(),
            pool_size: settings.effective_concurrency(),
        })?;

        Ok(Self { settings, executor })
    }

    pub fn settings(&self) -> &RunSettings {
        &self.settings
    }

    /// Run every request to completion and summarize
    pub async fn run<F>(&self, targets: TargetList, on_result: F) -> LoadTestReport
    where
        F: FnMut(&RequestResult),
    {
        tracing::info!(
            targets = ?targets.urls(),
            requests = %self.settings.requests,
            concurrency = %self.settings.concurrency,
            timeout_secs = %self.settings.timeout.as_secs(),
            "Starting load test"
        );

        let pool = WorkerPool::new(self.executor.clone(), targets);
        let output = pool
            .run(self.settings.requests, self.settings.concurrency, on_result)
            .await;
        let summary = aggregate(&output.results, output.elapsed, output.concurrency);

        tracing::info!(
            total = %summary.total_requests,
            successful = %summary.successful,
            failed = %summary.failed,
            rps = %summary.requests_per_second,
            "Load test completed"
        );

        LoadTestReport { output, summary }
    }
}
