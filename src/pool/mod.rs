//! Worker pool
//!
//! Spreads `requests` jobs over a fixed number of workers. Jobs are claimed
//! through an atomic index, results flow back over a channel, and the run is
//! complete once every worker task has been joined.

use crate::executor::{RequestExecutor, RequestResult};
use crate::targets::TargetList;
use chrono::{DateTime, Utc};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;

/// Everything a finished run hands to the aggregator
#[derive(Debug, Clone)]
pub struct RunOutput {
    /// One result per job, in arrival order
    pub results: Vec<RequestResult>,
    /// When the first worker was spawned
    pub started_at: DateTime<Utc>,
    /// Wall-clock time from first dispatch to last join
    pub elapsed: Duration,
    /// Workers actually spawned
    pub concurrency: usize,
}

/// Hands out job indexes `0..total`, each exactly once
#[derive(Debug)]
struct JobSource {
    next: AtomicUsize,
    total: usize,
}

impl JobSource {
    fn new(total: usize) -> Self {
        Self {
            next: AtomicUsize::new(0),
            total,
        }
    }

    fn claim(&self) -> Option<usize> {
        let job = self.next.fetch_add(1, Ordering::Relaxed);
        (job < self.total).then_some(job)
    }
}

/// Fixed-size pool of request workers
pub struct WorkerPool<E> {
    executor: Arc<E>,
    targets: Arc<TargetList>,
}

impl<E: RequestExecutor + 'static> WorkerPool<E> {
    pub fn new(executor: E, targets: TargetList) -> Self {
        Self {
            executor: Arc::new(executor),
            targets: Arc::new(targets),
        }
    }

    /// Run `requests` jobs on at most `concurrency` workers
    ///
    /// `on_result` sees every result as it arrives, before aggregation.
    /// Per-request failures are part of the output, never an error.
    pub async fn run<F>(&self, requests: usize, concurrency: usize, mut on_result: F) -> RunOutput
    where
        F: FnMut(&RequestResult),
    {
        let concurrency = concurrency.min(requests);
        let jobs = Arc::new(JobSource::new(requests));
        let (tx, mut rx) = mpsc::unbounded_channel::<RequestResult>();

        tracing::info!(
            requests = %requests,
            concurrency = %concurrency,
            targets = %self.targets.len(),
            "Starting workers"
        );

        let started_at = Utc::now();
        let start = Instant::now();
        let mut handles = Vec::with_capacity(concurrency);
        for worker in 0..concurrency {
            let executor = Arc::clone(&self.executor);
            let targets = Arc::clone(&self.targets);
            let jobs = Arc::clone(&jobs);
            let tx = tx.clone();

            handles.push(tokio::spawn(async move {
                let mut completed = 0usize;
                while let Some(job) = jobs.claim() {
                    let url = targets.for_job(job);
                    let outcome = executor.execute(url).await;
                    if let Err(err) = tx.send(RequestResult {
                        job,
                        url: url.to_string(),
                        outcome,
                    }) {
                        tracing::error!(worker = %worker, error = %err, "Result channel closed");
                        break;
                    }
                    completed += 1;
                }
                tracing::debug!(worker = %worker, completed = %completed, "Worker finished");
            }));
        }
        drop(tx);

        let mut results = Vec::with_capacity(requests);
        while let Some(result) = rx.recv().await {
            on_result(&result);
            results.push(result);
        }

        for handle in handles {
            if let Err(err) = handle.await {
                tracing::error!(error = %err, "Worker task panicked");
            }
        }
        let elapsed = start.elapsed();

        tracing::info!(
            results = %results.len(),
            elapsed_ms = %(elapsed.as_secs_f64() * 1000.0),
            "Workers finished"
        );

        RunOutput {
            results,
            started_at,
            elapsed,
            concurrency,
        }
    }
}
