//! Metrics aggregation
//!
//! Turns the full result set of a run into summary statistics. Nothing is
//! counted while the run is in progress; the summary is derived once at the end.

use crate::executor::RequestResult;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;

/// Min, max and mean of a set of durations, in milliseconds
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct DurationStats {
    pub min_ms: f64,
    pub max_ms: f64,
    pub mean_ms: f64,
}

impl DurationStats {
    /// Reduce a sequence of durations. An empty sequence gives all zeros.
    pub fn from_durations<I>(durations: I) -> Self
    where
        I: IntoIterator<Item = Duration>,
    {
        let mut iter = durations.into_iter();
        let Some(first) = iter.next() else {
            return Self::default();
        };

        let (min, max, total, count) = iter.fold(
            (first, first, first, 1u32),
            |(min, max, total, count), d| (min.min(d), max.max(d), total + d, count + 1),
        );

        Self {
            min_ms: as_millis(min),
            max_ms: as_millis(max),
            mean_ms: as_millis(total) / f64::from(count),
        }
    }
}

/// Microsecond resolution, reported as fractional milliseconds
fn as_millis(duration: Duration) -> f64 {
    duration.as_micros() as f64 / 1000.0
}

/// Aggregated statistics for one run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    /// Requests issued (one result each)
    pub total_requests: usize,
    /// Workers used
    pub concurrency: usize,
    /// Responses with a 2xx status
    pub successful: usize,
    /// Everything else: non-2xx responses and request errors
    pub failed: usize,
    /// Results that carried no response at all
    pub errors: usize,
    /// Wall-clock run time in milliseconds
    pub duration_ms: f64,
    /// Requests divided by wall-clock seconds
    pub requests_per_second: f64,
    /// Total request time; identical to time to last byte
    pub total_time: DurationStats,
    pub time_to_first_byte: DurationStats,
    pub time_to_last_byte: DurationStats,
    /// Count per response status code
    pub status_distribution: BTreeMap<u16, usize>,
}

/// Build the run summary from every result of a run
///
/// Only results with a complete response contribute to timing statistics,
/// including non-2xx ones. Throughput is `results / wall clock`.
pub fn aggregate(results: &[RequestResult], elapsed: Duration, concurrency: usize) -> RunSummary {
    let total_requests = results.len();
    let successful = results.iter().filter(|r| r.outcome.is_success()).count();

    let timings: Vec<_> = results.iter().filter_map(|r| r.outcome.timing()).collect();
    let errors = total_requests - timings.len();

    let mut status_distribution = BTreeMap::new();
    for status in results.iter().filter_map(|r| r.outcome.status()) {
        *status_distribution.entry(status).or_insert(0) += 1;
    }

    let seconds = elapsed.as_secs_f64();
    let requests_per_second = if seconds > 0.0 {
        total_requests as f64 / seconds
    } else {
        0.0
    };

    let ttlb = DurationStats::from_durations(timings.iter().map(|t| t.ttlb));

    RunSummary {
        total_requests,
        concurrency,
        successful,
        failed: total_requests - successful,
        errors,
        duration_ms: as_millis(elapsed),
        requests_per_second,
        total_time: ttlb,
        time_to_first_byte: DurationStats::from_durations(timings.iter().map(|t| t.ttfb)),
        time_to_last_byte: ttlb,
        status_distribution,
    }
}
