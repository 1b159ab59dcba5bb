//! Report rendering
//!
//! Text output keeps a fixed layout so it can be scraped; JSON output carries
//! the full summary.

use crate::executor::{Outcome, RequestResult};
use crate::metrics::{DurationStats, RunSummary};
use crate::pool::RunOutput;
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Header line printed before the run starts
pub fn announce(sequential: bool) -> &'static str {
    if sequential {
        "Running sequential test..."
    } else {
        "Starting load test..."
    }
}

/// One line per result, used by sequential runs
pub fn render_result_line(result: &RequestResult) -> String {
    match &result.outcome {
        Outcome::Response { status, .. } => format!("Response code: {status}"),
        Outcome::Failed(err) => format!("Request error: {err}"),
    }
}

/// Human-readable summary
pub fn render_text(summary: &RunSummary) -> String {
    format!(
        "Results:\n \
         Total Requests (2XX)..........................: {}\n \
         Failed Requests (non-2XX or network error)....: {}\n \
         Total Requests Per Second.....................: {:.2}\n\
         Total Request Time (s) (Min, Max, Mean).......: {}\n\
         Time to First Byte (s) (Min, Max, Mean).......: {}\n\
         Time to Last Byte (s) (Min, Max, Mean)........: {}\n",
        summary.successful,
        summary.failed,
        summary.requests_per_second,
        triple(&summary.total_time),
        triple(&summary.time_to_first_byte),
        triple(&summary.time_to_last_byte),
    )
}

fn triple(stats: &DurationStats) -> String {
    format!(
        "{:.2}, {:.2}, {:.2} ms",
        stats.min_ms, stats.max_ms, stats.mean_ms
    )
}

/// Machine-readable report
#[derive(Debug, Serialize)]
pub struct JsonReport<'a> {
    pub started_at: DateTime<Utc>,
    pub targets: &'a [String],
    #[serde(flatten)]
    pub summary: &'a RunSummary,
}

impl<'a> JsonReport<'a> {
    pub fn new(output: &RunOutput, targets: &'a [String], summary: &'a RunSummary) -> Self {
        Self {
            started_at: output.started_at,
            targets,
            summary,
        }
    }

    pub fn render(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RequestError;
    use std::collections::BTreeMap;

    fn summary() -> RunSummary {
        RunSummary {
            total_requests: 10,
            concurrency: 4,
            successful: 7,
            failed: 3,
            errors: 1,
            duration_ms: 812.5,
            requests_per_second: 12.3456,
            total_time: DurationStats {
                min_ms: 1.234,
                max_ms: 98.7,
                mean_ms: 20.0,
            },
            time_to_first_byte: DurationStats {
                min_ms: 0.5,
                max_ms: 50.0,
                mean_ms: 10.006,
            },
            time_to_last_byte: DurationStats {
                min_ms: 1.234,
                max_ms: 98.7,
                mean_ms: 20.0,
            },
            status_distribution: BTreeMap::from([(200, 7), (500, 2)]),
        }
    }

    #[test]
    fn test_text_layout() {
        let text = render_text(&summary());
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(
            lines,
            vec![
                "Results:",
                " Total Requests (2XX)..........................: 7",
                " Failed Requests (non-2XX or network error)....: 3",
                " Total Requests Per Second.....................: 12.35",
                "Total Request Time (s) (Min, Max, Mean).......: 1.23, 98.70, 20.00 ms",
                "Time to First Byte (s) (Min, Max, Mean).......: 0.50, 50.00, 10.01 ms",
                "Time to Last Byte (s) (Min, Max, Mean)........: 1.23, 98.70, 20.00 ms",
            ]
        );
    }

    #[test]
    fn test_result_lines() {
        let ok = RequestResult {
            job: 0,
            url: "http://target.test/".to_string(),
            outcome: Outcome::Response {
                status: 200,
                timing: crate::executor::Timing {
                    ttfb: std::time::Duration::from_millis(1),
                    ttlb: std::time::Duration::from_millis(2),
                },
            },
        };
        assert_eq!(render_result_line(&ok), "Response code: 200");

        let failed = RequestResult {
            job: 1,
            url: "http://target.test/".to_string(),
            outcome: Outcome::Failed(RequestError::Connect("refused".to_string())),
        };
        assert_eq!(
            render_result_line(&failed),
            "Request error: connection error: refused"
        );
    }

    #[test]
    fn test_announce() {
        assert_eq!(announce(true), "Running sequential test...");
        assert_eq!(announce(false), "Starting load test...");
    }

    #[test]
    fn test_json_report() {
        let summary = summary();
        let targets = vec!["http://target.test/".to_string()];
        let output = RunOutput {
            results: Vec::new(),
            started_at: Utc::now(),
            elapsed: std::time::Duration::from_millis(812),
            concurrency: 4,
        };

        let json = JsonReport::new(&output, &targets, &summary).render().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["successful"], 7);
        assert_eq!(value["targets"][0], "http://target.test/");
        assert_eq!(value["status_distribution"]["500"], 2);
        assert!(value["started_at"].is_string());
    }
}
