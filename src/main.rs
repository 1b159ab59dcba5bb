//! load-check - Main Application
//!
//! Command-line HTTP load generator.

use clap::Parser;
use load_check::{
    config::{AppConfig, CliOverrides, OutputFormat, RunSettings},
    error::LoadError,
    report::{self, JsonReport},
    targets::{self, TargetSource},
    testing::LoadTester,
};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// load-check - HTTP load generator with TTFB/TTLB statistics
#[derive(Parser)]
#[command(name = "load-check")]
#[command(about = "Send N GET requests across C workers and report latency and throughput")]
#[command(version)]
struct Cli {
    /// URL to test (used when neither -u nor -f is given)
    url_arg: Vec<String>,

    /// URL to test
    #[arg(short = 'u', long = "url")]
    url: Option<String>,

    /// File containing URLs to test, one per line
    #[arg(short = 'f', long = "file")]
    file: Option<PathBuf>,

    /// Number of requests
    #[arg(short = 'n', long = "requests", allow_negative_numbers = true)]
    requests: Option<i64>,

    /// Number of concurrent requests
    #[arg(short = 'c', long = "concurrency", allow_negative_numbers = true)]
    concurrency: Option<i64>,

    /// Per-request timeout in seconds
    #[arg(long)]
    timeout: Option<u64>,

    /// Print the summary as JSON
    #[arg(long)]
    json: bool,

    /// Configuration file path (defaults to load-check.toml when present)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Print the effective configuration and exit
    #[arg(long)]
    print_config: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Logs go to stderr so the report on stdout stays clean
    let log_level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("load_check={}", log_level).into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::from(e.exit_code())
        }
    }
}

async fn run(cli: Cli) -> Result<(), LoadError> {
    let config = load_config(cli.config.as_deref())?;

    if cli.print_config {
        let json = serde_json::to_string_pretty(&config)?;
        println!("{json}");
        return Ok(());
    }

    let targets = targets::resolve(&TargetSource {
        file: cli.file,
        url: cli.url,
        args: cli.url_arg.clone(),
    })?;

    // A bare URL with no counts is a one-off request
    let overrides = CliOverrides {
        requests: cli.requests,
        concurrency: cli.concurrency,
        timeout_secs: cli.timeout,
        json: cli.json,
        single_shot: cli.requests.is_none()
            && cli.concurrency.is_none()
            && !cli.url_arg.is_empty(),
    };
    let settings = RunSettings::resolve(&config, &overrides)?;

    let text = settings.format == OutputFormat::Text;
    let sequential = settings.is_sequential();
    let tester = LoadTester::new(settings)?;

    if text {
        println!("{}", report::announce(sequential));
    }

    let target_urls = targets.urls().to_vec();
    let load_test = tester
        .run(targets, |result| {
            if text && sequential {
                println!("{}", report::render_result_line(result));
            }
        })
        .await;

    match tester.settings().format {
        OutputFormat::Text => {
            println!();
            print!("{}", report::render_text(&load_test.summary));
        }
        OutputFormat::Json => {
            let json = JsonReport::new(&load_test.output, &target_urls, &load_test.summary).render()?;
            println!("{json}");
        }
    }

    Ok(())
}

fn load_config(path: Option<&std::path::Path>) -> Result<AppConfig, LoadError> {
    AppConfig::load(path).map_err(|e| {
        tracing::warn!(error = %e, "Failed to load configuration");
        LoadError::ConfigFile(format!("{e:#}"))
    })
}
