//! Sitetrawl main entry point
//!
//! This is the command-line interface for the Sitetrawl URL discovery crawler.

use clap::Parser;
use std::path::{Path, PathBuf};
use std::time::Instant;
use sitetrawl::config::{resolve_config, Config, ConfigOverrides};
use sitetrawl::crawler::{Orchestrator, RunOutcome};
use sitetrawl::input::InputSource;
use sitetrawl::output::{print_statistics, write_output, OutputAggregator, OutputFormat};
use tracing_subscriber::EnvFilter;

/// Sitetrawl: redundant multi-strategy URL discovery
///
/// Sitetrawl crawls each target with a headless browser (or a static markup parser),
/// a manual descent, a lightweight HTTP fetcher and the web archive index at the same
/// time, and merges everything they find into one deduplicated list.
#[derive(Parser, Debug)]
#[command(name = "sitetrawl")]
#[command(version = "1.0.0")]
#[command(about = "Redundant multi-strategy URL discovery", long_about = None)]
struct Cli {
    /// Target URL (scheme defaults to http://)
    #[arg(short, long)]
    url: Option<String>,

    /// File with one target URL per line
    #[arg(short, long, value_name = "FILE")]
    list: Option<PathBuf>,

    /// Path to TOML configuration file
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Restrict accepted hostnames, e.g. "*.example.com"
    #[arg(short, long)]
    scope: Option<String>,

    /// Parallel requests for eligible backends
    #[arg(short, long)]
    concurrency: Option<usize>,

    /// Use the headless browser as the primary fetcher
    #[arg(short, long)]
    recursive: bool,

    /// Stop the whole run after this many seconds, keeping what was found
    #[arg(short, long, value_name = "SECONDS")]
    timeout: Option<u64>,

    /// Disable TLS certificate validation
    #[arg(short = 'k', long)]
    ignore_ssl: bool,

    /// Accepted for compatibility; redirects are always followed
    #[arg(long)]
    force_redirect: bool,

    /// Comma-separated file extensions to skip, e.g. "png,jpg,css"
    #[arg(short, long, value_name = "EXTENSIONS")]
    exclude: Option<String>,

    /// Proxy URI, or a file with one proxy URI per line
    #[arg(short, long)]
    proxy: Option<String>,

    /// Proxy credentials as username:password
    #[arg(long, value_name = "USER:PASS")]
    proxy_auth: Option<String>,

    /// Write discovered URLs to this file (.txt or .json)
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Write structured JSON records
    #[arg(short, long)]
    json: bool,

    /// Re-crawl newly discovered URLs (up to depth 3)
    #[arg(short, long)]
    iterative: bool,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

impl Cli {
    fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            scope: self.scope.clone(),
            concurrency: self.concurrency,
            recursive: self.recursive,
            timeout_secs: self.timeout,
            ignore_ssl: self.ignore_ssl,
            force_redirect: self.force_redirect,
            exclude: self.exclude.clone(),
            proxy: self.proxy.clone(),
            proxy_auth: self.proxy_auth.clone(),
            output: self.output.clone(),
            json: self.json,
            iterative: self.iterative,
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    if let Some(path) = &cli.config {
        tracing::info!("Loading configuration from: {}", path.display());
    }
    let config = match resolve_config(cli.config.as_deref(), cli.overrides()) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("Invalid configuration: {}", e);
            return Err(e.into());
        }
    };

    let source = InputSource::detect(cli.url.clone(), cli.list.clone())?;
    let targets = source.load_targets()?;
    tracing::info!("Loaded {} targets", targets.len());

    let mut orchestrator = Orchestrator::new(config.clone())?;
    let aggregator = orchestrator.aggregator();
    let started = Instant::now();

    match orchestrator.run_with_deadline(targets).await? {
        RunOutcome::Completed => {
            print_statistics(orchestrator.statistics(), aggregator.len(), started.elapsed());
            flush_output(&config, &aggregator)?;
            Ok(())
        }
        RunOutcome::TimedOut => {
            flush_output(&config, &aggregator)?;
            // Abandoned fetches and browser processes go down with the process
            std::process::exit(0);
        }
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
///
/// Logs go to stderr; stdout only carries discovered URLs.
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("sitetrawl=info,warn"),
            1 => EnvFilter::new("sitetrawl=debug,info"),
            2 => EnvFilter::new("sitetrawl=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Writes the accumulated records, if an output file was requested
///
/// A failed JSON write is fatal; a failed text write is only reported.
fn flush_output(
    config: &Config,
    aggregator: &OutputAggregator,
) -> Result<(), Box<dyn std::error::Error>> {
    let Some(path) = config.output.path.as_deref() else {
        return Ok(());
    };

    let records = aggregator.snapshot();
    match write_output(path, config.output.json, &records) {
        Ok(_) => Ok(()),
        Err(e) => {
            tracing::error!("Failed to write {}: {}", path.display(), e);
            if is_json_output(path, config.output.json) {
                Err(e.into())
            } else {
                Ok(())
            }
        }
    }
}

fn is_json_output(path: &Path, json_flag: bool) -> bool {
    matches!(OutputFormat::resolve(path, json_flag), Ok(OutputFormat::Json))
}
