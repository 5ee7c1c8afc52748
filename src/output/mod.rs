//! Output module for discovery records
//!
//! This module handles:
//! - Building one structured record per accepted URL
//! - Accumulating records for the whole run
//! - Rendering the plain-text or JSON encoding and writing it once
//! - Recording crawl statistics

mod aggregator;
mod record;
pub mod stats;
mod writer;

pub use aggregator::OutputAggregator;
pub use record::DiscoveryRecord;
pub use stats::{print_statistics, CrawlStatistics};
pub use writer::{render, render_json, render_text, write_output, OutputFormat};

use thiserror::Error;

/// Errors that can occur during output operations
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("Unsupported output file '{0}': use a .txt or .json extension, or pass --json")]
    UnsupportedFormat(String),

    #[error("Failed to encode JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;
