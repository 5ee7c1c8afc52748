//! Configuration module for Sitetrawl
//!
//! Settings come from command-line flags, optionally layered over a TOML file with
//! `[crawler]`, `[proxy]` and `[output]` sections.
//!
//! # Example
//!
//! ```no_run
//! use sitetrawl::config::{resolve_config, ConfigOverrides};
//! use std::path::Path;
//!
//! let config = resolve_config(Some(Path::new("sitetrawl.toml")), ConfigOverrides::default()).unwrap();
//! println!("Scope: {:?}", config.crawler.scope);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    Config, CrawlerConfig, OutputConfig, ProxyConfig, DEFAULT_ARCHIVE_ENDPOINT,
    DEFAULT_CONCURRENCY, DEFAULT_MAX_PAGES, DEFAULT_REQUEST_TIMEOUT_SECS, DEFAULT_USER_AGENT,
};

// Re-export parser functions
pub use parser::{parse_config, resolve_config, ConfigOverrides};
