//! Sitetrawl: redundant multi-strategy URL discovery
//!
//! This crate crawls a target host with several independent fetch strategies at once
//! (a headless browser, static markup parsing, a lightweight HTTP pass and the web archive
//! index), merges what they find into one deduplicated set per root, and renders the result
//! as a sorted URL list or as structured JSON records.

pub mod config;
pub mod crawler;
pub mod input;
pub mod output;
pub mod proxy;
pub mod state;
pub mod url;

use thiserror::Error;

/// Main error type for Sitetrawl operations
#[derive(Debug, Error)]
pub enum TrawlError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("URL error: {0}")]
    UrlError(#[from] UrlError),

    #[error("Proxy error: {0}")]
    Proxy(#[from] ProxyError),

    #[error("Output error: {0}")]
    Output(#[from] output::OutputError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("Invalid phase transition: {from:?} -> {to:?}")]
    InvalidTransition {
        from: state::CrawlPhase,
        to: state::CrawlPhase,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),

    #[error("Invalid domain pattern: {0}")]
    InvalidPattern(String),

    #[error("No input source: pass --url, --list, or pipe URLs on standard input")]
    NoInputSource,

    #[error("Failed to read target list {path}: {source}")]
    TargetList {
        path: String,
        source: std::io::Error,
    },
}

/// URL-specific errors
#[derive(Debug, Error)]
pub enum UrlError {
    #[error("Failed to parse URL: {0}")]
    Parse(String),

    #[error("Invalid URL scheme: {0}")]
    InvalidScheme(String),

    #[error("Missing domain in URL")]
    MissingDomain,
}

/// Proxy configuration errors
///
/// All of these are fatal: a run never starts with a proxy pool it cannot use.
#[derive(Debug, Error)]
pub enum ProxyError {
    #[error("Invalid proxy URI '{uri}': {reason}")]
    InvalidUri { uri: String, reason: String },

    #[error("Unsupported proxy scheme '{0}' (expected http, https, socks4 or socks5)")]
    UnsupportedScheme(String),

    #[error("Failed to read proxy file {path}: {source}")]
    File {
        path: String,
        source: std::io::Error,
    },

    #[error("Invalid proxy credentials: expected username:password")]
    InvalidAuth,

    #[error("Failed to build proxy: {0}")]
    Build(#[from] reqwest::Error),
}

/// Result type alias for Sitetrawl operations
pub type Result<T> = std::result::Result<T, TrawlError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for URL operations
pub type UrlResult<T> = std::result::Result<T, UrlError>;

// Re-export commonly used types
pub use config::Config;
pub use state::CrawlPhase;
pub use crate::url::{normalize_target, UrlPolicy};
