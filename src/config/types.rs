use serde::Deserialize;
use std::path::PathBuf;

/// Default number of parallel requests for backends that honour it
pub const DEFAULT_CONCURRENCY: usize = 5;

/// Default per-request timeout in seconds
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Default cap on pages visited by one backend traversal
pub const DEFAULT_MAX_PAGES: usize = 1000;

/// Default historical snapshot index host
pub const DEFAULT_ARCHIVE_ENDPOINT: &str = "https://web.archive.org";

/// Default user agent sent by the HTTP backends and the browser
pub const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Main configuration structure for Sitetrawl
///
/// Every section is optional in the TOML file; command-line flags override file values.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub crawler: CrawlerConfig,
    pub proxy: ProxyConfig,
    pub output: OutputConfig,
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct CrawlerConfig {
    /// Hostname pattern restricting accepted URLs (e.g. "*.example.com")
    pub scope: Option<String>,

    /// Maximum parallel requests for eligible backends
    pub concurrency: usize,

    /// Use the rendered-DOM fetcher instead of the static-markup fetcher
    pub recursive: bool,

    /// Hard deadline for the whole run, in seconds
    pub timeout_secs: Option<u64>,

    /// Disable TLS certificate validation
    pub ignore_ssl: bool,

    /// Accepted for compatibility; redirects follow backend defaults either way
    pub force_redirect: bool,

    /// File extensions whose URLs are skipped (case-insensitive, no leading dot)
    pub exclude_extensions: Vec<String>,

    /// Re-crawl newly discovered URLs, up to the fixed depth ceiling
    pub iterative: bool,

    /// Per-request timeout, in seconds
    pub request_timeout_secs: u64,

    /// Maximum pages one backend traversal visits
    pub max_pages: usize,

    /// User agent string
    pub user_agent: String,

    /// Base URL of the historical snapshot index
    pub archive_endpoint: String,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            scope: None,
            concurrency: DEFAULT_CONCURRENCY,
            recursive: false,
            timeout_secs: None,
            ignore_ssl: false,
            force_redirect: false,
            exclude_extensions: Vec::new(),
            iterative: false,
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            max_pages: DEFAULT_MAX_PAGES,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            archive_endpoint: DEFAULT_ARCHIVE_ENDPOINT.to_string(),
        }
    }
}

/// Egress proxy configuration
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct ProxyConfig {
    /// A single proxy URI, or a path to a file with one URI per line
    pub source: Option<String>,

    /// Credentials applied to every selected proxy, as "username:password"
    pub auth: Option<String>,
}

/// Output configuration
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct OutputConfig {
    /// Destination file; nothing is written when absent
    pub path: Option<PathBuf>,

    /// Render structured JSON records instead of a URL list
    pub json: bool,
}
