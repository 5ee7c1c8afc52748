//! HTTP fetcher implementation
//!
//! This module handles the plain HTTP side of the crawler:
//! - The fetch configuration shared by every backend of a run
//! - Building HTTP clients with the TLS toggle, user agent and proxy applied
//! - Picking a fresh egress proxy for each fetch attempt
//! - GET requests with redirect following and Content-Type classification

use crate::config::Config;
use crate::crawler::backends::BackendError;
use crate::crawler::classify::error_chain;
use crate::proxy::ProxyPool;
use reqwest::{redirect::Policy, Client};
use std::sync::Arc;
use std::time::Duration;
use url::Url;

/// Maximum redirect hops followed per request
const MAX_REDIRECTS: usize = 10;

/// Connection establishment timeout
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Settings every backend receives for a run
#[derive(Debug, Clone)]
pub struct FetchConfig {
    /// User agent for HTTP requests and the browser
    pub user_agent: String,

    /// Per-request timeout
    pub request_timeout: Duration,

    /// Disable TLS certificate validation
    pub ignore_ssl: bool,

    /// Accepted for compatibility; redirects are followed either way
    pub force_redirect: bool,

    /// Parallel requests for traversals that honour it
    pub concurrency: usize,

    /// Page cap for auto-enqueue traversals
    pub max_pages: usize,

    /// Base URL of the historical snapshot index
    pub archive_endpoint: String,

    /// Egress proxies, sampled per attempt
    pub proxies: Arc<ProxyPool>,
}

impl FetchConfig {
    /// Builds the fetch configuration from the resolved run configuration
    pub fn from_config(config: &Config, proxies: ProxyPool) -> Self {
        let crawler = &config.crawler;
        Self {
            user_agent: crawler.user_agent.clone(),
            request_timeout: Duration::from_secs(crawler.request_timeout_secs),
            ignore_ssl: crawler.ignore_ssl,
            force_redirect: crawler.force_redirect,
            concurrency: crawler.concurrency.max(1),
            max_pages: crawler.max_pages.max(1),
            archive_endpoint: crawler.archive_endpoint.trim_end_matches('/').to_string(),
            proxies: Arc::new(proxies),
        }
    }
}

/// Result of a fetch operation
#[derive(Debug)]
pub enum FetchResult {
    /// Successfully fetched an HTML page
    Success {
        /// Final URL after redirects
        final_url: Url,
        /// Page body content
        body: String,
    },

    /// Page loaded but is not HTML
    ContentMismatch {
        /// Final URL after redirects
        final_url: Url,
        /// The actual Content-Type received
        content_type: String,
    },

    /// Non-success HTTP status
    HttpError {
        /// Final URL after redirects
        final_url: Url,
        /// The HTTP status code
        status_code: u16,
    },

    /// Network error (connection refused, timeout, TLS failure, etc.)
    NetworkError {
        /// Error description, including every source
        error: String,
    },
}

impl FetchResult {
    /// Converts failures into a backend error for the requested URL
    pub fn into_result(self, requested: &Url) -> Result<FetchedPage, BackendError> {
        match self {
            Self::Success { final_url, body } => Ok(FetchedPage {
                final_url,
                body: Some(body),
            }),
            Self::ContentMismatch {
                final_url,
                content_type,
            } => {
                tracing::trace!("Not parsing {} ({})", final_url, content_type);
                Ok(FetchedPage {
                    final_url,
                    body: None,
                })
            }
            Self::HttpError {
                final_url,
                status_code,
            } => Err(BackendError::Status {
                url: final_url.to_string(),
                status: status_code,
            }),
            Self::NetworkError { error } => Err(BackendError::Http {
                url: requested.to_string(),
                message: error,
            }),
        }
    }
}

/// A page that loaded successfully
#[derive(Debug, Clone)]
pub struct FetchedPage {
    /// Final URL after redirects
    pub final_url: Url,

    /// HTML body, or None when the response was not HTML
    pub body: Option<String>,
}

/// Builds an HTTP client with proper configuration
///
/// # Arguments
///
/// * `config` - The fetch configuration
/// * `proxy` - Egress proxy for this client, or None for a direct connection
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(reqwest::Error)` - Failed to build client
///
/// # Example
///
/// ```no_run
/// use sitetrawl::config::Config;
/// use sitetrawl::crawler::{build_http_client, FetchConfig};
/// use sitetrawl::proxy::ProxyPool;
///
/// let config = FetchConfig::from_config(&Config::default(), ProxyPool::empty());
/// let client = build_http_client(&config, None).unwrap();
/// ```
pub fn build_http_client(
    config: &FetchConfig,
    proxy: Option<reqwest::Proxy>,
) -> Result<Client, reqwest::Error> {
    let builder = Client::builder()
        .user_agent(config.user_agent.as_str())
        .timeout(config.request_timeout)
        .connect_timeout(CONNECT_TIMEOUT)
        .redirect(Policy::limited(MAX_REDIRECTS))
        .danger_accept_invalid_certs(config.ignore_ssl)
        .gzip(true)
        .brotli(true);

    // Without a configured pool nothing is proxied, environment variables included
    let builder = match proxy {
        Some(proxy) => builder.proxy(proxy),
        None => builder.no_proxy(),
    };

    builder.build()
}

/// Hands out HTTP clients, one per fetch attempt
///
/// With an empty proxy pool every attempt shares one direct client. Otherwise each
/// attempt gets a client bound to a proxy picked uniformly at random from the pool.
#[derive(Debug, Clone)]
pub struct HttpClients {
    config: FetchConfig,
    direct: Client,
}

impl HttpClients {
    pub fn new(config: FetchConfig) -> Result<Self, reqwest::Error> {
        let direct = build_http_client(&config, None)?;
        Ok(Self { config, direct })
    }

    pub fn config(&self) -> &FetchConfig {
        &self.config
    }

    /// Client for the next fetch attempt
    pub fn for_attempt(&self) -> Result<Client, BackendError> {
        let pool = &self.config.proxies;
        let Some(endpoint) = pool.pick() else {
            return Ok(self.direct.clone());
        };

        tracing::trace!("Using proxy {}", endpoint);
        let proxy = endpoint.to_reqwest(pool.auth())?;
        Ok(build_http_client(&self.config, Some(proxy))?)
    }
}

/// Fetches a URL once, following redirects
///
/// # Request Flow
///
/// 1. Send a GET request (redirects followed up to 10 hops)
/// 2. Non-success status → HttpError
/// 3. Content-Type without "html" → ContentMismatch (body not read)
/// 4. Otherwise read the body → Success
///
/// There are no retries: a URL is attempted once per pass.
pub async fn fetch_url(client: &Client, url: &Url) -> FetchResult {
    let response = match client.get(url.as_str()).send().await {
        Ok(response) => response,
        Err(e) => {
            return FetchResult::NetworkError {
                error: error_chain(&e),
            }
        }
    };

    let status = response.status();
    let final_url = response.url().clone();

    if !status.is_success() {
        return FetchResult::HttpError {
            final_url,
            status_code: status.as_u16(),
        };
    }

    let content_type = response
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
        .to_ascii_lowercase();

    if !content_type.contains("html") {
        return FetchResult::ContentMismatch {
            final_url,
            content_type,
        };
    }

    match response.text().await {
        Ok(body) => FetchResult::Success { final_url, body },
        Err(e) => FetchResult::NetworkError {
            error: error_chain(&e),
        },
    }
}

/// Fetches a URL with a client for a fresh attempt
pub async fn fetch_page(clients: &HttpClients, url: &Url) -> Result<FetchedPage, BackendError> {
    let client = clients.for_attempt()?;
    fetch_url(&client, url).await.into_result(url)
}
