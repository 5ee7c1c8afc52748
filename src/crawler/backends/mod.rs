//! Fetch backends
//!
//! Every backend takes a root URL and the shared [`FetchContext`] and pushes whatever it
//! finds onto the pass's discovery channel. Backends run concurrently and know nothing
//! about each other; overlap between them is resolved by the discovery owner.
//!
//! | backend         | engine               | traversal                                  |
//! |-----------------|----------------------|--------------------------------------------|
//! | `rendered`      | headless Chromium    | same-origin auto-enqueue (recursive mode)  |
//! | `static`        | reqwest + scraper    | same-origin auto-enqueue in waves          |
//! | `descent`       | headless Chromium    | manual descent over every href/src         |
//! | `lightweight`   | reqwest + scraper    | target plus one hop, ten requests in flight|
//! | `archive`       | snapshot index       | none, never contacts the target            |

mod archive;
mod browser;
mod descent;
mod lightweight;
mod rendered;
mod static_markup;

pub use archive::{build_query_url, parse_index_lines, ArchiveBackend};
pub use descent::{should_descend, DescentBackend};
pub use lightweight::{LightweightBackend, MAX_IN_FLIGHT};
pub use rendered::RenderedBackend;
pub use static_markup::StaticMarkupBackend;

use crate::crawler::classify::should_suppress;
use crate::crawler::discovery::DiscoverySink;
use crate::crawler::fetcher::{FetchConfig, HttpClients};
use crate::url::{same_host, UrlPolicy};
use crate::ProxyError;
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;
use url::Url;

/// Errors raised by a backend
///
/// These never cross backends or abort a pass; the orchestrator classifies them and
/// either drops them silently or reports them.
#[derive(Debug, Error)]
pub enum BackendError {
    #[error("Request to {url} failed: {message}")]
    Http { url: String, message: String },

    #[error("HTTP {status} for {url}")]
    Status { url: String, status: u16 },

    #[error("Browser error: {0}")]
    Browser(String),

    #[error("Archive index query failed: {0}")]
    Archive(String),

    #[error("Failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),

    #[error("Proxy error: {0}")]
    Proxy(#[from] ProxyError),
}

impl BackendError {
    /// Returns true if this failure is expected network noise
    pub fn is_suppressed(&self) -> bool {
        should_suppress(&self.to_string())
    }
}

/// A discovery strategy run against each root target
#[async_trait]
pub trait FetchBackend: Send + Sync {
    /// Short name used in logs
    fn name(&self) -> &'static str;

    /// Crawls from `target`, emitting candidates through the context's sink
    ///
    /// An `Err` means the backend could not handle the target itself. Failures on pages
    /// reached from it are reported through [`FetchContext::report_failure`] and the
    /// traversal moves on.
    async fn discover(&self, target: &Url, ctx: &FetchContext) -> Result<(), BackendError>;
}

/// Which primary fetcher runs for every pass of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchStrategy {
    /// Headless browser with auto-enqueue
    Rendered,
    /// Raw markup, scripts never run
    Static,
}

impl FetchStrategy {
    /// Recursive mode selects the rendering engine
    pub fn from_recursive(recursive: bool) -> Self {
        if recursive {
            Self::Rendered
        } else {
            Self::Static
        }
    }

    /// Instantiates the primary backend for this strategy
    pub fn backend(&self) -> Arc<dyn FetchBackend> {
        match self {
            Self::Rendered => Arc::new(RenderedBackend),
            Self::Static => Arc::new(StaticMarkupBackend),
        }
    }
}

/// The full backend set for a pass: the primary fetcher, the manual descent, the
/// lightweight fetcher and the archive index
pub fn default_backends(strategy: FetchStrategy) -> Vec<Arc<dyn FetchBackend>> {
    vec![
        strategy.backend(),
        Arc::new(DescentBackend),
        Arc::new(LightweightBackend),
        Arc::new(ArchiveBackend),
    ]
}

/// Everything a backend needs during one pass
#[derive(Debug, Clone)]
pub struct FetchContext {
    pub clients: Arc<HttpClients>,
    pub policy: Arc<UrlPolicy>,
    pub sink: DiscoverySink,
}

impl FetchContext {
    pub fn new(clients: Arc<HttpClients>, policy: Arc<UrlPolicy>, sink: DiscoverySink) -> Self {
        Self {
            clients,
            policy,
            sink,
        }
    }

    pub fn config(&self) -> &FetchConfig {
        self.clients.config()
    }

    /// Emits a candidate URL to the discovery owner
    pub fn emit(&self, backend: &'static str, url: Url) {
        self.sink.emit(backend, url);
    }

    /// Returns true if a link found while crawling `target` is worth emitting
    ///
    /// With a scope configured the scope decides, so links to sibling subdomains are
    /// kept. Without one only links on the target's own host are kept.
    pub fn is_candidate(&self, link: &Url, target: &Url) -> bool {
        if self.policy.scope_pattern().is_some() {
            self.policy.in_scope(link)
        } else {
            same_host(link, target)
        }
    }

    /// Emits the URL a fetch of `target` ended up on, if it is still a candidate
    ///
    /// A redirect can land anywhere, so the final URL gets the same check as a link.
    pub fn emit_final(&self, backend: &'static str, final_url: &Url, target: &Url) {
        if self.is_candidate(final_url, target) {
            self.emit(backend, final_url.clone());
        } else {
            tracing::debug!("[{}] {} redirected off-site to {}", backend, target, final_url);
        }
    }

    /// Classifies and records a failure inside a traversal
    pub fn report_failure(&self, backend: &'static str, error: &BackendError) {
        let suppressed = error.is_suppressed();
        if !suppressed {
            tracing::warn!("[{}] {}", backend, error);
        }
        self.sink.failure(backend, suppressed);
    }
}
