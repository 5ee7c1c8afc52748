//! Per-pass discovery set and its owner task
//!
//! Backends never touch the discovery set directly. They push [`DiscoveryEvent`]s onto an
//! unbounded channel through a [`DiscoverySink`]; one owner task drains the channel, applies
//! the URL policy, performs the check-and-insert and appends new URLs to the run's
//! [`OutputAggregator`].

use crate::output::OutputAggregator;
use crate::url::{normalize_discovered, PolicyDecision, UrlPolicy};
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::task::JoinHandle;
use url::Url;

/// Something a backend observed while crawling
#[derive(Debug, Clone)]
pub enum DiscoveryEvent {
    /// A candidate URL
    Candidate { url: Url, backend: &'static str },

    /// A failure inside a backend's own traversal, already classified
    Failure { backend: &'static str, suppressed: bool },
}

/// URLs accepted within one orchestration pass
///
/// A URL appears at most once; [`DiscoverySet::insert`] checks and inserts in one step.
#[derive(Debug, Default)]
pub struct DiscoverySet {
    urls: HashSet<String>,
}

impl DiscoverySet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts the URL, returning false if it was already present
    pub fn insert(&mut self, url: &Url) -> bool {
        self.urls.insert(url.to_string())
    }

    pub fn contains(&self, url: &Url) -> bool {
        self.urls.contains(url.as_str())
    }

    pub fn len(&self) -> usize {
        self.urls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.urls.is_empty()
    }
}

/// Sending half handed to every backend of a pass
#[derive(Debug, Clone)]
pub struct DiscoverySink {
    tx: UnboundedSender<DiscoveryEvent>,
}

impl DiscoverySink {
    /// Emits a candidate URL
    pub fn emit(&self, backend: &'static str, url: Url) {
        // The owner only stops once every sink is dropped, so a send failure means the
        // pass was abandoned and the candidate can go.
        let _ = self.tx.send(DiscoveryEvent::Candidate { url, backend });
    }

    /// Emits a raw string candidate, skipping it silently if it is not an absolute web URL
    pub fn emit_raw(&self, backend: &'static str, raw: &str) {
        match normalize_discovered(raw) {
            Some(url) => self.emit(backend, url),
            None => tracing::trace!("[{}] skipping malformed candidate {:?}", backend, raw),
        }
    }

    /// Records a classified failure for the run statistics
    pub fn failure(&self, backend: &'static str, suppressed: bool) {
        let _ = self.tx.send(DiscoveryEvent::Failure { backend, suppressed });
    }
}

/// What one pass's owner task saw
#[derive(Debug, Clone, Default)]
pub struct PassDiscoveries {
    /// URLs accepted into the pass's discovery set, in acceptance order
    pub accepted: Vec<Url>,

    /// Accepted URLs the run had never recorded before
    pub new_urls: Vec<Url>,

    pub duplicates: u64,
    pub out_of_scope: u64,
    pub excluded_extension: u64,
    pub suppressed_errors: u64,
    pub reported_errors: u64,
}

/// Handle on a running owner task
#[derive(Debug)]
pub struct DiscoveryOwner {
    handle: JoinHandle<PassDiscoveries>,
}

impl DiscoveryOwner {
    /// Starts an owner task for one pass
    ///
    /// # Arguments
    ///
    /// * `policy` - Scope and extension policy applied to every candidate
    /// * `aggregator` - Run-wide record store
    /// * `echo` - Print each URL new to the run on stdout
    ///
    /// # Returns
    ///
    /// The sink for backends and the owner handle. The owner finishes once every clone
    /// of the sink has been dropped.
    pub fn spawn(
        policy: Arc<UrlPolicy>,
        aggregator: OutputAggregator,
        echo: bool,
    ) -> (DiscoverySink, Self) {
        let (tx, rx) = mpsc::unbounded_channel();
        let handle = tokio::spawn(drain(rx, policy, aggregator, echo));
        (DiscoverySink { tx }, Self { handle })
    }

    /// Waits for the owner task to drain the channel
    pub async fn finish(self) -> PassDiscoveries {
        match self.handle.await {
            Ok(discoveries) => discoveries,
            Err(e) => {
                tracing::error!("Discovery owner task failed: {}", e);
                PassDiscoveries::default()
            }
        }
    }
}

async fn drain(
    mut rx: UnboundedReceiver<DiscoveryEvent>,
    policy: Arc<UrlPolicy>,
    aggregator: OutputAggregator,
    echo: bool,
) -> PassDiscoveries {
    let mut set = DiscoverySet::new();
    let mut outcome = PassDiscoveries::default();

    while let Some(event) = rx.recv().await {
        match event {
            DiscoveryEvent::Candidate { url, backend } => match policy.evaluate(&url) {
                PolicyDecision::OutOfScope => {
                    tracing::debug!("[{}] out of scope: {}", backend, url);
                    outcome.out_of_scope += 1;
                }
                PolicyDecision::ExcludedExtension => {
                    tracing::debug!("[{}] excluded extension: {}", backend, url);
                    outcome.excluded_extension += 1;
                }
                PolicyDecision::Accepted => {
                    if !set.insert(&url) {
                        outcome.duplicates += 1;
                        continue;
                    }

                    tracing::debug!("[{}] discovered {}", backend, url);
                    if aggregator.record(&url) {
                        if echo {
                            println!("{}", url);
                        }
                        outcome.new_urls.push(url.clone());
                    }
                    outcome.accepted.push(url);
                }
            },
            DiscoveryEvent::Failure { suppressed, .. } => {
                if suppressed {
                    outcome.suppressed_errors += 1;
                } else {
                    outcome.reported_errors += 1;
                }
            }
        }
    }

    outcome
}
