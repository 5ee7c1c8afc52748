//! Crawl orchestration
//!
//! This module drives the per-target passes of a run, including:
//! - Normalizing and policy-checking each target
//! - Fanning out to every backend and waiting for all of them
//! - Merging discoveries through the pass's owner task
//! - Iterative re-crawls of newly discovered URLs, up to a fixed depth
//! - The global deadline

use crate::config::Config;
use crate::crawler::backends::{
    default_backends, BackendError, FetchBackend, FetchContext, FetchStrategy,
};
use crate::crawler::discovery::{DiscoveryOwner, PassDiscoveries};
use crate::crawler::fetcher::{FetchConfig, HttpClients};
use crate::output::{CrawlStatistics, OutputAggregator};
use crate::proxy::ProxyPool;
use crate::state::{CrawlPhase, PhaseTracker};
use crate::url::{normalize_discovered, PolicyDecision, UrlPolicy};
use crate::TrawlError;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinSet;
use url::Url;

/// Deepest pass iterative mode will start; the root pass is depth 1
pub const MAX_CRAWL_DEPTH: u32 = 3;

/// Name under which the orchestrator emits the target itself
const ORCHESTRATOR: &str = "orchestrator";

/// How a run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    /// Every target was processed
    Completed,
    /// The global deadline fired first
    TimedOut,
}

/// Summary of one pass
#[derive(Debug, Clone)]
pub struct PassReport {
    pub target: Url,
    pub depth: u32,
    /// True when the pass ended before fetching (malformed or rejected target)
    pub skipped: bool,
    pub discoveries: PassDiscoveries,
    /// URLs to re-crawl at `depth + 1`
    pub recurse: Vec<Url>,
}

impl PassReport {
    fn skipped(target: Url, depth: u32) -> Self {
        Self {
            target,
            depth,
            skipped: true,
            discoveries: PassDiscoveries::default(),
            recurse: Vec::new(),
        }
    }
}

/// Main orchestrator structure
pub struct Orchestrator {
    config: Arc<Config>,
    policy: Arc<UrlPolicy>,
    clients: Arc<HttpClients>,
    backends: Vec<Arc<dyn FetchBackend>>,
    aggregator: OutputAggregator,
    stats: CrawlStatistics,
    echo: bool,
}

impl Orchestrator {
    /// Creates an orchestrator with the standard backend set
    ///
    /// The primary fetcher is chosen once from the recursive flag.
    ///
    /// # Returns
    ///
    /// * `Ok(Orchestrator)` - Ready to run
    /// * `Err(TrawlError)` - Invalid proxy source, scope pattern, or HTTP client setup
    pub fn new(config: Config) -> Result<Self, TrawlError> {
        let strategy = FetchStrategy::from_recursive(config.crawler.recursive);
        tracing::debug!("Primary fetch strategy: {:?}", strategy);
        Self::with_backends(config, default_backends(strategy))
    }

    /// Creates an orchestrator running exactly the given backends
    pub fn with_backends(
        config: Config,
        backends: Vec<Arc<dyn FetchBackend>>,
    ) -> Result<Self, TrawlError> {
        let proxies = ProxyPool::load(config.proxy.source.as_deref(), config.proxy.auth.as_deref())?;
        if !proxies.is_empty() {
            tracing::info!("Loaded {} proxies", proxies.len());
        }

        let policy = Arc::new(UrlPolicy::from_config(&config.crawler)?);
        let clients = Arc::new(HttpClients::new(FetchConfig::from_config(&config, proxies))?);

        Ok(Self {
            config: Arc::new(config),
            policy,
            clients,
            backends,
            aggregator: OutputAggregator::new(),
            stats: CrawlStatistics::new(),
            echo: true,
        })
    }

    /// Enables or disables printing newly recorded URLs on stdout (on by default)
    pub fn echo_discoveries(mut self, echo: bool) -> Self {
        self.echo = echo;
        self
    }

    /// Handle on the run's records; shares state with the orchestrator
    pub fn aggregator(&self) -> OutputAggregator {
        self.aggregator.clone()
    }

    pub fn statistics(&self) -> &CrawlStatistics {
        &self.stats
    }

    /// Runs every target under the configured global deadline
    ///
    /// When the deadline fires, in-flight passes are dropped (their backend tasks are
    /// aborted) and whatever the aggregator holds is left for the caller to flush.
    pub async fn run_with_deadline(&mut self, targets: Vec<Url>) -> Result<RunOutcome, TrawlError> {
        let Some(secs) = self.config.crawler.timeout_secs else {
            self.run(targets).await?;
            return Ok(RunOutcome::Completed);
        };

        match tokio::time::timeout(Duration::from_secs(secs), self.run(targets)).await {
            Ok(result) => {
                result?;
                Ok(RunOutcome::Completed)
            }
            Err(_) => {
                tracing::warn!("Timeout of {}s reached, stopping", secs);
                Ok(RunOutcome::TimedOut)
            }
        }
    }

    /// Processes targets strictly one after another
    pub async fn run(&mut self, targets: Vec<Url>) -> Result<(), TrawlError> {
        tracing::info!("Starting run over {} targets", targets.len());

        for target in targets {
            self.stats.targets += 1;
            let reports = self.crawl_target(&target).await?;
            if reports.first().is_some_and(|r| r.skipped) {
                self.stats.targets_skipped += 1;
            }
        }

        Ok(())
    }

    /// Crawls one root target, including iterative re-crawls
    ///
    /// Re-crawls are driven by a worklist of `(url, depth)` pairs; each pops one pass.
    pub async fn crawl_target(&mut self, root: &Url) -> Result<Vec<PassReport>, TrawlError> {
        let mut worklist = vec![(root.clone(), 1u32)];
        let mut reports = Vec::new();

        while let Some((url, depth)) = worklist.pop() {
            let report = self.run_pass(&url, depth).await?;
            worklist.extend(report.recurse.iter().rev().map(|u| (u.clone(), depth + 1)));
            reports.push(report);
        }

        Ok(reports)
    }

    /// Runs one orchestration pass
    ///
    /// # Phases
    ///
    /// 1. `Normalizing` - strip the fragment; malformed targets end the pass
    /// 2. `PolicyCheck` - out-of-scope or excluded targets end the pass
    /// 3. `Fetching` - all backends run concurrently; the pass waits for every one
    /// 4. `Merging` - the owner task drains the remaining discoveries
    /// 5. `Recursing` - iterative mode only, when new URLs were found below the ceiling
    async fn run_pass(&mut self, raw: &Url, depth: u32) -> Result<PassReport, TrawlError> {
        let mut tracker = PhaseTracker::new(raw.as_str());

        let Some(target) = normalize_discovered(raw.as_str()) else {
            tracing::warn!("Skipping malformed target {}", raw);
            tracker.advance(CrawlPhase::Done)?;
            return Ok(PassReport::skipped(raw.clone(), depth));
        };

        tracker.advance(CrawlPhase::PolicyCheck)?;
        match self.policy.evaluate(&target) {
            PolicyDecision::Accepted => {}
            PolicyDecision::OutOfScope => {
                tracing::info!("Skipping {}: out of scope", target);
                tracker.advance(CrawlPhase::Done)?;
                return Ok(PassReport::skipped(target, depth));
            }
            PolicyDecision::ExcludedExtension => {
                tracing::info!("Skipping {}: excluded extension", target);
                tracker.advance(CrawlPhase::Done)?;
                return Ok(PassReport::skipped(target, depth));
            }
        }

        tracker.advance(CrawlPhase::Fetching)?;
        tracing::info!("Crawling {} (depth {})", target, depth);
        self.stats.passes += 1;
        self.stats.max_depth_reached = self.stats.max_depth_reached.max(depth);

        let (sink, owner) =
            DiscoveryOwner::spawn(self.policy.clone(), self.aggregator.clone(), self.echo);
        sink.emit(ORCHESTRATOR, target.clone());

        let ctx = FetchContext::new(self.clients.clone(), self.policy.clone(), sink);
        let mut tasks = JoinSet::new();
        for backend in &self.backends {
            let backend = Arc::clone(backend);
            let ctx = ctx.clone();
            let target = target.clone();
            tasks.spawn(async move {
                let result = backend.discover(&target, &ctx).await;
                (backend.name(), result)
            });
        }
        // The owner stops once the last backend drops its sink
        drop(ctx);

        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((_, Ok(()))) => {}
                Ok((name, Err(e))) => self.record_backend_error(name, &target, &e),
                Err(e) => {
                    tracing::error!("Backend task for {} failed: {}", target, e);
                    self.stats.reported_errors += 1;
                }
            }
        }

        tracker.advance(CrawlPhase::Merging)?;
        let discoveries = owner.finish().await;
        self.absorb(&discoveries);
        tracing::info!(
            "{}: {} URLs accepted, {} new to this run",
            target,
            discoveries.accepted.len(),
            discoveries.new_urls.len()
        );

        let mut recurse = Vec::new();
        if self.config.crawler.iterative && depth < MAX_CRAWL_DEPTH {
            recurse = discoveries
                .new_urls
                .iter()
                .filter(|u| **u != target)
                .cloned()
                .collect();

            if !recurse.is_empty() {
                tracker.advance(CrawlPhase::Recursing)?;
                tracing::debug!(
                    "{}: re-crawling {} URLs at depth {}",
                    target,
                    recurse.len(),
                    depth + 1
                );
            }
        }

        tracker.advance(CrawlPhase::Done)?;

        Ok(PassReport {
            target,
            depth,
            skipped: false,
            discoveries,
            recurse,
        })
    }

    fn record_backend_error(&mut self, backend: &str, target: &Url, error: &BackendError) {
        if error.is_suppressed() {
            self.stats.suppressed_errors += 1;
            return;
        }

        self.stats.reported_errors += 1;
        tracing::error!("[{}] {} failed: {}", backend, target, error);
    }

    fn absorb(&mut self, discoveries: &PassDiscoveries) {
        self.stats.accepted += discoveries.accepted.len() as u64;
        self.stats.duplicates += discoveries.duplicates;
        self.stats.out_of_scope += discoveries.out_of_scope;
        self.stats.excluded_extension += discoveries.excluded_extension;
        self.stats.suppressed_errors += discoveries.suppressed_errors;
        self.stats.reported_errors += discoveries.reported_errors;
    }
}
