//! Run statistics
//!
//! Counters accumulated by the orchestrator across all passes of a run and logged
//! once the run completes.

use std::time::Duration;

/// Crawl statistics summary
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CrawlStatistics {
    /// Root targets taken from the input source
    pub targets: u64,

    /// Root targets rejected by the policy check
    pub targets_skipped: u64,

    /// Orchestration passes run (roots plus iterative re-crawls)
    pub passes: u64,

    /// Deepest pass reached
    pub max_depth_reached: u32,

    /// Candidates accepted into a discovery set
    pub accepted: u64,

    /// Candidates already present in the pass's discovery set
    pub duplicates: u64,

    /// Candidates rejected because of their host
    pub out_of_scope: u64,

    /// Candidates rejected because of their extension
    pub excluded_extension: u64,

    /// Backend failures classified as benign noise
    pub suppressed_errors: u64,

    /// Backend failures reported to the operator
    pub reported_errors: u64,
}

impl CrawlStatistics {
    /// Creates an empty statistics record
    pub fn new() -> Self {
        Self::default()
    }

    /// Total candidates seen by the discovery owners
    pub fn total_candidates(&self) -> u64 {
        self.accepted + self.duplicates + self.out_of_scope + self.excluded_extension
    }

    /// Share of candidates that were duplicates, as a percentage
    pub fn duplicate_rate(&self) -> f64 {
        let total = self.total_candidates();
        if total == 0 {
            return 0.0;
        }
        (self.duplicates as f64 / total as f64) * 100.0
    }
}

/// Logs the statistics at info level
pub fn print_statistics(stats: &CrawlStatistics, records: usize, elapsed: Duration) {
    tracing::info!(
        "Run finished in {:.1}s: {} targets ({} skipped), {} passes, max depth {}",
        elapsed.as_secs_f64(),
        stats.targets,
        stats.targets_skipped,
        stats.passes,
        stats.max_depth_reached
    );
    tracing::info!(
        "Candidates: {} accepted, {} duplicates ({:.1}%), {} out of scope, {} excluded by extension",
        stats.accepted,
        stats.duplicates,
        stats.duplicate_rate(),
        stats.out_of_scope,
        stats.excluded_extension
    );
    tracing::info!(
        "Backend errors: {} reported, {} suppressed; {} unique URLs recorded",
        stats.reported_errors,
        stats.suppressed_errors,
        records
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_is_empty() {
        let stats = CrawlStatistics::new();
        assert_eq!(stats.total_candidates(), 0);
        assert_eq!(stats.duplicate_rate(), 0.0);
    }

    #[test]
    fn test_duplicate_rate() {
        let stats = CrawlStatistics {
            accepted: 60,
            duplicates: 30,
            out_of_scope: 5,
            excluded_extension: 5,
            ..Default::default()
        };
        assert_eq!(stats.total_candidates(), 100);
        assert!((stats.duplicate_rate() - 30.0).abs() < 0.01);
    }
}
