//! Run-wide accumulator of discovery records

use crate::output::record::DiscoveryRecord;
use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard};
use url::Url;

#[derive(Debug, Default)]
struct Inner {
    records: Vec<DiscoveryRecord>,
    seen: HashSet<String>,
}

/// Ordered, deduplicated sequence of discovery records for one run
///
/// Cloning is cheap and every clone shares the same records, so the timeout path can
/// flush whatever the orchestrator has accumulated so far.
#[derive(Debug, Clone, Default)]
pub struct OutputAggregator {
    inner: Arc<Mutex<Inner>>,
}

impl OutputAggregator {
    /// Creates an empty aggregator
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        // A panic while holding the lock leaves the data consistent (push + insert)
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Records a URL unless the run already has a record for it
    ///
    /// Returns true if a new record was created.
    pub fn record(&self, url: &Url) -> bool {
        let mut inner = self.lock();
        if !inner.seen.insert(url.to_string()) {
            return false;
        }
        inner.records.push(DiscoveryRecord::new(url));
        true
    }

    /// Returns true if the run already has a record for this URL
    pub fn contains(&self, url: &Url) -> bool {
        self.lock().seen.contains(url.as_str())
    }

    /// Copy of all records, in acceptance order
    pub fn snapshot(&self) -> Vec<DiscoveryRecord> {
        self.lock().records.clone()
    }

    /// Number of records
    pub fn len(&self) -> usize {
        self.lock().records.len()
    }

    /// Returns true if nothing has been recorded
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
