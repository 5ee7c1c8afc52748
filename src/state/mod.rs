//! State module for tracking orchestration progress
//!
//! # Components
//!
//! - `CrawlPhase`: The phase of one orchestration pass (normalizing, policy check,
//!   fetching, merging, recursing, done)
//! - `PhaseTracker`: Enforces valid phase transitions for a single pass

mod phase;

pub use phase::CrawlPhase;

use crate::TrawlError;

/// Tracks the phase of one pass and rejects invalid transitions
#[derive(Debug)]
pub struct PhaseTracker {
    target: String,
    phase: CrawlPhase,
}

impl PhaseTracker {
    /// Starts tracking a pass in the `Normalizing` phase
    pub fn new(target: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            phase: CrawlPhase::Normalizing,
        }
    }

    /// Current phase
    pub fn phase(&self) -> CrawlPhase {
        self.phase
    }

    /// Moves to the next phase
    pub fn advance(&mut self, next: CrawlPhase) -> Result<(), TrawlError> {
        if !self.phase.can_transition_to(next) {
            return Err(TrawlError::InvalidTransition {
                from: self.phase,
                to: next,
            });
        }

        tracing::trace!("{}: {} -> {}", self.target, self.phase, next);
        self.phase = next;
        Ok(())
    }
}
