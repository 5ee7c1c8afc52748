/// Phase definitions for one orchestration pass over a target
use std::fmt;

/// Represents the current phase of an orchestration pass
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CrawlPhase {
    /// Target is being normalized (scheme added, URL parsed)
    Normalizing,

    /// Target is checked against scope and extension policy
    PolicyCheck,

    /// All backends are running against the target
    Fetching,

    /// Backends have finished; the discovery owner is draining remaining events
    Merging,

    /// Newly discovered URLs are queued for another pass
    Recursing,

    /// Pass is finished (including skipped targets)
    Done,
}

impl CrawlPhase {
    /// Returns true if the pass may move from this phase to `next`
    ///
    /// `PolicyCheck` may jump straight to `Done` when the target is rejected, and
    /// `Merging` goes to `Done` when there is nothing to recurse into.
    pub fn can_transition_to(&self, next: CrawlPhase) -> bool {
        matches!(
            (self, next),
            (Self::Normalizing, Self::PolicyCheck)
                | (Self::Normalizing, Self::Done)
                | (Self::PolicyCheck, Self::Fetching)
                | (Self::PolicyCheck, Self::Done)
                | (Self::Fetching, Self::Merging)
                | (Self::Merging, Self::Recursing)
                | (Self::Merging, Self::Done)
                | (Self::Recursing, Self::Done)
        )
    }

    /// Returns true if this is the final phase
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done)
    }

    /// Short lowercase name used in logs
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Normalizing => "normalizing",
            Self::PolicyCheck => "policy_check",
            Self::Fetching => "fetching",
            Self::Merging => "merging",
            Self::Recursing => "recursing",
            Self::Done => "done",
        }
    }
}

impl fmt::Display for CrawlPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
