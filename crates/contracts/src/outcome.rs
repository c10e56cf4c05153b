//! BundleOutcome - Session registry output
//!
//! Per-bundle report of what the registry did, consumed by metrics and the CLI.

use serde::{Deserialize, Serialize};

use crate::{PoseUpdate, SubjectId};

/// Why a tracking session was destroyed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DestroyReason {
    /// Color or depth format changed
    FormatChange,
    /// Subject unseen for more than the staleness threshold
    Stale,
    /// Registry shut down
    Shutdown,
}

impl DestroyReason {
    /// Label used for metrics
    pub fn as_str(self) -> &'static str {
        match self {
            Self::FormatChange => "format_change",
            Self::Stale => "stale",
            Self::Shutdown => "shutdown",
        }
    }
}

/// Result of pushing one bundle into the registry
#[derive(Debug, Clone, PartialEq)]
pub enum BundleOutcome {
    /// Bundle accepted and processed
    Processed(FrameReport),

    /// Sequence number not newer than the last processed one; nothing changed
    Rejected { sequence: u64, last: u64 },
}

impl BundleOutcome {
    /// Report of an accepted bundle
    pub fn report(&self) -> Option<&FrameReport> {
        match self {
            Self::Processed(report) => Some(report),
            Self::Rejected { .. } => None,
        }
    }

    /// Pose forwarded for this bundle, if any
    pub fn forwarded(&self) -> Option<PoseUpdate> {
        self.report().and_then(|r| r.forwarded)
    }
}

/// What happened while processing an accepted bundle
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FrameReport {
    /// Bundle sequence number
    pub sequence: u64,

    /// Whether the color or depth format differed from the previous bundle
    pub format_changed: bool,

    /// Sessions destroyed by the format check
    pub invalidated: usize,

    /// Observed subjects (position-only or fully tracked)
    pub observed: usize,

    /// Sessions created this bundle
    pub created: usize,

    /// Subjects whose estimator could not be created this bundle
    pub estimator_unavailable: usize,

    /// First observed subject in bundle order
    pub selected: Option<SubjectId>,

    /// Update delivered to the sink
    pub forwarded: Option<PoseUpdate>,

    /// Sessions evicted by the staleness sweep
    pub evicted: Vec<SubjectId>,

    /// Sessions alive after the call
    pub active_sessions: usize,
}
