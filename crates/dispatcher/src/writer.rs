//! PoseWriter trait - async output backend behind a sink worker

use chrono::Utc;
use contracts::{ContractError, PoseUpdate};
use serde::{Deserialize, Serialize};

/// Pose update as queued to writers
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PoseRecord {
    /// Per-sink update counter, starting at 1
    pub sequence: u64,

    /// Wall-clock time the update left the registry (Unix ms, UTC)
    pub timestamp_ms: i64,

    pub pose: PoseUpdate,
}

impl PoseRecord {
    /// Stamp an update with the current time
    pub fn now(sequence: u64, pose: PoseUpdate) -> Self {
        Self {
            sequence,
            timestamp_ms: Utc::now().timestamp_millis(),
            pose,
        }
    }
}

/// Output backend driven by a sink worker task
///
/// Writers may be slow; they never run on the frame-processing path.
#[trait_variant::make(PoseWriter: Send)]
pub trait LocalPoseWriter {
    /// Writer name (used for logging and metrics)
    fn name(&self) -> &str;

    /// Write one record
    async fn write(&mut self, record: &PoseRecord) -> Result<(), ContractError>;

    /// Flush buffered output
    async fn flush(&mut self) -> Result<(), ContractError>;

    /// Release resources; called once when the worker stops
    async fn close(&mut self) -> Result<(), ContractError>;
}
