//! PoseSink trait - registry output interface
//!
//! Defines the abstract interface for pose consumers.

use crate::{ContractError, PoseUpdate};

/// Pose output trait
///
/// Invoked synchronously from the frame-processing path, at most once per
/// bundle. Updates are fire-and-forget: implementations log delivery problems
/// instead of returning them.
pub trait PoseSink: Send {
    /// Sink name (used for logging/metrics)
    fn name(&self) -> &str;

    /// Deliver one 6-DOF update
    fn update(&mut self, pose: PoseUpdate);

    /// Flush and release the sink
    ///
    /// # Errors
    /// Returns close error (should include context)
    fn close(&mut self) -> Result<(), ContractError> {
        Ok(())
    }
}

impl<S: PoseSink + ?Sized> PoseSink for Box<S> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn update(&mut self, pose: PoseUpdate) {
        (**self).update(pose)
    }

    fn close(&mut self) -> Result<(), ContractError> {
        (**self).close()
    }
}
