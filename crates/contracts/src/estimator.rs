//! PoseEstimator traits - boundary to the face tracking backend

use crate::{ColorImage, DepthImage, EstimatorError, PoseResult, SkeletonEstimate};

/// Everything an estimator sees for one subject in one frame
#[derive(Debug, Clone, Copy)]
pub struct TrackInput<'a> {
    pub color: ColorImage<'a>,
    pub depth: DepthImage<'a>,
    pub skeleton: &'a SkeletonEstimate,
}

/// Stateful per-subject face tracker
///
/// Instances may hold calibration state tied to the stream formats they were
/// first fed; the registry discards them on any format change.
pub trait PoseEstimator: Send {
    /// Estimate the head pose for one subject
    fn track(&mut self, input: &TrackInput<'_>) -> PoseResult;

    /// Release backend resources
    ///
    /// Called exactly once by the owning session before the instance is dropped.
    fn release(&mut self) {}
}

/// Creates estimator instances on demand
///
/// Creation may fail transiently; callers retry on a later frame.
pub trait EstimatorFactory: Send {
    type Estimator: PoseEstimator;

    /// Create a fresh estimator
    fn create(&mut self) -> Result<Self::Estimator, EstimatorError>;
}
