//! Synthetic pose estimator
//!
//! Derives a head rotation from the skeleton's head and shoulder-center
//! joints. Good enough to drive the tracker without a face tracking library.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use contracts::{
    EstimatorError, EstimatorFactory, FacePose, PoseEstimator, PoseResult, TrackInput, Vector3,
};
use nalgebra::{Rotation3, Vector3 as NVector3};
use tracing::trace;

/// Faces further away than this are too small to track (metres)
const MAX_FACE_DISTANCE_M: f32 = 3.5;

/// Creates [`SyntheticEstimator`]s, optionally capped in number
#[derive(Debug, Clone, Default)]
pub struct SyntheticEstimatorFactory {
    live: Arc<AtomicUsize>,
    max_live: Option<usize>,
}

impl SyntheticEstimatorFactory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Refuse to create more than `max_live` concurrent estimators
    pub fn with_max_live(max_live: usize) -> Self {
        Self {
            live: Arc::default(),
            max_live: Some(max_live),
        }
    }

    /// Estimators created and not yet released
    pub fn live(&self) -> usize {
        self.live.load(Ordering::SeqCst)
    }
}

impl EstimatorFactory for SyntheticEstimatorFactory {
    type Estimator = SyntheticEstimator;

    fn create(&mut self) -> Result<SyntheticEstimator, EstimatorError> {
        if let Some(max) = self.max_live {
            if self.live() >= max {
                return Err(EstimatorError::unavailable(format!(
                    "all {max} face trackers in use"
                )));
            }
        }
        self.live.fetch_add(1, Ordering::SeqCst);
        Ok(SyntheticEstimator {
            live: Some(self.live.clone()),
        })
    }
}

/// Geometry-based estimator
#[derive(Debug)]
pub struct SyntheticEstimator {
    /// `None` once released
    live: Option<Arc<AtomicUsize>>,
}

impl PoseEstimator for SyntheticEstimator {
    fn track(&mut self, input: &TrackInput<'_>) -> PoseResult {
        if input.color.data.is_empty() || input.depth.data.is_empty() {
            trace!("no image data");
            return PoseResult::NotFound;
        }

        let skeleton = input.skeleton;
        let (Some(head), Some(shoulder)) = (skeleton.head, skeleton.shoulder_center) else {
            return PoseResult::NotFound;
        };
        if head.z > MAX_FACE_DISTANCE_M {
            return PoseResult::NotFound;
        }

        let neck = NVector3::new(head.x - shoulder.x, head.y - shoulder.y, head.z - shoulder.z);
        let Some(rotation) = Rotation3::rotation_between(&NVector3::y(), &neck) else {
            return PoseResult::NotFound;
        };
        let (rx, ry, rz) = rotation.euler_angles();

        PoseResult::Found(FacePose {
            rotation: Vector3::new(rx.to_degrees(), ry.to_degrees(), rz.to_degrees()),
            translation: head,
        })
    }

    fn release(&mut self) {
        if let Some(live) = self.live.take() {
            live.fetch_sub(1, Ordering::SeqCst);
        }
    }
}

impl Drop for SyntheticEstimator {
    fn drop(&mut self) {
        self.release();
    }
}
