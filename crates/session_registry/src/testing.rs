//! Test doubles shared by the session and registry tests.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use contracts::{
    ColorFormat, DepthFormat, EstimatorError, EstimatorFactory, FacePose, OwnedFrameBundle,
    PoseEstimator, PoseResult, PoseSink, PoseUpdate, SkeletonEstimate, TrackInput, Vector3,
};

/// Rotation every scripted estimator reports
pub fn rotation() -> Vector3 {
    Vector3::new(10.0, 20.0, 30.0)
}

/// Bundle in the default formats
pub fn bundle(sequence: u64, subjects: Vec<SkeletonEstimate>) -> OwnedFrameBundle {
    OwnedFrameBundle::new(
        sequence,
        ColorFormat::Rgb640x480Fps30,
        DepthFormat::Depth320x240Fps30,
        subjects,
    )
}

#[derive(Debug, Default)]
struct Shared {
    created: AtomicUsize,
    released: AtomicUsize,
    failures_left: AtomicUsize,
    face_hidden: AtomicBool,
}

/// Factory whose estimators always report [`rotation`] unless told otherwise
#[derive(Debug, Clone, Default)]
pub struct ScriptedFactory {
    shared: Arc<Shared>,
}

impl ScriptedFactory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next `n` calls to `create` fail
    pub fn fail_next_creations(&self, n: usize) {
        self.shared.failures_left.store(n, Ordering::SeqCst);
    }

    /// Toggle whether estimators find a face
    pub fn set_face_visible(&self, visible: bool) {
        self.shared.face_hidden.store(!visible, Ordering::SeqCst);
    }

    pub fn created(&self) -> usize {
        self.shared.created.load(Ordering::SeqCst)
    }

    pub fn released(&self) -> usize {
        self.shared.released.load(Ordering::SeqCst)
    }
}

impl EstimatorFactory for ScriptedFactory {
    type Estimator = ScriptedEstimator;

    fn create(&mut self) -> Result<ScriptedEstimator, EstimatorError> {
        let failures = self.shared.failures_left.load(Ordering::SeqCst);
        if failures > 0 {
            self.shared.failures_left.store(failures - 1, Ordering::SeqCst);
            return Err(EstimatorError::unavailable("scripted failure"));
        }
        self.shared.created.fetch_add(1, Ordering::SeqCst);
        Ok(ScriptedEstimator {
            shared: Arc::clone(&self.shared),
        })
    }
}

#[derive(Debug)]
pub struct ScriptedEstimator {
    shared: Arc<Shared>,
}

impl PoseEstimator for ScriptedEstimator {
    fn track(&mut self, _input: &TrackInput<'_>) -> PoseResult {
        if self.shared.face_hidden.load(Ordering::SeqCst) {
            return PoseResult::NotFound;
        }
        PoseResult::Found(FacePose {
            rotation: rotation(),
            translation: Vector3::default(),
        })
    }

    fn release(&mut self) {
        self.shared.released.fetch_add(1, Ordering::SeqCst);
    }
}

/// Sink that keeps every update
#[derive(Debug, Default)]
pub struct RecordingSink {
    pub updates: Vec<PoseUpdate>,
}

impl PoseSink for RecordingSink {
    fn name(&self) -> &str {
        "recording"
    }

    fn update(&mut self, pose: PoseUpdate) {
        self.updates.push(pose);
    }
}
