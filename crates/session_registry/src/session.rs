//! Per-subject tracking session.

use contracts::{
    EstimatorError, EstimatorFactory, FacePose, FrameBundle, PoseEstimator, PoseResult,
    SkeletonEstimate, SubjectId, TrackInput, TrackingState,
};
use tracing::{debug, instrument, trace};

/// What a session did with one frame
#[derive(Debug, Clone, PartialEq)]
pub enum SessionUpdate {
    /// Subject not fully tracked; no pose work this frame
    Skipped,
    /// Estimator could not be created; retried next frame
    EstimatorUnavailable(EstimatorError),
    /// Estimator found the face
    Estimated(FacePose),
    /// Estimator ran but found no face; last pose kept
    Missed,
}

/// Binds one subject to one lazily created pose estimator
///
/// The estimator is released exactly once, either by [`destroy`](Self::destroy)
/// or when the session is dropped.
#[derive(Debug)]
pub struct TrackingSession<E: PoseEstimator> {
    subject_id: SubjectId,
    estimator: Option<E>,
    /// Last known good pose; `None` until the first successful estimate
    last_pose: Option<FacePose>,
    first_seen_sequence: u64,
    last_updated_sequence: u64,
}

impl<E: PoseEstimator> TrackingSession<E> {
    /// Create a session for a subject first observed at `sequence`
    pub fn new(subject_id: SubjectId, sequence: u64) -> Self {
        Self {
            subject_id,
            estimator: None,
            last_pose: None,
            first_seen_sequence: sequence,
            last_updated_sequence: sequence,
        }
    }

    /// Feed one frame to the session
    #[instrument(
        level = "trace",
        name = "session_update",
        skip_all,
        fields(subject_id = %self.subject_id, sequence = bundle.sequence)
    )]
    pub fn update<F>(
        &mut self,
        factory: &mut F,
        bundle: &FrameBundle<'_>,
        subject: &SkeletonEstimate,
    ) -> SessionUpdate
    where
        F: EstimatorFactory<Estimator = E>,
    {
        if subject.state != TrackingState::FullyTracked {
            return SessionUpdate::Skipped;
        }

        let estimator = match self.estimator {
            Some(ref mut estimator) => estimator,
            None => match factory.create() {
                Ok(estimator) => {
                    debug!(subject_id = %self.subject_id, "pose estimator created");
                    self.estimator.insert(estimator)
                }
                Err(err) => {
                    debug!(
                        subject_id = %self.subject_id,
                        error = %err,
                        "pose estimator unavailable, retrying next frame"
                    );
                    return SessionUpdate::EstimatorUnavailable(err);
                }
            },
        };

        let input = TrackInput {
            color: bundle.color,
            depth: bundle.depth,
            skeleton: subject,
        };

        match estimator.track(&input) {
            PoseResult::Found(pose) => {
                self.last_pose = Some(pose);
                SessionUpdate::Estimated(pose)
            }
            PoseResult::NotFound => {
                trace!(subject_id = %self.subject_id, "no face found");
                SessionUpdate::Missed
            }
        }
    }

    /// Record that the subject was observed at `sequence`
    #[inline]
    pub fn touch(&mut self, sequence: u64) {
        self.last_updated_sequence = sequence;
    }

    /// Frames elapsed since the last observation, relative to `sequence`
    #[inline]
    pub fn missed_frames(&self, sequence: u64) -> u64 {
        sequence.saturating_sub(self.last_updated_sequence)
    }

    /// Release the estimator; idempotent
    ///
    /// Returns `true` if an estimator was actually released.
    pub fn destroy(&mut self) -> bool {
        match self.estimator.take() {
            Some(mut estimator) => {
                estimator.release();
                debug!(subject_id = %self.subject_id, "pose estimator released");
                true
            }
            None => false,
        }
    }

    pub fn subject_id(&self) -> SubjectId {
        self.subject_id
    }

    pub fn last_pose(&self) -> Option<FacePose> {
        self.last_pose
    }

    pub fn first_seen_sequence(&self) -> u64 {
        self.first_seen_sequence
    }

    pub fn last_updated_sequence(&self) -> u64 {
        self.last_updated_sequence
    }

    /// Whether an estimator instance is currently held
    pub fn has_estimator(&self) -> bool {
        self.estimator.is_some()
    }
}

impl<E: PoseEstimator> Drop for TrackingSession<E> {
    fn drop(&mut self) {
        self.destroy();
    }
}
