//! Session registry implementation.

use std::collections::HashMap;

use contracts::{
    BundleOutcome, ColorFormat, DepthFormat, DestroyReason, EstimatorFactory, ForwardPolicy,
    FrameBundle, FrameReport, PoseSink, PoseUpdate, SubjectId, TrackerConfig,
};
use metrics::histogram;
use observability::metrics::{
    record_bundle_outcome, record_estimator_unavailable, record_session_created,
    record_session_destroyed,
};
use tracing::{debug, info, instrument, warn};

use crate::session::{SessionUpdate, TrackingSession};

/// Multi-subject tracking session manager
///
/// Owns every session, the estimator factory and the pose sink. Driven by
/// one caller at a time through [`process_bundle`](Self::process_bundle).
pub struct SessionRegistry<F: EstimatorFactory, S: PoseSink> {
    /// Configuration
    config: TrackerConfig,
    /// Live sessions keyed by subject
    sessions: HashMap<SubjectId, TrackingSession<F::Estimator>>,
    /// Estimator source
    factory: F,
    /// Pose consumer
    sink: S,
    /// Color format of the previous accepted bundle
    last_color_format: ColorFormat,
    /// Depth format of the previous accepted bundle
    last_depth_format: DepthFormat,
    /// Sequence of the previous accepted bundle
    last_sequence: Option<u64>,
}

impl<F: EstimatorFactory, S: PoseSink> SessionRegistry<F, S> {
    /// Create an empty registry
    pub fn new(config: TrackerConfig, factory: F, sink: S) -> Self {
        Self {
            config,
            sessions: HashMap::new(),
            factory,
            sink,
            last_color_format: ColorFormat::Undefined,
            last_depth_format: DepthFormat::Undefined,
            last_sequence: None,
        }
    }

    /// Process one synchronized frame bundle
    ///
    /// Runs, in order: ordering check, format check, subject scan with
    /// forwarding of the first observed subject, staleness sweep. At most
    /// one update reaches the sink per call.
    #[instrument(
        level = "debug",
        name = "registry_process_bundle",
        skip(self, bundle),
        fields(sequence = bundle.sequence, subjects = bundle.subjects.len())
    )]
    pub fn process_bundle(&mut self, bundle: &FrameBundle<'_>) -> BundleOutcome {
        if let Some(last) = self.last_sequence {
            if bundle.sequence <= last {
                warn!(
                    sequence = bundle.sequence,
                    last_sequence = last,
                    "Out-of-order bundle rejected"
                );
                let outcome = BundleOutcome::Rejected {
                    sequence: bundle.sequence,
                    last,
                };
                record_bundle_outcome(&outcome);
                return outcome;
            }
        }
        self.last_sequence = Some(bundle.sequence);

        let mut report = FrameReport {
            sequence: bundle.sequence,
            ..Default::default()
        };

        // 1. Format check
        if bundle.color.format != self.last_color_format
            || bundle.depth.format != self.last_depth_format
        {
            report.format_changed = true;
            report.invalidated = self.destroy_all(DestroyReason::FormatChange);
            info!(
                color = ?bundle.color.format,
                depth = ?bundle.depth.format,
                invalidated = report.invalidated,
                "Stream format changed"
            );
            self.last_color_format = bundle.color.format;
            self.last_depth_format = bundle.depth.format;
        }

        // 2. Subject scan
        for subject in bundle.subjects.iter().filter(|s| s.state.is_observed()) {
            report.observed += 1;

            let session = self.sessions.entry(subject.subject_id).or_insert_with(|| {
                report.created += 1;
                record_session_created();
                debug!(subject_id = %subject.subject_id, "Session created");
                TrackingSession::new(subject.subject_id, bundle.sequence)
            });

            let update = session.update(&mut self.factory, bundle, subject);
            session.touch(bundle.sequence);

            if let SessionUpdate::EstimatorUnavailable(_) = update {
                report.estimator_unavailable += 1;
                record_estimator_unavailable();
            }

            if report.selected.is_some() {
                continue;
            }
            report.selected = Some(subject.subject_id);

            let pose = match (self.config.forward_policy, update) {
                (_, SessionUpdate::Estimated(pose)) => Some(pose),
                (ForwardPolicy::LastKnownGood, _) => session.last_pose(),
                (ForwardPolicy::FreshOnly, _) => None,
            };

            if let Some(pose) = pose {
                let update = PoseUpdate::from_parts(subject.position, &pose);
                self.sink.update(update);
                report.forwarded = Some(update);
            }
        }

        // 3. Staleness sweep
        report.evicted = self.evict_stale(bundle.sequence);
        report.active_sessions = self.sessions.len();

        let outcome = BundleOutcome::Processed(report);
        record_bundle_outcome(&outcome);
        outcome
    }

    /// Destroy every session whose subject has been unseen for more than
    /// `max_missed_frames` frames
    fn evict_stale(&mut self, sequence: u64) -> Vec<SubjectId> {
        let threshold = self.config.max_missed_frames;

        let mut stale: Vec<SubjectId> = self
            .sessions
            .iter()
            .filter(|(_, session)| session.missed_frames(sequence) > threshold)
            .map(|(id, _)| *id)
            .collect();
        stale.sort_unstable();

        for id in &stale {
            if let Some(mut session) = self.sessions.remove(id) {
                let lifetime = session.last_updated_sequence() - session.first_seen_sequence();
                histogram!("headtrack_session_lifetime_frames").record(lifetime as f64);
                session.destroy();
                record_session_destroyed(DestroyReason::Stale);
                info!(
                    subject_id = %id,
                    last_seen = session.last_updated_sequence(),
                    sequence,
                    "Stale session evicted"
                );
            }
        }

        stale
    }

    /// Destroy all sessions, returning how many were live
    fn destroy_all(&mut self, reason: DestroyReason) -> usize {
        let count = self.sessions.len();
        for (_, mut session) in self.sessions.drain() {
            session.destroy();
            record_session_destroyed(reason);
        }
        count
    }

    /// Destroy every session; idempotent
    ///
    /// Returns the number of sessions destroyed by this call.
    pub fn shutdown(&mut self) -> usize {
        let count = self.destroy_all(DestroyReason::Shutdown);
        if count > 0 {
            info!(sessions = count, "Session registry shut down");
        }
        count
    }

    /// Session for a subject, if one is live
    pub fn session(&self, subject_id: SubjectId) -> Option<&TrackingSession<F::Estimator>> {
        self.sessions.get(&subject_id)
    }

    /// Number of live sessions
    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }

    /// Live subject ids, sorted
    pub fn subject_ids(&self) -> Vec<SubjectId> {
        let mut ids: Vec<_> = self.sessions.keys().copied().collect();
        ids.sort_unstable();
        ids
    }

    /// Sequence of the last accepted bundle
    pub fn last_sequence(&self) -> Option<u64> {
        self.last_sequence
    }

    /// Formats of the last accepted bundle (`Undefined` before the first one)
    pub fn formats(&self) -> (ColorFormat, DepthFormat) {
        (self.last_color_format, self.last_depth_format)
    }

    pub fn config(&self) -> &TrackerConfig {
        &self.config
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }
}

impl<F: EstimatorFactory, S: PoseSink> Drop for SessionRegistry<F, S> {
    fn drop(&mut self) {
        self.shutdown();
    }
}
