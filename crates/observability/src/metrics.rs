//! Session registry metrics
//!
//! Prometheus-facing recorders plus an in-memory aggregator for run summaries.

use std::collections::HashMap;

use contracts::{BundleOutcome, DestroyReason};
use metrics::{counter, gauge, histogram};

/// Record metrics for one `process_bundle` call
///
/// # Example
///
/// ```ignore
/// use observability::metrics::record_bundle_outcome;
///
/// let outcome = registry.process_bundle(&bundle);
/// record_bundle_outcome(&outcome);
/// ```
pub fn record_bundle_outcome(outcome: &BundleOutcome) {
    match outcome {
        BundleOutcome::Rejected { .. } => {
            counter!("headtrack_bundles_total", "status" => "rejected").increment(1);
        }
        BundleOutcome::Processed(report) => {
            counter!("headtrack_bundles_total", "status" => "processed").increment(1);
            gauge!("headtrack_last_sequence").set(report.sequence as f64);
            gauge!("headtrack_sessions_active").set(report.active_sessions as f64);
            histogram!("headtrack_subjects_observed").record(report.observed as f64);

            if report.format_changed {
                counter!("headtrack_format_changes_total").increment(1);
            }
            if report.forwarded.is_some() {
                counter!("headtrack_poses_forwarded_total").increment(1);
            }
        }
    }
}

/// Record a session creation
pub fn record_session_created() {
    counter!("headtrack_sessions_created_total").increment(1);
}

/// Record a session teardown
pub fn record_session_destroyed(reason: DestroyReason) {
    counter!(
        "headtrack_sessions_destroyed_total",
        "reason" => reason.as_str()
    )
    .increment(1);
}

/// Record a failed estimator instantiation
pub fn record_estimator_unavailable() {
    counter!("headtrack_estimator_unavailable_total").increment(1);
}

/// Record a frame skipped because the consumer was still busy
pub fn record_frame_skipped() {
    counter!("headtrack_frames_skipped_total").increment(1);
}

/// Record a pose delivered to a sink
pub fn record_pose_dispatched(sink_name: &str) {
    counter!(
        "headtrack_poses_dispatched_total",
        "sink" => sink_name.to_string()
    )
    .increment(1);
}

/// Tracking statistics aggregator
///
/// Aggregates bundle outcomes in memory for the end-of-run report.
#[derive(Debug, Clone, Default)]
pub struct TrackingStatsAggregator {
    /// Accepted bundles
    pub bundles_processed: u64,

    /// Out-of-order / duplicate bundles
    pub bundles_rejected: u64,

    /// Updates delivered to the sink
    pub poses_forwarded: u64,

    /// Bundles that changed the color or depth format
    pub format_changes: u64,

    /// Sessions created
    pub sessions_created: u64,

    /// Sessions destroyed by a format change
    pub sessions_invalidated: u64,

    /// Sessions evicted as stale
    pub sessions_evicted: u64,

    /// Estimator creation failures
    pub estimator_unavailable: u64,

    /// Live session count per bundle
    pub active_sessions: RunningStats,

    /// Forwarded updates per subject
    pub forwarded_by_subject: HashMap<u32, u64>,
}

impl TrackingStatsAggregator {
    /// Create an empty aggregator
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one outcome into the statistics
    pub fn update(&mut self, outcome: &BundleOutcome) {
        let report = match outcome {
            BundleOutcome::Rejected { .. } => {
                self.bundles_rejected += 1;
                return;
            }
            BundleOutcome::Processed(report) => report,
        };

        self.bundles_processed += 1;
        if report.format_changed {
            self.format_changes += 1;
        }
        self.sessions_created += report.created as u64;
        self.sessions_invalidated += report.invalidated as u64;
        self.sessions_evicted += report.evicted.len() as u64;
        self.estimator_unavailable += report.estimator_unavailable as u64;
        self.active_sessions.push(report.active_sessions as f64);

        if report.forwarded.is_some() {
            self.poses_forwarded += 1;
            if let Some(subject) = report.selected {
                *self.forwarded_by_subject.entry(subject.0).or_insert(0) += 1;
            }
        }
    }

    /// Build the summary report
    pub fn summary(&self) -> TrackingSummary {
        TrackingSummary {
            bundles_processed: self.bundles_processed,
            bundles_rejected: self.bundles_rejected,
            poses_forwarded: self.poses_forwarded,
            forward_rate: if self.bundles_processed > 0 {
                self.poses_forwarded as f64 / self.bundles_processed as f64 * 100.0
            } else {
                0.0
            },
            format_changes: self.format_changes,
            sessions_created: self.sessions_created,
            sessions_invalidated: self.sessions_invalidated,
            sessions_evicted: self.sessions_evicted,
            estimator_unavailable: self.estimator_unavailable,
            active_sessions: StatsSummary::from(&self.active_sessions),
            forwarded_by_subject: self.forwarded_by_subject.clone(),
        }
    }
}

/// Tracking summary
#[derive(Debug, Clone, Default)]
pub struct TrackingSummary {
    pub bundles_processed: u64,
    pub bundles_rejected: u64,
    pub poses_forwarded: u64,
    pub forward_rate: f64,
    pub format_changes: u64,
    pub sessions_created: u64,
    pub sessions_invalidated: u64,
    pub sessions_evicted: u64,
    pub estimator_unavailable: u64,
    pub active_sessions: StatsSummary,
    pub forwarded_by_subject: HashMap<u32, u64>,
}

impl std::fmt::Display for TrackingSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "=== Tracking Summary ===")?;
        writeln!(f, "Bundles processed: {}", self.bundles_processed)?;
        writeln!(f, "Bundles rejected: {}", self.bundles_rejected)?;
        writeln!(
            f,
            "Poses forwarded: {} ({:.2}%)",
            self.poses_forwarded, self.forward_rate
        )?;
        writeln!(f, "Format changes: {}", self.format_changes)?;
        writeln!(
            f,
            "Sessions: created={}, invalidated={}, evicted={}",
            self.sessions_created, self.sessions_invalidated, self.sessions_evicted
        )?;
        writeln!(f, "Estimator unavailable: {}", self.estimator_unavailable)?;
        writeln!(f, "Active sessions: {}", self.active_sessions)?;

        if !self.forwarded_by_subject.is_empty() {
            writeln!(f, "Forwarded per subject:")?;
            let mut subjects: Vec<_> = self.forwarded_by_subject.iter().collect();
            subjects.sort();
            for (subject, count) in subjects {
                writeln!(f, "  {}: {}", subject, count)?;
            }
        }

        Ok(())
    }
}

/// Statistics summary
#[derive(Debug, Clone, Default)]
pub struct StatsSummary {
    pub count: u64,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub std_dev: f64,
}

impl From<&RunningStats> for StatsSummary {
    fn from(stats: &RunningStats) -> Self {
        Self {
            count: stats.count,
            min: stats.min,
            max: stats.max,
            mean: stats.mean(),
            std_dev: stats.std_dev(),
        }
    }
}

impl std::fmt::Display for StatsSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.count == 0 {
            write!(f, "N/A")
        } else {
            write!(
                f,
                "min={:.1}, max={:.1}, mean={:.2}, std={:.2} (n={})",
                self.min, self.max, self.mean, self.std_dev, self.count
            )
        }
    }
}

/// Online statistics (Welford's algorithm)
#[derive(Debug, Clone, Default)]
pub struct RunningStats {
    count: u64,
    mean: f64,
    m2: f64,
    min: f64,
    max: f64,
}

impl RunningStats {
    /// Add a sample
    pub fn push(&mut self, value: f64) {
        self.count += 1;

        if self.count == 1 {
            self.min = value;
            self.max = value;
            self.mean = value;
            self.m2 = 0.0;
        } else {
            self.min = self.min.min(value);
            self.max = self.max.max(value);

            let delta = value - self.mean;
            self.mean += delta / self.count as f64;
            let delta2 = value - self.mean;
            self.m2 += delta * delta2;
        }
    }

    pub fn count(&self) -> u64 {
        self.count
    }

    pub fn mean(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.mean
        }
    }

    /// Sample variance
    pub fn variance(&self) -> f64 {
        if self.count < 2 {
            0.0
        } else {
            self.m2 / (self.count - 1) as f64
        }
    }

    pub fn std_dev(&self) -> f64 {
        self.variance().sqrt()
    }

    pub fn min(&self) -> f64 {
        self.min
    }

    pub fn max(&self) -> f64 {
        self.max
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::{FrameReport, PoseUpdate, SubjectId};

    fn processed(sequence: u64, forwarded: bool) -> BundleOutcome {
        BundleOutcome::Processed(FrameReport {
            sequence,
            format_changed: sequence == 1,
            observed: 2,
            created: if sequence == 1 { 2 } else { 0 },
            selected: Some(SubjectId(7)),
            forwarded: forwarded.then(PoseUpdate::default),
            active_sessions: 2,
            ..Default::default()
        })
    }

    #[test]
    fn test_running_stats() {
        let mut stats = RunningStats::default();
        for v in [1.0, 2.0, 3.0, 4.0, 5.0] {
            stats.push(v);
        }

        assert_eq!(stats.count(), 5);
        assert!((stats.mean() - 3.0).abs() < 1e-10);
        assert!((stats.min() - 1.0).abs() < 1e-10);
        assert!((stats.max() - 5.0).abs() < 1e-10);
        assert!((stats.variance() - 2.5).abs() < 1e-10);
    }

    #[test]
    fn test_aggregator_update() {
        let mut aggregator = TrackingStatsAggregator::new();

        aggregator.update(&processed(1, true));
        aggregator.update(&processed(2, false));
        aggregator.update(&BundleOutcome::Rejected {
            sequence: 2,
            last: 2,
        });

        assert_eq!(aggregator.bundles_processed, 2);
        assert_eq!(aggregator.bundles_rejected, 1);
        assert_eq!(aggregator.poses_forwarded, 1);
        assert_eq!(aggregator.format_changes, 1);
        assert_eq!(aggregator.sessions_created, 2);
        assert_eq!(aggregator.forwarded_by_subject.get(&7), Some(&1));
    }

    #[test]
    fn test_summary_display() {
        let mut aggregator = TrackingStatsAggregator::new();
        aggregator.update(&processed(1, true));
        aggregator.update(&processed(2, true));

        let output = format!("{}", aggregator.summary());
        assert!(output.contains("Bundles processed: 2"));
        assert!(output.contains("100.00%"));
        assert!(output.contains("  7: 2"));
    }
}
