//! FanoutSink - one registry sink feeding every configured writer

use contracts::{ContractError, PoseSink, PoseUpdate};
use tracing::{info, instrument};

use crate::handle::{SinkHandle, SinkWorker};
use crate::metrics::MetricsSnapshot;
use crate::writer::PoseRecord;

/// Sends each update to every sink worker
///
/// A full queue drops the update for that sink only.
pub struct FanoutSink {
    handles: Vec<SinkHandle>,
    sequence: u64,
}

impl FanoutSink {
    /// Create a fan-out over existing handles (for testing)
    pub fn with_handles(handles: Vec<SinkHandle>) -> Self {
        Self {
            handles,
            sequence: 0,
        }
    }

    /// Number of downstream sinks
    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    /// Updates received so far
    pub fn updates(&self) -> u64 {
        self.sequence
    }

    /// Get metrics for all sinks
    pub fn metrics(&self) -> Vec<(String, MetricsSnapshot)> {
        self.handles
            .iter()
            .map(|h| (h.name().to_string(), h.metrics().snapshot()))
            .collect()
    }
}

impl PoseSink for FanoutSink {
    fn name(&self) -> &str {
        "fanout"
    }

    fn update(&mut self, pose: PoseUpdate) {
        self.sequence += 1;
        let record = PoseRecord::now(self.sequence, pose);
        for handle in &self.handles {
            handle.try_send(record);
        }
    }

    #[instrument(name = "fanout_close", skip(self), fields(sinks = self.handles.len()))]
    fn close(&mut self) -> Result<(), ContractError> {
        for handle in &mut self.handles {
            handle.close()?;
        }
        Ok(())
    }
}

/// Worker side of every sink behind a [`FanoutSink`]
pub struct SinkWorkers {
    workers: Vec<SinkWorker>,
}

impl SinkWorkers {
    pub fn new(workers: Vec<SinkWorker>) -> Self {
        Self { workers }
    }

    pub fn len(&self) -> usize {
        self.workers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.workers.is_empty()
    }

    /// Wait for every worker to drain
    ///
    /// Close or drop the `FanoutSink` first, otherwise this waits forever.
    #[instrument(name = "sink_workers_join", skip(self), fields(sinks = self.workers.len()))]
    pub async fn join(self) -> Vec<(String, MetricsSnapshot)> {
        let mut results = Vec::with_capacity(self.workers.len());
        for worker in self.workers {
            let name = worker.name().to_string();
            let snapshot = worker.join().await;
            info!(
                sink = %name,
                writes = snapshot.write_count,
                failures = snapshot.failure_count,
                dropped = snapshot.dropped_count,
                "Sink stopped"
            );
            results.push((name, snapshot));
        }
        results
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handle::spawn_sink;
    use crate::sinks::LogSink;

    #[tokio::test]
    async fn test_fanout_reaches_every_sink() {
        let (a, worker_a) = spawn_sink(LogSink::new("a"), 10);
        let (b, worker_b) = spawn_sink(LogSink::new("b"), 10);
        let mut fanout = FanoutSink::with_handles(vec![a, b]);
        let workers = SinkWorkers::new(vec![worker_a, worker_b]);

        for _ in 0..3 {
            fanout.update(PoseUpdate::default());
        }
        assert_eq!(fanout.updates(), 3);
        fanout.close().unwrap();

        let results = workers.join().await;
        assert_eq!(results.len(), 2);
        for (_, snapshot) in results {
            assert_eq!(snapshot.write_count, 3);
            assert_eq!(snapshot.dropped_count, 0);
        }
    }

    #[tokio::test]
    async fn test_dropping_fanout_stops_workers() {
        let (handle, worker) = spawn_sink(LogSink::new("solo"), 4);
        let mut fanout = FanoutSink::with_handles(vec![handle]);
        fanout.update(PoseUpdate::default());
        drop(fanout);

        let results = SinkWorkers::new(vec![worker]).join().await;
        assert_eq!(results[0].0, "solo");
        assert_eq!(results[0].1.write_count, 1);
    }
}
