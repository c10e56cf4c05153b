//! SinkHandle - registry-facing end of an isolated sink worker

use std::sync::Arc;

use contracts::{ContractError, PoseSink, PoseUpdate};
use observability::metrics::record_pose_dispatched;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, error, instrument, warn};

use crate::metrics::{MetricsSnapshot, SinkMetrics};
use crate::writer::{PoseRecord, PoseWriter};

/// Spawn a worker for `writer` and return both ends
///
/// Updates are queued up to `queue_capacity`; beyond that they are dropped
/// and counted, so a slow writer never blocks frame processing.
pub fn spawn_sink<W: PoseWriter + 'static>(
    writer: W,
    queue_capacity: usize,
) -> (SinkHandle, SinkWorker) {
    let name = writer.name().to_string();
    let (tx, rx) = mpsc::channel(queue_capacity.max(1));
    let metrics = Arc::new(SinkMetrics::new());

    let join = tokio::spawn(sink_worker(
        writer,
        rx,
        Arc::clone(&metrics),
        name.clone(),
    ));

    let handle = SinkHandle {
        name: name.clone(),
        tx: Some(tx),
        metrics: Arc::clone(&metrics),
        sequence: 0,
    };
    let worker = SinkWorker {
        name,
        join,
        metrics,
    };
    (handle, worker)
}

/// Sending side of a sink worker
pub struct SinkHandle {
    name: String,
    /// `None` after `close`
    tx: Option<mpsc::Sender<PoseRecord>>,
    metrics: Arc<SinkMetrics>,
    /// Updates sent through the `PoseSink` interface
    sequence: u64,
}

impl SinkHandle {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn metrics(&self) -> &Arc<SinkMetrics> {
        &self.metrics
    }

    /// Queue a record (non-blocking)
    ///
    /// Returns true if queued, false if dropped.
    pub fn try_send(&self, record: PoseRecord) -> bool {
        let Some(tx) = self.tx.as_ref() else {
            return false;
        };
        match tx.try_send(record) {
            Ok(()) => true,
            Err(mpsc::error::TrySendError::Full(record)) => {
                self.metrics.record_dropped();
                warn!(
                    sink = %self.name,
                    sequence = record.sequence,
                    "Queue full, pose dropped"
                );
                false
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                error!(sink = %self.name, "Sink worker closed unexpectedly");
                false
            }
        }
    }
}

impl PoseSink for SinkHandle {
    fn name(&self) -> &str {
        &self.name
    }

    fn update(&mut self, pose: PoseUpdate) {
        self.sequence += 1;
        self.try_send(PoseRecord::now(self.sequence, pose));
    }

    /// Stop accepting updates; the worker drains its queue and exits
    fn close(&mut self) -> Result<(), ContractError> {
        if self.tx.take().is_some() {
            debug!(sink = %self.name, "SinkHandle closed");
        }
        Ok(())
    }
}

/// Worker side of a sink
pub struct SinkWorker {
    name: String,
    join: JoinHandle<()>,
    metrics: Arc<SinkMetrics>,
}

impl SinkWorker {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Wait for the worker to drain and close its writer
    ///
    /// Completes once every `SinkHandle` for this worker is closed or dropped.
    #[instrument(name = "sink_worker_join", skip(self), fields(sink = %self.name))]
    pub async fn join(self) -> MetricsSnapshot {
        if let Err(e) = self.join.await {
            error!(sink = %self.name, error = ?e, "Worker task panicked");
        }
        self.metrics.snapshot()
    }
}

#[instrument(
    name = "sink_worker_loop",
    skip(writer, rx, metrics),
    fields(sink = %name)
)]
async fn sink_worker<W: PoseWriter>(
    mut writer: W,
    mut rx: mpsc::Receiver<PoseRecord>,
    metrics: Arc<SinkMetrics>,
    name: String,
) {
    debug!(sink = %name, "Sink worker started");

    while let Some(record) = rx.recv().await {
        match writer.write(&record).await {
            Ok(()) => {
                metrics.record_write();
                record_pose_dispatched(&name);
            }
            Err(e) => {
                metrics.record_failure();
                error!(
                    sink = %name,
                    sequence = record.sequence,
                    error = %e,
                    "Write failed"
                );
            }
        }
    }

    if let Err(e) = writer.flush().await {
        error!(sink = %name, error = %e, "Flush failed on shutdown");
    }
    if let Err(e) = writer.close().await {
        error!(sink = %name, error = %e, "Close failed on shutdown");
    }

    debug!(sink = %name, "Sink worker stopped");
}
