//! Pipeline orchestrator - wires device, registry and sinks together.

use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::Result;
use contracts::{PoseSink, SensingDevice, TrackerBlueprint};
use ingestion::{
    frame_gate, FrameAssembler, IngestionMetrics, SimulatedDevice, SimulatedDeviceConfig,
    SyntheticEstimatorFactory,
};
use session_registry::SessionRegistry;
use tracing::{debug, info, warn};

use super::PipelineStats;
use crate::error::CliError;

/// Time allowed for sink workers to drain on shutdown
const SINK_DRAIN_TIMEOUT: Duration = Duration::from_secs(5);

/// Pipeline configuration
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Loaded configuration
    pub blueprint: TrackerBlueprint,

    /// Stop after this many bundles (None = unlimited)
    pub max_frames: Option<u64>,

    /// Run timeout (None = no timeout)
    pub timeout: Option<Duration>,

    /// Elevation change applied after start (degrees)
    pub tilt: i32,

    /// Metrics server port (None = disabled)
    pub metrics_port: Option<u16>,

    /// People in view of the simulated device
    pub subjects: usize,
}

/// Main pipeline orchestrator
pub struct Pipeline {
    config: PipelineConfig,
}

impl Pipeline {
    /// Create a new pipeline with the given configuration
    pub fn new(config: PipelineConfig) -> Self {
        Self { config }
    }

    /// Run until the frame limit, the timeout, `shutdown` or the end of the
    /// frame stream, then shut everything down in order
    pub async fn run(self, shutdown: impl Future<Output = ()>) -> Result<PipelineStats> {
        let start_time = Instant::now();
        let blueprint = &self.config.blueprint;

        if let Some(port) = self.config.metrics_port {
            observability::init_metrics_only(port)?;
            info!("Metrics endpoint available on port {}", port);
        }

        info!(sinks = blueprint.sinks.len(), "Setting up sinks...");
        let (fanout, workers) = dispatcher::create_sink(&blueprint.sinks)
            .await
            .map_err(|e| CliError::pipeline_execution(e.to_string()))?;

        let ingestion_metrics = Arc::new(IngestionMetrics::new());
        let (gate, frames) = frame_gate(ingestion_metrics.clone());
        let device_config =
            SimulatedDeviceConfig::from_device_config(&blueprint.device, self.config.subjects);
        let mut device = SimulatedDevice::new(device_config, gate, ingestion_metrics.clone());

        device
            .start()
            .await
            .map_err(|e| CliError::device(e.to_string()))?;
        if self.config.tilt != 0 {
            let elevation = device
                .tilt(self.config.tilt)
                .await
                .map_err(|e| CliError::device(e.to_string()))?;
            info!(elevation, "Sensor tilted");
        }

        let mut registry = SessionRegistry::new(
            blueprint.tracker.clone(),
            SyntheticEstimatorFactory::new(),
            fanout,
        );
        let mut assembler = FrameAssembler::new(ingestion_metrics.clone());
        let mut stats = PipelineStats::default();

        info!(
            max_frames = ?self.config.max_frames,
            timeout = ?self.config.timeout,
            policy = ?blueprint.tracker.forward_policy,
            "Tracker running"
        );

        let deadline = async {
            match self.config.timeout {
                Some(timeout) => tokio::time::sleep(timeout).await,
                None => std::future::pending().await,
            }
        };
        tokio::pin!(deadline);
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                biased;
                _ = &mut shutdown => {
                    warn!("Received shutdown signal, stopping tracker...");
                    break;
                }
                _ = &mut deadline => {
                    warn!(timeout = ?self.config.timeout, "Run timed out");
                    break;
                }
                delivery = frames.recv() => {
                    let Some(delivery) = delivery else {
                        info!("Frame stream ended");
                        break;
                    };
                    stats.frames_received += 1;

                    match assembler.assemble(&delivery) {
                        Ok(bundle) => {
                            let outcome = registry.process_bundle(&bundle);
                            if let Some(pose) = outcome.forwarded() {
                                debug!(
                                    yaw = pose.yaw,
                                    pitch = pose.pitch,
                                    roll = pose.roll,
                                    "Pose forwarded"
                                );
                            }
                            stats.tracking.update(&outcome);
                        }
                        Err(e) => {
                            stats.frames_incomplete += 1;
                            debug!(error = %e, "Frame set skipped");
                        }
                    }
                    // Releasing the delivery lets the device hand over the next frame
                    drop(delivery);

                    if let Some(max) = self.config.max_frames {
                        if stats.tracking.bundles_processed >= max {
                            info!(frames = max, "Reached max frames limit");
                            break;
                        }
                    }
                }
            }
        }

        info!("Shutting down tracker...");
        if let Err(e) = device.stop().await {
            warn!(error = %e, "Error while stopping device");
        }
        stats.final_elevation = device.elevation();

        stats.sessions_released = registry.shutdown();
        if let Err(e) = registry.sink_mut().close() {
            warn!(error = %e, "Error while closing sinks");
        }
        drop(registry);

        match tokio::time::timeout(SINK_DRAIN_TIMEOUT, workers.join()).await {
            Ok(sinks) => stats.sinks = sinks,
            Err(_) => warn!("Sink workers did not drain in time"),
        }

        stats.ingestion = ingestion_metrics.snapshot();
        stats.duration = start_time.elapsed();

        info!(
            duration_secs = stats.duration.as_secs_f64(),
            fps = format!("{:.2}", stats.fps()),
            "Tracker shutdown complete"
        );

        Ok(stats)
    }
}

/// Build a pipeline configuration from CLI style numbers (0 = unset)
pub fn pipeline_config(
    blueprint: TrackerBlueprint,
    max_frames: u64,
    timeout_secs: u64,
    tilt: i32,
    metrics_port: u16,
    subjects: usize,
) -> PipelineConfig {
    PipelineConfig {
        blueprint,
        max_frames: (max_frames > 0).then_some(max_frames),
        timeout: (timeout_secs > 0).then(|| Duration::from_secs(timeout_secs)),
        tilt,
        metrics_port: (metrics_port > 0).then_some(metrics_port),
        subjects,
    }
}
