//! Simulated sensing device
//!
//! Produces color, depth and skeleton streams for a configurable number of
//! subjects so the tracker can run without hardware.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use contracts::{
    clamp_elevation, ColorFormat, ContractError, DepthFormat, DeviceConfig, SensingDevice,
    SkeletonEstimate, Vector3, MAX_FRAME_RATE_HZ, TILT_STEP_DEGREES,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use crate::assembler::{RawColorFrame, RawDepthFrame, RawFrameSet};
use crate::gate::{FrameGate, Offer};
use crate::metrics::IngestionMetrics;

/// Skeleton slots reported per frame
pub const SKELETON_SLOTS: usize = 6;

/// Subjects that get full joint tracking; the rest are position-only
pub const FULLY_TRACKED_LIMIT: usize = 2;

/// Constant depth reading of the simulated scene (millimetres)
const BACKGROUND_DEPTH_MM: u16 = 2500;

/// Simulated device configuration
#[derive(Debug, Clone)]
pub struct SimulatedDeviceConfig {
    /// Device name
    pub name: String,

    pub color_format: ColorFormat,

    pub depth_format: DepthFormat,

    /// Frame rate (Hz)
    pub frame_rate_hz: f64,

    /// People in view
    pub subjects: usize,

    /// Whether a sensor is plugged in; `start` fails otherwise
    pub connected: bool,

    /// RNG seed for position jitter
    pub seed: u64,

    /// Stop producing after this many frames and close the stream
    pub frame_limit: Option<u64>,

    pub near_range: bool,

    pub seated: bool,

    /// Elevation applied on start (degrees)
    pub initial_elevation: i32,
}

impl Default for SimulatedDeviceConfig {
    fn default() -> Self {
        Self::from_device_config(&DeviceConfig::default(), 1)
    }
}

impl SimulatedDeviceConfig {
    /// Build from the blueprint's device section
    pub fn from_device_config(config: &DeviceConfig, subjects: usize) -> Self {
        Self {
            name: "simulated".to_string(),
            color_format: config.color_format,
            depth_format: config.depth_format,
            frame_rate_hz: config.frame_rate_hz,
            subjects,
            connected: true,
            seed: 0,
            frame_limit: None,
            near_range: config.near_range,
            seated: config.seated,
            initial_elevation: config.initial_elevation,
        }
    }
}

/// Simulated sensing device
///
/// Frames are published through a [`FrameGate`], so a slow consumer makes
/// the device skip frames rather than queue them. The gate is closed when
/// frame production ends for any reason.
pub struct SimulatedDevice {
    config: SimulatedDeviceConfig,
    gate: FrameGate<RawFrameSet>,
    metrics: Arc<IngestionMetrics>,
    running: Arc<AtomicBool>,
    task: Option<JoinHandle<()>>,
    elevation: i32,
}

impl SimulatedDevice {
    pub fn new(
        config: SimulatedDeviceConfig,
        gate: FrameGate<RawFrameSet>,
        metrics: Arc<IngestionMetrics>,
    ) -> Self {
        Self {
            config,
            gate,
            metrics,
            running: Arc::new(AtomicBool::new(false)),
            task: None,
            elevation: 0,
        }
    }

    /// Tilt the sensor head up one step
    pub async fn tilt_up(&mut self) -> Result<i32, ContractError> {
        self.tilt(TILT_STEP_DEGREES).await
    }

    /// Tilt the sensor head down one step
    pub async fn tilt_down(&mut self) -> Result<i32, ContractError> {
        self.tilt(-TILT_STEP_DEGREES).await
    }

    pub fn config(&self) -> &SimulatedDeviceConfig {
        &self.config
    }

    fn ensure_connected(&self) -> Result<(), ContractError> {
        if self.config.connected {
            Ok(())
        } else {
            Err(ContractError::DeviceUnavailable {
                message: format!("no connected sensor named {}", self.config.name),
            })
        }
    }
}

impl SensingDevice for SimulatedDevice {
    fn name(&self) -> &str {
        &self.config.name
    }

    async fn start(&mut self) -> Result<(), ContractError> {
        self.ensure_connected()?;

        if self.is_streaming() {
            warn!(device = %self.config.name, "device already streaming");
            return Ok(());
        }
        if self.gate.is_closed() {
            return Err(ContractError::device(
                &self.config.name,
                "frame stream already closed",
            ));
        }
        let rate = self.config.frame_rate_hz;
        if !rate.is_finite() || rate <= 0.0 || rate > MAX_FRAME_RATE_HZ {
            return Err(ContractError::device(
                &self.config.name,
                format!("invalid frame rate {rate}"),
            ));
        }

        self.elevation = clamp_elevation(0, self.config.initial_elevation);
        self.running.store(true, Ordering::SeqCst);

        info!(
            device = %self.config.name,
            color = ?self.config.color_format,
            depth = ?self.config.depth_format,
            frame_rate_hz = self.config.frame_rate_hz,
            subjects = self.config.subjects,
            near_range = self.config.near_range,
            seated = self.config.seated,
            elevation = self.elevation,
            "device started"
        );

        self.task = Some(tokio::spawn(produce_frames(
            self.config.clone(),
            self.gate.clone(),
            self.metrics.clone(),
            self.running.clone(),
        )));
        Ok(())
    }

    async fn stop(&mut self) -> Result<(), ContractError> {
        self.running.store(false, Ordering::SeqCst);
        if let Some(task) = self.task.take() {
            task.await.map_err(|e| {
                ContractError::device(&self.config.name, format!("frame task failed: {e}"))
            })?;
            info!(device = %self.config.name, "device stopped");
        }
        Ok(())
    }

    fn is_streaming(&self) -> bool {
        self.running.load(Ordering::Relaxed)
    }

    fn elevation(&self) -> i32 {
        self.elevation
    }

    async fn tilt(&mut self, delta: i32) -> Result<i32, ContractError> {
        self.ensure_connected()?;
        let elevation = clamp_elevation(self.elevation, delta);
        debug!(
            device = %self.config.name,
            from = self.elevation,
            to = elevation,
            "elevation changed"
        );
        self.elevation = elevation;
        Ok(elevation)
    }
}

impl Drop for SimulatedDevice {
    fn drop(&mut self) {
        self.running.store(false, Ordering::SeqCst);
    }
}

async fn produce_frames(
    config: SimulatedDeviceConfig,
    gate: FrameGate<RawFrameSet>,
    metrics: Arc<IngestionMetrics>,
    running: Arc<AtomicBool>,
) {
    let mut ticker = tokio::time::interval(Duration::from_secs_f64(1.0 / config.frame_rate_hz));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    let mut rng = StdRng::seed_from_u64(config.seed);
    let color = Bytes::from(vec![0x80u8; config.color_format.buffer_len()]);
    let mut sequence: u64 = 0;

    while running.load(Ordering::Relaxed) {
        ticker.tick().await;
        if !running.load(Ordering::Relaxed) {
            break;
        }
        if config.frame_limit.is_some_and(|limit| sequence >= limit) {
            debug!(device = %config.name, sequence, "frame limit reached");
            break;
        }

        sequence += 1;
        metrics.record_produced();

        let offer = gate.offer_with(|| RawFrameSet {
            sequence,
            color: Some(RawColorFrame {
                format: config.color_format,
                data: color.clone(),
            }),
            depth: Some(RawDepthFrame {
                format: config.depth_format,
                data: vec![BACKGROUND_DEPTH_MM; config.depth_format.pixel_count()],
            }),
            skeletons: Some(scene(&config, sequence, &mut rng)),
        });

        if offer == Offer::Closed {
            debug!(device = %config.name, "frame receiver closed");
            break;
        }
    }

    // Ends the stream for the consumer once no more frames will come
    gate.close();
    running.store(false, Ordering::SeqCst);
}

/// Skeleton slots for one frame
///
/// Subjects stand side by side, swaying slowly; the head leans with the sway.
fn scene(config: &SimulatedDeviceConfig, sequence: u64, rng: &mut StdRng) -> Vec<SkeletonEstimate> {
    let t = sequence as f32 / config.frame_rate_hz as f32;
    let occupied = config.subjects.min(SKELETON_SLOTS);

    let mut slots = Vec::with_capacity(SKELETON_SLOTS);
    for i in 0..occupied {
        let phase = t * 0.5 + i as f32;
        let position = Vector3::new(
            (i as f32 - (occupied as f32 - 1.0) / 2.0) * 0.6
                + 0.05 * phase.sin()
                + rng.random_range(-0.005..0.005),
            0.1 + rng.random_range(-0.005..0.005),
            1.8 + 0.2 * i as f32,
        );
        let id = i as u32 + 1;

        let skeleton = if i < FULLY_TRACKED_LIMIT {
            let mut skeleton = SkeletonEstimate::tracked(id, position);
            if let Some(head) = skeleton.head.as_mut() {
                head.x += 0.08 * phase.sin();
                head.z -= 0.04 * (t * 0.3).cos();
            }
            skeleton
        } else {
            SkeletonEstimate::position_only(id, position)
        };
        slots.push(skeleton);
    }
    slots.resize_with(SKELETON_SLOTS, || SkeletonEstimate::not_tracked(0));
    slots
}
