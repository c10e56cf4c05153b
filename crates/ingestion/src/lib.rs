//! # Ingestion
//!
//! Frame source side of the tracker.
//!
//! Responsibilities:
//! - Hand frames to the consumer through a skip-when-busy [`FrameGate`]
//! - Assemble raw frame sets into reusable buffers ([`FrameAssembler`])
//! - Provide a simulated sensing device and a synthetic pose estimator
//!
//! ## Usage Example
//!
//! ```ignore
//! use ingestion::{frame_gate, FrameAssembler, SimulatedDevice, SimulatedDeviceConfig};
//!
//! let metrics = Arc::new(IngestionMetrics::new());
//! let (gate, frames) = frame_gate(metrics.clone());
//! let mut device = SimulatedDevice::new(SimulatedDeviceConfig::default(), gate, metrics.clone());
//! let mut assembler = FrameAssembler::new(metrics);
//!
//! device.start().await?;
//! while let Some(frame) = frames.recv().await {
//!     if let Ok(bundle) = assembler.assemble(&frame) {
//!         registry.process_bundle(&bundle);
//!     }
//! }
//! ```

mod assembler;
mod device;
mod error;
mod estimator;
mod gate;
mod metrics;

pub use assembler::{FrameAssembler, RawColorFrame, RawDepthFrame, RawFrameSet};
pub use device::{SimulatedDevice, SimulatedDeviceConfig, FULLY_TRACKED_LIMIT, SKELETON_SLOTS};
pub use error::{IngestionError, Result};
pub use estimator::{SyntheticEstimator, SyntheticEstimatorFactory};
pub use gate::{frame_gate, Delivery, FrameGate, FrameReceiver, Offer};
pub use metrics::{IngestionMetrics, MetricsSnapshot};
