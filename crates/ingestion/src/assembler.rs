//! Frame assembly with buffer reuse
//!
//! Turns raw device frame sets into the bundle the session registry borrows.
//! The depth buffer is reallocated only on a depth format change, the
//! skeleton buffer keeps its allocation across frames and color pixels are
//! shared without copying.

use std::sync::Arc;

use bytes::Bytes;
use contracts::{
    ColorFormat, DepthFormat, FrameBundle, OwnedFrameBundle, SkeletonEstimate,
};
use tracing::debug;

use crate::error::{IngestionError, Result};
use crate::metrics::IngestionMetrics;

/// Color stream payload
#[derive(Debug, Clone)]
pub struct RawColorFrame {
    pub format: ColorFormat,
    pub data: Bytes,
}

/// Depth stream payload
#[derive(Debug, Clone)]
pub struct RawDepthFrame {
    pub format: DepthFormat,
    pub data: Vec<u16>,
}

/// One device tick; any stream may be absent
#[derive(Debug, Clone, Default)]
pub struct RawFrameSet {
    pub sequence: u64,
    pub color: Option<RawColorFrame>,
    pub depth: Option<RawDepthFrame>,
    pub skeletons: Option<Vec<SkeletonEstimate>>,
}

/// Copies raw frame sets into long-lived buffers
pub struct FrameAssembler {
    bundle: OwnedFrameBundle,
    metrics: Arc<IngestionMetrics>,
}

impl FrameAssembler {
    pub fn new(metrics: Arc<IngestionMetrics>) -> Self {
        Self {
            bundle: OwnedFrameBundle::new(
                0,
                ColorFormat::Undefined,
                DepthFormat::Undefined,
                Vec::new(),
            ),
            metrics,
        }
    }

    /// Assemble a frame set
    ///
    /// # Errors
    /// `IncompleteFrameSet` when a stream is missing, `*SizeMismatch` when a
    /// payload does not match its declared format. The previous bundle is
    /// left untouched in both cases.
    pub fn assemble(&mut self, raw: &RawFrameSet) -> Result<FrameBundle<'_>> {
        let (color, depth, skeletons) = match (&raw.color, &raw.depth, &raw.skeletons) {
            (Some(color), Some(depth), Some(skeletons)) => (color, depth, skeletons),
            (color, depth, _) => {
                let stream = if color.is_none() {
                    "color"
                } else if depth.is_none() {
                    "depth"
                } else {
                    "skeleton"
                };
                return Err(self.reject(IngestionError::IncompleteFrameSet {
                    sequence: raw.sequence,
                    stream,
                }));
            }
        };

        let expected = color.format.buffer_len();
        if color.data.len() != expected {
            return Err(self.reject(IngestionError::ColorSizeMismatch {
                format: color.format,
                expected,
                actual: color.data.len(),
            }));
        }
        let expected = depth.format.pixel_count();
        if depth.data.len() != expected {
            return Err(self.reject(IngestionError::DepthSizeMismatch {
                format: depth.format,
                expected,
                actual: depth.data.len(),
            }));
        }

        if depth.format != self.bundle.depth_format {
            debug!(from = ?self.bundle.depth_format, to = ?depth.format, "depth buffer reallocated");
            self.bundle.depth = vec![0; expected];
            self.bundle.depth_format = depth.format;
            self.metrics.record_reallocation();
        }
        self.bundle.depth.copy_from_slice(&depth.data);

        self.bundle.color_format = color.format;
        self.bundle.color = color.data.clone();

        if self.bundle.subjects.len() != skeletons.len() {
            debug!(slots = skeletons.len(), "skeleton buffer resized");
            self.metrics.record_reallocation();
        }
        self.bundle.subjects.clone_from(skeletons);

        self.bundle.sequence = raw.sequence;
        Ok(self.bundle.as_bundle())
    }

    fn reject(&self, err: IngestionError) -> IngestionError {
        self.metrics.record_incomplete();
        debug!(error = %err, "frame set skipped");
        err
    }

    /// Last successfully assembled bundle
    pub fn bundle(&self) -> &OwnedFrameBundle {
        &self.bundle
    }
}
