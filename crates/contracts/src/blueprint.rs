//! TrackerBlueprint - Config Loader output
//!
//! Describes the complete runtime configuration: tracker policy, device modes, output routing.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use validator::Validate;

use crate::{ColorFormat, DepthFormat};

/// Default staleness threshold, in frames
pub const DEFAULT_MAX_MISSED_FRAMES: u64 = 100;

/// Default per-sink queue capacity
pub const DEFAULT_SINK_QUEUE_CAPACITY: usize = 64;

/// Highest frame rate a device may be configured for (Hz)
pub const MAX_FRAME_RATE_HZ: f64 = 1000.0;

/// Config version
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ConfigVersion {
    #[default]
    V1,
}

/// Complete configuration blueprint
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct TrackerBlueprint {
    /// Config version
    #[serde(default)]
    pub version: ConfigVersion,

    /// Session registry policy
    #[serde(default)]
    #[validate(nested)]
    pub tracker: TrackerConfig,

    /// Sensing device modes
    #[serde(default)]
    #[validate(nested)]
    pub device: DeviceConfig,

    /// Output routing
    #[validate(nested)]
    pub sinks: Vec<SinkConfig>,
}

/// Session registry configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct TrackerConfig {
    /// Sessions unseen for more than this many frames are evicted
    #[serde(default = "default_max_missed_frames")]
    #[validate(range(min = 1, message = "max_missed_frames must be > 0"))]
    pub max_missed_frames: u64,

    /// Which pose is forwarded for the selected subject
    #[serde(default)]
    pub forward_policy: ForwardPolicy,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            max_missed_frames: DEFAULT_MAX_MISSED_FRAMES,
            forward_policy: ForwardPolicy::default(),
        }
    }
}

fn default_max_missed_frames() -> u64 {
    DEFAULT_MAX_MISSED_FRAMES
}

/// Forwarding policy for the selected subject
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ForwardPolicy {
    /// Forward only when the estimator succeeded this frame
    #[default]
    FreshOnly,
    /// Forward the last known good rotation even when this frame missed
    LastKnownGood,
}

/// Sensing device configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct DeviceConfig {
    /// Color stream mode
    #[serde(default = "default_color_format")]
    pub color_format: ColorFormat,

    /// Depth stream mode
    #[serde(default = "default_depth_format")]
    pub depth_format: DepthFormat,

    /// Frame rate of the simulated device (Hz)
    #[serde(default = "default_frame_rate")]
    #[validate(range(
        exclusive_min = 0.0,
        max = 1000.0,
        message = "frame_rate_hz must be in (0, 1000]"
    ))]
    pub frame_rate_hz: f64,

    /// Enable near-range skeleton tracking
    #[serde(default = "default_true")]
    pub near_range: bool,

    /// Seated (upper body) skeleton tracking
    #[serde(default = "default_true")]
    pub seated: bool,

    /// Elevation angle applied on start (degrees)
    #[serde(default)]
    #[validate(range(min = -27, max = 27, message = "initial_elevation out of range"))]
    pub initial_elevation: i32,
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            color_format: default_color_format(),
            depth_format: default_depth_format(),
            frame_rate_hz: default_frame_rate(),
            near_range: true,
            seated: true,
            initial_elevation: 0,
        }
    }
}

fn default_color_format() -> ColorFormat {
    ColorFormat::Rgb640x480Fps30
}

fn default_depth_format() -> DepthFormat {
    DepthFormat::Depth320x240Fps30
}

fn default_frame_rate() -> f64 {
    30.0
}

fn default_true() -> bool {
    true
}

/// Sink output configuration
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SinkConfig {
    /// Sink name
    #[validate(length(min = 1, message = "sink name must not be empty"))]
    pub name: String,

    /// Sink type
    pub sink_type: SinkType,

    /// Updates queued ahead of the sink worker before new ones are dropped
    #[serde(default = "default_queue_capacity")]
    #[validate(range(min = 1, message = "queue_capacity must be > 0"))]
    pub queue_capacity: usize,

    /// Type specific parameters
    #[serde(default)]
    pub params: HashMap<String, String>,
}

fn default_queue_capacity() -> usize {
    DEFAULT_SINK_QUEUE_CAPACITY
}

/// Sink type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SinkType {
    /// Log every update via tracing
    Log,
    /// UDP datagrams (OpenTrack / JSON / bincode)
    Udp,
    /// JSON lines file
    File,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tracker_defaults() {
        let config = TrackerConfig::default();
        assert_eq!(config.max_missed_frames, 100);
        assert_eq!(config.forward_policy, ForwardPolicy::FreshOnly);
    }

    #[test]
    fn test_blueprint_validation() {
        let mut blueprint = TrackerBlueprint {
            version: ConfigVersion::V1,
            tracker: TrackerConfig::default(),
            device: DeviceConfig::default(),
            sinks: vec![SinkConfig {
                name: "console".to_string(),
                sink_type: SinkType::Log,
                queue_capacity: DEFAULT_SINK_QUEUE_CAPACITY,
                params: HashMap::new(),
            }],
        };
        assert!(blueprint.validate().is_ok());

        blueprint.tracker.max_missed_frames = 0;
        assert!(blueprint.validate().is_err());
    }

    #[test]
    fn test_forward_policy_serde() {
        let policy: ForwardPolicy = serde_json::from_str("\"last_known_good\"").unwrap();
        assert_eq!(policy, ForwardPolicy::LastKnownGood);
    }
}
