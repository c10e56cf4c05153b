//! Layered error definitions
//!
//! Categorized by source: config / device / estimator / sink

use thiserror::Error;

/// Unified error type
#[derive(Debug, Error)]
pub enum ContractError {
    // ===== Configuration Errors =====
    /// Configuration parse error
    #[error("config parse error: {message}")]
    ConfigParse {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Configuration validation error
    #[error("config validation error at '{field}': {message}")]
    ConfigValidation { field: String, message: String },

    // ===== Device Errors =====
    /// No connected sensing device could be found
    #[error("no connected sensing device: {message}")]
    DeviceUnavailable { message: String },

    /// Device rejected a command (start, tilt, ...)
    #[error("device '{device}' error: {message}")]
    Device { device: String, message: String },

    // ===== Estimator Errors =====
    /// Estimator could not be instantiated
    #[error(transparent)]
    Estimator(#[from] EstimatorError),

    // ===== Sink Errors =====
    /// Sink write error
    #[error("sink '{sink_name}' write error: {message}")]
    SinkWrite { sink_name: String, message: String },

    /// Sink connection error
    #[error("sink '{sink_name}' connection error: {message}")]
    SinkConnection { sink_name: String, message: String },

    // ===== General Errors =====
    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Other error
    #[error("{0}")]
    Other(String),
}

impl ContractError {
    /// Create configuration parse error
    pub fn config_parse(message: impl Into<String>) -> Self {
        Self::ConfigParse {
            message: message.into(),
            source: None,
        }
    }

    /// Create configuration validation error
    pub fn config_validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ConfigValidation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create device command error
    pub fn device(device: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Device {
            device: device.into(),
            message: message.into(),
        }
    }

    /// Create sink write error
    pub fn sink_write(sink_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::SinkWrite {
            sink_name: sink_name.into(),
            message: message.into(),
        }
    }
}

/// Failure to bring up a pose estimator instance.
///
/// Always treated as transient by the session registry: the subject keeps its
/// session and creation is retried on the next frame it appears in.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EstimatorError {
    /// Estimator backend refused instantiation (e.g. during device shutdown)
    #[error("estimator unavailable: {message}")]
    Unavailable { message: String },

    /// Estimator does not support the current stream formats
    #[error("estimator does not support color={color:?} depth={depth:?}")]
    UnsupportedFormat {
        color: crate::ColorFormat,
        depth: crate::DepthFormat,
    },
}

impl EstimatorError {
    /// Create an unavailable error
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error_message() {
        let err = ContractError::config_validation("tracker.max_missed_frames", "must be > 0");
        assert_eq!(
            err.to_string(),
            "config validation error at 'tracker.max_missed_frames': must be > 0"
        );
    }

    #[test]
    fn test_estimator_error_converts() {
        let err: ContractError = EstimatorError::unavailable("shutting down").into();
        assert!(err.to_string().contains("shutting down"));
    }
}
