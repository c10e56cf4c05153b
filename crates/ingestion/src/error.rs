//! Ingestion error types

use contracts::{ColorFormat, DepthFormat};
use thiserror::Error;

/// Ingestion errors
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum IngestionError {
    /// A frame set arrived without one of its streams
    #[error("frame set {sequence} is missing its {stream} stream")]
    IncompleteFrameSet {
        /// Device frame number
        sequence: u64,
        /// Missing stream name
        stream: &'static str,
    },

    /// Color payload length does not match its format
    #[error("color frame size mismatch for {format:?}: expected {expected} bytes, got {actual}")]
    ColorSizeMismatch {
        format: ColorFormat,
        expected: usize,
        actual: usize,
    },

    /// Depth payload length does not match its format
    #[error("depth frame size mismatch for {format:?}: expected {expected} samples, got {actual}")]
    DepthSizeMismatch {
        format: DepthFormat,
        expected: usize,
        actual: usize,
    },
}

/// Ingestion Result type alias
pub type Result<T> = std::result::Result<T, IngestionError>;
