//! FrameBundle - one synchronized device observation
//!
//! Color image, depth image and the skeleton set, tagged with the device frame number.

use bytes::Bytes;
use serde::{Deserialize, Serialize};

use crate::SkeletonEstimate;

/// Color stream format
///
/// `Undefined` is the "unset" sentinel: no real stream ever reports it, so the
/// first bundle always counts as a format change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColorFormat {
    #[default]
    Undefined,
    Rgb640x480Fps30,
    Rgb1280x960Fps12,
    Yuv640x480Fps15,
    RawYuv640x480Fps15,
    Infrared640x480Fps30,
    RawBayer640x480Fps30,
    RawBayer1280x960Fps12,
}

impl ColorFormat {
    /// Frame dimensions (width, height); zero for `Undefined`
    pub fn dimensions(self) -> (u32, u32) {
        match self {
            Self::Undefined => (0, 0),
            Self::Rgb1280x960Fps12 | Self::RawBayer1280x960Fps12 => (1280, 960),
            _ => (640, 480),
        }
    }

    /// Bytes per pixel of the raw buffer
    pub fn bytes_per_pixel(self) -> usize {
        match self {
            Self::Undefined => 0,
            Self::Rgb640x480Fps30 | Self::Rgb1280x960Fps12 => 4,
            Self::Yuv640x480Fps15 | Self::RawYuv640x480Fps15 | Self::Infrared640x480Fps30 => 2,
            Self::RawBayer640x480Fps30 | Self::RawBayer1280x960Fps12 => 1,
        }
    }

    /// Expected raw buffer length in bytes
    pub fn buffer_len(self) -> usize {
        let (w, h) = self.dimensions();
        w as usize * h as usize * self.bytes_per_pixel()
    }
}

/// Depth stream format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DepthFormat {
    #[default]
    Undefined,
    Depth640x480Fps30,
    Depth320x240Fps30,
    Depth80x60Fps30,
}

impl DepthFormat {
    /// Frame dimensions (width, height); zero for `Undefined`
    pub fn dimensions(self) -> (u32, u32) {
        match self {
            Self::Undefined => (0, 0),
            Self::Depth640x480Fps30 => (640, 480),
            Self::Depth320x240Fps30 => (320, 240),
            Self::Depth80x60Fps30 => (80, 60),
        }
    }

    /// Expected number of depth samples
    pub fn pixel_count(self) -> usize {
        let (w, h) = self.dimensions();
        w as usize * h as usize
    }
}

/// Borrowed color image
#[derive(Debug, Clone, Copy)]
pub struct ColorImage<'a> {
    pub format: ColorFormat,
    pub data: &'a [u8],
}

/// Borrowed depth image (one 16-bit sample per pixel)
#[derive(Debug, Clone, Copy)]
pub struct DepthImage<'a> {
    pub format: DepthFormat,
    pub data: &'a [u16],
}

/// Synchronized frame bundle
///
/// All buffers are borrowed for the duration of one registry call and are
/// never retained past it.
#[derive(Debug, Clone, Copy)]
pub struct FrameBundle<'a> {
    /// Device frame number (strictly increasing, gaps allowed)
    pub sequence: u64,

    /// Color image
    pub color: ColorImage<'a>,

    /// Depth image
    pub depth: DepthImage<'a>,

    /// Skeleton slots in device order
    pub subjects: &'a [SkeletonEstimate],
}

/// Owned frame bundle, used where a bundle has to cross a task or channel boundary
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OwnedFrameBundle {
    /// Device frame number
    pub sequence: u64,

    /// Color format
    pub color_format: ColorFormat,

    /// Raw color pixels (zero-copy)
    pub color: Bytes,

    /// Depth format
    pub depth_format: DepthFormat,

    /// Raw depth samples
    pub depth: Vec<u16>,

    /// Skeleton slots
    pub subjects: Vec<SkeletonEstimate>,
}

impl OwnedFrameBundle {
    /// Bundle with empty image buffers, handy for bookkeeping-only callers
    pub fn new(
        sequence: u64,
        color_format: ColorFormat,
        depth_format: DepthFormat,
        subjects: Vec<SkeletonEstimate>,
    ) -> Self {
        Self {
            sequence,
            color_format,
            color: Bytes::new(),
            depth_format,
            depth: Vec::new(),
            subjects,
        }
    }

    /// Borrow as a `FrameBundle`
    pub fn as_bundle(&self) -> FrameBundle<'_> {
        FrameBundle {
            sequence: self.sequence,
            color: ColorImage {
                format: self.color_format,
                data: &self.color,
            },
            depth: DepthImage {
                format: self.depth_format,
                data: &self.depth,
            },
            subjects: &self.subjects,
        }
    }
}
