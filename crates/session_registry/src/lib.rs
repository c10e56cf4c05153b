//! # Session Registry
//!
//! Multi-subject head tracking session manager.
//!
//! Responsibilities:
//! - Invalidate every session when the color or depth format changes
//! - Create / update one `TrackingSession` per observed subject
//! - Forward the pose of the first observed subject in bundle order
//! - Evict sessions unseen for more than `max_missed_frames` frames
//!
//! ## Example
//!
//! ```ignore
//! use session_registry::{SessionRegistry, TrackerConfig};
//!
//! let mut registry = SessionRegistry::new(TrackerConfig::default(), factory, sink);
//!
//! // Push bundles as the device delivers them
//! let outcome = registry.process_bundle(&bundle);
//!
//! registry.shutdown();
//! ```

mod registry;
mod session;

#[cfg(test)]
mod testing;

pub use registry::SessionRegistry;
pub use session::{SessionUpdate, TrackingSession};

// Re-export contracts types
pub use contracts::{
    BundleOutcome, DestroyReason, ForwardPolicy, FrameBundle, FrameReport, TrackerConfig,
};
