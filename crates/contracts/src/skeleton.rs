//! SkeletonEstimate - per-subject skeletal data carried by every frame bundle

use serde::{Deserialize, Serialize};
use std::fmt;

/// Subject identifier assigned by the skeleton tracker.
///
/// Stable while the subject stays observed; may be reused by the device once
/// the subject has left the scene.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct SubjectId(pub u32);

impl fmt::Display for SubjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for SubjectId {
    #[inline]
    fn from(id: u32) -> Self {
        Self(id)
    }
}

/// Skeleton tracking state reported by the device
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrackingState {
    /// Slot is empty or the subject was lost
    #[default]
    NotTracked,
    /// Only the body centre is known, no joints
    PositionOnly,
    /// Full joint set is available
    FullyTracked,
}

impl TrackingState {
    /// Whether a subject in this state keeps (or gets) a tracking session
    #[inline]
    pub fn is_observed(self) -> bool {
        matches!(self, Self::PositionOnly | Self::FullyTracked)
    }
}

/// 3D vector (camera space, metres for positions, degrees for rotations)
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Vector3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vector3 {
    /// Create a vector from components
    #[inline]
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }
}

/// One subject's skeletal estimate within a frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkeletonEstimate {
    /// Subject identifier
    pub subject_id: SubjectId,

    /// Tracking state for this frame
    pub state: TrackingState,

    /// Body centre position
    pub position: Vector3,

    /// Head joint, present only when fully tracked
    #[serde(default)]
    pub head: Option<Vector3>,

    /// Shoulder centre joint, present only when fully tracked
    #[serde(default)]
    pub shoulder_center: Option<Vector3>,
}

impl SkeletonEstimate {
    /// Fully tracked skeleton with the head placed straight above the body centre
    pub fn tracked(subject_id: impl Into<SubjectId>, position: Vector3) -> Self {
        Self {
            subject_id: subject_id.into(),
            state: TrackingState::FullyTracked,
            position,
            head: Some(Vector3::new(position.x, position.y + 0.6, position.z)),
            shoulder_center: Some(Vector3::new(position.x, position.y + 0.4, position.z)),
        }
    }

    /// Skeleton known only by its centre position
    pub fn position_only(subject_id: impl Into<SubjectId>, position: Vector3) -> Self {
        Self {
            subject_id: subject_id.into(),
            state: TrackingState::PositionOnly,
            position,
            head: None,
            shoulder_center: None,
        }
    }

    /// Empty skeleton slot
    pub fn not_tracked(subject_id: impl Into<SubjectId>) -> Self {
        Self {
            subject_id: subject_id.into(),
            state: TrackingState::NotTracked,
            position: Vector3::default(),
            head: None,
            shoulder_center: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_observed_states() {
        assert!(TrackingState::FullyTracked.is_observed());
        assert!(TrackingState::PositionOnly.is_observed());
        assert!(!TrackingState::NotTracked.is_observed());
    }

    #[test]
    fn test_state_serde_snake_case() {
        let json = serde_json::to_string(&TrackingState::PositionOnly).unwrap();
        assert_eq!(json, "\"position_only\"");
    }

    #[test]
    fn test_subject_id_transparent() {
        let json = serde_json::to_string(&SubjectId(7)).unwrap();
        assert_eq!(json, "7");
    }
}
