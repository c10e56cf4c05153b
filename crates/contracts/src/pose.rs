//! Pose types - estimator output and sink input

use serde::{Deserialize, Serialize};

use crate::Vector3;

/// Head pose reported by an estimator
///
/// Rotation is in degrees, in the estimator's axis convention; see
/// [`PoseUpdate::from_parts`] for how the axes map onto pitch/roll/yaw.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct FacePose {
    /// Rotation (degrees)
    pub rotation: Vector3,

    /// Head translation relative to the camera (metres)
    pub translation: Vector3,
}

/// Result of one estimator call
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PoseResult {
    /// A face was found
    Found(FacePose),

    /// No face in this frame; not an error
    NotFound,
}

/// 6-DOF update forwarded to a pose sink
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PoseUpdate {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub pitch: f32,
    pub roll: f32,
    pub yaw: f32,
}

impl PoseUpdate {
    /// Combine a skeleton position with an estimated head rotation
    ///
    /// pitch = rotation.y, roll = rotation.x, yaw = rotation.z
    pub fn from_parts(position: Vector3, pose: &FacePose) -> Self {
        Self {
            x: position.x,
            y: position.y,
            z: position.z,
            pitch: pose.rotation.y,
            roll: pose.rotation.x,
            yaw: pose.rotation.z,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_axis_mapping() {
        let pose = FacePose {
            rotation: Vector3::new(10.0, 20.0, 30.0),
            translation: Vector3::default(),
        };
        let update = PoseUpdate::from_parts(Vector3::new(1.0, 2.0, 3.0), &pose);
        assert_eq!(
            update,
            PoseUpdate {
                x: 1.0,
                y: 2.0,
                z: 3.0,
                pitch: 20.0,
                roll: 10.0,
                yaw: 30.0,
            }
        );
    }
}
