//! Transform tree types
//!
//! Stamped rigid transforms and the synchronized pair broadcast per sample.

use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

use crate::{Quaternion, Vector3};

/// Wall-clock timestamp (seconds + nanoseconds since UNIX epoch)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Stamp {
    pub sec: i64,
    pub nanosec: u32,
}

impl Stamp {
    /// Current wall-clock time
    pub fn now() -> Self {
        // A clock set before 1970 collapses to the epoch
        let d = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default();
        Self {
            sec: d.as_secs() as i64,
            nanosec: d.subsec_nanos(),
        }
    }

    /// Seconds as f64 (lossy)
    pub fn as_secs_f64(&self) -> f64 {
        self.sec as f64 + self.nanosec as f64 * 1e-9
    }
}

/// Rigid transform: translation + rotation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    pub translation: Vector3,
    pub rotation: Quaternion,
}

/// Transform from `frame_id` to `child_frame_id` at `stamp`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransformStamped {
    pub stamp: Stamp,
    pub frame_id: String,
    pub child_frame_id: String,
    pub transform: Transform,
}

/// Frame identifiers used by the transform pair
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FrameIds {
    /// Fixed world frame
    pub world: String,
    /// Vehicle body frame (child of `world`)
    pub body: String,
    /// Rotation-only anchor frame
    pub rotation_anchor: String,
    /// Vehicle rotation frame (child of `rotation_anchor`)
    pub vehicle_rotation: String,
}

impl Default for FrameIds {
    fn default() -> Self {
        Self {
            world: "world".to_string(),
            body: "auv_base".to_string(),
            rotation_anchor: "world_rotation".to_string(),
            vehicle_rotation: "auv_rotation".to_string(),
        }
    }
}

/// Vehicle-in-world transform plus its rotation-only twin
///
/// Both members always carry the same stamp and rotation; the rotation
/// member always has zero translation. Fields are private so the pair can
/// only be built through [`TransformPair::new`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransformPair {
    body: TransformStamped,
    rotation: TransformStamped,
}

impl TransformPair {
    pub fn new(frames: &FrameIds, stamp: Stamp, translation: Vector3, rotation: Quaternion) -> Self {
        Self {
            body: TransformStamped {
                stamp,
                frame_id: frames.world.clone(),
                child_frame_id: frames.body.clone(),
                transform: Transform {
                    translation,
                    rotation,
                },
            },
            rotation: TransformStamped {
                stamp,
                frame_id: frames.rotation_anchor.clone(),
                child_frame_id: frames.vehicle_rotation.clone(),
                transform: Transform {
                    translation: Vector3::ZERO,
                    rotation,
                },
            },
        }
    }

    /// `world -> body` transform
    pub fn body(&self) -> &TransformStamped {
        &self.body
    }

    /// `rotation_anchor -> vehicle_rotation` transform
    pub fn rotation(&self) -> &TransformStamped {
        &self.rotation
    }

    /// Shared stamp
    pub fn stamp(&self) -> Stamp {
        self.body.stamp
    }

    /// Both transforms in broadcast order
    pub fn to_vec(&self) -> Vec<TransformStamped> {
        vec![self.body.clone(), self.rotation.clone()]
    }
}
