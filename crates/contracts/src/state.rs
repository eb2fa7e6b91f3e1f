//! RawStateSample - Ingestion output, ConvertedState - converter output
//!
//! Both are transient: built, published and dropped within one callback.

use serde::{Deserialize, Serialize};

use crate::InputRepresentation;

/// 3D vector
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Vector3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vector3 {
    pub const ZERO: Self = Self {
        x: 0.0,
        y: 0.0,
        z: 0.0,
    };

    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Components as `[x, y, z]`
    pub fn to_array(self) -> [f64; 3] {
        [self.x, self.y, self.z]
    }

    pub fn from_array(v: [f64; 3]) -> Self {
        Self::new(v[0], v[1], v[2])
    }
}

/// Quaternion in `(x, y, z, w)` layout
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Quaternion {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub w: f64,
}

impl Quaternion {
    pub const IDENTITY: Self = Self {
        x: 0.0,
        y: 0.0,
        z: 0.0,
        w: 1.0,
    };

    pub const fn new(x: f64, y: f64, z: f64, w: f64) -> Self {
        Self { x, y, z, w }
    }

    pub fn norm(&self) -> f64 {
        (self.x * self.x + self.y * self.y + self.z * self.z + self.w * self.w).sqrt()
    }
}

impl Default for Quaternion {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// Simulator-native orientation
///
/// A deployment receives exactly one of the two variants.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Orientation {
    /// Euler angles in degrees, native axes
    Euler { degrees: Vector3 },

    /// Native quaternion
    Quaternion(Quaternion),
}

impl Orientation {
    /// Representation carried by this orientation
    pub fn representation(&self) -> InputRepresentation {
        match self {
            Self::Euler { .. } => InputRepresentation::Euler,
            Self::Quaternion(_) => InputRepresentation::Quaternion,
        }
    }
}

/// Ground-truth vehicle state as reported by the simulator
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RawStateSample {
    /// Position, native linear unit and handedness
    pub position: Vector3,

    /// Native orientation
    pub orientation: Orientation,

    /// Linear velocity, native frame
    pub linear_velocity: Vector3,

    /// Angular velocity, native frame
    pub angular_velocity: Vector3,

    /// Optional sender sequence number (ordering/diagnostics)
    #[serde(default)]
    pub sequence: Option<u64>,
}

/// Vehicle state expressed in the target frame
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConvertedState {
    pub position: Vector3,

    /// Unit quaternion, canonical for pose and transforms
    pub orientation: Quaternion,

    /// Debug readout in degrees, not guaranteed to recompose `orientation`
    pub orientation_euler_degrees: Vector3,

    pub linear_velocity: Vector3,

    pub angular_velocity: Vector3,
}

/// Virtual sensor freshness flags
///
/// Signals "fresh data for this virtual sensor", not a real health check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SensorHealthFlags {
    pub imu: bool,
    pub depth: bool,
    pub dvl: bool,
}

impl SensorHealthFlags {
    /// Flags emitted for every processed sample
    pub const fn fresh() -> Self {
        Self {
            imu: true,
            depth: true,
            dvl: true,
        }
    }
}
