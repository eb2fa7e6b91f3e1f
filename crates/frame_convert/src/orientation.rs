//! Orientation conversion into the target frame.

use contracts::{
    AxisMap, ConversionConfig, EulerReadout, EulerSequence, Orientation, Quaternion,
    QuaternionComposition, QuaternionRemap, Vector3,
};
use nalgebra::UnitQuaternion;

use crate::axis::remap_array;
use crate::euler::{euler_from_quaternion, leading_angle, quaternion_from_euler};

/// Orientation in the target frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConvertedOrientation {
    /// Renormalized quaternion
    pub quaternion: Quaternion,
    /// Debug readout, degrees, x/y/z slots
    pub euler_degrees: Vector3,
}

/// Converts native Euler angles or quaternions into the target frame
#[derive(Debug, Clone)]
pub struct OrientationConverter {
    euler_input_map: AxisMap,
    euler_sequence: EulerSequence,
    readout: EulerReadout,
    composition: QuaternionComposition,
    reference: UnitQuaternion<f64>,
}

impl OrientationConverter {
    pub fn new(config: &ConversionConfig) -> Self {
        Self {
            euler_input_map: config.euler_input_map,
            euler_sequence: config.euler_sequence,
            readout: config.euler_readout,
            composition: config.quaternion_remap.composition,
            reference: reference_quaternion(&config.quaternion_remap),
        }
    }

    pub fn convert(&self, orientation: &Orientation) -> ConvertedOrientation {
        match orientation {
            Orientation::Euler { degrees } => self.convert_euler(*degrees),
            Orientation::Quaternion(q) => self.convert_quaternion(q),
        }
    }

    /// Remap the degree triple, then compose it with the configured sequence.
    ///
    /// The readout is the remapped triple itself.
    fn convert_euler(&self, degrees: Vector3) -> ConvertedOrientation {
        let remapped = remap_array(&self.euler_input_map, degrees.to_array());
        let angles = self
            .euler_sequence
            .order
            .axes()
            .map(|axis| remapped[axis.index()].to_radians());
        let q = quaternion_from_euler(angles, self.euler_sequence);

        ConvertedOrientation {
            quaternion: to_contract(&q),
            euler_degrees: Vector3::from_array(remapped),
        }
    }

    fn convert_quaternion(&self, native: &Quaternion) -> ConvertedOrientation {
        let q = UnitQuaternion::from_quaternion(to_nalgebra(native));
        let r = self.reference;
        let converted = match self.composition {
            QuaternionComposition::Conjugate => r * q * r.inverse(),
            QuaternionComposition::PreMultiply => r * q,
            QuaternionComposition::PostMultiply => q * r,
        };
        // products of unit quaternions drift; renormalize before publishing
        let converted = UnitQuaternion::from_quaternion(converted.into_inner());

        ConvertedOrientation {
            quaternion: to_contract(&converted),
            euler_degrees: self.readout_degrees(&converted),
        }
    }

    fn readout_degrees(&self, q: &UnitQuaternion<f64>) -> Vector3 {
        let radians = match self.readout {
            EulerReadout::PerAxis { x, y, z } => {
                [leading_angle(q, x), leading_angle(q, y), leading_angle(q, z)]
            }
            EulerReadout::Sequence { sequence } => {
                let angles = euler_from_quaternion(q, sequence);
                let mut slots = [0.0; 3];
                for (axis, angle) in sequence.order.axes().into_iter().zip(angles) {
                    slots[axis.index()] = angle;
                }
                slots
            }
        };
        Vector3::from_array(radians.map(f64::to_degrees))
    }
}

fn reference_quaternion(remap: &QuaternionRemap) -> UnitQuaternion<f64> {
    UnitQuaternion::from_quaternion(to_nalgebra(&remap.reference))
}

fn to_nalgebra(q: &Quaternion) -> nalgebra::Quaternion<f64> {
    nalgebra::Quaternion::new(q.w, q.x, q.y, q.z)
}

fn to_contract(q: &UnitQuaternion<f64>) -> Quaternion {
    Quaternion::new(q.i, q.j, q.k, q.w)
}
