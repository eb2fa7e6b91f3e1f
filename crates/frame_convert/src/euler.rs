//! Tait-Bryan angle <-> unit quaternion conversion.
//!
//! Angles are always in radians and listed in sequence order: for `zyx`
//! the first angle is about z.
//!
//! Intrinsic `ijk` composes as `q_i(a) * q_j(b) * q_k(c)`; extrinsic `ijk`
//! is intrinsic `kji` with the angles reversed.

use contracts::{Axis, EulerConvention, EulerOrder, EulerSequence};
use nalgebra::{UnitQuaternion, Vector3};

fn unit_axis(axis: Axis) -> nalgebra::Unit<Vector3<f64>> {
    match axis {
        Axis::X => Vector3::x_axis(),
        Axis::Y => Vector3::y_axis(),
        Axis::Z => Vector3::z_axis(),
    }
}

/// Build a unit quaternion from three angles (radians, sequence order).
pub fn quaternion_from_euler(angles: [f64; 3], sequence: EulerSequence) -> UnitQuaternion<f64> {
    let (order, angles) = intrinsic_form(angles, sequence);
    let [i, j, k] = order.axes();

    UnitQuaternion::from_axis_angle(&unit_axis(i), angles[0])
        * UnitQuaternion::from_axis_angle(&unit_axis(j), angles[1])
        * UnitQuaternion::from_axis_angle(&unit_axis(k), angles[2])
}

/// Decompose a unit quaternion into three angles (radians, sequence order).
///
/// The middle angle lies in `[-pi/2, pi/2]`, the outer ones in `(-pi, pi]`.
/// At gimbal lock the split between the outer angles is arbitrary.
pub fn euler_from_quaternion(q: &UnitQuaternion<f64>, sequence: EulerSequence) -> [f64; 3] {
    let intrinsic_order = match sequence.convention {
        EulerConvention::Intrinsic => sequence.order,
        EulerConvention::Extrinsic => sequence.order.reversed(),
    };

    let [a, b, c] = intrinsic_angles(q, intrinsic_order);

    match sequence.convention {
        EulerConvention::Intrinsic => [a, b, c],
        EulerConvention::Extrinsic => [c, b, a],
    }
}

/// First angle of the intrinsic decomposition in `order` (radians).
pub fn leading_angle(q: &UnitQuaternion<f64>, order: EulerOrder) -> f64 {
    intrinsic_angles(q, order)[0]
}

fn intrinsic_form(angles: [f64; 3], sequence: EulerSequence) -> (EulerOrder, [f64; 3]) {
    match sequence.convention {
        EulerConvention::Intrinsic => (sequence.order, angles),
        EulerConvention::Extrinsic => (
            sequence.order.reversed(),
            [angles[2], angles[1], angles[0]],
        ),
    }
}

/// Intrinsic decomposition read off the rotation matrix.
///
/// For `R = R_i(a) R_j(b) R_k(c)`, with `s = +1` when `ijk` is a cyclic
/// permutation of `xyz` and `-1` otherwise:
/// `R[i][k] = s sin b`, `R[j][k] / R[k][k] = -s tan a`,
/// `R[i][j] / R[i][i] = -s tan c`.
fn intrinsic_angles(q: &UnitQuaternion<f64>, order: EulerOrder) -> [f64; 3] {
    let m = q.to_rotation_matrix().into_inner();
    let [i, j, k] = order.axes().map(Axis::index);
    let s = if is_cyclic(i, j) { 1.0 } else { -1.0 };

    let b = (s * m[(i, k)]).clamp(-1.0, 1.0).asin();
    let a = (-s * m[(j, k)]).atan2(m[(k, k)]);
    let c = (-s * m[(i, j)]).atan2(m[(i, i)]);
    [a, b, c]
}

fn is_cyclic(i: usize, j: usize) -> bool {
    (i + 1) % 3 == j
}
