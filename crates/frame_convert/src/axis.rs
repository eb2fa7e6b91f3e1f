//! Signed axis permutation between handedness conventions.

use contracts::{AxisMap, Vector3};

/// Apply a signed axis permutation: `out[i] = sign_i * input[axis_i]`.
///
/// Linear and total. NaN/inf components propagate to wherever the map
/// sends them.
pub fn remap_vector(map: &AxisMap, input: Vector3) -> Vector3 {
    let src = input.to_array();
    let mut out = [0.0; 3];
    for (slot, entry) in out.iter_mut().zip(map.0.iter()) {
        *slot = entry.sign() * src[entry.axis.index()];
    }
    Vector3::from_array(out)
}

/// Apply a map to a plain triple (used for Euler degrees).
pub(crate) fn remap_array(map: &AxisMap, input: [f64; 3]) -> [f64; 3] {
    remap_vector(map, Vector3::from_array(input)).to_array()
}
