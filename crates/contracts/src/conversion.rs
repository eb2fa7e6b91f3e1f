//! Frame conversion configuration
//!
//! Every sign, permutation and rotation order used by the converter is data,
//! never hardcoded at the call site.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::Quaternion;

/// Orientation representation delivered by the simulator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InputRepresentation {
    Euler,
    #[default]
    Quaternion,
}

impl fmt::Display for InputRepresentation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Euler => write!(f, "euler"),
            Self::Quaternion => write!(f, "quaternion"),
        }
    }
}

/// Principal axis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    pub const fn index(self) -> usize {
        match self {
            Self::X => 0,
            Self::Y => 1,
            Self::Z => 2,
        }
    }

    fn from_char(c: char) -> Option<Self> {
        match c.to_ascii_lowercase() {
            'x' => Some(Self::X),
            'y' => Some(Self::Y),
            'z' => Some(Self::Z),
            _ => None,
        }
    }

    const fn as_char(self) -> char {
        match self {
            Self::X => 'x',
            Self::Y => 'y',
            Self::Z => 'z',
        }
    }
}

/// Source axis with a sign, written `"+x"`, `"-y"`, ...
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SignedAxis {
    pub axis: Axis,
    pub negate: bool,
}

impl SignedAxis {
    pub const fn pos(axis: Axis) -> Self {
        Self {
            axis,
            negate: false,
        }
    }

    pub const fn neg(axis: Axis) -> Self {
        Self { axis, negate: true }
    }

    /// `+1.0` or `-1.0`
    pub const fn sign(self) -> f64 {
        if self.negate {
            -1.0
        } else {
            1.0
        }
    }
}

impl fmt::Display for SignedAxis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.negate { '-' } else { '+' };
        write!(f, "{}{}", sign, self.axis.as_char())
    }
}

impl FromStr for SignedAxis {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut chars = s.trim().chars();
        let (negate, axis_char) = match (chars.next(), chars.next(), chars.next()) {
            (Some('+'), Some(c), None) => (false, c),
            (Some('-'), Some(c), None) => (true, c),
            (Some(c), None, None) => (false, c),
            _ => return Err(format!("invalid signed axis '{s}', expected e.g. \"+x\" or \"-z\"")),
        };
        let axis = Axis::from_char(axis_char)
            .ok_or_else(|| format!("invalid axis '{axis_char}' in '{s}'"))?;
        Ok(Self { axis, negate })
    }
}

impl TryFrom<String> for SignedAxis {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<SignedAxis> for String {
    fn from(value: SignedAxis) -> Self {
        value.to_string()
    }
}

/// Signed axis permutation: output component `i` = `map[i].sign() * input[map[i].axis]`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AxisMap(pub [SignedAxis; 3]);

impl AxisMap {
    pub const IDENTITY: Self = Self([
        SignedAxis::pos(Axis::X),
        SignedAxis::pos(Axis::Y),
        SignedAxis::pos(Axis::Z),
    ]);

    /// Position and linear velocity: `(x, -y, -z)`
    pub const POLAR_NED: Self = Self([
        SignedAxis::pos(Axis::X),
        SignedAxis::neg(Axis::Y),
        SignedAxis::neg(Axis::Z),
    ]);

    /// Angular velocity and Euler angles: `(-x, -y, z)`
    pub const AXIAL_NED: Self = Self([
        SignedAxis::neg(Axis::X),
        SignedAxis::neg(Axis::Y),
        SignedAxis::pos(Axis::Z),
    ]);

    /// True when every source axis is used exactly once
    pub fn is_permutation(&self) -> bool {
        let mut seen = [false; 3];
        for entry in &self.0 {
            seen[entry.axis.index()] = true;
        }
        seen.iter().all(|s| *s)
    }
}

impl fmt::Display for AxisMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}, {}]", self.0[0], self.0[1], self.0[2])
    }
}

/// Tait-Bryan axis sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EulerOrder {
    Xyz,
    Xzy,
    Yxz,
    Yzx,
    Zxy,
    Zyx,
}

impl EulerOrder {
    /// The three axes in sequence order
    pub const fn axes(self) -> [Axis; 3] {
        match self {
            Self::Xyz => [Axis::X, Axis::Y, Axis::Z],
            Self::Xzy => [Axis::X, Axis::Z, Axis::Y],
            Self::Yxz => [Axis::Y, Axis::X, Axis::Z],
            Self::Yzx => [Axis::Y, Axis::Z, Axis::X],
            Self::Zxy => [Axis::Z, Axis::X, Axis::Y],
            Self::Zyx => [Axis::Z, Axis::Y, Axis::X],
        }
    }

    /// Same axes, traversed backwards
    pub const fn reversed(self) -> Self {
        match self {
            Self::Xyz => Self::Zyx,
            Self::Xzy => Self::Yzx,
            Self::Yxz => Self::Zxy,
            Self::Yzx => Self::Xzy,
            Self::Zxy => Self::Yxz,
            Self::Zyx => Self::Xyz,
        }
    }

    /// First axis of the sequence
    pub const fn first(self) -> Axis {
        self.axes()[0]
    }
}

impl fmt::Display for EulerOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [a, b, c] = self.axes();
        write!(f, "{}{}{}", a.as_char(), b.as_char(), c.as_char())
    }
}

/// Rotating (intrinsic) or static (extrinsic) axes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EulerConvention {
    #[default]
    Intrinsic,
    Extrinsic,
}

/// Fully specified Euler convention
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EulerSequence {
    pub order: EulerOrder,
    #[serde(default)]
    pub convention: EulerConvention,
}

impl EulerSequence {
    pub const fn intrinsic(order: EulerOrder) -> Self {
        Self {
            order,
            convention: EulerConvention::Intrinsic,
        }
    }

    pub const fn extrinsic(order: EulerOrder) -> Self {
        Self {
            order,
            convention: EulerConvention::Extrinsic,
        }
    }
}

impl Default for EulerSequence {
    fn default() -> Self {
        Self::intrinsic(EulerOrder::Zyx)
    }
}

impl fmt::Display for EulerSequence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let prefix = match self.convention {
            EulerConvention::Intrinsic => 'r',
            EulerConvention::Extrinsic => 's',
        };
        write!(f, "{}{}", prefix, self.order)
    }
}

/// How the debug Euler readout is extracted from a quaternion
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum EulerReadout {
    /// Each reported angle is the first angle of its own intrinsic order
    PerAxis {
        x: EulerOrder,
        y: EulerOrder,
        z: EulerOrder,
    },

    /// All three angles from one sequence, in x/y/z axis slots
    Sequence { sequence: EulerSequence },
}

impl Default for EulerReadout {
    fn default() -> Self {
        Self::PerAxis {
            x: EulerOrder::Xyz,
            y: EulerOrder::Yxz,
            z: EulerOrder::Zyx,
        }
    }
}

/// How the reference quaternion is combined with the native one
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuaternionComposition {
    /// `q_ref * q * q_ref^-1` (change of basis)
    #[default]
    Conjugate,
    /// `q_ref * q`
    PreMultiply,
    /// `q * q_ref`
    PostMultiply,
}

/// Fixed reference rotation moving native quaternions into the target frame
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct QuaternionRemap {
    pub reference: Quaternion,
    #[serde(default)]
    pub composition: QuaternionComposition,
}

impl QuaternionRemap {
    /// 180 degrees about X
    pub const HALF_TURN_X: Quaternion = Quaternion::new(1.0, 0.0, 0.0, 0.0);

    pub const fn identity() -> Self {
        Self {
            reference: Quaternion::IDENTITY,
            composition: QuaternionComposition::Conjugate,
        }
    }
}

impl Default for QuaternionRemap {
    fn default() -> Self {
        Self {
            reference: Self::HALF_TURN_X,
            composition: QuaternionComposition::Conjugate,
        }
    }
}

/// Complete converter configuration
///
/// `Default` is the NED bridge; [`ConversionConfig::passthrough`] performs
/// no conversion at all.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConversionConfig {
    /// Representation the deployment receives
    pub input: InputRepresentation,

    /// Position and linear velocity table
    pub position_map: AxisMap,

    /// Angular velocity table
    pub angular_velocity_map: AxisMap,

    /// Table applied to incoming Euler angles
    ///
    /// Independent of [`Self::quaternion_remap`]. With the defaults the two
    /// input kinds do not agree: Euler `(30°, 0, 0)` publishes a -30° roll,
    /// while the same native rotation sent as a quaternion survives the X
    /// half-turn conjugation unchanged and publishes +30°. Deployments tune
    /// the table for the representation they actually receive.
    pub euler_input_map: AxisMap,

    /// Sequence used to build the quaternion from Euler input
    pub euler_sequence: EulerSequence,

    /// Debug readout for quaternion input
    pub euler_readout: EulerReadout,

    /// Reference rotation for quaternion input
    pub quaternion_remap: QuaternionRemap,
}

impl Default for ConversionConfig {
    fn default() -> Self {
        Self {
            input: InputRepresentation::Quaternion,
            position_map: AxisMap::POLAR_NED,
            angular_velocity_map: AxisMap::AXIAL_NED,
            euler_input_map: AxisMap::AXIAL_NED,
            euler_sequence: EulerSequence::default(),
            euler_readout: EulerReadout::default(),
            quaternion_remap: QuaternionRemap::default(),
        }
    }
}

impl ConversionConfig {
    /// No remapping: values are republished in the simulator's own frame
    pub fn passthrough() -> Self {
        Self {
            position_map: AxisMap::IDENTITY,
            angular_velocity_map: AxisMap::IDENTITY,
            euler_input_map: AxisMap::IDENTITY,
            quaternion_remap: QuaternionRemap::identity(),
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signed_axis_parse() {
        assert_eq!("+x".parse::<SignedAxis>().unwrap(), SignedAxis::pos(Axis::X));
        assert_eq!("-Z".parse::<SignedAxis>().unwrap(), SignedAxis::neg(Axis::Z));
        assert_eq!("y".parse::<SignedAxis>().unwrap(), SignedAxis::pos(Axis::Y));
        assert!("+w".parse::<SignedAxis>().is_err());
        assert!("--x".parse::<SignedAxis>().is_err());
    }

    #[test]
    fn test_axis_map_serde() {
        let json = serde_json::to_string(&AxisMap::POLAR_NED).unwrap();
        assert_eq!(json, r#"["+x","-y","-z"]"#);
        let parsed: AxisMap = serde_json::from_str(r#"["-x","-y","+z"]"#).unwrap();
        assert_eq!(parsed, AxisMap::AXIAL_NED);
    }

    #[test]
    fn test_axis_map_permutation() {
        assert!(AxisMap::POLAR_NED.is_permutation());
        let dup = AxisMap([
            SignedAxis::pos(Axis::X),
            SignedAxis::neg(Axis::X),
            SignedAxis::pos(Axis::Z),
        ]);
        assert!(!dup.is_permutation());
    }

    #[test]
    fn test_euler_order_reverse_roundtrip() {
        for order in [
            EulerOrder::Xyz,
            EulerOrder::Xzy,
            EulerOrder::Yxz,
            EulerOrder::Yzx,
            EulerOrder::Zxy,
            EulerOrder::Zyx,
        ] {
            assert_eq!(order.reversed().reversed(), order);
            let mut fwd = order.axes();
            fwd.reverse();
            assert_eq!(order.reversed().axes(), fwd);
        }
    }

    #[test]
    fn test_readout_serde_shape() {
        let readout: EulerReadout =
            serde_json::from_str(r#"{"mode":"per_axis","x":"xyz","y":"yxz","z":"zyx"}"#).unwrap();
        assert_eq!(readout, EulerReadout::default());
        assert_eq!(EulerSequence::default().to_string(), "rzyx");
    }

    #[test]
    fn test_passthrough_is_identity() {
        let config = ConversionConfig::passthrough();
        assert_eq!(config.position_map, AxisMap::IDENTITY);
        assert_eq!(config.quaternion_remap.reference, Quaternion::IDENTITY);
    }
}
