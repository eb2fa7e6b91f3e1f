//! Per-sample state conversion.

use contracts::{
    ConversionConfig, ConvertedState, FrameIds, InputRepresentation, RawStateSample, Stamp,
    TransformPair,
};
use tracing::trace;

use crate::axis::remap_vector;
use crate::orientation::OrientationConverter;

/// Converts raw simulator samples into the target frame
///
/// Holds only the precomputed configuration; every call is independent.
#[derive(Debug, Clone)]
pub struct FrameConverter {
    config: ConversionConfig,
    orientation: OrientationConverter,
}

impl FrameConverter {
    pub fn new(config: ConversionConfig) -> Self {
        let orientation = OrientationConverter::new(&config);
        Self {
            config,
            orientation,
        }
    }

    pub fn config(&self) -> &ConversionConfig {
        &self.config
    }

    /// Representation this converter was configured for
    pub fn input(&self) -> InputRepresentation {
        self.config.input
    }

    /// Convert one sample.
    ///
    /// Position and linear velocity share the position table; angular
    /// velocity uses its own. The sample's orientation variant decides the
    /// orientation path. Input values are not validated.
    pub fn convert(&self, sample: &RawStateSample) -> ConvertedState {
        let orientation = self.orientation.convert(&sample.orientation);

        trace!(
            sequence = ?sample.sequence,
            representation = %sample.orientation.representation(),
            "converted sample"
        );

        ConvertedState {
            position: remap_vector(&self.config.position_map, sample.position),
            orientation: orientation.quaternion,
            orientation_euler_degrees: orientation.euler_degrees,
            linear_velocity: remap_vector(&self.config.position_map, sample.linear_velocity),
            angular_velocity: remap_vector(
                &self.config.angular_velocity_map,
                sample.angular_velocity,
            ),
        }
    }
}

/// Build the synchronized transform pair for a converted state.
pub fn transform_pair(state: &ConvertedState, frames: &FrameIds, stamp: Stamp) -> TransformPair {
    TransformPair::new(frames, stamp, state.position, state.orientation)
}

/// One-shot conversion without a long-lived [`FrameConverter`].
pub fn convert(
    sample: &RawStateSample,
    config: &ConversionConfig,
    frames: &FrameIds,
    stamp: Stamp,
) -> (ConvertedState, TransformPair) {
    let state = FrameConverter::new(*config).convert(sample);
    let pair = transform_pair(&state, frames, stamp);
    (state, pair)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use contracts::{Orientation, Quaternion, Vector3};
    use rand::Rng;

    fn sample(position: Vector3, orientation: Orientation) -> RawStateSample {
        RawStateSample {
            position,
            orientation,
            linear_velocity: Vector3::ZERO,
            angular_velocity: Vector3::ZERO,
            sequence: None,
        }
    }

    #[test]
    fn test_reference_scenario() {
        let raw = sample(
            Vector3::new(1.0, 2.0, 3.0),
            Orientation::Quaternion(Quaternion::IDENTITY),
        );
        let stamp = Stamp { sec: 10, nanosec: 5 };
        let (state, pair) = convert(&raw, &ConversionConfig::default(), &FrameIds::default(), stamp);

        assert_eq!(state.position, Vector3::new(1.0, -2.0, -3.0));
        assert_abs_diff_eq!(state.orientation.w, 1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(state.orientation.x, 0.0, epsilon = 1e-12);
        assert_eq!(state.linear_velocity, Vector3::ZERO);
        assert_eq!(state.angular_velocity, Vector3::ZERO);

        assert_eq!(pair.body().frame_id, "world");
        assert_eq!(pair.body().child_frame_id, "auv_base");
        assert_eq!(pair.body().transform.translation, Vector3::new(1.0, -2.0, -3.0));
        assert_eq!(pair.rotation().frame_id, "world_rotation");
        assert_eq!(pair.rotation().child_frame_id, "auv_rotation");
        assert_eq!(pair.rotation().transform.translation, Vector3::ZERO);
        assert_eq!(pair.body().transform.rotation, pair.rotation().transform.rotation);
        assert_eq!(pair.body().stamp, pair.rotation().stamp);
        assert_eq!(pair.stamp(), stamp);
    }

    #[test]
    fn test_velocity_sign_tables() {
        let converter = FrameConverter::new(ConversionConfig::default());
        let mut raw = sample(Vector3::ZERO, Orientation::Quaternion(Quaternion::IDENTITY));
        raw.linear_velocity = Vector3::new(1.0, 1.0, 1.0);
        raw.angular_velocity = Vector3::new(1.0, 1.0, 1.0);

        let state = converter.convert(&raw);
        assert_eq!(state.linear_velocity, Vector3::new(1.0, -1.0, -1.0));
        assert_eq!(state.angular_velocity, Vector3::new(-1.0, -1.0, 1.0));
    }

    #[test]
    fn test_pair_shares_orientation_for_random_samples() {
        let mut rng = rand::rng();
        let converter = FrameConverter::new(ConversionConfig::default());
        for _ in 0..100 {
            let raw = sample(
                Vector3::new(rng.random(), rng.random(), rng.random()),
                Orientation::Quaternion(Quaternion::new(
                    rng.random_range(-1.0..1.0),
                    rng.random_range(-1.0..1.0),
                    rng.random_range(-1.0..1.0),
                    rng.random_range(0.1..1.0),
                )),
            );
            let state = converter.convert(&raw);
            let pair = transform_pair(&state, &FrameIds::default(), Stamp::now());
            assert_eq!(pair.body().transform.rotation, state.orientation);
            assert_eq!(pair.rotation().transform.rotation, state.orientation);
            assert_abs_diff_eq!(state.orientation.norm(), 1.0, epsilon = 1e-6);
        }
    }

    #[test]
    fn test_passthrough_leaves_sample_untouched() {
        let converter = FrameConverter::new(ConversionConfig::passthrough());
        let mut raw = sample(
            Vector3::new(1.0, 2.0, 3.0),
            Orientation::Quaternion(Quaternion::new(0.0, 0.0, 0.6, 0.8)),
        );
        raw.linear_velocity = Vector3::new(4.0, 5.0, 6.0);
        raw.angular_velocity = Vector3::new(7.0, 8.0, 9.0);

        let state = converter.convert(&raw);
        assert_eq!(state.position, raw.position);
        assert_eq!(state.linear_velocity, raw.linear_velocity);
        assert_eq!(state.angular_velocity, raw.angular_velocity);
        assert_abs_diff_eq!(state.orientation.z, 0.6, epsilon = 1e-12);
        assert_abs_diff_eq!(state.orientation.w, 0.8, epsilon = 1e-12);
    }

    #[test]
    fn test_default_tables_roll_differs_by_input_kind() {
        let converter = FrameConverter::new(ConversionConfig::default());
        let half = 15f64.to_radians();

        let euler = converter.convert(&sample(
            Vector3::ZERO,
            Orientation::Euler {
                degrees: Vector3::new(30.0, 0.0, 0.0),
            },
        ));
        let quat = converter.convert(&sample(
            Vector3::ZERO,
            Orientation::Quaternion(Quaternion::new(half.sin(), 0.0, 0.0, half.cos())),
        ));

        assert_abs_diff_eq!(euler.orientation_euler_degrees.x, -30.0, epsilon = 1e-9);
        assert_abs_diff_eq!(quat.orientation_euler_degrees.x, 30.0, epsilon = 1e-9);
        assert_abs_diff_eq!(euler.orientation.x, -quat.orientation.x, epsilon = 1e-12);
        assert_abs_diff_eq!(euler.orientation.w, quat.orientation.w, epsilon = 1e-12);
    }

    #[test]
    fn test_nan_sample_is_converted_not_rejected() {
        let converter = FrameConverter::new(ConversionConfig::default());
        let raw = sample(
            Vector3::new(f64::NAN, 0.0, 0.0),
            Orientation::Euler {
                degrees: Vector3::new(f64::NAN, 0.0, 0.0),
            },
        );
        let state = converter.convert(&raw);
        assert!(state.position.x.is_nan());
        assert!(state.orientation.w.is_nan());
    }
}
