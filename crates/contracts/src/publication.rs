//! Publication - StatePublisher output
//!
//! One full fan-out rendered into topic messages.

use serde::{Deserialize, Serialize};

use crate::{
    ConvertedState, Quaternion, SensorHealthFlags, Stamp, TopicName, TransformPair,
    TransformStamped, Vector3,
};

/// Number of messages in every publication
pub const PUBLICATION_MESSAGE_COUNT: usize = 14;

/// Pose message: position + orientation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Pose {
    pub position: Vector3,
    pub orientation: Quaternion,
}

/// Payload carried on a single channel
///
/// Externally tagged (`{"float64": 1.5}`) so the same form decodes from
/// both JSON and bincode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessagePayload {
    Float64(f64),
    Bool(bool),
    Vector3(Vector3),
    Pose(Pose),
    /// Transform-tree broadcast
    Tf(Vec<TransformStamped>),
}

/// A message addressed to one channel
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopicMessage {
    pub topic: TopicName,
    pub payload: MessagePayload,
}

/// Channel names for every output
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TopicMap {
    pub position_x: TopicName,
    pub position_y: TopicName,
    pub position_z: TopicName,
    pub theta_x: TopicName,
    pub theta_y: TopicName,
    pub theta_z: TopicName,
    pub linear_velocity: TopicName,
    pub angular_velocity: TopicName,
    pub pose: TopicName,
    pub imu_status: TopicName,
    pub depth_status: TopicName,
    pub dvl_status: TopicName,
    pub transforms: TopicName,
}

impl Default for TopicMap {
    fn default() -> Self {
        Self {
            position_x: "/state/x".into(),
            position_y: "/state/y".into(),
            position_z: "/state/z".into(),
            theta_x: "/state/theta/x".into(),
            theta_y: "/state/theta/y".into(),
            theta_z: "/state/theta/z".into(),
            linear_velocity: "/state/linear_velocity".into(),
            angular_velocity: "/state/angular_velocity".into(),
            pose: "/state/pose".into(),
            imu_status: "/sensors/imu/status".into(),
            depth_status: "/sensors/depth/status".into(),
            dvl_status: "/sensors/dvl/status".into(),
            transforms: "/tf".into(),
        }
    }
}

impl TopicMap {
    /// All topic names in publication order, paired with their config key
    pub fn entries(&self) -> [(&'static str, &TopicName); PUBLICATION_MESSAGE_COUNT - 1] {
        [
            ("position_x", &self.position_x),
            ("position_y", &self.position_y),
            ("position_z", &self.position_z),
            ("theta_x", &self.theta_x),
            ("theta_y", &self.theta_y),
            ("theta_z", &self.theta_z),
            ("linear_velocity", &self.linear_velocity),
            ("angular_velocity", &self.angular_velocity),
            ("pose", &self.pose),
            ("imu_status", &self.imu_status),
            ("depth_status", &self.depth_status),
            ("dvl_status", &self.dvl_status),
            ("transforms", &self.transforms),
        ]
    }
}

/// One complete fan-out for one sample
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Publication {
    /// Publication sequence number (monotonically increasing)
    pub sequence: u64,

    /// Broadcast stamp, shared with the transform pair
    pub stamp: Stamp,

    /// Channel messages in fixed order
    pub messages: Vec<TopicMessage>,
}

impl Publication {
    /// Render the fixed channel set
    ///
    /// Order: position x/y/z, theta x/y/z, linear velocity, angular velocity,
    /// pose, health imu/depth/dvl, transform pair.
    pub fn assemble(
        sequence: u64,
        state: &ConvertedState,
        health: SensorHealthFlags,
        transforms: &TransformPair,
        topics: &TopicMap,
    ) -> Self {
        let msg = |topic: &TopicName, payload| TopicMessage {
            topic: topic.clone(),
            payload,
        };

        let messages = vec![
            msg(&topics.position_x, MessagePayload::Float64(state.position.x)),
            msg(&topics.position_y, MessagePayload::Float64(state.position.y)),
            msg(&topics.position_z, MessagePayload::Float64(state.position.z)),
            msg(
                &topics.theta_x,
                MessagePayload::Float64(state.orientation_euler_degrees.x),
            ),
            msg(
                &topics.theta_y,
                MessagePayload::Float64(state.orientation_euler_degrees.y),
            ),
            msg(
                &topics.theta_z,
                MessagePayload::Float64(state.orientation_euler_degrees.z),
            ),
            msg(
                &topics.linear_velocity,
                MessagePayload::Vector3(state.linear_velocity),
            ),
            msg(
                &topics.angular_velocity,
                MessagePayload::Vector3(state.angular_velocity),
            ),
            msg(
                &topics.pose,
                MessagePayload::Pose(Pose {
                    position: state.position,
                    orientation: state.orientation,
                }),
            ),
            msg(&topics.imu_status, MessagePayload::Bool(health.imu)),
            msg(&topics.depth_status, MessagePayload::Bool(health.depth)),
            msg(&topics.dvl_status, MessagePayload::Bool(health.dvl)),
            msg(&topics.transforms, MessagePayload::Tf(transforms.to_vec())),
        ];

        Self {
            sequence,
            stamp: transforms.stamp(),
            messages,
        }
    }

    /// Find the message published on `topic`
    pub fn message(&self, topic: &str) -> Option<&MessagePayload> {
        self.messages
            .iter()
            .find(|m| m.topic == topic)
            .map(|m| &m.payload)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::FrameIds;

    fn sample_state() -> ConvertedState {
        ConvertedState {
            position: Vector3::new(1.0, -2.0, -3.0),
            orientation: Quaternion::IDENTITY,
            orientation_euler_degrees: Vector3::new(0.0, 0.0, 90.0),
            linear_velocity: Vector3::new(0.5, 0.0, 0.0),
            angular_velocity: Vector3::ZERO,
        }
    }

    #[test]
    fn test_assemble_emits_full_channel_set() {
        let state = sample_state();
        let stamp = Stamp { sec: 3, nanosec: 4 };
        let pair = TransformPair::new(&FrameIds::default(), stamp, state.position, state.orientation);
        let topics = TopicMap::default();

        let publication =
            Publication::assemble(9, &state, SensorHealthFlags::fresh(), &pair, &topics);

        assert_eq!(publication.sequence, 9);
        assert_eq!(publication.stamp, stamp);
        assert_eq!(publication.messages.len(), PUBLICATION_MESSAGE_COUNT);
        assert_eq!(
            publication.message("/state/y"),
            Some(&MessagePayload::Float64(-2.0))
        );
        assert_eq!(
            publication.message("/state/theta/z"),
            Some(&MessagePayload::Float64(90.0))
        );
        for topic in ["/sensors/imu/status", "/sensors/depth/status", "/sensors/dvl/status"] {
            assert_eq!(publication.message(topic), Some(&MessagePayload::Bool(true)));
        }
        match publication.message("/tf") {
            Some(MessagePayload::Tf(transforms)) => assert_eq!(transforms.len(), 2),
            other => panic!("expected tf payload, got {:?}", other),
        }
    }

    #[test]
    fn test_topic_entries_are_unique_by_default() {
        let topics = TopicMap::default();
        let mut names: Vec<&str> = topics.entries().iter().map(|(_, t)| t.as_str()).collect();
        names.sort();
        names.dedup();
        assert_eq!(names.len(), PUBLICATION_MESSAGE_COUNT - 1);
    }

    #[test]
    fn test_payload_json_shape() {
        let msg = TopicMessage {
            topic: "/state/x".into(),
            payload: MessagePayload::Float64(1.5),
        };
        let json = serde_json::to_string(&msg).unwrap();
        assert_eq!(json, r#"{"topic":"/state/x","payload":{"float64":1.5}}"#);
    }
}
