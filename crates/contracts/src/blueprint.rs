//! BridgeBlueprint - Config Loader output
//!
//! Describes the full bridge deployment: inbound source, frame conversion,
//! output channel names, transform frames and sink routing.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::net::SocketAddr;
use std::time::Duration;

use crate::{ConversionConfig, FrameIds, TopicMap};

/// Config version
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ConfigVersion {
    #[default]
    V1,
}

/// Complete bridge configuration blueprint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BridgeBlueprint {
    /// Config version
    #[serde(default)]
    pub version: ConfigVersion,

    /// Inbound state sample source
    #[serde(default)]
    pub source: SourceConfig,

    /// Frame conversion tables and orders
    #[serde(default)]
    pub conversion: ConversionConfig,

    /// Output channel names
    #[serde(default)]
    pub topics: TopicMap,

    /// Transform tree frame identifiers
    #[serde(default)]
    pub frames: FrameIds,

    /// Output routing
    #[serde(default)]
    pub sinks: Vec<SinkConfig>,
}

impl Default for BridgeBlueprint {
    fn default() -> Self {
        Self {
            version: ConfigVersion::V1,
            source: SourceConfig::default(),
            conversion: ConversionConfig::default(),
            topics: TopicMap::default(),
            frames: FrameIds::default(),
            sinks: vec![SinkConfig::log("log")],
        }
    }
}

/// State source kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    /// Samples pushed by the simulator over UDP
    #[default]
    Udp,
    /// Synthetic trajectory, no simulator required
    Mock,
}

/// Datagram encoding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WireFormat {
    /// JSON (human-readable, larger)
    #[default]
    Json,
    /// Bincode (binary, compact)
    Bincode,
}

/// Inbound source configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    /// Source kind
    pub kind: SourceKind,

    /// Source identifier (logging/metrics)
    pub id: String,

    /// UDP bind address
    pub bind_addr: SocketAddr,

    /// UDP datagram encoding
    pub format: WireFormat,

    /// Mock sample rate (Hz), must be > 0
    pub rate_hz: f64,

    /// Behaviour when the depth-1 inbound queue is occupied
    pub drop_policy: DropPolicy,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            kind: SourceKind::Udp,
            id: "unity_state".to_string(),
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 10100)),
            format: WireFormat::Json,
            rate_hz: 50.0,
            drop_policy: DropPolicy::DropOldest,
        }
    }
}

impl SourceConfig {
    /// Mock tick period, see [`sample_period`]
    pub fn sample_period(&self) -> Option<Duration> {
        sample_period(self.rate_hz)
    }
}

/// Period of a `rate_hz` ticker
///
/// `None` unless the period is a finite, non-zero `Duration`.
pub fn sample_period(rate_hz: f64) -> Option<Duration> {
    if !(rate_hz.is_finite() && rate_hz > 0.0) {
        return None;
    }
    Duration::try_from_secs_f64(rate_hz.recip())
        .ok()
        .filter(|period| !period.is_zero())
}

/// Drop policy when the inbound queue is full
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DropPolicy {
    /// Replace the queued sample (most-recent-wins)
    #[default]
    DropOldest,
    /// Keep the queued sample, discard the incoming one
    DropNewest,
}

/// Sink output configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SinkConfig {
    /// Sink name
    pub name: String,

    /// Sink type
    pub sink_type: SinkType,

    /// Queue capacity (publications)
    #[serde(default = "default_queue_capacity")]
    pub queue_capacity: usize,

    /// Type-specific parameters
    #[serde(default)]
    pub params: HashMap<String, String>,
}

impl SinkConfig {
    /// Log sink with default queue
    pub fn log(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            sink_type: SinkType::Log,
            queue_capacity: default_queue_capacity(),
            params: HashMap::new(),
        }
    }
}

fn default_queue_capacity() -> usize {
    16
}

/// Sink type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SinkType {
    /// Structured log output
    Log,
    /// JSON lines per topic
    File,
    /// UDP datagrams
    Network,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blueprint_defaults_from_empty_json() {
        let blueprint: BridgeBlueprint = serde_json::from_str("{}").unwrap();
        assert_eq!(blueprint.source.kind, SourceKind::Udp);
        assert_eq!(blueprint.source.drop_policy, DropPolicy::DropOldest);
        assert_eq!(blueprint.conversion, ConversionConfig::default());
        assert_eq!(blueprint.frames.world, "world");
        assert!(blueprint.sinks.is_empty());
    }

    #[test]
    fn test_partial_source_keeps_other_defaults() {
        let blueprint: BridgeBlueprint =
            serde_json::from_str(r#"{"source": {"kind": "mock", "rate_hz": 10.0}}"#).unwrap();
        assert_eq!(blueprint.source.kind, SourceKind::Mock);
        assert_eq!(blueprint.source.rate_hz, 10.0);
        assert_eq!(blueprint.source.id, "unity_state");
        assert_eq!(blueprint.source.bind_addr.port(), 10100);
    }

    #[test]
    fn test_sample_period_bounds() {
        assert_eq!(sample_period(50.0), Some(Duration::from_millis(20)));
        assert_eq!(sample_period(0.0), None);
        assert_eq!(sample_period(-1.0), None);
        assert_eq!(sample_period(f64::NAN), None);
        assert_eq!(sample_period(f64::INFINITY), None);
        // period overflows Duration
        assert_eq!(sample_period(1e-300), None);
        // period rounds to zero
        assert_eq!(sample_period(1e300), None);
    }

    #[test]
    fn test_default_blueprint_has_log_sink() {
        let blueprint = BridgeBlueprint::default();
        assert_eq!(blueprint.sinks.len(), 1);
        assert_eq!(blueprint.sinks[0].sink_type, SinkType::Log);
    }
}
