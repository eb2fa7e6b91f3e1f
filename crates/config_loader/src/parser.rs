//! 配置解析模块
//!
//! 支持 TOML (主要) 和 JSON (可选) 格式。

use contracts::{BridgeBlueprint, ContractError};

/// 配置文件格式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    /// TOML 格式 (推荐)
    Toml,
    /// JSON 格式
    Json,
}

impl ConfigFormat {
    /// 从文件扩展名推断格式
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "toml" => Some(Self::Toml),
            "json" => Some(Self::Json),
            _ => None,
        }
    }
}

/// 解析 TOML 格式配置
pub fn parse_toml(content: &str) -> Result<BridgeBlueprint, ContractError> {
    toml::from_str(content).map_err(|e| ContractError::ConfigParse {
        message: format!("TOML parse error: {e}"),
        source: Some(Box::new(e)),
    })
}

/// 解析 JSON 格式配置
pub fn parse_json(content: &str) -> Result<BridgeBlueprint, ContractError> {
    serde_json::from_str(content).map_err(|e| ContractError::ConfigParse {
        message: format!("JSON parse error: {e}"),
        source: Some(Box::new(e)),
    })
}

/// 根据格式解析配置
pub fn parse(content: &str, format: ConfigFormat) -> Result<BridgeBlueprint, ContractError> {
    match format {
        ConfigFormat::Toml => parse_toml(content),
        ConfigFormat::Json => parse_json(content),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::{
        Axis, AxisMap, EulerOrder, EulerReadout, EulerSequence, InputRepresentation,
        QuaternionComposition, SignedAxis, SinkType, SourceKind, WireFormat,
    };

    #[test]
    fn test_parse_toml_full() {
        let content = r#"
[source]
kind = "mock"
rate_hz = 20.0
format = "bincode"

[conversion]
input = "euler"
position_map = ["+x", "-y", "-z"]
angular_velocity_map = ["-x", "-y", "+z"]
euler_input_map = ["-x", "-y", "+z"]
euler_sequence = { order = "xyz", convention = "extrinsic" }
euler_readout = { mode = "sequence", sequence = { order = "zyx" } }
quaternion_remap = { reference = { x = 0.0, y = 0.0, z = 0.0, w = 1.0 }, composition = "pre_multiply" }

[frames]
body = "vehicle"

[topics]
pose = "/nav/pose"

[[sinks]]
name = "log_sink"
sink_type = "log"
"#;
        let result = parse_toml(content);
        assert!(result.is_ok(), "Failed: {:?}", result.err());
        let bp = result.unwrap();
        assert_eq!(bp.source.kind, SourceKind::Mock);
        assert_eq!(bp.source.format, WireFormat::Bincode);
        assert_eq!(bp.conversion.input, InputRepresentation::Euler);
        assert_eq!(bp.conversion.position_map, AxisMap::POLAR_NED);
        assert_eq!(
            bp.conversion.euler_sequence,
            EulerSequence::extrinsic(EulerOrder::Xyz)
        );
        assert_eq!(
            bp.conversion.euler_readout,
            EulerReadout::Sequence {
                sequence: EulerSequence::intrinsic(EulerOrder::Zyx)
            }
        );
        assert_eq!(
            bp.conversion.quaternion_remap.composition,
            QuaternionComposition::PreMultiply
        );
        assert_eq!(bp.frames.body, "vehicle");
        assert_eq!(bp.frames.world, "world");
        assert_eq!(bp.topics.pose, "/nav/pose");
        assert_eq!(bp.topics.position_x, "/state/x");
        assert_eq!(bp.sinks[0].sink_type, SinkType::Log);
    }

    #[test]
    fn test_parse_json_minimal() {
        let content = r#"{
            "source": { "kind": "udp", "bind_addr": "127.0.0.1:9000" },
            "conversion": { "angular_velocity_map": ["x", "y", "z"] },
            "sinks": [{ "name": "log", "sink_type": "log" }]
        }"#;
        let result = parse_json(content);
        assert!(result.is_ok(), "Failed: {:?}", result.err());
        let bp = result.unwrap();
        assert_eq!(bp.source.bind_addr.port(), 9000);
        assert_eq!(bp.conversion.angular_velocity_map, AxisMap::IDENTITY);
        assert_eq!(
            bp.conversion.position_map.0[1],
            SignedAxis::neg(Axis::Y)
        );
    }

    #[test]
    fn test_parse_rejects_bad_axis() {
        let content = r#"
[conversion]
position_map = ["+x", "-w", "-z"]
"#;
        let err = parse_toml(content).unwrap_err();
        assert!(matches!(err, ContractError::ConfigParse { .. }));
    }

    #[test]
    fn test_parse_toml_syntax_error() {
        let content = "invalid toml [[[";
        let result = parse_toml(content);
        assert!(result.is_err());
        let err = result.unwrap_err();
        assert!(matches!(err, ContractError::ConfigParse { .. }));
    }

    #[test]
    fn test_format_from_extension() {
        assert_eq!(
            ConfigFormat::from_extension("toml"),
            Some(ConfigFormat::Toml)
        );
        assert_eq!(
            ConfigFormat::from_extension("TOML"),
            Some(ConfigFormat::Toml)
        );
        assert_eq!(
            ConfigFormat::from_extension("json"),
            Some(ConfigFormat::Json)
        );
        assert_eq!(ConfigFormat::from_extension("yaml"), None);
    }
}
