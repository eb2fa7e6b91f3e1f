//! `info` command implementation.

use anyhow::{Context, Result};
use contracts::{BridgeBlueprint, EulerReadout};
use serde::Serialize;
use tracing::info;

use crate::cli::InfoArgs;
use crate::error::ensure_config_exists;

/// Configuration info for JSON output
#[derive(Serialize)]
struct ConfigInfo {
    version: String,
    source: SourceInfo,
    conversion: ConversionInfo,
    frames: contracts::FrameIds,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    topics: Vec<TopicInfo>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    sinks: Vec<SinkInfo>,
}

#[derive(Serialize)]
struct SourceInfo {
    id: String,
    kind: String,
    bind_addr: String,
    format: String,
    rate_hz: f64,
    drop_policy: String,
}

#[derive(Serialize)]
struct ConversionInfo {
    input: String,
    position_map: String,
    angular_velocity_map: String,
    euler_input_map: String,
    euler_sequence: String,
    euler_readout: String,
    quaternion_composition: String,
}

#[derive(Serialize)]
struct TopicInfo {
    key: &'static str,
    name: String,
}

#[derive(Serialize)]
struct SinkInfo {
    name: String,
    sink_type: String,
    queue_capacity: usize,
    #[serde(skip_serializing_if = "std::collections::HashMap::is_empty")]
    params: std::collections::HashMap<String, String>,
}

/// Execute the `info` command
pub fn run_info(args: &InfoArgs) -> Result<()> {
    info!(config = %args.config.display(), "Loading configuration info");

    ensure_config_exists(&args.config)?;

    let blueprint = config_loader::ConfigLoader::load_from_path(&args.config)
        .with_context(|| format!("Failed to load config from {}", args.config.display()))?;

    if args.json {
        let info = build_config_info(&blueprint, args);
        let json =
            serde_json::to_string_pretty(&info).context("Failed to serialize config info")?;
        println!("{}", json);
    } else {
        print_config_info(&blueprint, args);
    }

    Ok(())
}

fn describe_readout(readout: &EulerReadout) -> String {
    match readout {
        EulerReadout::PerAxis { x, y, z } => format!("per_axis (x: {x}, y: {y}, z: {z})"),
        EulerReadout::Sequence { sequence } => format!("sequence ({sequence})"),
    }
}

fn build_config_info(blueprint: &BridgeBlueprint, args: &InfoArgs) -> ConfigInfo {
    let source = &blueprint.source;
    let conversion = &blueprint.conversion;

    let topics = if args.topics {
        blueprint
            .topics
            .entries()
            .into_iter()
            .map(|(key, name)| TopicInfo {
                key,
                name: name.to_string(),
            })
            .collect()
    } else {
        Vec::new()
    };

    let sinks = if args.sinks {
        blueprint
            .sinks
            .iter()
            .map(|s| SinkInfo {
                name: s.name.clone(),
                sink_type: format!("{:?}", s.sink_type),
                queue_capacity: s.queue_capacity,
                params: s.params.clone(),
            })
            .collect()
    } else {
        Vec::new()
    };

    ConfigInfo {
        version: format!("{:?}", blueprint.version),
        source: SourceInfo {
            id: source.id.clone(),
            kind: format!("{:?}", source.kind),
            bind_addr: source.bind_addr.to_string(),
            format: format!("{:?}", source.format),
            rate_hz: source.rate_hz,
            drop_policy: format!("{:?}", source.drop_policy),
        },
        conversion: ConversionInfo {
            input: conversion.input.to_string(),
            position_map: conversion.position_map.to_string(),
            angular_velocity_map: conversion.angular_velocity_map.to_string(),
            euler_input_map: conversion.euler_input_map.to_string(),
            euler_sequence: conversion.euler_sequence.to_string(),
            euler_readout: describe_readout(&conversion.euler_readout),
            quaternion_composition: format!("{:?}", conversion.quaternion_remap.composition),
        },
        frames: blueprint.frames.clone(),
        topics,
        sinks,
    }
}

fn print_config_info(blueprint: &BridgeBlueprint, args: &InfoArgs) {
    let source = &blueprint.source;
    let conversion = &blueprint.conversion;

    println!("╔══════════════════════════════════════════════════════════════╗");
    println!("║                 Unity Bridge Configuration                   ║");
    println!("╚══════════════════════════════════════════════════════════════╝\n");

    println!("📡 Source");
    println!("   ├─ Version: {:?}", blueprint.version);
    println!("   ├─ Id: {}", source.id);
    println!("   ├─ Kind: {:?}", source.kind);
    println!("   ├─ Bind: {} ({:?})", source.bind_addr, source.format);
    println!("   └─ Drop policy: {:?}", source.drop_policy);

    println!("\n🧭 Conversion");
    println!("   ├─ Input: {}", conversion.input);
    println!("   ├─ Position / linear velocity: {}", conversion.position_map);
    println!("   ├─ Angular velocity: {}", conversion.angular_velocity_map);
    println!("   ├─ Euler input: {} ({})", conversion.euler_input_map, conversion.euler_sequence);
    println!("   ├─ Euler readout: {}", describe_readout(&conversion.euler_readout));
    println!(
        "   └─ Quaternion remap: {:?}",
        conversion.quaternion_remap.composition
    );

    let frames = &blueprint.frames;
    println!("\n🌐 Frames");
    println!("   ├─ {} -> {}", frames.world, frames.body);
    println!("   └─ {} -> {}", frames.rotation_anchor, frames.vehicle_rotation);

    if args.topics {
        let entries = blueprint.topics.entries();
        println!("\n📨 Topics ({})", entries.len());
        for (i, (key, name)) in entries.iter().enumerate() {
            let prefix = if i == entries.len() - 1 { "└─" } else { "├─" };
            println!("   {} {:<18} {}", prefix, key, name);
        }
    }

    if !blueprint.sinks.is_empty() {
        println!("\n📤 Sinks ({})", blueprint.sinks.len());
        for (i, sink) in blueprint.sinks.iter().enumerate() {
            let is_last = i == blueprint.sinks.len() - 1;
            let prefix = if is_last { "└─" } else { "├─" };
            if args.sinks {
                println!(
                    "   {} {} ({:?}, queue {}) {:?}",
                    prefix, sink.name, sink.sink_type, sink.queue_capacity, sink.params
                );
            } else {
                println!("   {} {} ({:?})", prefix, sink.name, sink.sink_type);
            }
        }
    }

    println!();
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn args(topics: bool, sinks: bool) -> InfoArgs {
        InfoArgs {
            config: PathBuf::from("config.toml"),
            json: true,
            topics,
            sinks,
        }
    }

    #[test]
    fn test_topics_listed_on_request() {
        let blueprint = BridgeBlueprint::default();

        let info = build_config_info(&blueprint, &args(true, false));
        assert_eq!(info.topics.len(), 13);
        assert_eq!(info.topics[0].key, "position_x");
        assert_eq!(info.topics[0].name, "/state/x");
        assert!(info.sinks.is_empty());

        let info = build_config_info(&blueprint, &args(false, true));
        assert!(info.topics.is_empty());
        assert_eq!(info.sinks.len(), 1);
    }

    #[test]
    fn test_info_json_describes_default_conversion() {
        let info = build_config_info(&BridgeBlueprint::default(), &args(false, false));
        let json = serde_json::to_value(&info).unwrap();

        assert_eq!(json["conversion"]["position_map"], "[+x, -y, -z]");
        assert_eq!(json["conversion"]["input"], "quaternion");
        assert!(json.get("topics").is_none());
    }
}
