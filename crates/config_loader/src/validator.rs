//! 配置校验模块
//!
//! 校验规则：
//! - 轴映射表必须是置换 (每个轴恰好出现一次)
//! - per_axis 读出顺序必须以对应轴开头
//! - 参考四元数有限且非零
//! - frame id 非空
//! - topic 非空且唯一, 文件名形式 (`file_stem`) 也唯一
//! - mock 源 rate_hz > 0 且周期可表示为非零 Duration
//! - sink 名称非空且唯一

use std::collections::{HashMap, HashSet};

use contracts::{
    Axis, AxisMap, BridgeBlueprint, ContractError, EulerOrder, EulerReadout, SourceKind,
};

/// 校验 BridgeBlueprint 配置
///
/// 返回第一个遇到的错误，或 Ok(())。
pub fn validate(blueprint: &BridgeBlueprint) -> Result<(), ContractError> {
    validate_source(blueprint)?;
    validate_conversion(blueprint)?;
    validate_frames(blueprint)?;
    validate_topics(blueprint)?;
    validate_sinks(blueprint)?;
    Ok(())
}

/// 校验输入源配置
fn validate_source(blueprint: &BridgeBlueprint) -> Result<(), ContractError> {
    let source = &blueprint.source;

    if source.id.trim().is_empty() {
        return Err(ContractError::config_validation(
            "source.id",
            "source id cannot be empty",
        ));
    }

    if source.kind == SourceKind::Mock && source.sample_period().is_none() {
        return Err(ContractError::config_validation(
            "source.rate_hz",
            format!(
                "rate_hz must be > 0 with a representable period, got {}",
                source.rate_hz
            ),
        ));
    }

    Ok(())
}

/// 校验坐标转换配置
fn validate_conversion(blueprint: &BridgeBlueprint) -> Result<(), ContractError> {
    let conversion = &blueprint.conversion;

    validate_axis_map("conversion.position_map", &conversion.position_map)?;
    validate_axis_map(
        "conversion.angular_velocity_map",
        &conversion.angular_velocity_map,
    )?;
    validate_axis_map("conversion.euler_input_map", &conversion.euler_input_map)?;

    // per_axis 读出取各顺序的第一个角，所以第一个轴必须是被报告的轴
    if let EulerReadout::PerAxis { x, y, z } = conversion.euler_readout {
        validate_readout_order("conversion.euler_readout.x", Axis::X, x)?;
        validate_readout_order("conversion.euler_readout.y", Axis::Y, y)?;
        validate_readout_order("conversion.euler_readout.z", Axis::Z, z)?;
    }

    let q = conversion.quaternion_remap.reference;
    let norm = q.norm();
    if !norm.is_finite() || norm < 1e-9 {
        return Err(ContractError::config_validation(
            "conversion.quaternion_remap.reference",
            format!("reference quaternion must be finite and non-zero, got norm {norm}"),
        ));
    }

    Ok(())
}

fn validate_axis_map(field: &str, map: &AxisMap) -> Result<(), ContractError> {
    if !map.is_permutation() {
        return Err(ContractError::config_validation(
            field,
            format!("axis map {map} must use each of x, y, z exactly once"),
        ));
    }
    Ok(())
}

fn validate_readout_order(field: &str, axis: Axis, order: EulerOrder) -> Result<(), ContractError> {
    if order.first() != axis {
        return Err(ContractError::config_validation(
            field,
            format!("order '{order}' does not start with the reported axis"),
        ));
    }
    Ok(())
}

/// 校验 frame id
fn validate_frames(blueprint: &BridgeBlueprint) -> Result<(), ContractError> {
    let frames = &blueprint.frames;
    let entries = [
        ("frames.world", &frames.world),
        ("frames.body", &frames.body),
        ("frames.rotation_anchor", &frames.rotation_anchor),
        ("frames.vehicle_rotation", &frames.vehicle_rotation),
    ];

    for (field, id) in entries {
        if id.trim().is_empty() {
            return Err(ContractError::config_validation(
                field,
                "frame id cannot be empty",
            ));
        }
    }

    if frames.world == frames.body {
        return Err(ContractError::config_validation(
            "frames.body",
            "body frame must differ from world frame",
        ));
    }
    if frames.rotation_anchor == frames.vehicle_rotation {
        return Err(ContractError::config_validation(
            "frames.vehicle_rotation",
            "vehicle_rotation frame must differ from rotation_anchor frame",
        ));
    }

    Ok(())
}

/// 校验 topic 名称唯一性
///
/// file sink 以 `file_stem()` 命名文件, `/a/b` 与 `a_b` 会落到同一文件。
fn validate_topics(blueprint: &BridgeBlueprint) -> Result<(), ContractError> {
    let mut seen = HashSet::new();
    let mut stems: HashMap<String, &str> = HashMap::new();
    for (key, topic) in blueprint.topics.entries() {
        if topic.trim().is_empty() {
            return Err(ContractError::config_validation(
                format!("topics.{key}"),
                "topic name cannot be empty",
            ));
        }
        if !seen.insert(topic.as_str()) {
            return Err(ContractError::config_validation(
                format!("topics.{key}"),
                format!("duplicate topic '{topic}'"),
            ));
        }
        if let Some(other) = stems.insert(topic.file_stem(), topic.as_str()) {
            return Err(ContractError::config_validation(
                format!("topics.{key}"),
                format!(
                    "topic '{topic}' shares file name '{}' with '{other}'",
                    topic.file_stem()
                ),
            ));
        }
    }
    Ok(())
}

/// 校验 sink 配置
fn validate_sinks(blueprint: &BridgeBlueprint) -> Result<(), ContractError> {
    let mut seen = HashSet::new();
    for (idx, sink) in blueprint.sinks.iter().enumerate() {
        if sink.name.is_empty() {
            return Err(ContractError::config_validation(
                format!("sinks[{}].name", idx),
                "sink name cannot be empty",
            ));
        }
        if !seen.insert(sink.name.as_str()) {
            return Err(ContractError::config_validation(
                format!("sinks[name={}]", sink.name),
                "duplicate sink name",
            ));
        }
        if sink.queue_capacity == 0 {
            return Err(ContractError::config_validation(
                format!("sinks[{}].queue_capacity", idx),
                "queue_capacity must be > 0",
            ));
        }
    }
    Ok(())
}
