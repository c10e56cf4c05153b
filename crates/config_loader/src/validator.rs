//! 配置校验模块
//!
//! 校验规则：
//! - 字段级约束 (`validator` derive)
//! - 至少一个 sink，且 sink 名称唯一
//! - udp sink 必须有可解析的 addr
//! - file sink 必须有 path
//! - 设备格式不能为 undefined
//! - 帧率必须为有限值且在 (0, 1000] Hz 内

use std::collections::HashSet;
use std::net::SocketAddr;

use contracts::{
    ColorFormat, ContractError, DepthFormat, SinkConfig, SinkType, TrackerBlueprint,
    MAX_FRAME_RATE_HZ,
};
use validator::Validate;

const UDP_FORMATS: &[&str] = &["opentrack", "json", "bincode"];

/// 校验 TrackerBlueprint 配置
///
/// 返回第一个遇到的错误，或 Ok(())。
pub fn validate(blueprint: &TrackerBlueprint) -> Result<(), ContractError> {
    validate_fields(blueprint)?;
    validate_device(blueprint)?;
    validate_sink_names(blueprint)?;
    for (idx, sink) in blueprint.sinks.iter().enumerate() {
        validate_sink_params(idx, sink)?;
    }
    Ok(())
}

/// 字段级约束
fn validate_fields(blueprint: &TrackerBlueprint) -> Result<(), ContractError> {
    blueprint.validate().map_err(|errors| {
        let field = errors
            .errors()
            .keys()
            .next()
            .map(|k| k.to_string())
            .unwrap_or_else(|| "blueprint".to_string());
        ContractError::config_validation(field, errors.to_string())
    })
}

fn validate_device(blueprint: &TrackerBlueprint) -> Result<(), ContractError> {
    let device = &blueprint.device;
    if device.color_format == ColorFormat::Undefined {
        return Err(ContractError::config_validation(
            "device.color_format",
            "color format cannot be undefined",
        ));
    }
    if device.depth_format == DepthFormat::Undefined {
        return Err(ContractError::config_validation(
            "device.depth_format",
            "depth format cannot be undefined",
        ));
    }
    let rate = device.frame_rate_hz;
    if !rate.is_finite() || rate <= 0.0 || rate > MAX_FRAME_RATE_HZ {
        return Err(ContractError::config_validation(
            "device.frame_rate_hz",
            format!("frame rate {rate} outside (0, {MAX_FRAME_RATE_HZ}] Hz"),
        ));
    }
    Ok(())
}

/// 校验 sink 名称非空且唯一
fn validate_sink_names(blueprint: &TrackerBlueprint) -> Result<(), ContractError> {
    if blueprint.sinks.is_empty() {
        return Err(ContractError::config_validation(
            "sinks",
            "at least one sink is required",
        ));
    }

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
    }
    Ok(())
}

/// 校验 sink 类型相关参数
fn validate_sink_params(idx: usize, sink: &SinkConfig) -> Result<(), ContractError> {
    let field = |key: &str| format!("sinks[{}].params.{}", idx, key);

    match sink.sink_type {
        SinkType::Log => Ok(()),
        SinkType::Udp => {
            let addr = sink.params.get("addr").ok_or_else(|| {
                ContractError::config_validation(field("addr"), "udp sink requires 'addr'")
            })?;
            addr.parse::<SocketAddr>().map_err(|e| {
                ContractError::config_validation(
                    field("addr"),
                    format!("invalid address '{addr}': {e}"),
                )
            })?;
            if let Some(format) = sink.params.get("format") {
                if !UDP_FORMATS.contains(&format.as_str()) {
                    return Err(ContractError::config_validation(
                        field("format"),
                        format!("unknown format '{format}', expected one of {UDP_FORMATS:?}"),
                    ));
                }
            }
            Ok(())
        }
        SinkType::File => match sink.params.get("path") {
            Some(path) if !path.is_empty() => Ok(()),
            _ => Err(ContractError::config_validation(
                field("path"),
                "file sink requires 'path'",
            )),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::{
        ConfigVersion, DeviceConfig, TrackerConfig, DEFAULT_SINK_QUEUE_CAPACITY,
    };
    use std::collections::HashMap;

    fn sink(name: &str, sink_type: SinkType, params: &[(&str, &str)]) -> SinkConfig {
        SinkConfig {
            name: name.into(),
            sink_type,
            queue_capacity: DEFAULT_SINK_QUEUE_CAPACITY,
            params: params
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect::<HashMap<_, _>>(),
        }
    }

    fn minimal_blueprint() -> TrackerBlueprint {
        TrackerBlueprint {
            version: ConfigVersion::V1,
            tracker: TrackerConfig::default(),
            device: DeviceConfig::default(),
            sinks: vec![sink("log", SinkType::Log, &[])],
        }
    }

    fn error_of(bp: &TrackerBlueprint) -> String {
        validate(bp).unwrap_err().to_string()
    }

    #[test]
    fn test_valid_config() {
        let mut bp = minimal_blueprint();
        bp.sinks.push(sink("udp", SinkType::Udp, &[("addr", "127.0.0.1:4242")]));
        bp.sinks.push(sink("file", SinkType::File, &[("path", "poses.jsonl")]));
        assert!(validate(&bp).is_ok());
    }

    #[test]
    fn test_zero_max_missed_frames() {
        let mut bp = minimal_blueprint();
        bp.tracker.max_missed_frames = 0;
        let err = error_of(&bp);
        assert!(err.contains("max_missed_frames"), "got: {err}");
    }

    #[test]
    fn test_elevation_out_of_range() {
        let mut bp = minimal_blueprint();
        bp.device.initial_elevation = 40;
        let err = error_of(&bp);
        assert!(err.contains("initial_elevation"), "got: {err}");
    }

    #[test]
    fn test_undefined_format() {
        let mut bp = minimal_blueprint();
        bp.device.depth_format = DepthFormat::Undefined;
        let err = error_of(&bp);
        assert!(err.contains("depth format cannot be undefined"), "got: {err}");
    }

    #[test]
    fn test_frame_rate_must_be_finite_and_bounded() {
        for rate in [f64::INFINITY, f64::NAN, 1e12, 0.0, -30.0] {
            let mut bp = minimal_blueprint();
            bp.device.frame_rate_hz = rate;
            let err = error_of(&bp);
            assert!(err.contains("frame_rate_hz"), "rate {rate}, got: {err}");
        }

        let mut bp = minimal_blueprint();
        bp.device.frame_rate_hz = MAX_FRAME_RATE_HZ;
        assert!(validate(&bp).is_ok());
    }

    #[test]
    fn test_no_sinks() {
        let mut bp = minimal_blueprint();
        bp.sinks.clear();
        let err = error_of(&bp);
        assert!(err.contains("at least one sink"), "got: {err}");
    }

    #[test]
    fn test_duplicate_sink_name() {
        let mut bp = minimal_blueprint();
        bp.sinks.push(bp.sinks[0].clone());
        let err = error_of(&bp);
        assert!(err.contains("duplicate sink name"), "got: {err}");
    }

    #[test]
    fn test_empty_sink_name() {
        let mut bp = minimal_blueprint();
        bp.sinks[0].name = String::new();
        assert!(validate(&bp).is_err());
    }

    #[test]
    fn test_udp_addr_checks() {
        let mut bp = minimal_blueprint();
        bp.sinks = vec![sink("udp", SinkType::Udp, &[])];
        assert!(error_of(&bp).contains("requires 'addr'"));

        bp.sinks = vec![sink("udp", SinkType::Udp, &[("addr", "localhost")])];
        assert!(error_of(&bp).contains("invalid address"));

        bp.sinks = vec![sink(
            "udp",
            SinkType::Udp,
            &[("addr", "127.0.0.1:4242"), ("format", "xml")],
        )];
        assert!(error_of(&bp).contains("unknown format"));
    }

    #[test]
    fn test_file_path_required() {
        let mut bp = minimal_blueprint();
        bp.sinks = vec![sink("file", SinkType::File, &[("path", "")])];
        let err = error_of(&bp);
        assert!(err.contains("requires 'path'"), "got: {err}");
    }
}
