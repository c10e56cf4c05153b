//! `info` command implementation.

use anyhow::{Context, Result};
use contracts::TrackerBlueprint;
use serde::Serialize;
use tracing::info;

use crate::cli::InfoArgs;
use crate::error::CliError;

/// Configuration info for JSON output
#[derive(Serialize)]
struct ConfigInfo<'a> {
    version: String,
    tracker: &'a contracts::TrackerConfig,
    device: &'a contracts::DeviceConfig,
    sinks: Vec<SinkInfo>,
}

#[derive(Serialize)]
struct SinkInfo {
    name: String,
    sink_type: String,
    queue_capacity: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    target: Option<String>,
}

/// Execute the `info` command
pub fn run_info(args: &InfoArgs) -> Result<()> {
    info!(config = %args.config.display(), "Loading configuration info");

    if !args.config.exists() {
        return Err(CliError::config_not_found(args.config.display().to_string()).into());
    }

    let blueprint = config_loader::ConfigLoader::load_from_path(&args.config)
        .with_context(|| format!("Failed to load config from {}", args.config.display()))?;

    if args.json {
        let json = serde_json::to_string_pretty(&build_config_info(&blueprint))
            .context("Failed to serialize config info")?;
        println!("{}", json);
    } else {
        print_config_info(&blueprint);
    }

    Ok(())
}

fn build_config_info(blueprint: &TrackerBlueprint) -> ConfigInfo<'_> {
    let sinks = blueprint
        .sinks
        .iter()
        .map(|s| SinkInfo {
            name: s.name.clone(),
            sink_type: format!("{:?}", s.sink_type),
            queue_capacity: s.queue_capacity,
            target: s.params.get("addr").or_else(|| s.params.get("path")).cloned(),
        })
        .collect();

    ConfigInfo {
        version: format!("{:?}", blueprint.version),
        tracker: &blueprint.tracker,
        device: &blueprint.device,
        sinks,
    }
}

fn print_config_info(blueprint: &TrackerBlueprint) {
    println!("╔══════════════════════════════════════════════════════════════╗");
    println!("║                  Headtrack Configuration                     ║");
    println!("╚══════════════════════════════════════════════════════════════╝\n");

    let tracker = &blueprint.tracker;
    println!("🧍 Tracker");
    println!("   ├─ Version: {:?}", blueprint.version);
    println!("   ├─ Max missed frames: {}", tracker.max_missed_frames);
    println!("   └─ Forward policy: {:?}", tracker.forward_policy);

    let device = &blueprint.device;
    println!("\n📷 Device");
    println!("   ├─ Color: {:?}", device.color_format);
    println!("   ├─ Depth: {:?}", device.depth_format);
    println!("   ├─ Frame rate: {} Hz", device.frame_rate_hz);
    println!(
        "   ├─ Skeleton: near_range={}, seated={}",
        device.near_range, device.seated
    );
    println!("   └─ Initial elevation: {}°", device.initial_elevation);

    println!("\n📤 Sinks ({})", blueprint.sinks.len());
    for (i, sink) in blueprint.sinks.iter().enumerate() {
        let prefix = if i == blueprint.sinks.len() - 1 { "└─" } else { "├─" };
        match sink.params.get("addr").or_else(|| sink.params.get("path")) {
            Some(target) => println!("   {} {} ({:?}) -> {}", prefix, sink.name, sink.sink_type, target),
            None => println!("   {} {} ({:?})", prefix, sink.name, sink.sink_type),
        }
    }

    println!();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_info_json() {
        let blueprint = config_loader::ConfigLoader::load_from_str(
            r#"
[[sinks]]
name = "opentrack"
sink_type = "udp"
params = { addr = "127.0.0.1:4242" }
"#,
            config_loader::ConfigFormat::Toml,
        )
        .unwrap();

        let json = serde_json::to_value(build_config_info(&blueprint)).unwrap();
        assert_eq!(json["tracker"]["max_missed_frames"], 100);
        assert_eq!(json["tracker"]["forward_policy"], "fresh_only");
        assert_eq!(json["sinks"][0]["target"], "127.0.0.1:4242");
        assert_eq!(json["device"]["color_format"], "rgb640x480_fps30");
    }
}
