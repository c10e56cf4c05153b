//! `validate` command implementation.

use std::path::Path;

use anyhow::{Context, Result};
use contracts::{ForwardPolicy, SinkType, TrackerBlueprint};
use serde::Serialize;
use tracing::info;

use crate::cli::ValidateArgs;
use crate::error::CliError;

/// Validation result for JSON output
#[derive(Serialize)]
struct ValidationResult {
    valid: bool,
    config_path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    warnings: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    summary: Option<ConfigSummary>,
}

#[derive(Serialize)]
struct ConfigSummary {
    version: String,
    max_missed_frames: u64,
    forward_policy: ForwardPolicy,
    sink_count: usize,
}

/// Execute the `validate` command
pub fn run_validate(args: &ValidateArgs) -> Result<()> {
    info!(config = %args.config.display(), "Validating configuration");

    let result = validate_config(&args.config);

    if args.json {
        let json = serde_json::to_string_pretty(&result)
            .context("Failed to serialize validation result")?;
        println!("{}", json);
    } else {
        print_validation_result(&result);
    }

    match result.error {
        None => Ok(()),
        Some(error) => Err(CliError::config_validation(error).into()),
    }
}

fn validate_config(path: &Path) -> ValidationResult {
    let config_path = path.display().to_string();

    if !path.exists() {
        return ValidationResult {
            valid: false,
            error: Some(CliError::config_not_found(&config_path).to_string()),
            config_path,
            warnings: None,
            summary: None,
        };
    }

    match config_loader::ConfigLoader::load_from_path(path) {
        Ok(blueprint) => {
            let warnings = collect_warnings(&blueprint);
            ValidationResult {
                valid: true,
                config_path,
                error: None,
                warnings: (!warnings.is_empty()).then_some(warnings),
                summary: Some(ConfigSummary {
                    version: format!("{:?}", blueprint.version),
                    max_missed_frames: blueprint.tracker.max_missed_frames,
                    forward_policy: blueprint.tracker.forward_policy,
                    sink_count: blueprint.sinks.len(),
                }),
            }
        }
        Err(e) => ValidationResult {
            valid: false,
            config_path,
            error: Some(e.to_string()),
            warnings: None,
            summary: None,
        },
    }
}

/// Collect configuration warnings (non-fatal issues)
fn collect_warnings(blueprint: &TrackerBlueprint) -> Vec<String> {
    let mut warnings = Vec::new();

    if blueprint
        .sinks
        .iter()
        .all(|sink| sink.sink_type == SinkType::Log)
    {
        warnings.push("Only log sinks configured - poses are not streamed anywhere".to_string());
    }

    if blueprint.device.frame_rate_hz > 30.0 {
        warnings.push(format!(
            "device.frame_rate_hz = {} exceeds the 30 Hz the sensor delivers",
            blueprint.device.frame_rate_hz
        ));
    }

    if blueprint.tracker.max_missed_frames < 10 {
        warnings.push(format!(
            "tracker.max_missed_frames = {} evicts sessions after a brief occlusion",
            blueprint.tracker.max_missed_frames
        ));
    }

    warnings
}

fn print_validation_result(result: &ValidationResult) {
    if result.valid {
        println!("✓ Configuration is valid: {}", result.config_path);

        if let Some(ref summary) = result.summary {
            println!("\n  Version: {}", summary.version);
            println!("  Max missed frames: {}", summary.max_missed_frames);
            println!("  Forward policy: {:?}", summary.forward_policy);
            println!("  Sinks: {}", summary.sink_count);
        }

        if let Some(ref warnings) = result.warnings {
            println!("\n⚠ Warnings:");
            for warning in warnings {
                println!("  - {}", warning);
            }
        }
    } else {
        println!("✗ Configuration is invalid: {}", result.config_path);
        if let Some(ref error) = result.error {
            println!("\n  Error: {}", error);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_valid_config_with_warning() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("headtrack.toml");
        std::fs::write(
            &path,
            "[[sinks]]\nname = \"console\"\nsink_type = \"log\"\n",
        )
        .unwrap();

        let result = validate_config(&path);
        assert!(result.valid);
        assert_eq!(result.summary.unwrap().max_missed_frames, 100);
        assert_eq!(result.warnings.unwrap().len(), 1);
    }

    #[test]
    fn test_invalid_config() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("headtrack.toml");
        std::fs::write(&path, "[tracker]\nmax_missed_frames = 0\n\n[[sinks]]\nname = \"a\"\nsink_type = \"log\"\n").unwrap();

        let result = validate_config(&path);
        assert!(!result.valid);
        assert!(result.error.unwrap().contains("max_missed_frames"));
    }

    #[test]
    fn test_missing_file() {
        let result = validate_config(Path::new("/nonexistent/headtrack.toml"));
        assert!(!result.valid);
        assert!(result.error.unwrap().contains("not found"));
    }
}
