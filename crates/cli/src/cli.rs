//! CLI argument definitions using clap.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// headtrack - skeleton-driven head pose tracker
#[derive(Parser, Debug)]
#[command(
    name = "headtrack",
    author,
    version,
    about = "Skeleton-driven 6-DOF head tracker",
    long_about = "Tracks the head pose of people seen by a depth sensor.\n\n\
                  Keeps one tracking session per skeleton, estimates the head \n\
                  rotation of the first tracked person and streams it to the \n\
                  configured sinks (log, UDP/OpenTrack, file)."
)]
pub struct Cli {
    /// Increase logging verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true, env = "HEADTRACK_VERBOSE")]
    pub verbose: u8,

    /// Suppress all output except warnings and errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Log output format
    #[arg(
        long,
        value_enum,
        default_value = "pretty",
        global = true,
        env = "HEADTRACK_LOG_FORMAT"
    )]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the tracker against the simulated device
    Run(RunArgs),

    /// Validate configuration file without running
    Validate(ValidateArgs),

    /// Display configuration information
    Info(InfoArgs),
}

/// Arguments for the `run` command
#[derive(Parser, Debug, Clone)]
pub struct RunArgs {
    /// Path to configuration file (TOML or JSON)
    #[arg(
        short,
        long,
        default_value = "headtrack.toml",
        env = "HEADTRACK_CONFIG"
    )]
    pub config: PathBuf,

    /// Stop after this many bundles (0 = unlimited)
    #[arg(long, default_value = "0", env = "HEADTRACK_MAX_FRAMES")]
    pub max_frames: u64,

    /// Stop after this many seconds (0 = no timeout)
    #[arg(long, default_value = "0", env = "HEADTRACK_TIMEOUT")]
    pub timeout: u64,

    /// Tilt the sensor head by this many degrees after start
    #[arg(long, default_value = "0", allow_hyphen_values = true)]
    pub tilt: i32,

    /// Metrics server port (0 = disabled)
    #[arg(long, default_value = "0", env = "HEADTRACK_METRICS_PORT")]
    pub metrics_port: u16,

    /// People in view of the simulated device
    #[arg(long, default_value = "1", env = "HEADTRACK_SIMULATE_SUBJECTS")]
    pub simulate_subjects: usize,
}

/// Arguments for the `validate` command
#[derive(Parser, Debug)]
pub struct ValidateArgs {
    /// Path to configuration file to validate
    #[arg(short, long, default_value = "headtrack.toml")]
    pub config: PathBuf,

    /// Output validation result as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `info` command
#[derive(Parser, Debug)]
pub struct InfoArgs {
    /// Path to configuration file
    #[arg(short, long, default_value = "headtrack.toml")]
    pub config: PathBuf,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// Log output format
#[derive(ValueEnum, Clone, Copy, Debug, Default)]
pub enum LogFormat {
    /// JSON structured logging
    Json,
    /// Human-readable pretty format
    #[default]
    Pretty,
    /// Compact single-line format
    Compact,
}

impl From<LogFormat> for observability::LogFormat {
    fn from(format: LogFormat) -> Self {
        match format {
            LogFormat::Json => Self::Json,
            LogFormat::Pretty => Self::Pretty,
            LogFormat::Compact => Self::Compact,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_args() {
        let cli = Cli::try_parse_from([
            "headtrack",
            "run",
            "-c",
            "tracker.toml",
            "--max-frames",
            "300",
            "--tilt",
            "-10",
            "--simulate-subjects",
            "3",
        ])
        .unwrap();

        let Commands::Run(args) = cli.command else {
            panic!("expected run");
        };
        assert_eq!(args.config, PathBuf::from("tracker.toml"));
        assert_eq!(args.max_frames, 300);
        assert_eq!(args.tilt, -10);
        assert_eq!(args.simulate_subjects, 3);
        assert_eq!(args.timeout, 0);
    }

    #[test]
    fn test_quiet_conflicts_with_verbose() {
        assert!(Cli::try_parse_from(["headtrack", "-q", "-v", "info"]).is_err());
    }
}
