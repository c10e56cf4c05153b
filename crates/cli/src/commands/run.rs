//! `run` command implementation.

use anyhow::{Context, Result};
use tracing::info;

use crate::cli::RunArgs;
use crate::error::CliError;
use crate::pipeline::{pipeline_config, Pipeline};

/// Execute the `run` command
pub async fn run_pipeline(args: &RunArgs) -> Result<()> {
    info!(config = %args.config.display(), "Loading configuration");

    if !args.config.exists() {
        return Err(CliError::config_not_found(args.config.display().to_string()).into());
    }

    let blueprint = config_loader::ConfigLoader::load_from_path(&args.config)
        .with_context(|| format!("Failed to load config from {}", args.config.display()))?;

    info!(
        max_missed_frames = blueprint.tracker.max_missed_frames,
        policy = ?blueprint.tracker.forward_policy,
        color = ?blueprint.device.color_format,
        depth = ?blueprint.device.depth_format,
        sinks = blueprint.sinks.len(),
        "Configuration loaded"
    );

    let config = pipeline_config(
        blueprint,
        args.max_frames,
        args.timeout,
        args.tilt,
        args.metrics_port,
        args.simulate_subjects,
    );

    info!("Starting tracker...");
    let stats = Pipeline::new(config)
        .run(shutdown_signal())
        .await
        .context("Tracker run failed")?;

    info!(
        bundles = stats.tracking.bundles_processed,
        poses = stats.tracking.poses_forwarded,
        duration_secs = stats.duration.as_secs_f64(),
        fps = format!("{:.2}", stats.fps()),
        "Tracker finished"
    );
    stats.print_summary();

    Ok(())
}

/// Resolve on Ctrl+C or SIGTERM
///
/// If a handler cannot be installed that source is ignored.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::warn!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
