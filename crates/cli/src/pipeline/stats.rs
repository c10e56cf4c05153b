//! Pipeline statistics.

use std::time::Duration;

use dispatcher::MetricsSnapshot as SinkSnapshot;
use ingestion::MetricsSnapshot as IngestionSnapshot;
use observability::TrackingStatsAggregator;

/// Statistics from a pipeline run
#[derive(Debug, Clone, Default)]
pub struct PipelineStats {
    /// Frame sets taken from the gate
    pub frames_received: u64,

    /// Frame sets the assembler rejected
    pub frames_incomplete: u64,

    /// Total duration of the run
    pub duration: Duration,

    /// Sensor elevation when the run ended (degrees)
    pub final_elevation: i32,

    /// Sessions released by the final shutdown
    pub sessions_released: usize,

    /// Registry outcomes
    pub tracking: TrackingStatsAggregator,

    /// Device side counters
    pub ingestion: IngestionSnapshot,

    /// Per-sink counters
    pub sinks: Vec<(String, SinkSnapshot)>,
}

impl PipelineStats {
    /// Bundles processed per second
    pub fn fps(&self) -> f64 {
        if self.duration.as_secs_f64() > 0.0 {
            self.tracking.bundles_processed as f64 / self.duration.as_secs_f64()
        } else {
            0.0
        }
    }

    /// Share of produced frames the device skipped, in percent
    pub fn skip_rate(&self) -> f64 {
        if self.ingestion.frames_produced > 0 {
            self.ingestion.frames_skipped as f64 / self.ingestion.frames_produced as f64 * 100.0
        } else {
            0.0
        }
    }

    /// Print detailed summary
    pub fn print_summary(&self) {
        println!("\n╔══════════════════════════════════════════════════════════════╗");
        println!("║                     Tracker Statistics                       ║");
        println!("╚══════════════════════════════════════════════════════════════╝\n");

        println!("📊 Overview");
        println!("   ├─ Duration: {:.2}s", self.duration.as_secs_f64());
        println!("   ├─ Frames received: {}", self.frames_received);
        println!("   ├─ Frames incomplete: {}", self.frames_incomplete);
        println!(
            "   ├─ Frames skipped (busy): {} ({:.2}%)",
            self.ingestion.frames_skipped,
            self.skip_rate()
        );
        println!("   ├─ FPS: {:.2}", self.fps());
        println!("   └─ Final elevation: {}°", self.final_elevation);

        println!("\n🧍 Tracking");
        for line in self.tracking.summary().to_string().lines().skip(1) {
            println!("   {}", line);
        }
        println!("   Released at shutdown: {}", self.sessions_released);

        if !self.sinks.is_empty() {
            println!("\n📤 Sinks");
            for (i, (name, snapshot)) in self.sinks.iter().enumerate() {
                let prefix = if i == self.sinks.len() - 1 { "└─" } else { "├─" };
                println!(
                    "   {} {}: writes={}, failures={}, dropped={}",
                    prefix, name, snapshot.write_count, snapshot.failure_count, snapshot.dropped_count
                );
            }
        }

        println!();
    }
}
