//! LogSink - logs every pose via tracing

use contracts::ContractError;
use tracing::{info, instrument};

use crate::writer::{PoseRecord, PoseWriter};

/// Writer that logs each update, for debugging and dry runs
pub struct LogSink {
    name: String,
}

impl LogSink {
    /// Create a new LogSink with the given name
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl PoseWriter for LogSink {
    fn name(&self) -> &str {
        &self.name
    }

    #[instrument(
        level = "trace",
        name = "log_sink_write",
        skip(self, record),
        fields(sink = %self.name, sequence = record.sequence)
    )]
    async fn write(&mut self, record: &PoseRecord) -> Result<(), ContractError> {
        let pose = &record.pose;
        info!(
            sink = %self.name,
            x = pose.x,
            y = pose.y,
            z = pose.z,
            pitch = pose.pitch,
            roll = pose.roll,
            yaw = pose.yaw,
            "Pose update"
        );
        Ok(())
    }

    async fn flush(&mut self) -> Result<(), ContractError> {
        Ok(())
    }

    #[instrument(name = "log_sink_close", skip(self))]
    async fn close(&mut self) -> Result<(), ContractError> {
        info!(sink = %self.name, "LogSink closed");
        Ok(())
    }
}
