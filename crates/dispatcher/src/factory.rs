//! Builds the sink fan-out from configuration

use contracts::{SinkConfig, SinkType};
use tracing::{info, instrument};

use crate::error::DispatcherError;
use crate::fanout::{FanoutSink, SinkWorkers};
use crate::handle::{spawn_sink, SinkHandle, SinkWorker};
use crate::sinks::{FileSink, LogSink, UdpSink};

/// Create one worker per configured sink behind a single [`FanoutSink`]
///
/// Must be called inside a Tokio runtime.
///
/// # Errors
/// `NoSinks` for an empty list; `SinkCreation` if any sink fails to open.
#[instrument(name = "dispatcher_create_sink", skip(configs), fields(sinks = configs.len()))]
pub async fn create_sink(
    configs: &[SinkConfig],
) -> Result<(FanoutSink, SinkWorkers), DispatcherError> {
    if configs.is_empty() {
        return Err(DispatcherError::NoSinks);
    }

    let mut handles = Vec::with_capacity(configs.len());
    let mut workers = Vec::with_capacity(configs.len());
    for config in configs {
        let (handle, worker) = create_sink_handle(config).await?;
        handles.push(handle);
        workers.push(worker);
    }

    info!(sinks = handles.len(), "Sinks ready");
    Ok((FanoutSink::with_handles(handles), SinkWorkers::new(workers)))
}

#[instrument(
    name = "dispatcher_create_sink_handle",
    skip(config),
    fields(sink = %config.name, sink_type = ?config.sink_type)
)]
async fn create_sink_handle(
    config: &SinkConfig,
) -> Result<(SinkHandle, SinkWorker), DispatcherError> {
    let capacity = config.queue_capacity;
    match config.sink_type {
        SinkType::Log => Ok(spawn_sink(LogSink::new(&config.name), capacity)),
        SinkType::File => {
            let sink = FileSink::from_params(&config.name, &config.params)
                .map_err(|e| DispatcherError::sink_creation(&config.name, e.to_string()))?;
            Ok(spawn_sink(sink, capacity))
        }
        SinkType::Udp => {
            let sink = UdpSink::from_params(&config.name, &config.params)
                .await
                .map_err(|e| DispatcherError::sink_creation(&config.name, e.to_string()))?;
            Ok(spawn_sink(sink, capacity))
        }
    }
}
