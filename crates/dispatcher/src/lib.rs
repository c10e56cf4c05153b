//! # Dispatcher
//!
//! Pose output routing.
//!
//! Responsibilities:
//! - Implement `PoseSink` for the session registry
//! - Fan out each update to every configured writer
//! - Isolate slow writers so frame processing never blocks

pub mod error;
pub mod factory;
pub mod fanout;
pub mod handle;
pub mod metrics;
pub mod sinks;
pub mod writer;

pub use contracts::{PoseSink, PoseUpdate};
pub use error::DispatcherError;
pub use factory::create_sink;
pub use fanout::{FanoutSink, SinkWorkers};
pub use handle::{spawn_sink, SinkHandle, SinkWorker};
pub use metrics::{MetricsSnapshot, SinkMetrics};
pub use sinks::{FileSink, LogSink, OpenTrackPacket, UdpFormat, UdpSink};
pub use writer::{LocalPoseWriter, PoseRecord, PoseWriter};
