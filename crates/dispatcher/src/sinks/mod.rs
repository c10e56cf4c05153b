//! Writer implementations
//!
//! Contains LogSink, UdpSink, and FileSink.

mod file;
mod log;
mod udp;

pub use self::file::{FileSink, FileSinkConfig};
pub use self::log::LogSink;
pub use self::udp::{OpenTrackPacket, UdpFormat, UdpSink, UdpSinkConfig};
