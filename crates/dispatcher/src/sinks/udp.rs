//! UdpSink - fire-and-forget UDP pose streaming

use std::collections::HashMap;
use std::net::SocketAddr;

use bytemuck::{Pod, Zeroable};
use contracts::{ContractError, PoseUpdate};
use tokio::net::UdpSocket;
use tracing::{debug, error, instrument, trace};

use crate::writer::{PoseRecord, PoseWriter};

/// Wire format of each datagram
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UdpFormat {
    /// OpenTrack "UDP over network" input: six little-endian f64
    #[default]
    OpenTrack,
    /// `PoseUpdate` as JSON
    Json,
    /// `PoseUpdate` via bincode
    Bincode,
}

/// OpenTrack datagram layout
///
/// Positions in centimetres, angles in degrees.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct OpenTrackPacket {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub yaw: f64,
    pub pitch: f64,
    pub roll: f64,
}

impl OpenTrackPacket {
    /// Datagram size in bytes
    pub const SIZE: usize = std::mem::size_of::<Self>();

    /// Convert a pose (positions in metres) to the OpenTrack layout
    pub fn from_pose(pose: &PoseUpdate) -> Self {
        Self {
            x: f64::from(pose.x) * 100.0,
            y: f64::from(pose.y) * 100.0,
            z: f64::from(pose.z) * 100.0,
            yaw: f64::from(pose.yaw),
            pitch: f64::from(pose.pitch),
            roll: f64::from(pose.roll),
        }
    }

    /// Little-endian wire bytes
    #[cfg(target_endian = "little")]
    pub fn to_le_bytes(&self) -> [u8; Self::SIZE] {
        let mut out = [0u8; Self::SIZE];
        out.copy_from_slice(bytemuck::bytes_of(self));
        out
    }

    /// Little-endian wire bytes
    #[cfg(not(target_endian = "little"))]
    pub fn to_le_bytes(&self) -> [u8; Self::SIZE] {
        let fields = [self.x, self.y, self.z, self.yaw, self.pitch, self.roll];
        let mut out = [0u8; Self::SIZE];
        for (chunk, value) in out.chunks_exact_mut(8).zip(fields) {
            chunk.copy_from_slice(&value.to_le_bytes());
        }
        out
    }
}

/// Configuration for UdpSink
#[derive(Debug, Clone)]
pub struct UdpSinkConfig {
    /// Target address
    pub addr: SocketAddr,
    /// Datagram format
    pub format: UdpFormat,
}

impl UdpSinkConfig {
    /// Create config from params map
    pub fn from_params(params: &HashMap<String, String>) -> Result<Self, String> {
        let addr_str = params
            .get("addr")
            .ok_or_else(|| "missing 'addr' parameter".to_string())?;

        let addr: SocketAddr = addr_str
            .parse()
            .map_err(|e| format!("invalid address '{}': {}", addr_str, e))?;

        let format = match params.get("format").map(String::as_str) {
            Some("opentrack") | None => UdpFormat::OpenTrack,
            Some("json") => UdpFormat::Json,
            Some("bincode") => UdpFormat::Bincode,
            Some(other) => return Err(format!("unknown format '{}'", other)),
        };

        Ok(Self { addr, format })
    }
}

/// Writer that sends each pose as one UDP datagram
pub struct UdpSink {
    name: String,
    config: UdpSinkConfig,
    socket: Option<UdpSocket>,
}

impl UdpSink {
    /// Bind an ephemeral local port and connect it to the target
    #[instrument(name = "udp_sink_new", skip(name, config), fields(target = %config.addr))]
    pub async fn new(name: impl Into<String>, config: UdpSinkConfig) -> std::io::Result<Self> {
        let name = name.into();
        let local = if config.addr.is_ipv4() {
            "0.0.0.0:0"
        } else {
            "[::]:0"
        };
        let socket = UdpSocket::bind(local).await?;
        socket.connect(config.addr).await?;

        debug!(sink = %name, target = %config.addr, format = ?config.format, "UdpSink connected");

        Ok(Self {
            name,
            config,
            socket: Some(socket),
        })
    }

    /// Create from params (for factory)
    pub async fn from_params(
        name: impl Into<String>,
        params: &HashMap<String, String>,
    ) -> Result<Self, ContractError> {
        let name = name.into();
        let config = UdpSinkConfig::from_params(params)
            .map_err(|e| ContractError::config_validation(format!("sinks.{name}.params"), e))?;

        Self::new(name.clone(), config)
            .await
            .map_err(|e| ContractError::SinkConnection {
                sink_name: name,
                message: e.to_string(),
            })
    }

    fn encode(&self, pose: &PoseUpdate) -> Result<Vec<u8>, ContractError> {
        match self.config.format {
            UdpFormat::OpenTrack => Ok(OpenTrackPacket::from_pose(pose).to_le_bytes().to_vec()),
            UdpFormat::Json => serde_json::to_vec(pose)
                .map_err(|e| ContractError::sink_write(&self.name, format!("json error: {e}"))),
            UdpFormat::Bincode => bincode::serialize(pose)
                .map_err(|e| ContractError::sink_write(&self.name, format!("bincode error: {e}"))),
        }
    }
}

impl PoseWriter for UdpSink {
    fn name(&self) -> &str {
        &self.name
    }

    #[instrument(
        level = "trace",
        name = "udp_sink_write",
        skip(self, record),
        fields(sink = %self.name, sequence = record.sequence)
    )]
    async fn write(&mut self, record: &PoseRecord) -> Result<(), ContractError> {
        let socket = self
            .socket
            .as_ref()
            .ok_or_else(|| ContractError::sink_write(&self.name, "socket not connected"))?;
        let data = self.encode(&record.pose)?;

        // Best effort: a missing receiver is not an error
        match socket.send(&data).await {
            Ok(sent) => trace!(sink = %self.name, bytes = sent, "Sent"),
            Err(e) => error!(sink = %self.name, error = %e, "UDP send failed"),
        }
        Ok(())
    }

    async fn flush(&mut self) -> Result<(), ContractError> {
        Ok(())
    }

    #[instrument(name = "udp_sink_close", skip(self))]
    async fn close(&mut self) -> Result<(), ContractError> {
        self.socket = None;
        debug!(sink = %self.name, "UdpSink closed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pose() -> PoseUpdate {
        PoseUpdate {
            x: 0.1,
            y: 0.2,
            z: 1.5,
            pitch: 20.0,
            roll: 10.0,
            yaw: 30.0,
        }
    }

    async fn receiver() -> (UdpSocket, SocketAddr) {
        let socket = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        let addr = socket.local_addr().unwrap();
        (socket, addr)
    }

    #[test]
    fn test_config_parsing() {
        let mut params = HashMap::new();
        params.insert("addr".to_string(), "127.0.0.1:4242".to_string());

        let config = UdpSinkConfig::from_params(&params).unwrap();
        assert_eq!(config.addr.port(), 4242);
        assert_eq!(config.format, UdpFormat::OpenTrack);

        params.insert("format".to_string(), "protobuf".to_string());
        assert!(UdpSinkConfig::from_params(&params).is_err());

        params.remove("addr");
        assert!(UdpSinkConfig::from_params(&params).is_err());
    }

    #[test]
    fn test_opentrack_packet_field_order() {
        let packet = OpenTrackPacket {
            x: 1.0,
            y: 2.0,
            z: 3.0,
            yaw: 4.0,
            pitch: 5.0,
            roll: 6.0,
        };
        let bytes = packet.to_le_bytes();

        assert_eq!(bytes.len(), 48);
        for (i, chunk) in bytes.chunks_exact(8).enumerate() {
            assert_eq!(chunk, ((i + 1) as f64).to_le_bytes());
        }
    }

    #[tokio::test]
    async fn test_opentrack_datagram_layout() {
        let (rx, addr) = receiver().await;
        let config = UdpSinkConfig {
            addr,
            format: UdpFormat::OpenTrack,
        };
        let mut sink = UdpSink::new("opentrack", config).await.unwrap();

        sink.write(&PoseRecord::now(1, pose())).await.unwrap();

        let mut buf = [0u8; 128];
        let len = rx.recv(&mut buf).await.unwrap();
        assert_eq!(len, OpenTrackPacket::SIZE);

        let values: Vec<f64> = buf[..len]
            .chunks_exact(8)
            .map(|c| f64::from_le_bytes(c.try_into().unwrap()))
            .collect();
        // x, y, z in cm then yaw, pitch, roll
        let expected = [10.0, 20.0, 150.0, 30.0, 20.0, 10.0];
        for (got, want) in values.iter().zip(expected) {
            assert!((got - want).abs() < 1e-3, "{got} != {want}");
        }
    }

    #[tokio::test]
    async fn test_json_datagram() {
        let (rx, addr) = receiver().await;
        let config = UdpSinkConfig {
            addr,
            format: UdpFormat::Json,
        };
        let mut sink = UdpSink::new("json", config).await.unwrap();

        sink.write(&PoseRecord::now(1, pose())).await.unwrap();

        let mut buf = [0u8; 512];
        let len = rx.recv(&mut buf).await.unwrap();
        let decoded: PoseUpdate = serde_json::from_slice(&buf[..len]).unwrap();
        assert_eq!(decoded, pose());
    }

    #[tokio::test]
    async fn test_write_without_receiver_is_ok() {
        let config = UdpSinkConfig {
            addr: "127.0.0.1:19998".parse().unwrap(),
            format: UdpFormat::Bincode,
        };
        let mut sink = UdpSink::new("nobody", config).await.unwrap();

        assert!(sink.write(&PoseRecord::now(1, pose())).await.is_ok());
        sink.close().await.unwrap();
        assert!(sink.write(&PoseRecord::now(2, pose())).await.is_err());
    }
}
