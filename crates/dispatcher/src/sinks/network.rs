//! NetworkSink - UDP fire-and-forget streaming, one datagram per publication

use contracts::{ContractError, DataSink, Publication};
use std::collections::HashMap;
use std::net::SocketAddr;
use tokio::net::UdpSocket;
use tracing::{debug, error, instrument, warn};

/// Serialization format for network transmission
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NetworkFormat {
    /// JSON (human-readable, larger); NaN and infinities become `null`
    #[default]
    Json,
    /// Bincode (binary, compact); non-finite values survive unchanged
    Bincode,
}

/// Configuration for NetworkSink
#[derive(Debug, Clone)]
pub struct NetworkSinkConfig {
    /// Target address
    pub addr: SocketAddr,
    /// Serialization format
    pub format: NetworkFormat,
    /// Max datagram size (UDP typically 65507 for IPv4)
    pub max_packet_size: usize,
}

impl NetworkSinkConfig {
    /// Create config from params map
    pub fn from_params(params: &HashMap<String, String>) -> Result<Self, String> {
        let addr_str = params
            .get("addr")
            .ok_or_else(|| "missing 'addr' parameter".to_string())?;

        let addr: SocketAddr = addr_str
            .parse()
            .map_err(|e| format!("invalid address '{}': {}", addr_str, e))?;

        let format = match params.get("format").map(String::as_str) {
            Some("bincode") => NetworkFormat::Bincode,
            Some("json") | None => NetworkFormat::Json,
            Some(other) => return Err(format!("unknown format '{}'", other)),
        };

        let max_packet_size = match params.get("max_packet_size") {
            Some(s) => s
                .parse()
                .map_err(|e| format!("invalid max_packet_size '{}': {}", s, e))?,
            None => 65000,
        };

        Ok(Self {
            addr,
            format,
            max_packet_size,
        })
    }
}

/// Sink that sends publications over UDP
pub struct NetworkSink {
    name: String,
    config: NetworkSinkConfig,
    socket: Option<UdpSocket>,
}

impl NetworkSink {
    /// Create a new NetworkSink
    #[instrument(name = "network_sink_new", skip(name, config))]
    pub async fn new(name: impl Into<String>, config: NetworkSinkConfig) -> std::io::Result<Self> {
        let name = name.into();
        let bind_addr: SocketAddr = if config.addr.is_ipv4() {
            ([0, 0, 0, 0], 0).into()
        } else {
            ([0u16; 8], 0).into()
        };
        let socket = UdpSocket::bind(bind_addr).await?;
        socket.connect(&config.addr).await?;

        debug!(
            sink = %name,
            target = %config.addr,
            "NetworkSink connected"
        );

        Ok(Self {
            name,
            config,
            socket: Some(socket),
        })
    }

    /// Create from params (for factory)
    #[instrument(name = "network_sink_from_params", skip(name, params))]
    pub async fn from_params(
        name: impl Into<String>,
        params: &HashMap<String, String>,
    ) -> Result<Self, ContractError> {
        let name = name.into();
        let config = NetworkSinkConfig::from_params(params)
            .map_err(|e| ContractError::sink_write(&name, e))?;

        Self::new(name.clone(), config)
            .await
            .map_err(|e| ContractError::SinkConnection {
                sink_name: name,
                message: e.to_string(),
            })
    }

    fn serialize_publication(&self, publication: &Publication) -> Result<Vec<u8>, String> {
        match self.config.format {
            NetworkFormat::Json => {
                serde_json::to_vec(publication).map_err(|e| format!("json error: {}", e))
            }
            NetworkFormat::Bincode => {
                bincode::serialize(publication).map_err(|e| format!("bincode error: {}", e))
            }
        }
    }

    fn socket(&self) -> Result<&UdpSocket, ContractError> {
        self.socket
            .as_ref()
            .ok_or_else(|| ContractError::sink_write(&self.name, "socket not connected"))
    }

    fn prepare_payload(&self, publication: &Publication) -> Result<Vec<u8>, ContractError> {
        let data = self
            .serialize_publication(publication)
            .map_err(|e| ContractError::sink_write(&self.name, e))?;

        if data.len() > self.config.max_packet_size {
            warn!(
                sink = %self.name,
                size = data.len(),
                max = self.config.max_packet_size,
                "Datagram too large, publication skipped"
            );
            return Err(ContractError::sink_write(
                &self.name,
                format!(
                    "datagram of {} bytes exceeds limit {}",
                    data.len(),
                    self.config.max_packet_size
                ),
            ));
        }

        Ok(data)
    }

    async fn transmit(&self, socket: &UdpSocket, data: &[u8], sequence: u64) {
        match socket.send(data).await {
            Ok(sent) => {
                debug!(sink = %self.name, sequence, bytes = sent, "Sent");
            }
            Err(e) => {
                // UDP is best-effort
                error!(sink = %self.name, error = %e, "UDP send failed");
            }
        }
    }
}

impl DataSink for NetworkSink {
    fn name(&self) -> &str {
        &self.name
    }

    #[instrument(
        name = "network_sink_write",
        skip(self, publication),
        fields(sink = %self.name, sequence = publication.sequence)
    )]
    async fn write(&mut self, publication: &Publication) -> Result<(), ContractError> {
        let socket = self.socket()?;
        let data = self.prepare_payload(publication)?;
        self.transmit(socket, &data, publication.sequence).await;
        Ok(())
    }

    #[instrument(name = "network_sink_flush", skip(self))]
    async fn flush(&mut self) -> Result<(), ContractError> {
        Ok(())
    }

    #[instrument(name = "network_sink_close", skip(self))]
    async fn close(&mut self) -> Result<(), ContractError> {
        self.socket = None;
        debug!(sink = %self.name, "NetworkSink closed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::publication;
    use contracts::MessagePayload;
    use std::time::Duration;

    fn params(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_network_sink_config_parsing() {
        let config =
            NetworkSinkConfig::from_params(&params(&[("addr", "127.0.0.1:9999"), ("format", "json")]))
                .unwrap();
        assert_eq!(config.addr.port(), 9999);
        assert_eq!(config.format, NetworkFormat::Json);
        assert_eq!(config.max_packet_size, 65000);
    }

    #[test]
    fn test_network_sink_config_rejects_bad_params() {
        assert!(NetworkSinkConfig::from_params(&HashMap::new()).is_err());
        assert!(NetworkSinkConfig::from_params(&params(&[("addr", "nowhere")])).is_err());
        assert!(
            NetworkSinkConfig::from_params(&params(&[("addr", "127.0.0.1:1"), ("format", "xml")]))
                .is_err()
        );
    }

    #[tokio::test]
    async fn test_network_sink_write_without_receiver() {
        let config = NetworkSinkConfig {
            addr: "127.0.0.1:19998".parse().unwrap(),
            format: NetworkFormat::Json,
            max_packet_size: 65000,
        };

        let mut sink = NetworkSink::new("test_net", config).await.unwrap();
        assert!(sink.write(&publication(1)).await.is_ok());
    }

    #[tokio::test]
    async fn test_one_datagram_per_publication() {
        let receiver = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        let config = NetworkSinkConfig {
            addr: receiver.local_addr().unwrap(),
            format: NetworkFormat::Json,
            max_packet_size: 65000,
        };
        let mut sink = NetworkSink::new("udp", config).await.unwrap();

        sink.write(&publication(42)).await.unwrap();

        let mut buf = vec![0u8; 65536];
        let len = tokio::time::timeout(Duration::from_secs(1), receiver.recv(&mut buf))
            .await
            .unwrap()
            .unwrap();
        let decoded: Publication = serde_json::from_slice(&buf[..len]).unwrap();
        assert_eq!(decoded, publication(42));
    }

    #[tokio::test]
    async fn test_bincode_datagram_decodes_to_publication() {
        let receiver = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        let config = NetworkSinkConfig::from_params(&params(&[
            ("addr", receiver.local_addr().unwrap().to_string().as_str()),
            ("format", "bincode"),
        ]))
        .unwrap();
        let mut sink = NetworkSink::new("udp_bin", config).await.unwrap();

        sink.write(&publication(7)).await.unwrap();

        let mut buf = vec![0u8; 65536];
        let len = tokio::time::timeout(Duration::from_secs(1), receiver.recv(&mut buf))
            .await
            .unwrap()
            .unwrap();
        let decoded: Publication = bincode::deserialize(&buf[..len]).unwrap();
        assert_eq!(decoded, publication(7));
        assert!(len < serde_json::to_vec(&publication(7)).unwrap().len());
    }

    #[tokio::test]
    async fn test_non_finite_values_by_format() {
        let receiver = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        let addr = receiver.local_addr().unwrap().to_string();
        let mut nan = publication(9);
        nan.messages[0].payload = MessagePayload::Float64(f64::NAN);

        let mut buf = vec![0u8; 65536];
        for format in ["json", "bincode"] {
            let config = NetworkSinkConfig::from_params(&params(&[
                ("addr", addr.as_str()),
                ("format", format),
            ]))
            .unwrap();
            let mut sink = NetworkSink::new(format, config).await.unwrap();
            sink.write(&nan).await.unwrap();

            let len = tokio::time::timeout(Duration::from_secs(1), receiver.recv(&mut buf))
                .await
                .unwrap()
                .unwrap();
            if format == "json" {
                let value: serde_json::Value = serde_json::from_slice(&buf[..len]).unwrap();
                assert!(value["messages"][0]["payload"]["float64"].is_null());
            } else {
                let decoded: Publication = bincode::deserialize(&buf[..len]).unwrap();
                match decoded.messages[0].payload {
                    MessagePayload::Float64(v) => assert!(v.is_nan()),
                    ref other => panic!("expected float payload, got {other:?}"),
                }
            }
        }
    }

    #[tokio::test]
    async fn test_oversized_publication_is_rejected() {
        let config = NetworkSinkConfig {
            addr: "127.0.0.1:19997".parse().unwrap(),
            format: NetworkFormat::Json,
            max_packet_size: 16,
        };
        let mut sink = NetworkSink::new("tiny", config).await.unwrap();
        assert!(sink.write(&publication(1)).await.is_err());
    }
}
