//! UDP 状态源
//!
//! 每个数据报携带一个 `RawStateSample` (JSON 或 bincode)。

use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use contracts::{InputRepresentation, StateSampleCallback, StateSource, WireFormat};
use tokio::net::UdpSocket;
use tokio::task::JoinHandle;
use tracing::{debug, info, trace, warn};

use crate::decode::decode_sample;
use crate::error::{IngestionError, Result};

/// Largest datagram accepted
const MAX_DATAGRAM_SIZE: usize = 64 * 1024;

/// Pause after a failed `recv_from`, doubled per consecutive failure
#[derive(Debug, Clone)]
struct RecvBackoff {
    initial: Duration,
    max: Duration,
    failures: u32,
}

impl RecvBackoff {
    fn new() -> Self {
        Self {
            initial: Duration::from_millis(10),
            max: Duration::from_secs(1),
            failures: 0,
        }
    }

    /// Record a failure and return how long to wait
    fn on_failure(&mut self) -> Duration {
        self.failures = self.failures.saturating_add(1);
        let shift = (self.failures - 1).min(16);
        self.initial.saturating_mul(1 << shift).min(self.max)
    }

    /// Only the 1st, 2nd, 4th, 8th... failure in a run is logged
    fn should_log(&self) -> bool {
        self.failures.is_power_of_two()
    }

    /// Reset after a successful receive, returning the failures cleared
    fn on_success(&mut self) -> u32 {
        std::mem::take(&mut self.failures)
    }
}

/// UDP 状态源
pub struct UdpStateSource {
    source_id: String,
    representation: InputRepresentation,
    format: WireFormat,
    socket: Arc<UdpSocket>,
    listening: Arc<AtomicBool>,
    decode_errors: Arc<AtomicU64>,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl UdpStateSource {
    /// 绑定 UDP socket
    ///
    /// # Errors
    /// 地址不可用时返回 `BindFailed`
    pub async fn bind(
        source_id: &str,
        addr: SocketAddr,
        format: WireFormat,
        representation: InputRepresentation,
    ) -> Result<Self> {
        let socket = UdpSocket::bind(addr)
            .await
            .map_err(|e| IngestionError::BindFailed {
                source_id: source_id.to_string(),
                addr: addr.to_string(),
                message: e.to_string(),
            })?;

        info!(source_id = %source_id, addr = %addr, format = ?format, "udp state source bound");

        Ok(Self {
            source_id: source_id.to_string(),
            representation,
            format,
            socket: Arc::new(socket),
            listening: Arc::new(AtomicBool::new(false)),
            decode_errors: Arc::new(AtomicU64::new(0)),
            task: Mutex::new(None),
        })
    }

    /// 实际绑定地址 (端口 0 时由系统分配)
    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.socket.local_addr()
    }

    /// 解码失败的数据报数量
    pub fn decode_errors(&self) -> u64 {
        self.decode_errors.load(Ordering::Relaxed)
    }
}

impl StateSource for UdpStateSource {
    fn source_id(&self) -> &str {
        &self.source_id
    }

    fn representation(&self) -> InputRepresentation {
        self.representation
    }

    fn listen(&self, callback: StateSampleCallback) {
        if self.listening.swap(true, Ordering::SeqCst) {
            return;
        }

        let source_id = self.source_id.clone();
        let format = self.format;
        let socket = self.socket.clone();
        let listening = self.listening.clone();
        let decode_errors = self.decode_errors.clone();

        let handle = tokio::spawn(async move {
            let mut buf = vec![0u8; MAX_DATAGRAM_SIZE];
            let mut backoff = RecvBackoff::new();
            debug!(source_id = %source_id, "udp receive loop started");

            while listening.load(Ordering::Relaxed) {
                let (len, peer) = match socket.recv_from(&mut buf).await {
                    Ok(received) => received,
                    Err(e) => {
                        let delay = backoff.on_failure();
                        if backoff.should_log() {
                            warn!(
                                source_id = %source_id,
                                error = %e,
                                failures = backoff.failures,
                                retry_in_ms = delay.as_millis() as u64,
                                "udp receive failed"
                            );
                        }
                        tokio::time::sleep(delay).await;
                        continue;
                    }
                };
                let cleared = backoff.on_success();
                if cleared > 0 {
                    info!(source_id = %source_id, failures = cleared, "udp receive recovered");
                }

                match decode_sample(&buf[..len], format, &source_id) {
                    Ok(sample) => {
                        trace!(source_id = %source_id, peer = %peer, len, "datagram decoded");
                        callback(sample);
                    }
                    Err(e) => {
                        decode_errors.fetch_add(1, Ordering::Relaxed);
                        observability::record_decode_error(&source_id, "decode");
                        warn!(source_id = %source_id, peer = %peer, error = %e, "dropping datagram");
                    }
                }
            }

            debug!(source_id = %source_id, "udp receive loop stopped");
        });

        if let Ok(mut task) = self.task.lock() {
            *task = Some(handle);
        }
    }

    fn stop(&self) {
        if self.listening.swap(false, Ordering::SeqCst) {
            // recv_from never returns without traffic
            if let Some(handle) = self.task.lock().ok().and_then(|mut t| t.take()) {
                handle.abort();
            }
            debug!(source_id = %self.source_id, "udp state source stopped");
        }
    }

    fn is_listening(&self) -> bool {
        self.listening.load(Ordering::Relaxed)
    }
}
