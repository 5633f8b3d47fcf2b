//! UDP prober.
//!
//! UDP offers no handshake to observe, so classification leans on what
//! comes back: any reply means open, silence until the timeout means
//! filtered, and anything else the transport reports is an error. There
//! is no closed status in this mode.

use async_trait::async_trait;
use std::net::{IpAddr, SocketAddr};
use std::time::Duration;
use tokio::net::UdpSocket;
use tokio::time::timeout;
use tracing::trace;

use crate::banner::{sanitize, BANNER_SIZE};
use crate::detect::{probe_for, ProbeKind, Transport};
use crate::error::{ScanError, ScanResult};
use crate::probes::{self, local_bind_addr};
use crate::scanner::traits::{PortOutcome, PortProber, PortStatus, SERVICE_UNKNOWN};
use crate::types::Port;

/// Datagram sent to ports without a protocol-specific payload.
const NUDGE: &[u8] = b"\x00";

/// Prober for the udp mode.
pub struct UdpProber {
    target: IpAddr,
    timeout: Duration,
    banner: bool,
}

impl UdpProber {
    /// Create a new UDP prober.
    pub fn new(target: IpAddr, timeout: Duration, banner: bool) -> Self {
        Self {
            target,
            timeout,
            banner,
        }
    }

    /// Send the nudge datagram and wait for any reply.
    async fn exchange(&self, addr: SocketAddr) -> ScanResult<Vec<u8>> {
        let socket = UdpSocket::bind(local_bind_addr(self.target)).await?;
        socket.connect(addr).await?;
        socket.send(NUDGE).await?;

        let mut buf = vec![0u8; BANNER_SIZE];
        match timeout(self.timeout, socket.recv(&mut buf)).await {
            Ok(Ok(n)) => {
                buf.truncate(n);
                Ok(buf)
            }
            Ok(Err(e)) => Err(ScanError::Io(e)),
            Err(_) => Err(ScanError::Timeout),
        }
    }

    /// Label an open UDP port from its reply.
    async fn label(&self, addr: SocketAddr, port: Port, reply: &[u8]) -> String {
        if probe_for(Transport::Udp, port) == Some(ProbeKind::Snmp) {
            return probes::probe_snmp(addr).await;
        }

        let text = sanitize(reply);
        if text.is_empty() {
            SERVICE_UNKNOWN.to_string()
        } else {
            text
        }
    }
}

#[async_trait]
impl PortProber for UdpProber {
    async fn probe_port(&self, port: Port) -> PortOutcome {
        let addr = SocketAddr::new(self.target, port.as_u16());

        match self.exchange(addr).await {
            Ok(reply) => {
                trace!(%addr, bytes = reply.len(), "udp reply");
                let outcome = PortOutcome::new(port, PortStatus::Open);
                if self.banner {
                    let service = self.label(addr, port, &reply).await;
                    outcome.with_service(service)
                } else {
                    outcome
                }
            }
            Err(ScanError::Timeout) => {
                trace!(%addr, "udp probe timed out");
                PortOutcome::new(port, PortStatus::Filtered)
            }
            Err(e) => {
                trace!(%addr, error = %e, "udp probe failed");
                PortOutcome::new(port, PortStatus::Error)
            }
        }
    }
}
