//! TCP connect prober.
//!
//! Performs standard TCP connect scans using the operating system's
//! socket API. A completed handshake marks the port open, an OS-reported
//! refusal marks it closed, and silence until the timeout (or any other
//! establishment failure) marks it filtered.

use async_trait::async_trait;
use std::io;
use std::net::{IpAddr, SocketAddr};
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::time::timeout;
use tracing::trace;

use crate::detect::detect_service;
use crate::error::{ScanError, ScanResult};
use crate::scanner::traits::{PortOutcome, PortProber, PortStatus};
use crate::types::Port;

/// Prober for the tcp_connect mode.
///
/// Does not require elevated privileges; every probe is an ordinary
/// connect() call owned for the duration of the probe and closed before
/// the outcome is returned.
pub struct TcpProber {
    target: IpAddr,
    timeout: Duration,
    banner: bool,
}

impl TcpProber {
    /// Create a new TCP connect prober.
    pub fn new(target: IpAddr, timeout: Duration, banner: bool) -> Self {
        Self {
            target,
            timeout,
            banner,
        }
    }

    /// Attempt to establish a connection, classifying failures.
    async fn attempt_connect(&self, addr: SocketAddr) -> ScanResult<TcpStream> {
        match timeout(self.timeout, TcpStream::connect(addr)).await {
            Ok(Ok(stream)) => Ok(stream),
            Ok(Err(e)) if e.kind() == io::ErrorKind::ConnectionRefused => {
                Err(ScanError::ConnectionRefused)
            }
            Ok(Err(e)) => Err(ScanError::Io(e)),
            Err(_) => Err(ScanError::Timeout),
        }
    }
}

#[async_trait]
impl PortProber for TcpProber {
    async fn probe_port(&self, port: Port) -> PortOutcome {
        let addr = SocketAddr::new(self.target, port.as_u16());

        match self.attempt_connect(addr).await {
            Ok(mut stream) => {
                trace!(%addr, "connect succeeded");
                let outcome = PortOutcome::new(port, PortStatus::Open);
                if self.banner {
                    let service = detect_service(&mut stream, port).await;
                    outcome.with_service(service)
                } else {
                    outcome
                }
            }
            Err(ScanError::ConnectionRefused) => {
                trace!(%addr, "connect refused");
                PortOutcome::new(port, PortStatus::Closed)
            }
            Err(ScanError::Timeout) => {
                trace!(%addr, "connect timed out");
                PortOutcome::new(port, PortStatus::Filtered)
            }
            Err(e) => {
                trace!(%addr, error = %e, "connect failed");
                PortOutcome::new(port, PortStatus::Filtered)
            }
        }
    }
}
