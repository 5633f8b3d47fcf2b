//! Core scan vocabulary.
//!
//! Defines the statuses, requests, and the prober interface shared by the
//! TCP and UDP implementations, enabling polymorphism and easier testing.

use crate::types::Port;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Connection establishment timeout.
pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(3);

/// Response read timeout.
pub const READ_TIMEOUT: Duration = Duration::from_secs(3);

/// Default cap on concurrent in-flight probes.
pub const DEFAULT_CONCURRENCY: usize = 512;

/// Service label used when nothing could be identified.
pub const SERVICE_UNKNOWN: &str = "unknown";

/// Status of a scanned port.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PortStatus {
    /// A service accepted the connection or sent a reply.
    Open,
    /// The target actively refused.
    Closed,
    /// No answer either way before the timeout.
    Filtered,
    /// Transport fault outside the refusal and timeout signals.
    Error,
}

impl fmt::Display for PortStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Open => write!(f, "open"),
            Self::Closed => write!(f, "closed"),
            Self::Filtered => write!(f, "filtered"),
            Self::Error => write!(f, "error"),
        }
    }
}

/// Outcome of probing a single port.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortOutcome {
    /// The port number that was probed.
    pub port: Port,
    /// Status determined by the probe.
    pub status: PortStatus,
    /// Detected or inferred service label.
    pub service: String,
}

impl PortOutcome {
    /// Create a new outcome with the default service label.
    pub fn new(port: Port, status: PortStatus) -> Self {
        Self {
            port,
            status,
            service: SERVICE_UNKNOWN.to_string(),
        }
    }

    /// Set the service label.
    pub fn with_service(mut self, service: impl Into<String>) -> Self {
        self.service = service.into();
        self
    }

    /// Check if the port is open.
    pub fn is_open(&self) -> bool {
        self.status == PortStatus::Open
    }
}

/// Rejection for scan mode labels the engine does not accept.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ModeError {
    #[error("scan mode '{0}' is not implemented (supported: tcp_connect, udp)")]
    Unimplemented(String),
    #[error("unknown scan mode '{0}' (supported: tcp_connect, udp)")]
    Unknown(String),
}

/// Probing modes implemented by the engine.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "snake_case")]
#[value(rename_all = "snake_case")]
pub enum ScanMode {
    /// Full TCP handshake per port (no special privileges required).
    #[default]
    TcpConnect,
    /// Single datagram per port, classified by reply or silence.
    Udp,
}

impl fmt::Display for ScanMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TcpConnect => write!(f, "tcp_connect"),
            Self::Udp => write!(f, "udp"),
        }
    }
}

impl std::str::FromStr for ScanMode {
    type Err = ModeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "tcp_connect" | "tcp-connect" | "tcp" => Ok(Self::TcpConnect),
            "udp" => Ok(Self::Udp),
            // Raw-socket modes are recognized but deliberately unsupported
            "syn" | "fin" | "null" => Err(ModeError::Unimplemented(s.to_string())),
            _ => Err(ModeError::Unknown(s.to_string())),
        }
    }
}

/// A validated scan request.
///
/// Built once by a caller, then handed to the engine by shared reference;
/// the engine never mutates it.
#[derive(Debug, Clone)]
pub struct ScanRequest {
    /// Hostname or IP literal to scan.
    pub target: String,
    /// Ports to probe, in the order outcomes will be reported.
    pub ports: Vec<Port>,
    /// Probing mode.
    pub mode: ScanMode,
    /// Whether to identify services on open ports.
    pub banner: bool,
    /// Per-probe connect/read timeout.
    pub timeout: Duration,
    /// Cap on probes in flight.
    pub concurrency: usize,
}

impl ScanRequest {
    /// Create a request with default mode, timeout, and concurrency.
    pub fn new(target: impl Into<String>, ports: Vec<Port>) -> Self {
        Self {
            target: target.into(),
            ports,
            mode: ScanMode::default(),
            banner: false,
            timeout: CONNECT_TIMEOUT,
            concurrency: DEFAULT_CONCURRENCY,
        }
    }

    /// Set the probing mode.
    pub fn with_mode(mut self, mode: ScanMode) -> Self {
        self.mode = mode;
        self
    }

    /// Enable or disable service detection.
    pub fn with_banner(mut self, banner: bool) -> Self {
        self.banner = banner;
        self
    }

    /// Set the per-probe timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the concurrency cap (floored at 1).
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }
}

/// Trait for port prober implementations.
///
/// Probing never fails: every transport fault is folded into the outcome's
/// status, so the orchestrator can fan out without error plumbing.
#[async_trait]
pub trait PortProber: Send + Sync {
    /// Probe a single port on the prober's target.
    async fn probe_port(&self, port: Port) -> PortOutcome;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_port_status_display() {
        assert_eq!(PortStatus::Open.to_string(), "open");
        assert_eq!(PortStatus::Closed.to_string(), "closed");
        assert_eq!(PortStatus::Filtered.to_string(), "filtered");
        assert_eq!(PortStatus::Error.to_string(), "error");
    }

    #[test]
    fn test_port_status_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&PortStatus::Open).unwrap(),
            "\"open\""
        );
        assert_eq!(
            serde_json::to_string(&PortStatus::Filtered).unwrap(),
            "\"filtered\""
        );
    }

    #[test]
    fn test_scan_mode_from_str() {
        assert_eq!("tcp_connect".parse::<ScanMode>().unwrap(), ScanMode::TcpConnect);
        assert_eq!("tcp-connect".parse::<ScanMode>().unwrap(), ScanMode::TcpConnect);
        assert_eq!("TCP".parse::<ScanMode>().unwrap(), ScanMode::TcpConnect);
        assert_eq!("udp".parse::<ScanMode>().unwrap(), ScanMode::Udp);
    }

    #[test]
    fn test_raw_socket_modes_are_rejected() {
        for label in ["syn", "fin", "null"] {
            let err = label.parse::<ScanMode>().unwrap_err();
            assert!(matches!(err, ModeError::Unimplemented(_)));
            assert!(err.to_string().contains("not implemented"));
        }

        let err = "xmas".parse::<ScanMode>().unwrap_err();
        assert!(matches!(err, ModeError::Unknown(_)));
    }

    #[test]
    fn test_scan_mode_serializes_snake_case() {
        assert_eq!(
            serde_json::to_string(&ScanMode::TcpConnect).unwrap(),
            "\"tcp_connect\""
        );
        assert_eq!(serde_json::to_string(&ScanMode::Udp).unwrap(), "\"udp\"");
    }

    #[test]
    fn test_request_defaults() {
        let request = ScanRequest::new("127.0.0.1", vec![Port::new(80).unwrap()]);
        assert_eq!(request.mode, ScanMode::TcpConnect);
        assert!(!request.banner);
        assert_eq!(request.timeout, CONNECT_TIMEOUT);
        assert_eq!(request.concurrency, DEFAULT_CONCURRENCY);
    }

    #[test]
    fn test_request_concurrency_floor() {
        let request = ScanRequest::new("127.0.0.1", Vec::new()).with_concurrency(0);
        assert_eq!(request.concurrency, 1);
    }

    #[test]
    fn test_outcome_defaults_to_unknown_service() {
        let outcome = PortOutcome::new(Port::new(22).unwrap(), PortStatus::Open);
        assert!(outcome.is_open());
        assert_eq!(outcome.service, "unknown");

        let outcome = outcome.with_service("OpenSSH");
        assert_eq!(outcome.service, "OpenSSH");
    }
}
