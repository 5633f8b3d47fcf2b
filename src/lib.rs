//! # PortAtlas - An Async Network Port Scanner
//!
//! PortAtlas probes a target's ports concurrently, classifies each as
//! open, closed, or filtered, and can identify listening services through
//! lightweight protocol-specific handshakes.
//!
//! ## Features
//!
//! - **TCP connect and UDP scanning** with per-port outcome classification
//! - **Service detection**: HTTP, Redis, PostgreSQL, MySQL, MongoDB, and
//!   SNMP probes, with a generic banner read as fallback
//! - **Bounded concurrency**: semaphore-gated fan-out across all ports
//! - **Ping sweep**: subnet-wide host discovery
//! - **HTTP API**: drive scans remotely and receive JSON reports
//! - **Multiple output formats**: plain text, JSON, and CSV
//!
//! ## Example Usage
//!
//! ```rust,ignore
//! use portatlas::scanner::{run_scan, ScanRequest};
//! use portatlas::types::Port;
//!
//! #[tokio::main]
//! async fn main() {
//!     let ports = vec![Port::new(22).unwrap(), Port::new(80).unwrap()];
//!     let request = ScanRequest::new("192.168.1.1", ports).with_banner(true);
//!
//!     let report = run_scan(&request).await.unwrap();
//!     for outcome in &report.results {
//!         println!("{}/{} {}", outcome.port, outcome.status, outcome.service);
//!     }
//! }
//! ```
//!
//! ## Architecture
//!
//! - [`types`] - Port and target domain types with validating parsers
//! - [`scanner`] - The scan engine: orchestrator, probers, and vocabulary
//! - [`detect`] - Port-to-probe dispatch table
//! - [`probes`] - Protocol-specific service probes
//! - [`banner`] - Generic banner read fallback
//! - [`discovery`] - Subnet ping sweep
//! - [`server`] - HTTP API wrapper
//! - [`error`] - Error types
//! - [`output`] - Report rendering

pub mod banner;
pub mod cli;
pub mod detect;
pub mod discovery;
pub mod error;
pub mod output;
pub mod probes;
pub mod scanner;
pub mod server;
pub mod types;

/// Port specification used when a caller supplies none.
pub const DEFAULT_PORTS: &str = "22,80";

// Re-export commonly used types
pub use error::{ScanError, ScanResult};
pub use scanner::{run_scan, PortOutcome, PortStatus, ScanMode, ScanReport, ScanRequest};
pub use types::{Port, PortSpec, ScanTarget, TargetSpec};
