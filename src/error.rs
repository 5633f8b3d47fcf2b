//! Error types for PortAtlas.
//!
//! Uses `thiserror` for ergonomic error definitions.

use thiserror::Error;

/// Errors produced while scanning.
///
/// The engine itself only ever surfaces `Resolution`: per-port transport
/// failures are classified by the probers through the connection variants
/// and folded into port statuses before they can escape.
#[derive(Error, Debug)]
pub enum ScanError {
    /// The scan target could not be turned into a network address.
    #[error("could not resolve target '{target}': {reason}")]
    Resolution { target: String, reason: String },

    /// The peer actively refused the connection.
    #[error("connection refused")]
    ConnectionRefused,

    /// No response before the probe deadline.
    #[error("probe timed out")]
    Timeout,

    /// Subnet argument that is not CIDR notation.
    #[error("invalid subnet '{0}'")]
    InvalidSubnet(String),

    /// Transport-level I/O failure.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for scan operations.
pub type ScanResult<T> = Result<T, ScanError>;
