//! Generic banner read for services without a dedicated probe.
//!
//! Many services announce themselves as soon as the connection opens
//! (SSH, SMTP, FTP). Reading whatever they volunteer is the fallback
//! identification strategy when no protocol probe covers the port.

use tokio::io::AsyncReadExt;
use tokio::net::TcpStream;
use tokio::time::timeout;
use tracing::trace;

use crate::scanner::traits::{READ_TIMEOUT, SERVICE_UNKNOWN};

/// Maximum bytes read from a service in one probe.
pub const BANNER_SIZE: usize = 1024;

/// Read the service's greeting and return it as a printable label.
///
/// Returns "unknown" when the peer stays silent until the read timeout,
/// closes without sending anything, or sends only unprintable noise.
pub async fn read_banner(stream: &mut TcpStream) -> String {
    let mut buf = vec![0u8; BANNER_SIZE];

    match timeout(READ_TIMEOUT, stream.read(&mut buf)).await {
        Ok(Ok(n)) if n > 0 => {
            trace!(bytes = n, "banner received");
            let text = sanitize(&buf[..n]);
            if text.is_empty() {
                SERVICE_UNKNOWN.to_string()
            } else {
                text
            }
        }
        _ => SERVICE_UNKNOWN.to_string(),
    }
}

/// Turn raw service bytes into a single-line printable label.
///
/// Control characters become spaces, runs of whitespace collapse, and the
/// ends are trimmed.
pub(crate) fn sanitize(data: &[u8]) -> String {
    let text = String::from_utf8_lossy(data);
    let mut out = String::with_capacity(text.len());
    let mut prev_space = false;

    for c in text.chars() {
        let c = if c.is_control() { ' ' } else { c };
        if c == ' ' {
            if !prev_space {
                out.push(' ');
            }
            prev_space = true;
        } else {
            out.push(c);
            prev_space = false;
        }
    }

    out.trim().to_string()
}
