//! Protocol-specific service probes.
//!
//! Each probe speaks just enough of its protocol to confirm what is
//! listening. Probes are infallible: transport faults and unrecognized
//! responses degrade to the protocol name instead of erroring out.

use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpStream, UdpSocket};
use tokio::time::timeout;
use tracing::trace;

use crate::banner::{sanitize, BANNER_SIZE};
use crate::scanner::traits::READ_TIMEOUT;

/// HEAD request used to elicit an HTTP response.
const HTTP_HEAD: &[u8] = b"HEAD / HTTP/1.0\r\n\r\n";

/// Redis inline PING.
const REDIS_PING: &[u8] = b"PING\r\n";

/// PostgreSQL SSLRequest packet: length 8, protocol marker 80877103.
const POSTGRES_SSL_REQUEST: &[u8] = &[0x00, 0x00, 0x00, 0x08, 0x04, 0xd2, 0x16, 0x2f];

/// Minimal MongoDB wire packet: a 58-byte message whose only meaningful
/// content is its own little-endian length header.
const MONGO_HANDSHAKE: [u8; 58] = {
    let mut pkt = [0u8; 58];
    pkt[0] = 58;
    pkt
};

/// Canned SNMPv1 GET for sysDescr.0 with community "public".
const SNMP_SYSDESCR_GET: &[u8] = b"\x30\x26\x02\x01\x00\x04\x06public\xa0\x19\x02\x04\x4a\x5b\x0f\x59\x02\x01\x00\x02\x01\x00\x30\x0b\x30\x09\x06\x05\x2b\x06\x01\x02\x01\x01\x01\x00";

/// Confirm an HTTP server and pull its `Server:` header when present.
///
/// Without the header the label falls back to the response text, and a
/// silent or failed exchange still labels the port "HTTP".
pub async fn probe_http(stream: &mut TcpStream) -> String {
    let Some(raw) = send_and_read(stream, HTTP_HEAD).await else {
        return "HTTP".to_string();
    };

    let text = String::from_utf8_lossy(&raw);
    if let Some(rest) = text.split("Server:").nth(1) {
        let value = rest.split("\r\n").next().unwrap_or("").trim();
        if !value.is_empty() {
            return value.to_string();
        }
    }

    let fallback = sanitize(&raw);
    if fallback.is_empty() {
        "HTTP".to_string()
    } else {
        fallback
    }
}

/// Confirm a Redis server with an inline PING.
pub async fn probe_redis(stream: &mut TcpStream) -> String {
    match send_and_read(stream, REDIS_PING).await {
        Some(raw) if raw.starts_with(b"+PONG") => "Redis (PONG)".to_string(),
        _ => "Redis".to_string(),
    }
}

/// Confirm PostgreSQL with an SSLRequest handshake.
///
/// The server answers a single byte, 'S' or 'N'. Either one identifies
/// PostgreSQL; the probe never negotiates TLS.
pub async fn probe_postgres(stream: &mut TcpStream) -> String {
    if stream.write_all(POSTGRES_SSL_REQUEST).await.is_ok() {
        let mut reply = [0u8; 1];
        if let Ok(Ok(_)) = timeout(READ_TIMEOUT, stream.read_exact(&mut reply)).await {
            trace!(reply = reply[0], "SSLRequest answered");
        }
    }
    "PostgreSQL".to_string()
}

/// MySQL announces itself: read the unsolicited greeting.
pub async fn probe_mysql(stream: &mut TcpStream) -> String {
    let Some(raw) = read_some(stream).await else {
        return "MySQL".to_string();
    };

    let text = String::from_utf8_lossy(&raw);
    if text.to_lowercase().contains("mysql") {
        return "MySQL".to_string();
    }

    let label = sanitize(&raw);
    if label.is_empty() {
        "MySQL".to_string()
    } else {
        label
    }
}

/// MongoDB speaks a binary protocol; completing the write is confirmation
/// enough and any reply is discarded.
pub async fn probe_mongo(stream: &mut TcpStream) -> String {
    if stream.write_all(&MONGO_HANDSHAKE).await.is_ok() {
        let _ = read_some(stream).await;
    }
    "MongoDB".to_string()
}

/// Confirm SNMP by sending a canned v1 GET over a fresh socket and
/// watching for any reply. The response ASN.1 is not parsed.
pub async fn probe_snmp(addr: SocketAddr) -> String {
    let replied = snmp_exchange(addr).await.is_some();
    trace!(%addr, replied, "snmp probe finished");
    "SNMP".to_string()
}

async fn snmp_exchange(addr: SocketAddr) -> Option<Vec<u8>> {
    let socket = UdpSocket::bind(local_bind_addr(addr.ip())).await.ok()?;
    socket.connect(addr).await.ok()?;
    socket.send(SNMP_SYSDESCR_GET).await.ok()?;

    let mut buf = vec![0u8; BANNER_SIZE];
    match timeout(READ_TIMEOUT, socket.recv(&mut buf)).await {
        Ok(Ok(n)) if n > 0 => {
            buf.truncate(n);
            Some(buf)
        }
        _ => None,
    }
}

/// Wildcard local bind address matching the target's address family.
pub(crate) fn local_bind_addr(target: IpAddr) -> SocketAddr {
    match target {
        IpAddr::V4(_) => SocketAddr::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), 0),
        IpAddr::V6(_) => SocketAddr::new(IpAddr::V6(Ipv6Addr::UNSPECIFIED), 0),
    }
}

/// Write a probe payload and read one response chunk.
async fn send_and_read(stream: &mut TcpStream, payload: &[u8]) -> Option<Vec<u8>> {
    if stream.write_all(payload).await.is_err() {
        return None;
    }
    read_some(stream).await
}

/// Read one chunk within the read timeout.
async fn read_some(stream: &mut TcpStream) -> Option<Vec<u8>> {
    let mut buf = vec![0u8; BANNER_SIZE];
    match timeout(READ_TIMEOUT, stream.read(&mut buf)).await {
        Ok(Ok(n)) if n > 0 => {
            buf.truncate(n);
            Some(buf)
        }
        _ => None,
    }
}
