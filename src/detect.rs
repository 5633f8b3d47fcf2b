//! Port-to-probe dispatch.
//!
//! A static rule table maps (transport, port) pairs to protocol probes.
//! The table is scanned in order and the first match wins; TCP ports no
//! rule covers fall back to the generic banner read. Adding support for a
//! new protocol means one table entry and one probe function.

use tokio::net::TcpStream;
use tracing::debug;

use crate::banner::read_banner;
use crate::probes;
use crate::types::Port;

/// Transport a probe rule applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transport {
    Tcp,
    Udp,
}

/// Identifier of a protocol probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeKind {
    Http,
    Redis,
    Postgres,
    Mysql,
    Mongo,
    Snmp,
}

/// A dispatch rule binding well-known ports to a probe.
struct ProbeRule {
    transport: Transport,
    ports: &'static [u16],
    probe: ProbeKind,
}

/// Dispatch table, scanned in order; first match wins.
const PROBE_RULES: &[ProbeRule] = &[
    ProbeRule {
        transport: Transport::Udp,
        ports: &[161],
        probe: ProbeKind::Snmp,
    },
    ProbeRule {
        transport: Transport::Tcp,
        ports: &[80, 443, 8000, 8080],
        probe: ProbeKind::Http,
    },
    ProbeRule {
        transport: Transport::Tcp,
        ports: &[6379],
        probe: ProbeKind::Redis,
    },
    ProbeRule {
        transport: Transport::Tcp,
        ports: &[5432],
        probe: ProbeKind::Postgres,
    },
    ProbeRule {
        transport: Transport::Tcp,
        ports: &[3306],
        probe: ProbeKind::Mysql,
    },
    ProbeRule {
        transport: Transport::Tcp,
        ports: &[27017],
        probe: ProbeKind::Mongo,
    },
];

/// Look up the probe covering a port, if any.
pub fn probe_for(transport: Transport, port: Port) -> Option<ProbeKind> {
    let number = port.as_u16();
    PROBE_RULES
        .iter()
        .find(|rule| rule.transport == transport && rule.ports.contains(&number))
        .map(|rule| rule.probe)
}

/// Identify the service on an established TCP connection.
///
/// Dispatches to the protocol probe covering the port, falling back to a
/// generic banner read. Never fails; unidentified services come back as
/// whatever printable text they volunteered, or "unknown".
pub async fn detect_service(stream: &mut TcpStream, port: Port) -> String {
    let kind = probe_for(Transport::Tcp, port);
    debug!(%port, ?kind, "service detection");

    match kind {
        Some(ProbeKind::Http) => probes::probe_http(stream).await,
        Some(ProbeKind::Redis) => probes::probe_redis(stream).await,
        Some(ProbeKind::Postgres) => probes::probe_postgres(stream).await,
        Some(ProbeKind::Mysql) => probes::probe_mysql(stream).await,
        Some(ProbeKind::Mongo) => probes::probe_mongo(stream).await,
        // SNMP is UDP-only, so an established TCP stream reads generically
        Some(ProbeKind::Snmp) | None => read_banner(stream).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::AsyncWriteExt;
    use tokio::net::TcpListener;

    fn port(n: u16) -> Port {
        Port::new(n).unwrap()
    }

    #[test]
    fn test_http_ports_dispatch_to_http() {
        for n in [80, 443, 8000, 8080] {
            assert_eq!(probe_for(Transport::Tcp, port(n)), Some(ProbeKind::Http));
        }
    }

    #[test]
    fn test_database_ports_dispatch() {
        assert_eq!(probe_for(Transport::Tcp, port(6379)), Some(ProbeKind::Redis));
        assert_eq!(
            probe_for(Transport::Tcp, port(5432)),
            Some(ProbeKind::Postgres)
        );
        assert_eq!(probe_for(Transport::Tcp, port(3306)), Some(ProbeKind::Mysql));
        assert_eq!(
            probe_for(Transport::Tcp, port(27017)),
            Some(ProbeKind::Mongo)
        );
    }

    #[test]
    fn test_snmp_is_udp_only() {
        assert_eq!(probe_for(Transport::Udp, port(161)), Some(ProbeKind::Snmp));
        assert_eq!(probe_for(Transport::Tcp, port(161)), None);
    }

    #[test]
    fn test_uncovered_ports_have_no_probe() {
        assert_eq!(probe_for(Transport::Tcp, port(22)), None);
        assert_eq!(probe_for(Transport::Udp, port(80)), None);
    }

    #[tokio::test]
    async fn test_uncovered_port_falls_back_to_banner() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            if let Ok((mut stream, _)) = listener.accept().await {
                let _ = stream.write_all(b"SSH-2.0-TestDaemon\r\n").await;
            }
        });

        let mut stream = TcpStream::connect(addr).await.unwrap();
        let label = detect_service(&mut stream, port(22)).await;
        assert_eq!(label, "SSH-2.0-TestDaemon");
    }
}
