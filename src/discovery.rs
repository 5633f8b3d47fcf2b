//! Ping sweep over a subnet.
//!
//! Liveness is delegated to the system `ping` binary, one short attempt
//! per host, with a bounded number of pings in flight. Hosts that answer
//! are collected into a sweep report sorted by address.

use futures::stream::{self, StreamExt};
use ipnetwork::IpNetwork;
use serde::{Deserialize, Serialize};
use std::net::IpAddr;
use std::process::Stdio;
use tokio::process::Command;
use tracing::{info, trace};

use crate::error::{ScanError, ScanResult};

/// Default cap on pings in flight.
pub const SWEEP_CONCURRENCY: usize = 64;

/// Result of sweeping a subnet for live hosts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SweepReport {
    /// Normalized subnet in CIDR notation.
    pub subnet: String,
    /// Hosts that answered, sorted by address.
    pub alive_hosts: Vec<IpAddr>,
    /// Number of live hosts.
    pub count: usize,
}

/// Ping every host address in `subnet` and report the ones that answered.
///
/// Host bits in the input are tolerated: "10.0.0.5/24" sweeps 10.0.0.0/24.
pub async fn sweep_subnet(subnet: &str, concurrency: usize) -> ScanResult<SweepReport> {
    let network = parse_subnet(subnet)?;
    let label = subnet_label(network);
    let hosts = host_addresses(network);

    info!(subnet = %label, hosts = hosts.len(), "starting ping sweep");

    let mut alive_hosts: Vec<IpAddr> = stream::iter(hosts)
        .map(|ip| async move {
            let alive = ping_host(ip).await;
            trace!(%ip, alive, "ping finished");
            alive.then_some(ip)
        })
        .buffer_unordered(concurrency.max(1))
        .filter_map(|alive| async move { alive })
        .collect()
        .await;

    alive_hosts.sort_unstable();
    let count = alive_hosts.len();

    info!(subnet = %label, alive = count, "ping sweep finished");

    Ok(SweepReport {
        subnet: label,
        alive_hosts,
        count,
    })
}

/// Parse CIDR notation, also accepting a bare address as a /32 (or /128).
fn parse_subnet(subnet: &str) -> ScanResult<IpNetwork> {
    subnet
        .trim()
        .parse()
        .map_err(|_| ScanError::InvalidSubnet(subnet.to_string()))
}

/// Canonical "network/prefix" form with host bits masked off.
fn subnet_label(network: IpNetwork) -> String {
    match network {
        IpNetwork::V4(net) => format!("{}/{}", net.network(), net.prefix()),
        IpNetwork::V6(net) => format!("{}/{}", net.network(), net.prefix()),
    }
}

/// All host addresses in the network, skipping the IPv4 network and
/// broadcast addresses when the prefix leaves room for them.
fn host_addresses(network: IpNetwork) -> Vec<IpAddr> {
    network
        .iter()
        .filter(|ip| {
            if let (IpNetwork::V4(net), IpAddr::V4(addr)) = (network, ip) {
                if net.prefix() < 31 {
                    return *addr != net.network() && *addr != net.broadcast();
                }
            }
            true
        })
        .collect()
}

/// One ping attempt with a one second deadline.
async fn ping_host(ip: IpAddr) -> bool {
    let status = Command::new("ping")
        .arg("-c")
        .arg("1")
        .arg("-W")
        .arg("1")
        .arg(ip.to_string())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .await;

    matches!(status, Ok(s) if s.success())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_malformed_subnets() {
        assert!(matches!(
            parse_subnet("charlie"),
            Err(ScanError::InvalidSubnet(_))
        ));
        assert!(matches!(
            parse_subnet("10.0.0.0/40"),
            Err(ScanError::InvalidSubnet(_))
        ));
    }

    #[test]
    fn test_host_bits_are_masked_off() {
        let network = parse_subnet("10.0.0.5/24").unwrap();
        assert_eq!(subnet_label(network), "10.0.0.0/24");
    }

    #[test]
    fn test_bare_address_is_a_host_subnet() {
        let network = parse_subnet("127.0.0.1").unwrap();
        assert_eq!(subnet_label(network), "127.0.0.1/32");
        assert_eq!(host_addresses(network).len(), 1);
    }

    #[test]
    fn test_network_and_broadcast_are_skipped() {
        let network = parse_subnet("192.168.1.0/30").unwrap();
        let hosts = host_addresses(network);
        let rendered: Vec<String> = hosts.iter().map(|ip| ip.to_string()).collect();
        assert_eq!(rendered, vec!["192.168.1.1", "192.168.1.2"]);
    }

    #[test]
    fn test_point_to_point_prefix_keeps_both_addresses() {
        let network = parse_subnet("192.168.1.0/31").unwrap();
        assert_eq!(host_addresses(network).len(), 2);
    }

    #[tokio::test]
    async fn test_sweep_report_shape() {
        // Whether loopback answers depends on the host's ping setup, so
        // only the report invariants are asserted
        let report = sweep_subnet("127.0.0.1/32", 1).await.unwrap();
        assert_eq!(report.subnet, "127.0.0.1/32");
        assert_eq!(report.count, report.alive_hosts.len());
        assert!(report.count <= 1);
    }
}
