//! Scan orchestration.
//!
//! Resolves the target once, fans the port list out across concurrent
//! probes under a semaphore, and reduces the outcomes into a single
//! report. Whatever happens on an individual port never aborts the scan;
//! the only failure the engine surfaces is an unresolvable target.

pub mod tcp;
pub mod traits;
pub mod udp;

pub use tcp::TcpProber;
pub use traits::{
    ModeError, PortOutcome, PortProber, PortStatus, ScanMode, ScanRequest, CONNECT_TIMEOUT,
    DEFAULT_CONCURRENCY, READ_TIMEOUT, SERVICE_UNKNOWN,
};
pub use udp::UdpProber;

use chrono::{DateTime, Utc};
use futures::stream::{self, StreamExt};
use serde::{Deserialize, Serialize};
use std::net::IpAddr;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Semaphore;
use tracing::{debug, info};

use crate::error::{ScanError, ScanResult};
use crate::types::{Port, TargetSpec};

/// Completed scan, assembled once and immutable afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanReport {
    /// Target as the caller named it.
    pub target: String,
    /// Address the scan actually ran against.
    pub resolved_ip: IpAddr,
    /// Mode the ports were probed with.
    pub scan_type: ScanMode,
    /// Wall-clock start of probing.
    pub started_at: DateTime<Utc>,
    /// Wall-clock end of probing.
    pub finished_at: DateTime<Utc>,
    /// Elapsed scan time in milliseconds.
    pub duration_ms: u64,
    /// Number of outcomes, one per requested port.
    pub total_scanned: usize,
    pub open_count: usize,
    pub closed_count: usize,
    pub filtered_count: usize,
    pub error_count: usize,
    /// Per-port outcomes, in the order the ports were requested.
    pub results: Vec<PortOutcome>,
}

/// Execute the scan described by `request`.
///
/// Fails only when the target cannot be resolved; per-port faults are
/// captured in the outcome statuses instead.
pub async fn run_scan(request: &ScanRequest) -> ScanResult<ScanReport> {
    let target = resolve_target(&request.target).await?;

    info!(
        target = %request.target,
        ip = %target,
        mode = %request.mode,
        ports = request.ports.len(),
        banner = request.banner,
        "starting scan"
    );

    let started_at = Utc::now();
    let clock = Instant::now();

    let prober: Arc<dyn PortProber> = match request.mode {
        ScanMode::TcpConnect => Arc::new(TcpProber::new(target, request.timeout, request.banner)),
        ScanMode::Udp => Arc::new(UdpProber::new(target, request.timeout, request.banner)),
    };

    let outcomes = probe_all(&request.ports, prober, request.concurrency).await;

    let finished_at = Utc::now();
    let duration_ms = clock.elapsed().as_millis() as u64;

    let (mut open_count, mut closed_count, mut filtered_count, mut error_count) = (0, 0, 0, 0);
    for outcome in &outcomes {
        match outcome.status {
            PortStatus::Open => open_count += 1,
            PortStatus::Closed => closed_count += 1,
            PortStatus::Filtered => filtered_count += 1,
            PortStatus::Error => error_count += 1,
        }
    }

    info!(
        open = open_count,
        closed = closed_count,
        filtered = filtered_count,
        errors = error_count,
        duration_ms,
        "scan finished"
    );

    Ok(ScanReport {
        target: request.target.clone(),
        resolved_ip: target,
        scan_type: request.mode,
        started_at,
        finished_at,
        duration_ms,
        total_scanned: request.ports.len(),
        open_count,
        closed_count,
        filtered_count,
        error_count,
        results: outcomes,
    })
}

/// Resolve the scan target to a single address.
async fn resolve_target(target: &str) -> ScanResult<IpAddr> {
    let spec = TargetSpec::parse(target).map_err(|e| ScanError::Resolution {
        target: target.to_string(),
        reason: e.to_string(),
    })?;

    let resolved = spec.resolve().await.map_err(|e| ScanError::Resolution {
        target: target.to_string(),
        reason: e.to_string(),
    })?;

    debug!(target, ip = %resolved.ip, "target resolved");
    Ok(resolved.ip)
}

/// Probe every port concurrently, keeping outcomes in request order.
///
/// Outcomes complete in whatever order the network dictates; each one is
/// tagged with its input index so the collected batch can be put back in
/// order, duplicates included.
async fn probe_all(
    ports: &[Port],
    prober: Arc<dyn PortProber>,
    concurrency: usize,
) -> Vec<PortOutcome> {
    let semaphore = Arc::new(Semaphore::new(concurrency.max(1)));

    let mut indexed: Vec<(usize, PortOutcome)> = stream::iter(ports.iter().copied().enumerate())
        .map(|(index, port)| {
            let prober = Arc::clone(&prober);
            let semaphore = Arc::clone(&semaphore);

            async move {
                let _permit = semaphore.acquire().await.expect("semaphore closed");
                (index, prober.probe_port(port).await)
            }
        })
        // High buffering; the semaphore is what gates sockets in flight
        .buffer_unordered(concurrency.max(1024))
        .collect()
        .await;

    indexed.sort_by_key(|(index, _)| *index);
    indexed.into_iter().map(|(_, outcome)| outcome).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tokio::net::{TcpListener, UdpSocket};

    async fn closed_tcp_port() -> Port {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        Port::new(listener.local_addr().unwrap().port()).unwrap()
    }

    #[tokio::test]
    async fn test_report_covers_every_requested_port_in_order() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let open = Port::new(listener.local_addr().unwrap().port()).unwrap();
        let closed = closed_tcp_port().await;

        // Duplicate entries must come back 1:1
        let ports = vec![open, closed, open];
        let request =
            ScanRequest::new("127.0.0.1", ports.clone()).with_timeout(Duration::from_millis(500));

        let report = run_scan(&request).await.unwrap();

        assert_eq!(report.total_scanned, 3);
        assert_eq!(report.results.len(), 3);

        let requested: Vec<u16> = ports.iter().map(|p| p.as_u16()).collect();
        let reported: Vec<u16> = report.results.iter().map(|o| o.port.as_u16()).collect();
        assert_eq!(requested, reported);

        assert_eq!(report.results[0].status, PortStatus::Open);
        assert_eq!(report.results[1].status, PortStatus::Closed);
        assert_eq!(report.results[2].status, PortStatus::Open);
        assert_eq!(
            report.open_count + report.closed_count + report.filtered_count + report.error_count,
            report.total_scanned
        );
        drop(listener);
    }

    #[tokio::test]
    async fn test_unresolvable_target_fails_whole_scan() {
        let request = ScanRequest::new(
            "definitely-not-a-real-host.invalid",
            vec![Port::new(80).unwrap()],
        );

        let err = run_scan(&request).await.unwrap_err();
        assert!(matches!(err, ScanError::Resolution { .. }));
    }

    #[tokio::test]
    async fn test_unparseable_target_fails_whole_scan() {
        let request = ScanRequest::new("not a host!!", vec![Port::new(80).unwrap()]);

        let err = run_scan(&request).await.unwrap_err();
        assert!(matches!(err, ScanError::Resolution { .. }));
    }

    #[tokio::test]
    async fn test_concurrent_and_sequential_statuses_agree() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let mut ports = vec![Port::new(listener.local_addr().unwrap().port()).unwrap()];
        for _ in 0..4 {
            ports.push(closed_tcp_port().await);
        }

        let request =
            ScanRequest::new("127.0.0.1", ports.clone()).with_timeout(Duration::from_millis(500));
        let report = run_scan(&request).await.unwrap();

        let prober = TcpProber::new(
            "127.0.0.1".parse().unwrap(),
            Duration::from_millis(500),
            false,
        );
        for (outcome, port) in report.results.iter().zip(&ports) {
            let sequential = prober.probe_port(*port).await;
            assert_eq!(outcome.status, sequential.status);
            assert_eq!(outcome.port, sequential.port);
        }
        drop(listener);
    }

    #[tokio::test]
    async fn test_udp_mode_reports_silence_as_filtered() {
        let socket = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        let port = Port::new(socket.local_addr().unwrap().port()).unwrap();

        let request = ScanRequest::new("127.0.0.1", vec![port])
            .with_mode(ScanMode::Udp)
            .with_timeout(Duration::from_millis(200));

        let report = run_scan(&request).await.unwrap();
        assert_eq!(report.scan_type, ScanMode::Udp);
        assert_eq!(report.results[0].status, PortStatus::Filtered);
        drop(socket);
    }

    #[tokio::test]
    async fn test_report_serializes_with_wire_field_names() {
        let closed = closed_tcp_port().await;
        let request =
            ScanRequest::new("127.0.0.1", vec![closed]).with_timeout(Duration::from_millis(500));

        let report = run_scan(&request).await.unwrap();
        let value = serde_json::to_value(&report).unwrap();

        assert_eq!(value["target"], "127.0.0.1");
        assert_eq!(value["resolved_ip"], "127.0.0.1");
        assert_eq!(value["scan_type"], "tcp_connect");
        assert!(value["started_at"].is_string());
        assert!(value["finished_at"].is_string());
        assert!(value["duration_ms"].is_u64());
        assert_eq!(value["total_scanned"], 1);
        assert_eq!(value["results"][0]["status"], "closed");
        assert_eq!(value["results"][0]["service"], "unknown");
    }
}
