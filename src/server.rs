//! HTTP API for driving scans remotely.
//!
//! Two endpoints: `GET /` describes the service, `POST /scan` runs a scan
//! and returns the report as JSON with per-request metadata attached.
//! Caller mistakes (bad target, bad ports, unsupported mode) come back as
//! 400 with a `detail` field; anything else is a 500.

use axum::extract::ConnectInfo;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::net::SocketAddr;
use std::time::Instant;
use tracing::{error, info};

use crate::error::{ScanError, ScanResult};
use crate::scanner::{run_scan, ScanMode, ScanReport, ScanRequest};
use crate::types::PortSpec;
use crate::DEFAULT_PORTS;

/// Scan parameters accepted by `POST /scan`.
#[derive(Debug, Deserialize)]
pub struct ApiScanRequest {
    /// Hostname or IP literal.
    pub target: String,
    /// Port specification, e.g. "22,80" or "1-1024".
    #[serde(default = "default_ports")]
    pub ports: String,
    /// Scan mode label; defaults to tcp_connect.
    #[serde(default)]
    pub scan_type: Option<String>,
    /// Identify services on open ports.
    #[serde(default)]
    pub banner: bool,
    /// Scan the full 1-65535 range, overriding `ports`.
    #[serde(default)]
    pub all_ports: bool,
}

fn default_ports() -> String {
    DEFAULT_PORTS.to_string()
}

/// Successful scan response: the report plus request metadata.
#[derive(Debug, Serialize)]
struct ApiScanResponse {
    #[serde(flatten)]
    report: ScanReport,
    /// End-to-end request handling time in milliseconds.
    api_duration_ms: u64,
    client: ClientInfo,
}

#[derive(Debug, Serialize)]
struct ClientInfo {
    ip: String,
}

/// Build the API router.
pub fn app() -> Router {
    Router::new()
        .route("/", get(service_info))
        .route("/scan", post(scan))
}

/// Serve the API on `bind` until the process is stopped.
pub async fn serve(bind: &str) -> ScanResult<()> {
    let listener = tokio::net::TcpListener::bind(bind).await?;
    info!(%bind, "api listening");

    axum::serve(
        listener,
        app().into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}

async fn service_info() -> Json<serde_json::Value> {
    Json(json!({
        "name": "PortAtlas",
        "version": env!("CARGO_PKG_VERSION"),
        "description": "API wrapper for the PortAtlas port scanner.",
        "usage": "POST /scan with JSON body: { \"target\": \"host\", \"ports\": \"22,80\", \"scan_type\": \"tcp_connect\" }",
    }))
}

async fn scan(
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    Json(body): Json<ApiScanRequest>,
) -> Response {
    let clock = Instant::now();

    let mode = match parse_mode(body.scan_type.as_deref()) {
        Ok(mode) => mode,
        Err(detail) => return bad_request(detail),
    };

    let ports = if body.all_ports {
        PortSpec::full().to_ports()
    } else {
        match body.ports.parse::<PortSpec>() {
            Ok(spec) => spec.to_ports(),
            Err(e) => return bad_request(e.to_string()),
        }
    };

    let request = ScanRequest::new(&body.target, ports)
        .with_mode(mode)
        .with_banner(body.banner);

    info!(
        client = %peer.ip(),
        target = %body.target,
        ports = request.ports.len(),
        mode = %mode,
        banner = body.banner,
        "api scan request"
    );

    match run_scan(&request).await {
        Ok(report) => {
            let response = ApiScanResponse {
                report,
                api_duration_ms: clock.elapsed().as_millis() as u64,
                client: ClientInfo {
                    ip: peer.ip().to_string(),
                },
            };
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(e @ ScanError::Resolution { .. }) => bad_request(e.to_string()),
        Err(e) => {
            error!(target = %body.target, error = %e, "scan failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "detail": format!("Scan failed: {e}") })),
            )
                .into_response()
        }
    }
}

fn parse_mode(label: Option<&str>) -> Result<ScanMode, String> {
    match label {
        None => Ok(ScanMode::default()),
        Some(s) => s.parse::<ScanMode>().map_err(|e| e.to_string()),
    }
}

fn bad_request(detail: impl Into<String>) -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(json!({ "detail": detail.into() })),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::extract::connect_info::MockConnectInfo;
    use axum::http::{header, Request};
    use tokio::net::TcpListener;
    use tower::ServiceExt;

    fn test_app() -> Router {
        app().layer(MockConnectInfo(SocketAddr::from(([127, 0, 0, 1], 4000))))
    }

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    async fn post_scan(payload: serde_json::Value) -> Response {
        test_app()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/scan")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(payload.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_info_endpoint_describes_the_api() {
        let response = test_app()
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let value = body_json(response).await;
        assert_eq!(value["name"], "PortAtlas");
        assert!(value["usage"].as_str().unwrap().contains("/scan"));
    }

    #[tokio::test]
    async fn test_scan_rejects_unimplemented_modes() {
        let response = post_scan(json!({ "target": "127.0.0.1", "scan_type": "syn" })).await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let value = body_json(response).await;
        assert!(value["detail"]
            .as_str()
            .unwrap()
            .contains("not implemented"));
    }

    #[tokio::test]
    async fn test_scan_rejects_malformed_ports() {
        let response = post_scan(json!({ "target": "127.0.0.1", "ports": "1-2-3" })).await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let value = body_json(response).await;
        assert!(value["detail"].is_string());
    }

    #[tokio::test]
    async fn test_scan_rejects_unresolvable_targets() {
        let response = post_scan(json!({
            "target": "definitely-not-a-real-host.invalid",
            "ports": "80"
        }))
        .await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let value = body_json(response).await;
        assert!(value["detail"]
            .as_str()
            .unwrap()
            .contains("could not resolve"));
    }

    #[tokio::test]
    async fn test_scan_returns_report_with_request_metadata() {
        // Nothing listening there, so loopback answers the probe fast
        let closed = {
            let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
            listener.local_addr().unwrap().port()
        };

        let response = post_scan(json!({
            "target": "127.0.0.1",
            "ports": closed.to_string()
        }))
        .await;

        assert_eq!(response.status(), StatusCode::OK);
        let value = body_json(response).await;
        assert_eq!(value["target"], "127.0.0.1");
        assert_eq!(value["resolved_ip"], "127.0.0.1");
        assert_eq!(value["scan_type"], "tcp_connect");
        assert_eq!(value["total_scanned"], 1);
        assert_eq!(value["results"][0]["status"], "closed");
        assert!(value["api_duration_ms"].is_u64());
        assert_eq!(value["client"]["ip"], "127.0.0.1");
    }
}
