//! Prometheus scrape endpoint.

use axum::http::StatusCode;
use axum::routing::get;
use axum::Router;
use std::net::SocketAddr;
use tokio::sync::watch;
use tracing::{error, info};

/// Router serving `GET /metrics`.
pub fn metrics_router() -> Router {
    Router::new().route("/metrics", get(render))
}

async fn render() -> (StatusCode, String) {
    match gateway_telemetry::encode_metrics() {
        Ok(text) => (StatusCode::OK, text),
        Err(e) => {
            error!(error = %e, "Failed to encode metrics");
            (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
        }
    }
}

/// Serves metrics until shutdown is signalled.
pub async fn serve_metrics(
    addr: SocketAddr,
    mut shutdown: watch::Receiver<bool>,
) -> std::io::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(addr = %listener.local_addr()?, "Metrics endpoint listening");
    axum::serve(listener, metrics_router())
        .with_graceful_shutdown(async move {
            let _ = shutdown.changed().await;
        })
        .await
}
