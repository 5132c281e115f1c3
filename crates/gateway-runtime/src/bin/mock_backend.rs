//! # Mock Backend
//!
//! Serves `POST /device/{device_id}/data` for local runs of the gateway.

use std::net::{Ipv4Addr, SocketAddr};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use gateway_runtime::simulator::{mock_backend_router, BackendState};
use gateway_telemetry::{init_telemetry, TelemetryConfig};
use tracing::info;

#[derive(Parser)]
#[command(name = "mock-backend")]
#[command(about = "HTTP backend that acknowledges device readings")]
struct Args {
    /// Port to listen on
    #[arg(short, long, default_value = "5000")]
    port: u16,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let telemetry = TelemetryConfig {
        service_name: "mock-backend".to_string(),
        ..TelemetryConfig::from_env()
    };
    let _telemetry = init_telemetry(&telemetry).context("Failed to initialize telemetry")?;

    let state = Arc::new(BackendState::default());
    let addr = SocketAddr::from((Ipv4Addr::UNSPECIFIED, args.port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    info!(
        addr = %addr,
        "[backend] Listening on http://{}/device/<device_id>/data",
        addr
    );

    axum::serve(listener, mock_backend_router(Arc::clone(&state)))
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await
        .context("Backend server failed")?;

    info!(received = state.received(), "[backend] Stopped");
    Ok(())
}
