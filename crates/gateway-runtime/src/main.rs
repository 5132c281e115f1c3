//! # Secure IoT Gateway
//!
//! Reads transport frames from stdin, validates and forwards each device
//! message, and writes backend replies to stdout as response frames.
//!
//! ## Startup Sequence
//!
//! 1. Load configuration (file, then `GW_*` environment overrides)
//! 2. Initialize logging and metrics
//! 3. Load device credentials and build the backend relay
//! 4. Start ingress and the worker pool
//! 5. Run until stdin closes or Ctrl-C

use std::net::{Ipv4Addr, SocketAddr};
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use gateway_runtime::adapters::LinePublisher;
use gateway_runtime::{GatewayConfig, GatewayContainer, GatewayRuntime};
use gateway_telemetry::{init_telemetry, TelemetryConfig};
use tokio::io::BufReader;
use tracing::info;

#[derive(Parser)]
#[command(name = "secure-iot-gateway")]
#[command(about = "Validates signed device messages and relays them to the backend")]
struct Args {
    /// Path to the TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config =
        GatewayConfig::load(args.config.as_deref()).context("Failed to load configuration")?;
    let telemetry = TelemetryConfig::from_env();
    let _telemetry = init_telemetry(&telemetry).context("Failed to initialize telemetry")?;

    let container = GatewayContainer::new(config).context("Failed to initialize gateway")?;
    let mut runtime = GatewayRuntime::new(container);
    if let Some(port) = telemetry.metrics_port {
        runtime = runtime.with_metrics_addr(SocketAddr::from((Ipv4Addr::UNSPECIFIED, port)));
    }

    let publisher = Arc::new(LinePublisher::new(tokio::io::stdout()));
    let running = runtime.start(BufReader::new(tokio::io::stdin()), publisher);
    let join = running.join();
    tokio::pin!(join);

    tokio::select! {
        result = &mut join => {
            result?;
            info!("Input closed");
        }
        signal = tokio::signal::ctrl_c() => {
            signal.context("Failed to listen for Ctrl-C")?;
            info!("Received Ctrl-C");
            runtime.shutdown();
            join.await?;
        }
    }

    info!("Final stats - {}", runtime.container().stats.snapshot());
    info!("Gateway shutdown complete");
    Ok(())
}
