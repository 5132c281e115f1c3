//! # Device Simulator
//!
//! Signs sensor readings as a device would and writes ingress frames to
//! stdout, one per line. Pipe into `secure-iot-gateway`.

use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use gateway_runtime::simulator::{reading, SensorKind, SimulatedDevice};
use gateway_telemetry::{init_telemetry, TelemetryConfig};
use shared_types::signature_prefix;
use tokio::io::AsyncWriteExt;
use tracing::info;

#[derive(Parser)]
#[command(name = "device-simulator")]
#[command(about = "Emits signed sensor readings as gateway ingress frames")]
struct Args {
    /// Device identifier
    #[arg(short, long, default_value = "sensor_001")]
    device_id: String,

    /// Shared secret registered for the device
    #[arg(short, long, env = "GW_DEVICE_SECRET", hide_env_values = true)]
    secret: String,

    /// Kind of reading to send
    #[arg(short, long, value_enum, default_value_t = SensorKind::Temperature)]
    kind: SensorKind,

    /// Seconds between messages
    #[arg(short, long, default_value = "3")]
    interval: u64,

    /// Number of messages to send (0 = until interrupted)
    #[arg(short = 'n', long, default_value = "0")]
    count: u64,

    /// Omit the peer identity so the gateway derives it from the topic
    #[arg(long)]
    anonymous: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let telemetry = TelemetryConfig {
        service_name: "device-simulator".to_string(),
        ..TelemetryConfig::from_env()
    };
    let _telemetry = init_telemetry(&telemetry).context("Failed to initialize telemetry")?;

    let peer_identity = (!args.anonymous).then(|| args.device_id.clone());
    let device =
        SimulatedDevice::new(args.device_id, args.secret).with_peer_identity(peer_identity);
    let mut stdout = tokio::io::stdout();
    let mut rng = rand::thread_rng();
    let mut sent = 0u64;

    loop {
        let message = device.sign(reading(args.kind, &mut rng));
        let frame = device.frame(&message).context("Failed to encode frame")?;
        let mut line = serde_json::to_vec(&frame).context("Failed to encode frame")?;
        line.push(b'\n');
        stdout.write_all(&line).await?;
        stdout.flush().await?;
        sent += 1;

        info!(
            device_id = device.device_id(),
            message_id = %message.message_id,
            timestamp = message.timestamp,
            signature = signature_prefix(&message.signature),
            sent,
            "[device] ✓ Message published"
        );

        if args.count != 0 && sent >= args.count {
            break;
        }
        tokio::select! {
            _ = tokio::time::sleep(Duration::from_secs(args.interval)) => {}
            _ = tokio::signal::ctrl_c() => break,
        }
    }

    info!(sent, "[device] Stopped");
    Ok(())
}
