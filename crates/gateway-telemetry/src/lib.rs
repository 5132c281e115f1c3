//! # Gateway Telemetry
//!
//! Observability for the Secure IoT Gateway.
//!
//! ## Components
//!
//! - **Logging**: `tracing-subscriber` with an `EnvFilter`, human-readable
//!   or JSON output
//! - **Metrics**: Prometheus counters and a validation-latency histogram,
//!   rendered in the text exposition format
//!
//! ## Usage
//!
//! ```rust,ignore
//! use gateway_telemetry::{init_telemetry, TelemetryConfig};
//!
//! let _guard = init_telemetry(&TelemetryConfig::from_env())?;
//! ```
//!
//! ## Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `GW_LOG_LEVEL` / `RUST_LOG` | `info` | Log filter directive |
//! | `GW_JSON_LOGS` | `false` (`true` in containers) | JSON log lines |
//! | `GW_SERVICE_NAME` | `secure-iot-gateway` | Service name in startup log |
//! | `GW_METRICS_PORT` | unset | Port for the `/metrics` endpoint |

mod config;
mod logging;
pub mod metrics;

pub use config::TelemetryConfig;
pub use logging::init_logging;
pub use metrics::{
    encode_metrics, register_metrics, BACKEND_FAILURES, CREDENTIAL_STORE_ERRORS,
    MESSAGES_FORWARDED, MESSAGES_RECEIVED, MESSAGES_REJECTED, MESSAGES_VALIDATED,
    REPLAY_CACHE_DEVICES, VALIDATION_DURATION,
};

use thiserror::Error;

/// Telemetry initialization errors
#[derive(Error, Debug)]
pub enum TelemetryError {
    #[error("Failed to initialize logging: {0}")]
    LoggingInit(String),

    #[error("Failed to initialize Prometheus metrics: {0}")]
    MetricsInit(String),

    #[error("Invalid configuration: {0}")]
    Config(String),
}

/// Initializes logging and registers metrics.
///
/// Returns a guard to be held for the lifetime of the process.
pub fn init_telemetry(config: &TelemetryConfig) -> Result<TelemetryGuard, TelemetryError> {
    register_metrics()?;
    init_logging(config)?;

    tracing::info!(
        service = %config.service_name,
        json_logs = config.json_logs,
        metrics_port = ?config.metrics_port,
        "Telemetry initialized"
    );

    Ok(TelemetryGuard { _private: () })
}

/// Guard that keeps telemetry active.
pub struct TelemetryGuard {
    _private: (),
}

impl Drop for TelemetryGuard {
    fn drop(&mut self) {
        tracing::info!("Shutting down telemetry...");
    }
}
