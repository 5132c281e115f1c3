//! Telemetry configuration from environment variables.

use std::env;

/// Configuration for logging and metrics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TelemetryConfig {
    /// Service name reported at startup
    pub service_name: String,

    /// Log filter directive (trace, debug, info, warn, error, or full EnvFilter syntax)
    pub log_level: String,

    /// Whether to emit JSON formatted logs
    pub json_logs: bool,

    /// Whether to colour human-readable output
    pub ansi: bool,

    /// Port for the Prometheus `/metrics` endpoint; disabled when `None`
    pub metrics_port: Option<u16>,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            service_name: "secure-iot-gateway".to_string(),
            log_level: "info".to_string(),
            json_logs: false,
            ansi: true,
            metrics_port: None,
        }
    }
}

impl TelemetryConfig {
    /// Create configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `GW_SERVICE_NAME`: Service name (default: secure-iot-gateway)
    /// - `GW_LOG_LEVEL` or `RUST_LOG`: Log filter (default: info)
    /// - `GW_JSON_LOGS`: Enable JSON logs (default: false in dev, true in containers)
    /// - `GW_METRICS_PORT`: Serve Prometheus metrics on this port
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds configuration from an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let is_container =
            lookup("KUBERNETES_SERVICE_HOST").is_some() || lookup("DOCKER_CONTAINER").is_some();
        let defaults = Self::default();

        Self {
            service_name: lookup("GW_SERVICE_NAME").unwrap_or(defaults.service_name),

            log_level: lookup("GW_LOG_LEVEL")
                .or_else(|| lookup("RUST_LOG"))
                .unwrap_or(defaults.log_level),

            json_logs: lookup("GW_JSON_LOGS")
                .map(|v| v.to_lowercase() == "true" || v == "1")
                .unwrap_or(is_container),

            ansi: lookup("NO_COLOR").is_none(),

            metrics_port: lookup("GW_METRICS_PORT").and_then(|v| v.parse().ok()),
        }
    }
}
