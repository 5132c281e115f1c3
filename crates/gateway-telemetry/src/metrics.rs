//! Prometheus metrics for the gateway.
//!
//! All metrics follow the naming convention: `gw_<metric>_<unit>`
//!
//! ## Metric Types
//!
//! - **Counter**: message and failure totals
//! - **CounterVec**: rejections labelled by `reason`
//! - **Gauge**: devices with replay state
//! - **Histogram**: time spent in one validation

use lazy_static::lazy_static;
use prometheus::{
    exponential_buckets, Encoder, Histogram, HistogramOpts, IntCounter, IntCounterVec, IntGauge,
    Opts, Registry, TextEncoder,
};

use crate::TelemetryError;

lazy_static! {
    /// Global metrics registry
    pub static ref REGISTRY: Registry = Registry::new();

    // =========================================================================
    // PIPELINE METRICS
    // =========================================================================

    /// Messages handed to the validation pipeline
    pub static ref MESSAGES_RECEIVED: IntCounter = IntCounter::new(
        "gw_messages_received_total",
        "Total messages received from devices"
    ).expect("metric creation failed");

    /// Messages that passed every check
    pub static ref MESSAGES_VALIDATED: IntCounter = IntCounter::new(
        "gw_messages_validated_total",
        "Total messages that passed validation"
    ).expect("metric creation failed");

    /// Rejections by reason
    pub static ref MESSAGES_REJECTED: IntCounterVec = IntCounterVec::new(
        Opts::new("gw_messages_rejected_total", "Total messages rejected, by reason"),
        &["reason"]
    ).expect("metric creation failed");

    /// Validation latency
    pub static ref VALIDATION_DURATION: Histogram = Histogram::with_opts(
        HistogramOpts::new(
            "gw_validation_duration_seconds",
            "Time spent validating one message"
        ).buckets(exponential_buckets(0.00001, 2.0, 16).expect("valid bucket layout"))
    ).expect("metric creation failed");

    /// Devices with at least one remembered message id
    pub static ref REPLAY_CACHE_DEVICES: IntGauge = IntGauge::new(
        "gw_replay_cache_devices",
        "Devices tracked by the replay cache"
    ).expect("metric creation failed");

    // =========================================================================
    // FORWARDING METRICS
    // =========================================================================

    /// Payloads delivered to the backend
    pub static ref MESSAGES_FORWARDED: IntCounter = IntCounter::new(
        "gw_messages_forwarded_total",
        "Total payloads the backend answered"
    ).expect("metric creation failed");

    /// Backend requests that produced no response
    pub static ref BACKEND_FAILURES: IntCounter = IntCounter::new(
        "gw_backend_failures_total",
        "Total backend requests that failed"
    ).expect("metric creation failed");

    // =========================================================================
    // INFRASTRUCTURE METRICS
    // =========================================================================

    /// Credential store lookups that failed
    pub static ref CREDENTIAL_STORE_ERRORS: IntCounter = IntCounter::new(
        "gw_credential_store_errors_total",
        "Total credential store failures"
    ).expect("metric creation failed");
}

/// Register all metrics with the global registry.
///
/// Safe to call more than once; already-registered metrics are skipped.
pub fn register_metrics() -> Result<(), TelemetryError> {
    let metrics: Vec<Box<dyn prometheus::core::Collector>> = vec![
        Box::new(MESSAGES_RECEIVED.clone()),
        Box::new(MESSAGES_VALIDATED.clone()),
        Box::new(MESSAGES_REJECTED.clone()),
        Box::new(VALIDATION_DURATION.clone()),
        Box::new(REPLAY_CACHE_DEVICES.clone()),
        Box::new(MESSAGES_FORWARDED.clone()),
        Box::new(BACKEND_FAILURES.clone()),
        Box::new(CREDENTIAL_STORE_ERRORS.clone()),
    ];

    for metric in metrics {
        match REGISTRY.register(metric) {
            Ok(()) | Err(prometheus::Error::AlreadyReg) => {}
            Err(e) => return Err(TelemetryError::MetricsInit(e.to_string())),
        }
    }
    Ok(())
}

/// Render the registry in the Prometheus text format.
pub fn encode_metrics() -> Result<String, TelemetryError> {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();
    encoder
        .encode(&metric_families, &mut buffer)
        .map_err(|e| TelemetryError::MetricsInit(e.to_string()))?;
    String::from_utf8(buffer).map_err(|e| TelemetryError::MetricsInit(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_is_idempotent() {
        assert!(register_metrics().is_ok());
        assert!(register_metrics().is_ok());
    }

    #[test]
    fn test_encode_contains_labelled_rejections() {
        register_metrics().unwrap();
        MESSAGES_REJECTED.with_label_values(&["replay_detected"]).inc();
        MESSAGES_RECEIVED.inc();

        let text = encode_metrics().unwrap();
        assert!(text.contains("gw_messages_received_total"));
        assert!(text.contains(r#"gw_messages_rejected_total{reason="replay_detected"}"#));
    }

    #[test]
    fn test_histogram_observe() {
        let before = VALIDATION_DURATION.get_sample_count();
        VALIDATION_DURATION.observe(0.0002);
        assert!(VALIDATION_DURATION.get_sample_count() > before);
    }
}
