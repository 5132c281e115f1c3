//! # Gateway Statistics
//!
//! Receives validation and forwarding events, keeps running totals with
//! atomics and mirrors each event into the Prometheus registry.
//!
//! `received` counts transport events, not pipeline runs: a message retried
//! after a credential store outage is received once. Every received event
//! ends as validated, rejected (including transport-level drops) or
//! unavailable.

use gateway_telemetry::{
    BACKEND_FAILURES, CREDENTIAL_STORE_ERRORS, MESSAGES_FORWARDED, MESSAGES_RECEIVED,
    MESSAGES_REJECTED, MESSAGES_VALIDATED, VALIDATION_DURATION,
};
use gw_01_message_validation::ValidationObserver;
use shared_types::{RejectionKind, RejectionReason};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// `reason` label for events refused at the transport boundary.
pub const DROPPED_LABEL: &str = "transport_rejected";

/// Running message totals.
#[derive(Debug, Default)]
pub struct GatewayStats {
    received: AtomicU64,
    validated: AtomicU64,
    rejected: AtomicU64,
    rejected_by_kind: [AtomicU64; RejectionKind::ALL.len()],
    dropped: AtomicU64,
    unavailable: AtomicU64,
    forwarded: AtomicU64,
    backend_failures: AtomicU64,
    store_errors: AtomicU64,
}

/// Point-in-time copy of the totals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StatsSnapshot {
    pub received: u64,
    pub validated: u64,
    pub rejected: u64,
    pub dropped: u64,
    pub unavailable: u64,
    pub forwarded: u64,
    pub backend_failures: u64,
    pub store_errors: u64,
}

impl GatewayStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// One transport event arrived.
    pub fn record_received(&self) {
        self.received.fetch_add(1, Ordering::Relaxed);
        MESSAGES_RECEIVED.inc();
    }

    /// The event was refused before validation (bad topic, no identity).
    /// Counted as a rejection.
    pub fn record_dropped(&self) {
        self.rejected.fetch_add(1, Ordering::Relaxed);
        self.dropped.fetch_add(1, Ordering::Relaxed);
        MESSAGES_REJECTED.with_label_values(&[DROPPED_LABEL]).inc();
    }

    /// Every validation attempt hit a credential store outage.
    pub fn record_unavailable(&self) {
        self.unavailable.fetch_add(1, Ordering::Relaxed);
    }

    /// The backend answered a forwarded payload.
    pub fn record_forwarded(&self) {
        self.forwarded.fetch_add(1, Ordering::Relaxed);
        MESSAGES_FORWARDED.inc();
    }

    /// A forward attempt produced no backend response.
    pub fn record_backend_failure(&self) {
        self.backend_failures.fetch_add(1, Ordering::Relaxed);
        BACKEND_FAILURES.inc();
    }

    /// Rejections of one kind so far.
    pub fn rejected_of(&self, kind: RejectionKind) -> u64 {
        self.rejected_by_kind[kind.index()].load(Ordering::Relaxed)
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            received: self.received.load(Ordering::Relaxed),
            validated: self.validated.load(Ordering::Relaxed),
            rejected: self.rejected.load(Ordering::Relaxed),
            dropped: self.dropped.load(Ordering::Relaxed),
            unavailable: self.unavailable.load(Ordering::Relaxed),
            forwarded: self.forwarded.load(Ordering::Relaxed),
            backend_failures: self.backend_failures.load(Ordering::Relaxed),
            store_errors: self.store_errors.load(Ordering::Relaxed),
        }
    }
}

impl ValidationObserver for GatewayStats {
    fn on_accepted(&self, _device_id: &str) {
        self.validated.fetch_add(1, Ordering::Relaxed);
        MESSAGES_VALIDATED.inc();
    }

    fn on_rejected(&self, reason: &RejectionReason) {
        let kind = reason.kind();
        self.rejected.fetch_add(1, Ordering::Relaxed);
        self.rejected_by_kind[kind.index()].fetch_add(1, Ordering::Relaxed);
        MESSAGES_REJECTED.with_label_values(&[kind.as_str()]).inc();
    }

    fn on_infrastructure_error(&self) {
        self.store_errors.fetch_add(1, Ordering::Relaxed);
        CREDENTIAL_STORE_ERRORS.inc();
    }

    fn on_validation_time(&self, elapsed: Duration) {
        VALIDATION_DURATION.observe(elapsed.as_secs_f64());
    }
}

impl fmt::Display for StatsSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Received: {} | Validated: {} | Rejected: {} | Forwarded: {}",
            self.received, self.validated, self.rejected, self.forwarded
        )
    }
}
