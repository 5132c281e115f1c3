//! # Error Types
//!
//! The rejection taxonomy for inbound device messages, and signer errors.
//!
//! Every rejection is a terminal verdict on one message. None of them is
//! retried by the gateway; a device must resend with a fresh timestamp and
//! nonce.

use thiserror::Error;

/// Why a message was rejected.
///
/// Variants carry audit detail. Signatures and secrets are never included.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RejectionReason {
    /// Not decodable, or a required field is missing, empty or mistyped.
    #[error("Malformed message: {detail}")]
    Malformed { detail: String },

    /// The envelope's `device_id` differs from the authenticated transport peer.
    #[error("Identity mismatch: device_id '{claimed}' != transport identity '{peer}'")]
    IdentityMismatch { claimed: String, peer: String },

    /// The timestamp is further than the tolerance from the gateway clock.
    #[error(
        "Timestamp {timestamp} out of range: {skew_secs}s from now ({now}), tolerance {tolerance_secs}s"
    )]
    StaleOrFutureTimestamp {
        timestamp: i64,
        now: i64,
        skew_secs: u64,
        tolerance_secs: u64,
    },

    /// The `message_id` was already accepted for this device.
    #[error("Replay detected: message_id {message_id} already seen")]
    ReplayDetected { message_id: String },

    /// No credential is registered for the device.
    #[error("Unknown device: {device_id}")]
    UnknownDevice { device_id: String },

    /// The MAC does not match the message contents.
    #[error("Invalid signature")]
    SignatureInvalid,
}

impl RejectionReason {
    /// Builds a `Malformed` rejection.
    pub fn malformed(detail: impl Into<String>) -> Self {
        Self::Malformed {
            detail: detail.into(),
        }
    }

    /// The detail-free kind of this rejection.
    #[must_use]
    pub fn kind(&self) -> RejectionKind {
        match self {
            Self::Malformed { .. } => RejectionKind::Malformed,
            Self::IdentityMismatch { .. } => RejectionKind::IdentityMismatch,
            Self::StaleOrFutureTimestamp { .. } => RejectionKind::StaleOrFutureTimestamp,
            Self::ReplayDetected { .. } => RejectionKind::ReplayDetected,
            Self::UnknownDevice { .. } => RejectionKind::UnknownDevice,
            Self::SignatureInvalid => RejectionKind::SignatureInvalid,
        }
    }
}

/// Rejection reason without its audit detail, for counting and labelling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RejectionKind {
    Malformed,
    IdentityMismatch,
    StaleOrFutureTimestamp,
    ReplayDetected,
    UnknownDevice,
    SignatureInvalid,
}

impl RejectionKind {
    /// All kinds, in pipeline order.
    pub const ALL: [RejectionKind; 6] = [
        RejectionKind::Malformed,
        RejectionKind::IdentityMismatch,
        RejectionKind::StaleOrFutureTimestamp,
        RejectionKind::ReplayDetected,
        RejectionKind::UnknownDevice,
        RejectionKind::SignatureInvalid,
    ];

    /// Stable snake_case label (metric labels, log fields).
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            RejectionKind::Malformed => "malformed",
            RejectionKind::IdentityMismatch => "identity_mismatch",
            RejectionKind::StaleOrFutureTimestamp => "stale_or_future_timestamp",
            RejectionKind::ReplayDetected => "replay_detected",
            RejectionKind::UnknownDevice => "unknown_device",
            RejectionKind::SignatureInvalid => "signature_invalid",
        }
    }

    /// Position in `ALL`.
    #[must_use]
    pub fn index(&self) -> usize {
        *self as usize
    }
}

/// Errors from the message signer.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SignerError {
    /// The payload cannot be represented as JSON.
    #[error("Malformed payload: {0}")]
    MalformedPayload(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_labels_unique() {
        let mut labels: Vec<&str> = RejectionKind::ALL.iter().map(|k| k.as_str()).collect();
        labels.sort_unstable();
        labels.dedup();
        assert_eq!(labels.len(), RejectionKind::ALL.len());
    }

    #[test]
    fn test_kind_index_matches_all() {
        for (i, kind) in RejectionKind::ALL.iter().enumerate() {
            assert_eq!(kind.index(), i);
        }
    }

    #[test]
    fn test_display_hides_nothing_sensitive() {
        let reason = RejectionReason::SignatureInvalid;
        assert_eq!(reason.to_string(), "Invalid signature");
        assert_eq!(reason.kind(), RejectionKind::SignatureInvalid);
    }

    #[test]
    fn test_identity_mismatch_display() {
        let reason = RejectionReason::IdentityMismatch {
            claimed: "sensor_001".into(),
            peer: "sensor_002".into(),
        };
        assert_eq!(
            reason.to_string(),
            "Identity mismatch: device_id 'sensor_001' != transport identity 'sensor_002'"
        );
    }
}
