//! # `DeviceMessage` Envelope
//!
//! The five-field wire shape every device publishes:
//!
//! ```text
//! {device_id, timestamp, message_id, payload, signature}
//! ```
//!
//! ## Compatibility
//!
//! - Field names and the MAC concatenation order are fixed by deployed devices.
//! - `timestamp` is integer seconds since the Unix epoch.
//! - `signature` is the lowercase hex HMAC-SHA256 over
//!   `device_id ‖ timestamp ‖ message_id ‖ canonical(payload)`.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A signed, timestamped device message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceMessage {
    /// Claimed sender. Must equal the transport peer identity.
    pub device_id: String,

    /// Device-asserted Unix timestamp (seconds).
    pub timestamp: i64,

    /// Per-device nonce used for replay detection.
    pub message_id: String,

    /// Opaque structured telemetry.
    pub payload: Value,

    /// Hex-encoded HMAC-SHA256 over the signed fields.
    pub signature: String,
}

impl DeviceMessage {
    /// Serializes the message to its wire form.
    pub fn to_wire(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_wire_field_names() {
        let message = DeviceMessage {
            device_id: "sensor_001".to_string(),
            timestamp: 1_700_000_000,
            message_id: "m-1".to_string(),
            payload: json!({"temperature": 22.5}),
            signature: "00".to_string(),
        };

        let wire: Value = serde_json::from_slice(&message.to_wire().unwrap()).unwrap();
        let object = wire.as_object().unwrap();

        assert_eq!(object.len(), 5);
        for field in ["device_id", "timestamp", "message_id", "payload", "signature"] {
            assert!(object.contains_key(field), "missing {field}");
        }
        assert_eq!(object["timestamp"].as_i64(), Some(1_700_000_000));
    }
}
