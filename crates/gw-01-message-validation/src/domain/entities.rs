//! # Validation Entities

use serde_json::Value;
use shared_types::DeviceMessage;

/// A message that passed every check.
///
/// The signature is dropped; only what the forwarding path needs is kept.
#[derive(Debug, Clone, PartialEq)]
pub struct AcceptedMessage {
    /// Verified sender, equal to the transport peer identity.
    pub device_id: String,
    /// Nonce now recorded in the device's replay window.
    pub message_id: String,
    /// Device-asserted timestamp that passed the freshness check.
    pub timestamp: i64,
    /// Decoded payload, ready for forwarding.
    pub payload: Value,
}

impl From<DeviceMessage> for AcceptedMessage {
    fn from(message: DeviceMessage) -> Self {
        Self {
            device_id: message.device_id,
            message_id: message.message_id,
            timestamp: message.timestamp,
            payload: message.payload,
        }
    }
}
