//! A simulated device that signs readings with its shared secret.

use crate::adapters::transport::{data_topic, TransportFrame};
use serde_json::Value;
use shared_types::{current_timestamp, sign_message, DeviceMessage, SharedSecret};
use uuid::Uuid;

/// Produces signed messages and ingress frames for one device.
pub struct SimulatedDevice {
    device_id: String,
    secret: SharedSecret,
    peer_identity: Option<String>,
}

impl SimulatedDevice {
    /// The transport identity defaults to the device id.
    pub fn new(device_id: impl Into<String>, secret: impl Into<SharedSecret>) -> Self {
        let device_id = device_id.into();
        Self {
            peer_identity: Some(device_id.clone()),
            device_id,
            secret: secret.into(),
        }
    }

    /// Overrides the identity written into frames. `None` leaves the
    /// gateway to derive it from the topic.
    pub fn with_peer_identity(mut self, peer_identity: Option<String>) -> Self {
        self.peer_identity = peer_identity;
        self
    }

    pub fn device_id(&self) -> &str {
        &self.device_id
    }

    /// Signs `payload` with the current time and a fresh v4 message id.
    pub fn sign(&self, payload: Value) -> DeviceMessage {
        self.sign_at(current_timestamp(), &Uuid::new_v4().to_string(), payload)
    }

    /// Signs `payload` with an explicit timestamp and message id.
    pub fn sign_at(&self, timestamp: i64, message_id: &str, payload: Value) -> DeviceMessage {
        sign_message(
            &self.device_id,
            timestamp,
            message_id,
            payload,
            self.secret.expose(),
        )
    }

    /// Wraps a message in an ingress frame on this device's data topic.
    pub fn frame(&self, message: &DeviceMessage) -> Result<TransportFrame, serde_json::Error> {
        Ok(TransportFrame {
            peer_identity: self.peer_identity.clone(),
            topic: data_topic(&self.device_id),
            message: serde_json::to_string(message)?,
        })
    }
}
