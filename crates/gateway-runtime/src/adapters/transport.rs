//! # Transport Boundary
//!
//! The transport pushes `TransportEvent`s onto a bounded channel; worker
//! tasks consume them.
//!
//! ## Line-Framed Ingress
//!
//! One JSON object per line:
//!
//! ```text
//! {"peer_identity": "sensor_001", "topic": "device/sensor_001/data", "message": "{...}"}
//! ```
//!
//! `peer_identity` is what the transport's mutual-TLS handshake
//! authenticated. It may be omitted when the broker binds each device
//! certificate to its own topic; the identity is then read from the topic.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio::sync::{mpsc, watch};
use tracing::{debug, info, warn};

/// Topic prefix devices publish under.
pub const TOPIC_PREFIX: &str = "device";
/// Topic suffix for inbound data.
pub const DATA_SUFFIX: &str = "data";
/// Topic suffix for backend replies.
pub const RESPONSE_SUFFIX: &str = "response";

/// One inbound message as delivered by the transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportEvent {
    /// Handshake-authenticated sender, if the transport provides one.
    pub peer_identity: Option<String>,
    /// Topic the message arrived on.
    pub topic: String,
    /// Undecoded message body.
    pub raw: Vec<u8>,
}

/// Wire frame for the line-framed ingress and egress.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransportFrame {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub peer_identity: Option<String>,
    pub topic: String,
    pub message: String,
}

impl From<TransportFrame> for TransportEvent {
    fn from(frame: TransportFrame) -> Self {
        Self {
            peer_identity: frame.peer_identity,
            topic: frame.topic,
            raw: frame.message.into_bytes(),
        }
    }
}

/// Transport-level failures. These never reach the validation pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    #[error("Invalid topic format: '{0}'")]
    InvalidTopic(String),

    #[error("No peer identity for topic '{0}'")]
    MissingIdentity(String),

    #[error("Invalid frame: {0}")]
    InvalidFrame(String),
}

/// Extracts the device id from a three-segment `device/{id}/data` topic.
pub fn device_id_from_topic(topic: &str) -> Result<&str, TransportError> {
    let parts: Vec<&str> = topic.split('/').collect();
    match parts.as_slice() {
        [_, device_id, _] if !device_id.is_empty() => Ok(*device_id),
        _ => Err(TransportError::InvalidTopic(topic.to_string())),
    }
}

/// Topic a device publishes data on.
pub fn data_topic(device_id: &str) -> String {
    format!("{TOPIC_PREFIX}/{device_id}/{DATA_SUFFIX}")
}

/// Topic a device listens on for backend replies.
pub fn response_topic(device_id: &str) -> String {
    format!("{TOPIC_PREFIX}/{device_id}/{RESPONSE_SUFFIX}")
}

impl TransportEvent {
    /// The identity to bind the message to.
    ///
    /// Prefers the handshake identity; falls back to the topic when
    /// `topic_fallback` is enabled.
    pub fn resolve_peer_identity(&self, topic_fallback: bool) -> Result<String, TransportError> {
        match &self.peer_identity {
            Some(identity) if !identity.is_empty() => Ok(identity.clone()),
            _ if topic_fallback => device_id_from_topic(&self.topic).map(str::to_string),
            _ => Err(TransportError::MissingIdentity(self.topic.clone())),
        }
    }
}

/// Decodes one ingress line.
pub fn parse_frame(line: &str) -> Result<TransportFrame, TransportError> {
    serde_json::from_str(line).map_err(|e| TransportError::InvalidFrame(e.to_string()))
}

/// Reads frames line by line and pushes them onto the ingress channel.
///
/// Blank and undecodable lines are skipped. Returns the number of events
/// enqueued when the reader reaches EOF, the channel closes, or shutdown is
/// signalled.
pub async fn run_line_ingress<R>(
    reader: R,
    tx: mpsc::Sender<TransportEvent>,
    mut shutdown: watch::Receiver<bool>,
) -> std::io::Result<u64>
where
    R: AsyncBufRead + Unpin,
{
    let mut lines = reader.lines();
    let mut enqueued = 0u64;

    loop {
        let line = tokio::select! {
            line = lines.next_line() => line?,
            _ = shutdown.changed() => {
                info!("[ingress] Shutdown signal received");
                break;
            }
        };
        let Some(line) = line else {
            debug!("[ingress] Input closed");
            break;
        };
        if line.trim().is_empty() {
            continue;
        }

        match parse_frame(&line) {
            Ok(frame) => {
                if tx.send(frame.into()).await.is_err() {
                    warn!("[ingress] Worker channel closed");
                    break;
                }
                enqueued += 1;
            }
            Err(e) => warn!(error = %e, "[ingress] Dropping frame"),
        }
    }

    Ok(enqueued)
}
