//! # Response Publisher
//!
//! Sends backend replies back to devices on `device/{id}/response`.

use crate::adapters::transport::TransportFrame;
use async_trait::async_trait;
use thiserror::Error;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio::sync::Mutex;

/// Publish failures.
#[derive(Debug, Error)]
pub enum PublishError {
    #[error("Failed to encode response frame: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("Failed to write response frame: {0}")]
    Io(#[from] std::io::Error),
}

/// Outbound side of the transport.
#[async_trait]
pub trait ResponsePublisher: Send + Sync {
    /// Publishes `body` on `topic`.
    async fn publish(&self, topic: &str, body: &str) -> Result<(), PublishError>;
}

/// Writes one JSON frame per line to any async writer (stdout in the binary).
pub struct LinePublisher<W> {
    writer: Mutex<W>,
}

impl<W: AsyncWrite + Unpin + Send> LinePublisher<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer: Mutex::new(writer),
        }
    }

    /// Returns the underlying writer.
    pub fn into_inner(self) -> W {
        self.writer.into_inner()
    }
}

#[async_trait]
impl<W: AsyncWrite + Unpin + Send> ResponsePublisher for LinePublisher<W> {
    async fn publish(&self, topic: &str, body: &str) -> Result<(), PublishError> {
        let frame = TransportFrame {
            peer_identity: None,
            topic: topic.to_string(),
            message: body.to_string(),
        };
        let mut line = serde_json::to_vec(&frame)?;
        line.push(b'\n');

        let mut writer = self.writer.lock().await;
        writer.write_all(&line).await?;
        writer.flush().await?;
        Ok(())
    }
}
