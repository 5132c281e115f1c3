//! # Ports Layer

use crate::domain::entities::BackendResponse;
use crate::domain::errors::RelayError;
use async_trait::async_trait;
use serde_json::Value;

/// Destination for validated payloads.
#[async_trait]
pub trait BackendRelay: Send + Sync {
    /// Delivers `payload` on behalf of `device_id`.
    ///
    /// # Errors
    ///
    /// `RelayError` when no HTTP response was obtained. Non-2xx responses are
    /// returned as `Ok` and left to the caller to interpret.
    async fn forward(&self, device_id: &str, payload: &Value)
        -> Result<BackendResponse, RelayError>;
}
