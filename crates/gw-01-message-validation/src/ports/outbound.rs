//! # Outbound Ports (Driven Ports / SPI)
//!
//! Dependencies the validation pipeline needs from the outside world.

use crate::domain::errors::CredentialStoreError;
use async_trait::async_trait;
use shared_types::{RejectionReason, SharedSecret};
use std::sync::Arc;
use std::time::Duration;

/// Source of per-device shared secrets.
///
/// The pipeline holds no lock while awaiting a lookup, so network-backed
/// stores are fine.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Looks up the secret registered for `device_id`.
    ///
    /// # Errors
    ///
    /// `CredentialStoreError::Unavailable` when the store cannot answer.
    /// An unknown device is `Ok(None)`, not an error.
    async fn lookup(&self, device_id: &str) -> Result<Option<SharedSecret>, CredentialStoreError>;
}

#[async_trait]
impl<S: CredentialStore + ?Sized> CredentialStore for Arc<S> {
    async fn lookup(&self, device_id: &str) -> Result<Option<SharedSecret>, CredentialStoreError> {
        (**self).lookup(device_id).await
    }
}

/// Time source trait for testability.
pub trait TimeSource: Send + Sync {
    /// Current Unix time in seconds.
    fn now(&self) -> i64;
}

/// Receives pipeline events for statistics and metrics.
///
/// Every method defaults to a no-op.
pub trait ValidationObserver: Send + Sync {
    /// A message entered the pipeline.
    fn on_received(&self) {}

    /// A message passed every check.
    fn on_accepted(&self, _device_id: &str) {}

    /// A message was rejected.
    fn on_rejected(&self, _reason: &RejectionReason) {}

    /// The credential store could not answer.
    fn on_infrastructure_error(&self) {}

    /// Wall time spent in one `validate` call.
    fn on_validation_time(&self, _elapsed: Duration) {}
}

/// Observer that ignores every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl ValidationObserver for NoopObserver {}
