//! # Transport Event Handler
//!
//! Runs one inbound event through the gateway:
//!
//! ```text
//! TransportEvent ──→ resolve peer identity ──→ validate (retry on store outage)
//!                ──→ forward to backend ──→ publish reply on 200
//! ```

use crate::adapters::{
    response_topic, GatewayStats, ResponsePublisher, TransportError, TransportEvent,
};
use crate::container::config::{IngressConfig, RetryConfig};
use gateway_telemetry::REPLAY_CACHE_DEVICES;
use gw_01_message_validation::{
    AcceptedMessage, CredentialStore, MessageValidationApi, MessageValidationService,
    SystemTimeSource, TimeSource, ValidationError,
};
use gw_02_backend_relay::BackendRelay;
use shared_types::RejectionReason;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// What happened to one event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventOutcome {
    /// The event never reached validation.
    Dropped(TransportError),
    /// Validation rejected the message.
    Rejected(RejectionReason),
    /// The credential store stayed down for every attempt.
    Unavailable { attempts: u32 },
    /// The backend answered. `published` is set when the reply went out.
    Forwarded {
        device_id: String,
        status: u16,
        published: bool,
    },
    /// The message was valid but the backend produced no response.
    BackendFailed { device_id: String },
}

/// Processes transport events against shared gateway services.
pub struct EventHandler<C, T = SystemTimeSource>
where
    C: CredentialStore,
    T: TimeSource,
{
    validator: Arc<MessageValidationService<C, T>>,
    relay: Arc<dyn BackendRelay>,
    publisher: Arc<dyn ResponsePublisher>,
    stats: Arc<GatewayStats>,
    ingress: IngressConfig,
    retry: RetryConfig,
}

impl<C, T> Clone for EventHandler<C, T>
where
    C: CredentialStore,
    T: TimeSource,
{
    fn clone(&self) -> Self {
        Self {
            validator: Arc::clone(&self.validator),
            relay: Arc::clone(&self.relay),
            publisher: Arc::clone(&self.publisher),
            stats: Arc::clone(&self.stats),
            ingress: self.ingress.clone(),
            retry: self.retry.clone(),
        }
    }
}

impl<C, T> EventHandler<C, T>
where
    C: CredentialStore,
    T: TimeSource,
{
    pub fn new(
        validator: Arc<MessageValidationService<C, T>>,
        relay: Arc<dyn BackendRelay>,
        publisher: Arc<dyn ResponsePublisher>,
        stats: Arc<GatewayStats>,
        ingress: IngressConfig,
        retry: RetryConfig,
    ) -> Self {
        Self {
            validator,
            relay,
            publisher,
            stats,
            ingress,
            retry,
        }
    }

    pub fn stats(&self) -> &GatewayStats {
        &self.stats
    }

    /// Handles one event and logs the running totals.
    pub async fn handle(&self, event: TransportEvent) -> EventOutcome {
        let outcome = self.process(event).await;
        info!("[gateway] Stats - {}", self.stats.snapshot());
        outcome
    }

    async fn process(&self, event: TransportEvent) -> EventOutcome {
        self.stats.record_received();
        let peer_identity = match event.resolve_peer_identity(self.ingress.topic_identity_fallback)
        {
            Ok(identity) => identity,
            Err(e) => {
                warn!(topic = %event.topic, "[gateway] Dropping event: {}", e);
                self.stats.record_dropped();
                return EventOutcome::Dropped(e);
            }
        };
        debug!(peer = %peer_identity, topic = %event.topic, "[gateway] Event received");

        let accepted = match self.validate_with_retry(&peer_identity, &event.raw).await {
            Ok(accepted) => accepted,
            Err(outcome) => return outcome,
        };
        REPLAY_CACHE_DEVICES.set(self.validator.replay_cache().device_count() as i64);

        self.forward(accepted).await
    }

    async fn validate_with_retry(
        &self,
        peer_identity: &str,
        raw: &[u8],
    ) -> Result<AcceptedMessage, EventOutcome> {
        let max_attempts = self.retry.max_attempts.max(1);
        let mut attempt = 1;

        loop {
            match self.validator.validate(peer_identity, raw).await {
                Ok(accepted) => return Ok(accepted),
                Err(ValidationError::Rejected(reason)) => {
                    return Err(EventOutcome::Rejected(reason));
                }
                Err(e) if e.is_retryable() && attempt < max_attempts => {
                    let delay = self.retry.backoff(attempt);
                    warn!(
                        peer = %peer_identity,
                        attempt,
                        delay_ms = delay.as_millis() as u64,
                        "[gateway] Retrying after {}",
                        e
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => {
                    error!(peer = %peer_identity, attempts = attempt, "[gateway] Giving up: {}", e);
                    self.stats.record_unavailable();
                    return Err(EventOutcome::Unavailable { attempts: attempt });
                }
            }
        }
    }

    async fn forward(&self, accepted: AcceptedMessage) -> EventOutcome {
        let device_id = accepted.device_id;

        let response = match self.relay.forward(&device_id, &accepted.payload).await {
            Ok(response) => response,
            Err(e) => {
                self.stats.record_backend_failure();
                error!(device_id = %device_id, "[gateway] Backend forward failed: {}", e);
                return EventOutcome::BackendFailed { device_id };
            }
        };
        self.stats.record_forwarded();
        info!(device_id = %device_id, status = response.status, "[gateway] ✓ Forwarded to backend");

        let mut published = false;
        if response.is_deliverable() {
            let topic = response_topic(&device_id);
            match self.publisher.publish(&topic, &response.body).await {
                Ok(()) => {
                    published = true;
                    debug!(topic = %topic, "[gateway] Response published");
                }
                Err(e) => error!(topic = %topic, "[gateway] Failed to publish response: {}", e),
            }
        }

        EventOutcome::Forwarded {
            device_id,
            status: response.status,
            published,
        }
    }
}
