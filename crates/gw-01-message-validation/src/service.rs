//! # Message Validation Service
//!
//! Application service implementing `MessageValidationApi`.
//!
//! ## Pipeline
//!
//! | Step | Check          | Failure                  | Touches            |
//! |------|----------------|--------------------------|--------------------|
//! | 1    | parse/fields   | `Malformed`              | nothing            |
//! | 2    | identity       | `IdentityMismatch`       | nothing            |
//! | 3    | freshness      | `StaleOrFutureTimestamp` | clock              |
//! | 4    | replay         | `ReplayDetected`         | cache (read)       |
//! | 5    | authenticity   | `UnknownDevice`, `SignatureInvalid` | credential store |
//! | -    | record nonce   | `ReplayDetected` (lost race) | cache (write)  |
//!
//! The replay cache is written only after step 5 passes.

use crate::adapters::SystemTimeSource;
use crate::domain::checks::{check_freshness, check_identity, parse_message};
use crate::domain::config::{ConfigError, ValidationConfig};
use crate::domain::entities::AcceptedMessage;
use crate::domain::errors::ValidationError;
use crate::domain::replay_cache::ReplayCache;
use crate::ports::inbound::MessageValidationApi;
use crate::ports::outbound::{CredentialStore, NoopObserver, TimeSource, ValidationObserver};
use async_trait::async_trait;
use shared_types::{signature_prefix, verify_mac, DeviceMessage, RejectionReason};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Message Validation Service.
///
/// Generic over the credential store and clock so tests can pin time and
/// simulate store outages.
pub struct MessageValidationService<C: CredentialStore, T: TimeSource = SystemTimeSource> {
    config: ValidationConfig,
    credentials: C,
    clock: T,
    replay_cache: ReplayCache,
    observer: Arc<dyn ValidationObserver>,
}

impl<C: CredentialStore> MessageValidationService<C, SystemTimeSource> {
    /// Creates a service using the system clock.
    ///
    /// # Errors
    ///
    /// `ConfigError` if the configuration is unusable.
    pub fn new(config: ValidationConfig, credentials: C) -> Result<Self, ConfigError> {
        Self::with_clock(config, credentials, SystemTimeSource)
    }
}

impl<C: CredentialStore, T: TimeSource> MessageValidationService<C, T> {
    /// Creates a service with an explicit clock.
    ///
    /// # Errors
    ///
    /// `ConfigError` if the configuration is unusable.
    pub fn with_clock(
        config: ValidationConfig,
        credentials: C,
        clock: T,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            replay_cache: ReplayCache::new(config.replay_cache_capacity),
            config,
            credentials,
            clock,
            observer: Arc::new(NoopObserver),
        })
    }

    /// Attaches an observer for statistics and metrics.
    #[must_use]
    pub fn with_observer(mut self, observer: Arc<dyn ValidationObserver>) -> Self {
        self.observer = observer;
        self
    }

    /// Active configuration.
    pub fn config(&self) -> &ValidationConfig {
        &self.config
    }

    /// Anti-replay state, for inspection.
    pub fn replay_cache(&self) -> &ReplayCache {
        &self.replay_cache
    }

    async fn run_checks(
        &self,
        peer_identity: &str,
        raw: &[u8],
    ) -> Result<AcceptedMessage, ValidationError> {
        // 1. Parse & required fields
        let message = parse_message(raw)?;
        debug!(
            device_id = %message.device_id,
            message_id = %message.message_id,
            "[gw-01] Required fields present"
        );

        // 2. Identity binding
        check_identity(&message.device_id, peer_identity)?;

        // 3. Freshness
        let now = self.clock.now();
        let skew =
            check_freshness(message.timestamp, now, self.config.timestamp_tolerance_secs)?;
        debug!(
            device_id = %message.device_id,
            skew_secs = skew,
            tolerance_secs = self.config.timestamp_tolerance_secs,
            "[gw-01] Timestamp within tolerance"
        );

        // 4. Replay (read only; the window lock is released before the lookup)
        if self
            .replay_cache
            .is_replay(&message.device_id, &message.message_id)
        {
            return Err(replay(&message).into());
        }

        // 5. Authenticity
        let secret = self
            .credentials
            .lookup(&message.device_id)
            .await?
            .ok_or_else(|| RejectionReason::UnknownDevice {
                device_id: message.device_id.clone(),
            })?;

        if !verify_mac(
            &message.device_id,
            message.timestamp,
            &message.message_id,
            &message.payload,
            secret.expose(),
            &message.signature,
        ) {
            debug!(
                device_id = %message.device_id,
                signature = signature_prefix(&message.signature),
                "[gw-01] Signature mismatch"
            );
            return Err(RejectionReason::SignatureInvalid.into());
        }

        // Record; a concurrent duplicate may have won since step 4.
        if !self
            .replay_cache
            .record(&message.device_id, &message.message_id)
        {
            return Err(replay(&message).into());
        }

        Ok(AcceptedMessage::from(message))
    }
}

fn replay(message: &DeviceMessage) -> RejectionReason {
    RejectionReason::ReplayDetected {
        message_id: message.message_id.clone(),
    }
}

#[async_trait]
impl<C: CredentialStore, T: TimeSource> MessageValidationApi for MessageValidationService<C, T> {
    async fn validate(
        &self,
        peer_identity: &str,
        raw: &[u8],
    ) -> Result<AcceptedMessage, ValidationError> {
        let started = Instant::now();
        self.observer.on_received();

        let outcome = self.run_checks(peer_identity, raw).await;

        match &outcome {
            Ok(accepted) => {
                info!(
                    device_id = %accepted.device_id,
                    message_id = %accepted.message_id,
                    "[gw-01] ✓ Message validated"
                );
                self.observer.on_accepted(&accepted.device_id);
            }
            Err(ValidationError::Rejected(reason)) => {
                warn!(
                    peer = %peer_identity,
                    reason = reason.kind().as_str(),
                    "[gw-01] ✗ Message rejected: {}",
                    reason
                );
                self.observer.on_rejected(reason);
            }
            Err(error @ ValidationError::CredentialStoreUnavailable(_)) => {
                warn!(peer = %peer_identity, "[gw-01] {}", error);
                self.observer.on_infrastructure_error();
            }
        }

        self.observer.on_validation_time(started.elapsed());
        outcome
    }
}
