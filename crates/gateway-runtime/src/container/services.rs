//! Builds the gateway services from a `GatewayConfig`.

use crate::adapters::{
    load_credential_store, CredentialFileError, GatewayStats, ResponsePublisher,
};
use crate::container::config::{ConfigError, GatewayConfig};
use crate::handlers::EventHandler;
use gw_01_message_validation::{InMemoryCredentialStore, MessageValidationService};
use gw_02_backend_relay::{BackendRelay, HttpBackendRelay, RelayError};
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};

/// The validator type the gateway binary runs.
pub type GatewayValidator = MessageValidationService<Arc<InMemoryCredentialStore>>;

/// Errors assembling the gateway.
#[derive(Debug, Error)]
pub enum ContainerError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Validation(#[from] gw_01_message_validation::ConfigError),

    #[error(transparent)]
    Credentials(#[from] CredentialFileError),

    #[error(transparent)]
    Relay(#[from] RelayError),
}

/// Long-lived gateway services.
pub struct GatewayContainer {
    pub config: GatewayConfig,
    pub credentials: Arc<InMemoryCredentialStore>,
    pub validator: Arc<GatewayValidator>,
    pub relay: Arc<dyn BackendRelay>,
    pub stats: Arc<GatewayStats>,
}

impl GatewayContainer {
    /// Validates `config`, loads credentials and builds the HTTP relay.
    pub fn new(config: GatewayConfig) -> Result<Self, ContainerError> {
        config.validate()?;

        let credentials = match &config.credentials.path {
            Some(path) => load_credential_store(path)?,
            None => {
                warn!("No credentials file configured; every device will be rejected as unknown");
                InMemoryCredentialStore::new()
            }
        };
        let relay = HttpBackendRelay::new(&config.backend)?;

        Self::with_parts(config, Arc::new(credentials), Arc::new(relay))
    }

    /// Builds the container around an existing store and relay.
    pub fn with_parts(
        config: GatewayConfig,
        credentials: Arc<InMemoryCredentialStore>,
        relay: Arc<dyn BackendRelay>,
    ) -> Result<Self, ContainerError> {
        let stats = Arc::new(GatewayStats::new());
        let validator = MessageValidationService::new(
            config.validation.clone(),
            Arc::clone(&credentials),
        )?
        .with_observer(stats.clone());

        info!(
            devices = credentials.len(),
            timestamp_tolerance_secs = config.validation.timestamp_tolerance_secs,
            replay_cache_capacity = config.validation.replay_cache_capacity,
            backend = %config.backend.url_template,
            "[gateway] Services initialized"
        );

        Ok(Self {
            config,
            credentials,
            validator: Arc::new(validator),
            relay,
            stats,
        })
    }

    /// An event handler publishing replies through `publisher`.
    pub fn handler(
        &self,
        publisher: Arc<dyn ResponsePublisher>,
    ) -> EventHandler<Arc<InMemoryCredentialStore>> {
        EventHandler::new(
            Arc::clone(&self.validator),
            Arc::clone(&self.relay),
            publisher,
            Arc::clone(&self.stats),
            self.config.ingress.clone(),
            self.config.retry.clone(),
        )
    }
}
