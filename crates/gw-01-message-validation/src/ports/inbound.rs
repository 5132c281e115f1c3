//! # Inbound Ports (Driving Ports / API)

use crate::domain::entities::AcceptedMessage;
use crate::domain::errors::ValidationError;
use async_trait::async_trait;

/// Primary Message Validation API.
///
/// Implementations must be thread-safe; the gateway calls `validate` from
/// many worker tasks at once.
#[async_trait]
pub trait MessageValidationApi: Send + Sync {
    /// Runs the ordered checks against one inbound message.
    ///
    /// `peer_identity` is the identity the transport authenticated for the
    /// sender; `raw` is the undecoded message body.
    ///
    /// # Errors
    ///
    /// - `ValidationError::Rejected` with the first failing check's reason.
    /// - `ValidationError::CredentialStoreUnavailable` if the credential
    ///   lookup failed. The replay cache is unchanged in that case.
    async fn validate(
        &self,
        peer_identity: &str,
        raw: &[u8],
    ) -> Result<AcceptedMessage, ValidationError>;
}
