//! # Validation Errors
//!
//! Two failure classes leave the pipeline:
//!
//! - `Rejected`: a permanent verdict on the message. Never retried.
//! - `CredentialStoreUnavailable`: the store could not answer. The message
//!   was not judged and the replay cache is untouched, so the caller may
//!   retry with backoff.

use shared_types::RejectionReason;
use thiserror::Error;

/// Errors a credential store may report.
///
/// A clean miss is not an error; stores return `Ok(None)` for it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CredentialStoreError {
    /// The backing store could not be reached or answered with a failure.
    #[error("Credential store unavailable: {0}")]
    Unavailable(String),
}

/// Outcome of a failed validation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// The message was judged and rejected.
    #[error(transparent)]
    Rejected(#[from] RejectionReason),

    /// Infrastructure failure while looking up the device credential.
    #[error("Credential store unavailable: {0}")]
    CredentialStoreUnavailable(String),
}

impl ValidationError {
    /// The rejection verdict, if the message was judged.
    #[must_use]
    pub fn rejection(&self) -> Option<&RejectionReason> {
        match self {
            ValidationError::Rejected(reason) => Some(reason),
            ValidationError::CredentialStoreUnavailable(_) => None,
        }
    }

    /// Whether resubmitting the same bytes may succeed.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, ValidationError::CredentialStoreUnavailable(_))
    }
}

impl From<CredentialStoreError> for ValidationError {
    fn from(error: CredentialStoreError) -> Self {
        match error {
            CredentialStoreError::Unavailable(detail) => {
                ValidationError::CredentialStoreUnavailable(detail)
            }
        }
    }
}
