//! # Relay Errors

use thiserror::Error;

/// Failures before a backend response was obtained.
#[derive(Debug, Error)]
pub enum RelayError {
    /// The URL template does not produce a valid URL.
    #[error("Invalid backend URL template '{template}': {reason}")]
    InvalidUrlTemplate { template: String, reason: String },

    /// The device id cannot be carried as a single path segment.
    #[error("Device id '{0}' cannot be used as a URL path segment")]
    UnroutableDeviceId(String),

    /// The HTTP client could not be built.
    #[error("HTTP client initialisation failed: {0}")]
    Client(String),

    /// The request did not complete within the timeout.
    #[error("Backend request to {url} timed out")]
    Timeout { url: String },

    /// Connection or protocol failure.
    #[error("Backend request to {url} failed: {reason}")]
    Transport { url: String, reason: String },
}
