//! # Device Entities
//!
//! Credentials provisioned out-of-band before a device sends anything.

use std::fmt;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Key material shared between one device and the gateway.
///
/// The bytes are wiped when the value is dropped and are never printed.
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct SharedSecret(Vec<u8>);

impl SharedSecret {
    /// Wraps raw key bytes.
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self(bytes.into())
    }

    /// Raw key bytes, for keying the MAC.
    pub fn expose(&self) -> &[u8] {
        &self.0
    }

    /// Length of the key in bytes.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if the key is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<&str> for SharedSecret {
    /// Secrets stored as text are keyed by their UTF-8 bytes.
    fn from(value: &str) -> Self {
        Self::new(value.as_bytes())
    }
}

impl From<String> for SharedSecret {
    fn from(value: String) -> Self {
        Self::new(value.into_bytes())
    }
}

impl fmt::Debug for SharedSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SharedSecret(<redacted {} bytes>)", self.0.len())
    }
}

/// A device identity paired with its shared secret.
///
/// `device_id` must match the transport-layer peer identity exactly.
#[derive(Debug, Clone)]
pub struct DeviceCredential {
    /// Opaque, unique device identifier.
    pub device_id: String,
    /// Secret known only to the device and the gateway.
    pub shared_secret: SharedSecret,
}

impl DeviceCredential {
    /// Creates a credential.
    pub fn new(device_id: impl Into<String>, shared_secret: impl Into<SharedSecret>) -> Self {
        Self {
            device_id: device_id.into(),
            shared_secret: shared_secret.into(),
        }
    }
}
