//! # In-Memory Credential Store
//!
//! Device secrets held in process memory. The gateway loads it from the
//! credentials file at startup; tests register devices directly.

use crate::domain::errors::CredentialStoreError;
use crate::ports::outbound::CredentialStore;
use async_trait::async_trait;
use parking_lot::RwLock;
use shared_types::{DeviceCredential, SharedSecret};
use std::collections::HashMap;

/// Credential store backed by a `HashMap` behind a read-write lock.
#[derive(Debug, Default)]
pub struct InMemoryCredentialStore {
    secrets: RwLock<HashMap<String, SharedSecret>>,
}

impl InMemoryCredentialStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a store from a list of credentials. Later duplicates win.
    pub fn from_credentials(credentials: impl IntoIterator<Item = DeviceCredential>) -> Self {
        let store = Self::new();
        for credential in credentials {
            store.insert(credential);
        }
        store
    }

    /// Registers or replaces the secret for `device_id`.
    pub fn register(&self, device_id: impl Into<String>, secret: impl Into<SharedSecret>) {
        self.secrets.write().insert(device_id.into(), secret.into());
    }

    /// Registers a credential.
    pub fn insert(&self, credential: DeviceCredential) {
        let DeviceCredential {
            device_id,
            shared_secret,
        } = credential;
        self.secrets.write().insert(device_id, shared_secret);
    }

    /// Number of registered devices.
    #[must_use]
    pub fn len(&self) -> usize {
        self.secrets.read().len()
    }

    /// Whether no device is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.secrets.read().is_empty()
    }
}

#[async_trait]
impl CredentialStore for InMemoryCredentialStore {
    async fn lookup(&self, device_id: &str) -> Result<Option<SharedSecret>, CredentialStoreError> {
        Ok(self.secrets.read().get(device_id).cloned())
    }
}
