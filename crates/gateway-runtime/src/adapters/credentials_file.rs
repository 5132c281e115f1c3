//! # Credentials File Adapter
//!
//! Loads device secrets from a TOML file into an `InMemoryCredentialStore`.
//!
//! ```toml
//! [[devices]]
//! device_id = "sensor_001"
//! shared_secret = "supersecretkey123"
//! ```
//!
//! Secrets are UTF-8 text and are used as raw HMAC key bytes.

use gw_01_message_validation::InMemoryCredentialStore;
use serde::Deserialize;
use shared_types::DeviceCredential;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;
use zeroize::Zeroizing;

#[derive(Deserialize)]
struct CredentialsFile {
    #[serde(default)]
    devices: Vec<DeviceEntry>,
}

#[derive(Deserialize)]
struct DeviceEntry {
    device_id: String,
    shared_secret: String,
}

/// Errors loading the credentials file.
#[derive(Debug, Error)]
pub enum CredentialFileError {
    #[error("Failed to read credentials file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse credentials file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Device '{0}' is listed more than once")]
    DuplicateDevice(String),

    #[error("Device entry has an empty device_id")]
    EmptyDeviceId,

    #[error("Device '{0}' has an empty shared_secret")]
    EmptySecret(String),
}

/// Parses credentials from TOML text.
pub fn parse_credentials(text: &str) -> Result<Vec<DeviceCredential>, CredentialFileError> {
    let file: CredentialsFile = toml::from_str(text)?;
    let mut seen = HashSet::new();
    let mut credentials = Vec::with_capacity(file.devices.len());

    for entry in file.devices {
        if entry.device_id.is_empty() {
            return Err(CredentialFileError::EmptyDeviceId);
        }
        if entry.shared_secret.is_empty() {
            return Err(CredentialFileError::EmptySecret(entry.device_id));
        }
        if !seen.insert(entry.device_id.clone()) {
            return Err(CredentialFileError::DuplicateDevice(entry.device_id));
        }
        credentials.push(DeviceCredential::new(entry.device_id, entry.shared_secret));
    }
    Ok(credentials)
}

/// Reads the file at `path` into a credential store.
pub fn load_credential_store(path: &Path) -> Result<InMemoryCredentialStore, CredentialFileError> {
    let text = Zeroizing::new(std::fs::read_to_string(path).map_err(|source| {
        CredentialFileError::Io {
            path: path.to_path_buf(),
            source,
        }
    })?);
    let credentials = parse_credentials(&text)?;
    let store = InMemoryCredentialStore::from_credentials(credentials);
    info!(path = %path.display(), devices = store.len(), "Loaded device credentials");
    Ok(store)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_parse_devices() {
        let credentials = parse_credentials(
            r#"
            [[devices]]
            device_id = "sensor_001"
            shared_secret = "supersecretkey123"

            [[devices]]
            device_id = "sensor_002"
            shared_secret = "anothersecret456"
            "#,
        )
        .unwrap();
        assert_eq!(credentials.len(), 2);
        assert_eq!(credentials[0].device_id, "sensor_001");
        assert_eq!(credentials[0].shared_secret.expose(), b"supersecretkey123");
    }

    #[test]
    fn test_empty_file_has_no_devices() {
        assert!(parse_credentials("").unwrap().is_empty());
    }

    #[test]
    fn test_duplicate_rejected() {
        let err = parse_credentials(
            r#"
            [[devices]]
            device_id = "sensor_001"
            shared_secret = "a"
            [[devices]]
            device_id = "sensor_001"
            shared_secret = "b"
            "#,
        )
        .unwrap_err();
        assert!(matches!(err, CredentialFileError::DuplicateDevice(id) if id == "sensor_001"));
    }

    #[test]
    fn test_empty_secret_rejected() {
        let err = parse_credentials(
            "[[devices]]\ndevice_id = \"sensor_001\"\nshared_secret = \"\"\n",
        )
        .unwrap_err();
        assert!(matches!(err, CredentialFileError::EmptySecret(_)));
    }

    #[test]
    fn test_error_never_contains_secret() {
        let err = parse_credentials(
            "[[devices]]\ndevice_id = \"\"\nshared_secret = \"topsecret\"\n",
        )
        .unwrap_err();
        assert!(!err.to_string().contains("topsecret"));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "[[devices]]\ndevice_id = \"sensor_001\"\nshared_secret = \"supersecretkey123\""
        )
        .unwrap();
        let store = load_credential_store(file.path()).unwrap();
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_missing_file() {
        let err = load_credential_store(Path::new("/nonexistent/devices.toml")).unwrap_err();
        assert!(matches!(err, CredentialFileError::Io { .. }));
    }
}
