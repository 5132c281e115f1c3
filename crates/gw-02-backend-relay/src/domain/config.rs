//! # Relay Configuration

use serde::Deserialize;

/// Placeholder substituted with the device id in the URL template.
pub const DEVICE_ID_PLACEHOLDER: &str = "{device_id}";

/// Default backend endpoint.
pub const DEFAULT_URL_TEMPLATE: &str = "http://localhost:5000/device/{device_id}/data";

/// Backend relay settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct RelayConfig {
    /// Endpoint template; must contain `{device_id}` as a path segment.
    pub url_template: String,
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            url_template: DEFAULT_URL_TEMPLATE.to_string(),
            timeout_secs: 5,
        }
    }
}
