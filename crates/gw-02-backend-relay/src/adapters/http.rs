//! # HTTP Backend Relay
//!
//! reqwest-based `BackendRelay`. The device id is inserted as a single,
//! percent-encoded path segment, so an id cannot alter the request path.

use crate::domain::config::{RelayConfig, DEVICE_ID_PLACEHOLDER};
use crate::domain::entities::BackendResponse;
use crate::domain::errors::RelayError;
use crate::ports::BackendRelay;
use async_trait::async_trait;
use reqwest::Url;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, info, warn};

const SEGMENT_MARKER: &str = "__gw_device_id__";

/// Posts payloads as JSON to the configured backend.
#[derive(Debug, Clone)]
pub struct HttpBackendRelay {
    client: reqwest::Client,
    base: Url,
    template: String,
}

impl HttpBackendRelay {
    /// Builds a relay, validating the URL template up front.
    ///
    /// # Errors
    ///
    /// - `RelayError::InvalidUrlTemplate` if the template does not parse or
    ///   lacks a `{device_id}` path segment.
    /// - `RelayError::Client` if the HTTP client cannot be created.
    pub fn new(config: &RelayConfig) -> Result<Self, RelayError> {
        let invalid = |reason: &str| RelayError::InvalidUrlTemplate {
            template: config.url_template.clone(),
            reason: reason.to_string(),
        };

        let base = Url::parse(&config.url_template.replace(DEVICE_ID_PLACEHOLDER, SEGMENT_MARKER))
            .map_err(|e| invalid(&e.to_string()))?;
        let has_segment = base
            .path_segments()
            .is_some_and(|mut segments| segments.any(|s| s == SEGMENT_MARKER));
        if !has_segment {
            return Err(invalid("missing {device_id} path segment"));
        }

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| RelayError::Client(e.to_string()))?;

        Ok(Self {
            client,
            base,
            template: config.url_template.clone(),
        })
    }

    /// The configured template, as given.
    pub fn template(&self) -> &str {
        &self.template
    }

    /// Resolves the endpoint for one device.
    ///
    /// Only the `{device_id}` segment is replaced; the rest of the template
    /// path keeps its original encoding.
    ///
    /// # Errors
    ///
    /// - `RelayError::UnroutableDeviceId` for `""`, `"."` and `".."`, which
    ///   URL path normalisation would drop or collapse.
    /// - `RelayError::InvalidUrlTemplate` if the base URL cannot carry a path.
    pub fn endpoint(&self, device_id: &str) -> Result<Url, RelayError> {
        if matches!(device_id, "" | "." | "..") {
            return Err(RelayError::UnroutableDeviceId(device_id.to_string()));
        }
        let segment = self.encode_segment(device_id)?;

        let path = self
            .base
            .path()
            .split('/')
            .map(|s| if s == SEGMENT_MARKER { segment.as_str() } else { s })
            .collect::<Vec<_>>()
            .join("/");

        let mut url = self.base.clone();
        url.set_path(&path);
        Ok(url)
    }

    /// Percent-encodes `device_id` as one path segment, `/`, `?`, `#` and
    /// `%` included.
    fn encode_segment(&self, device_id: &str) -> Result<String, RelayError> {
        let mut scratch = self.base.clone();
        scratch
            .path_segments_mut()
            .map_err(|()| RelayError::InvalidUrlTemplate {
                template: self.template.clone(),
                reason: "URL cannot be a base".to_string(),
            })?
            .clear()
            .push(device_id);
        Ok(scratch.path().trim_start_matches('/').to_string())
    }
}

#[async_trait]
impl BackendRelay for HttpBackendRelay {
    async fn forward(
        &self,
        device_id: &str,
        payload: &Value,
    ) -> Result<BackendResponse, RelayError> {
        let url = self.endpoint(device_id)?;
        info!(device_id = %device_id, url = %url, "[gw-02] Forwarding payload to backend");
        debug!(payload = %payload, "[gw-02] Payload");

        let response = self
            .client
            .post(url.clone())
            .json(payload)
            .send()
            .await
            .map_err(|e| classify(&url, e))?;

        let status = response.status().as_u16();
        let body = response.text().await.map_err(|e| classify(&url, e))?;

        info!(device_id = %device_id, status, "[gw-02] Backend responded");
        debug!(body = %body, "[gw-02] Response body");
        Ok(BackendResponse { status, body })
    }
}

fn classify(url: &Url, error: reqwest::Error) -> RelayError {
    if error.is_timeout() {
        warn!(url = %url, "[gw-02] Backend request timed out");
        RelayError::Timeout {
            url: url.to_string(),
        }
    } else {
        warn!(url = %url, error = %error, "[gw-02] Backend request failed");
        RelayError::Transport {
            url: url.to_string(),
            reason: error.to_string(),
        }
    }
}
