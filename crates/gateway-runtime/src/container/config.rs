//! # Gateway Configuration
//!
//! Unified configuration for the validation pipeline, backend relay,
//! credential source, ingress and retry behaviour.
//!
//! ## Sources (later wins)
//!
//! 1. Built-in defaults
//! 2. TOML file (path from `--config` or `GW_CONFIG`)
//! 3. `GW_*` environment variables
//!
//! The merged result is validated before anything is started.

use gw_01_message_validation::ValidationConfig;
use gw_02_backend_relay::RelayConfig;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Complete gateway configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct GatewayConfig {
    /// Validation pipeline configuration.
    pub validation: ValidationConfig,
    /// Backend relay configuration.
    pub backend: RelayConfig,
    /// Credential source configuration.
    pub credentials: CredentialsConfig,
    /// Transport ingress configuration.
    pub ingress: IngressConfig,
    /// Retry configuration for credential store outages.
    pub retry: RetryConfig,
}

/// Where device secrets come from.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct CredentialsConfig {
    /// TOML file of `[[devices]]` entries. No devices are known when unset.
    pub path: Option<PathBuf>,
}

/// Ingress channel and worker pool sizing.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct IngressConfig {
    /// Bounded capacity of the transport event channel.
    pub channel_capacity: usize,
    /// Number of validation worker tasks.
    pub workers: usize,
    /// Take the peer identity from a `device/{id}/data` topic when the
    /// transport supplies none.
    pub topic_identity_fallback: bool,
}

impl Default for IngressConfig {
    fn default() -> Self {
        Self {
            channel_capacity: 1024,
            workers: 4,
            topic_identity_fallback: true,
        }
    }
}

/// Exponential backoff for retryable failures.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Total attempts, including the first.
    pub max_attempts: u32,
    /// Delay before the second attempt, in milliseconds.
    pub initial_backoff_ms: u64,
    /// Upper bound for any single delay, in milliseconds.
    pub max_backoff_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_backoff_ms: 100,
            max_backoff_ms: 2_000,
        }
    }
}

impl RetryConfig {
    /// Delay after the given failed attempt (1-based), doubling each time.
    pub fn backoff(&self, attempt: u32) -> Duration {
        let factor = 1u64 << attempt.saturating_sub(1).min(20);
        let millis = self
            .initial_backoff_ms
            .saturating_mul(factor)
            .min(self.max_backoff_ms);
        Duration::from_millis(millis)
    }
}

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("Failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The configuration file is not valid TOML for this schema.
    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    /// An environment override could not be parsed.
    #[error("Invalid value '{value}' for {key}")]
    InvalidValue { key: &'static str, value: String },

    /// Validation settings are unusable.
    #[error(transparent)]
    Validation(#[from] gw_01_message_validation::ConfigError),

    /// A sizing or retry setting is zero.
    #[error("{0} must be greater than zero")]
    Zero(&'static str),
}

impl GatewayConfig {
    /// Parses a TOML document. Missing sections and keys keep their defaults.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    /// Reads a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    /// Loads defaults, the optional file, then process environment overrides,
    /// and validates the result.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let env_path = std::env::var_os("GW_CONFIG").map(PathBuf::from);
        let mut config = match path.or(env_path.as_deref()) {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_overrides(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Applies `GW_*` overrides from an arbitrary variable lookup.
    ///
    /// | Variable | Field |
    /// |----------|-------|
    /// | `GW_TIMESTAMP_TOLERANCE_SECS` | `validation.timestamp_tolerance_secs` |
    /// | `GW_REPLAY_CACHE_CAPACITY` | `validation.replay_cache_capacity` |
    /// | `GW_BACKEND_URL` | `backend.url_template` |
    /// | `GW_BACKEND_TIMEOUT_SECS` | `backend.timeout_secs` |
    /// | `GW_CREDENTIALS_FILE` | `credentials.path` |
    /// | `GW_CHANNEL_CAPACITY` | `ingress.channel_capacity` |
    /// | `GW_WORKERS` | `ingress.workers` |
    /// | `GW_TOPIC_IDENTITY_FALLBACK` | `ingress.topic_identity_fallback` |
    /// | `GW_RETRY_ATTEMPTS` | `retry.max_attempts` |
    /// | `GW_RETRY_BACKOFF_MS` | `retry.initial_backoff_ms` |
    pub fn apply_overrides(
        &mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<(), ConfigError> {
        fn parse<T: std::str::FromStr>(key: &'static str, value: String) -> Result<T, ConfigError> {
            value
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidValue { key, value })
        }

        if let Some(v) = lookup("GW_TIMESTAMP_TOLERANCE_SECS") {
            self.validation.timestamp_tolerance_secs = parse("GW_TIMESTAMP_TOLERANCE_SECS", v)?;
        }
        if let Some(v) = lookup("GW_REPLAY_CACHE_CAPACITY") {
            self.validation.replay_cache_capacity = parse("GW_REPLAY_CACHE_CAPACITY", v)?;
        }
        if let Some(v) = lookup("GW_BACKEND_URL") {
            self.backend.url_template = v;
        }
        if let Some(v) = lookup("GW_BACKEND_TIMEOUT_SECS") {
            self.backend.timeout_secs = parse("GW_BACKEND_TIMEOUT_SECS", v)?;
        }
        if let Some(v) = lookup("GW_CREDENTIALS_FILE") {
            self.credentials.path = Some(PathBuf::from(v));
        }
        if let Some(v) = lookup("GW_CHANNEL_CAPACITY") {
            self.ingress.channel_capacity = parse("GW_CHANNEL_CAPACITY", v)?;
        }
        if let Some(v) = lookup("GW_WORKERS") {
            self.ingress.workers = parse("GW_WORKERS", v)?;
        }
        if let Some(v) = lookup("GW_TOPIC_IDENTITY_FALLBACK") {
            self.ingress.topic_identity_fallback = parse("GW_TOPIC_IDENTITY_FALLBACK", v)?;
        }
        if let Some(v) = lookup("GW_RETRY_ATTEMPTS") {
            self.retry.max_attempts = parse("GW_RETRY_ATTEMPTS", v)?;
        }
        if let Some(v) = lookup("GW_RETRY_BACKOFF_MS") {
            self.retry.initial_backoff_ms = parse("GW_RETRY_BACKOFF_MS", v)?;
        }
        Ok(())
    }

    /// Rejects settings the gateway cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.validation.validate()?;
        if self.ingress.channel_capacity == 0 {
            return Err(ConfigError::Zero("ingress.channel_capacity"));
        }
        if self.ingress.workers == 0 {
            return Err(ConfigError::Zero("ingress.workers"));
        }
        if self.retry.max_attempts == 0 {
            return Err(ConfigError::Zero("retry.max_attempts"));
        }
        if self.backend.timeout_secs == 0 {
            return Err(ConfigError::Zero("backend.timeout_secs"));
        }
        Ok(())
    }
}
