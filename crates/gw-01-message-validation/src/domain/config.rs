//! # Validation Configuration

use serde::Deserialize;
use thiserror::Error;

/// Default freshness tolerance: 5 minutes either side of the gateway clock.
pub const DEFAULT_TIMESTAMP_TOLERANCE_SECS: u64 = 300;

/// Default number of accepted message ids remembered per device.
pub const DEFAULT_REPLAY_CACHE_CAPACITY: usize = 1000;

/// Tunables for the validation pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ValidationConfig {
    /// Maximum `|now - timestamp|` in seconds.
    pub timestamp_tolerance_secs: u64,
    /// Per-device replay window size (N).
    pub replay_cache_capacity: usize,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            timestamp_tolerance_secs: DEFAULT_TIMESTAMP_TOLERANCE_SECS,
            replay_cache_capacity: DEFAULT_REPLAY_CACHE_CAPACITY,
        }
    }
}

impl ValidationConfig {
    /// Rejects settings the pipeline cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.replay_cache_capacity == 0 {
            return Err(ConfigError::ZeroReplayCapacity);
        }
        Ok(())
    }
}

/// Invalid validation settings.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// A zero-sized window would admit every replay.
    #[error("replay_cache_capacity must be greater than zero")]
    ZeroReplayCapacity,
}
