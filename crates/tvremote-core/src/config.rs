//! Transport tunables, loadable from TOML.
//!
//! ```toml
//! [transport]
//! max_frame_len = 1048576
//! stop_grace_ms = 250
//! ```
//!
//! Every field has a serde default, so an empty table (or a missing one, when
//! embedded in a larger config) yields [`TransportConfig::default`].

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A file system I/O error occurred.
    #[error("I/O error accessing config at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The TOML content could not be parsed.
    #[error("failed to parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),

    /// A value parsed but is out of range.
    #[error("invalid config value for `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// Limits and timings for a [`crate::FrameTransport`] and the pairing framer.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TransportConfig {
    /// Largest frame body accepted or produced, in bytes.
    #[serde(default = "default_max_frame_len")]
    pub max_frame_len: usize,
    /// How long `stop()` waits for the receive task to exit, in milliseconds.
    #[serde(default = "default_stop_grace_ms")]
    pub stop_grace_ms: u64,
}

fn default_max_frame_len() -> usize {
    1024 * 1024
}
fn default_stop_grace_ms() -> u64 {
    250
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            max_frame_len: default_max_frame_len(),
            stop_grace_ms: default_stop_grace_ms(),
        }
    }
}

impl TransportConfig {
    pub fn stop_grace_period(&self) -> Duration {
        Duration::from_millis(self.stop_grace_ms)
    }

    /// Parses a standalone `TransportConfig` table and validates it.
    ///
    /// # Errors
    ///
    /// [`ConfigError::Parse`] for malformed TOML and [`ConfigError::Invalid`]
    /// for a zero `max_frame_len`.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: TransportConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Rejects values no transport can work with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_frame_len == 0 {
            return Err(ConfigError::Invalid {
                field: "max_frame_len",
                reason: "must be greater than zero".to_string(),
            });
        }
        if self.max_frame_len > u32::MAX as usize {
            return Err(ConfigError::Invalid {
                field: "max_frame_len",
                reason: format!("must fit the 4-byte length prefix (<= {})", u32::MAX),
            });
        }
        Ok(())
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
