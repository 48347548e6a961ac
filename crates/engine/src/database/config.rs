//! Database configuration via `snapkv.toml`
//!
//! Every field has a default, so an empty file (or no file) is a valid
//! configuration. Values are validated when a database is created.

use serde::{Deserialize, Serialize};
use std::path::Path;

use snapkv_core::{SnapError, SnapResult};
use snapkv_storage::IoLatency;

/// Config file name looked up by the CLI.
pub const CONFIG_FILE_NAME: &str = "snapkv.toml";

fn default_log_capacity() -> usize {
    1024
}

/// Database configuration loaded from `snapkv.toml`.
///
/// # Example
///
/// ```toml
/// # Undelivered result-log entries kept before new ones are dropped
/// log_capacity = 1024
///
/// # Simulated store latency upper bound in milliseconds (0 = off)
/// io_latency_ms = 0
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapConfig {
    /// Bound of the result-log queue. Must be positive.
    #[serde(default = "default_log_capacity")]
    pub log_capacity: usize,
    /// Upper bound of the random per-call store delay; 0 disables it.
    #[serde(default)]
    pub io_latency_ms: u64,
}

impl Default for SnapConfig {
    fn default() -> Self {
        Self {
            log_capacity: default_log_capacity(),
            io_latency_ms: 0,
        }
    }
}

impl SnapConfig {
    /// Returns the default config file content with comments.
    pub fn default_toml() -> &'static str {
        r#"# SnapKV configuration
#
# Result log capacity (default: 1024)
# Entries not yet read by the consumer are kept up to this bound;
# further entries are dropped with a warning.
log_capacity = 1024

# Simulated store latency (default: 0 = disabled)
# Each store read and write sleeps a random 1..=N milliseconds.
# Useful to widen race windows when experimenting with conflicts.
io_latency_ms = 0
"#
    }

    /// Parse and validate config from TOML text.
    ///
    /// # Errors
    ///
    /// Returns `SnapError::Config` if the text is not valid TOML for this
    /// structure or holds invalid values.
    pub fn from_toml_str(content: &str) -> SnapResult<Self> {
        let config: SnapConfig = toml::from_str(content)
            .map_err(|e| SnapError::config(format!("failed to parse config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Read and parse config from a file path.
    ///
    /// # Errors
    ///
    /// Returns `SnapError::Io` if the file cannot be read, `SnapError::Config`
    /// if it cannot be parsed or holds invalid values.
    pub fn from_file(path: &Path) -> SnapResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content).map_err(|e| match e {
            SnapError::Config { reason } => {
                SnapError::config(format!("{}: {}", path.display(), reason))
            }
            other => other,
        })
    }

    /// Check field values.
    pub fn validate(&self) -> SnapResult<()> {
        if self.log_capacity == 0 {
            return Err(SnapError::config("log_capacity must be greater than 0"));
        }
        Ok(())
    }

    /// Store latency described by `io_latency_ms`.
    pub fn io_latency(&self) -> IoLatency {
        IoLatency::from_millis(self.io_latency_ms)
    }
}
