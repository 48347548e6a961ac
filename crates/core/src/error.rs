//! Error types for SnapKV
//!
//! This module defines the recoverable error types used throughout the system.
//! We use `thiserror` for automatic `Display` and `Error` trait implementations.
//!
//! Protocol violations (ending a transaction that is not at the top of its
//! stack, writing with no open transaction) are programming defects and panic
//! instead of producing a `SnapError`.

use crate::types::Version;
use std::io;
use thiserror::Error;

/// Result type alias for SnapKV operations
pub type SnapResult<T> = std::result::Result<T, SnapError>;

/// Error types for SnapKV
#[derive(Debug, Error)]
pub enum SnapError {
    /// A merge found a key whose parent version no longer matches the
    /// version the snapshot's write was based on
    #[error("Conflict on {key}: expected version {base_version}, found {current_version}")]
    Conflict {
        /// Conflicting key
        key: String,
        /// Version recorded at the first write within the snapshot
        base_version: Version,
        /// Version found in the parent at merge time
        current_version: Version,
    },

    /// Malformed command text; rejected before reaching the engine
    #[error("{reason}")]
    InvalidInput {
        /// Human-readable reason
        reason: String,
    },

    /// Configuration could not be parsed or holds invalid values
    #[error("Invalid configuration: {reason}")]
    Config {
        /// Human-readable reason
        reason: String,
    },

    /// I/O error (reading configuration files)
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl SnapError {
    /// Create an invalid input error
    pub fn invalid_input(reason: impl Into<String>) -> Self {
        SnapError::InvalidInput {
            reason: reason.into(),
        }
    }

    /// Create a configuration error
    pub fn config(reason: impl Into<String>) -> Self {
        SnapError::Config {
            reason: reason.into(),
        }
    }

    /// Whether this error is a merge conflict
    pub fn is_conflict(&self) -> bool {
        matches!(self, SnapError::Conflict { .. })
    }

    /// Whether this error is an input rejection
    pub fn is_invalid_input(&self) -> bool {
        matches!(self, SnapError::InvalidInput { .. })
    }
}
