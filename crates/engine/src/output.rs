//! Output enum for command execution results.
//!
//! Every command produces exactly one output. `Display` renders the textual
//! result the interpreter protocol returns.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Successful command execution results.
///
/// | Command | Output |
/// |---------|--------|
/// | `Get`, key present | `Value` |
/// | `Get`, key absent | `Missing` |
/// | `Count` | `Count` |
/// | `Set`, `Delete`, `Begin` | `Done` |
/// | `Commit`, `Rollback` with an open transaction | `Done` |
/// | `Commit`, `Rollback` with no open transaction | `NoTransaction` |
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Output {
    /// The key's visible value
    Value(String),

    /// The key is absent or deleted
    Missing {
        /// The key that was read
        key: String,
    },

    /// Number of keys holding the counted value
    Count(usize),

    /// The command has no result
    Done,

    /// Commit or Rollback issued with no open transaction
    NoTransaction,
}

impl Output {
    /// Output of reading `key`
    pub fn read(key: &str, value: Option<String>) -> Self {
        match value {
            Some(value) => Output::Value(value),
            None => Output::Missing {
                key: key.to_string(),
            },
        }
    }

    /// Whether this output is appended to the result log
    pub fn is_logged(&self) -> bool {
        !matches!(self, Output::Done)
    }
}

impl fmt::Display for Output {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Output::Value(value) => f.write_str(value),
            Output::Missing { key } => write!(f, "Key {} not set", key),
            Output::Count(n) => write!(f, "{}", n),
            Output::Done => Ok(()),
            Output::NoTransaction => f.write_str("No transaction"),
        }
    }
}
