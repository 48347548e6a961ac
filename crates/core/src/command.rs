//! Command enum defining every interpreter operation.
//!
//! Commands are the "instruction set" consumed by the interpreter protocol.
//! The set is closed: adding a variant forces every `match` over commands to
//! handle it.
//!
//! | Command | Kind | Result |
//! |---------|------|--------|
//! | `Get` | read | value, or `Key <k> not set` |
//! | `Count` | read | decimal count |
//! | `Set` | write | empty |
//! | `Delete` | write | empty |
//! | `Begin` | lifecycle | empty |
//! | `Commit` / `Rollback` | lifecycle | empty, or `No transaction` |

use serde::{Deserialize, Serialize};
use std::fmt;

/// A self-contained, serializable interpreter operation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub enum Command {
    /// Read a key.
    Get {
        /// Key to read
        key: String,
    },

    /// Count keys whose visible value equals `value`.
    Count {
        /// Value to count
        value: String,
    },

    /// Write a key.
    Set {
        /// Key to write
        key: String,
        /// New value
        value: String,
    },

    /// Delete a key.
    Delete {
        /// Key to delete
        key: String,
    },

    /// Open a (possibly nested) transaction.
    Begin,

    /// Mark the current transaction successful and end it.
    Commit,

    /// Mark the current transaction unsuccessful and end it.
    Rollback,
}

impl Command {
    /// Lower-case command name as typed by users
    pub fn name(&self) -> &'static str {
        match self {
            Command::Get { .. } => "get",
            Command::Count { .. } => "count",
            Command::Set { .. } => "set",
            Command::Delete { .. } => "delete",
            Command::Begin => "begin",
            Command::Commit => "commit",
            Command::Rollback => "rollback",
        }
    }

    /// Whether this command ends the current transaction
    pub fn ends_transaction(&self) -> bool {
        matches!(self, Command::Commit | Command::Rollback)
    }

    /// Whether this command only reads
    pub fn is_read(&self) -> bool {
        matches!(self, Command::Get { .. } | Command::Count { .. })
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Command::Get { key } | Command::Delete { key } => write!(f, "{} {}", self.name(), key),
            Command::Count { value } => write!(f, "{} {}", self.name(), value),
            Command::Set { key, value } => write!(f, "{} {} {}", self.name(), key, value),
            Command::Begin | Command::Commit | Command::Rollback => f.write_str(self.name()),
        }
    }
}
