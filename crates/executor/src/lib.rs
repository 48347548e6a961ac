//! # SnapKV Executor
//!
//! The public API for SnapKV - an in-memory key-value store with nested,
//! snapshot-isolated transactions.
//!
//! This is the only crate users need to import. It provides:
//! - [`Database`] - The store plus its two transaction protocols
//! - [`parse`] - Text → [`Command`] conversion
//! - [`Session`] - Line-driven interpreter over a database
//!
//! ## Quick Start
//!
//! ```text
//! use snapkv_executor::{Command, Database};
//!
//! let db = Database::in_memory();
//!
//! // Structured protocol
//! db.with_transaction(|txn| {
//!     txn.set("user:123", "Alice");
//!     txn.commit();
//! })?;
//!
//! // Interpreter protocol
//! assert_eq!(db.execute(Command::Get { key: "user:123".into() }), "Alice");
//! ```
//!
//! ## Commands
//!
//! | Command | Result |
//! |---------|--------|
//! | `get <key>` | the value, or `Key <key> not set` |
//! | `count <value>` | number of keys holding the value |
//! | `set <key> <value>` | empty |
//! | `delete <key>` | empty |
//! | `begin` | empty |
//! | `commit` / `rollback` | empty, or `No transaction` |

#![warn(missing_docs)]

mod parse;
mod session;


// =============================================================================
// Public API - Everything users need is re-exported here
// =============================================================================

pub use parse::{parse, COMMAND_NAMES};
pub use session::{Session, Submission};

// Re-export core types so users don't need snapkv-core directly
pub use snapkv_core::{Command, SnapError, SnapResult, TxnId, Version};

// Re-export engine types so users don't need snapkv-engine directly
pub use snapkv_engine::{
    Database, LogStream, Output, SnapConfig, TransactionMetrics, TransactionScope,
    CONFIG_FILE_NAME,
};
