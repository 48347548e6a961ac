//! SnapKV - In-memory key-value store with nested, snapshot-isolated transactions
//!
//! Every key carries a version. Transactions write into private snapshots
//! layered over the store; committing merges a snapshot into its parent after
//! checking that no key it wrote changed underneath it.
//!
//! # Quick Start
//!
//! ```ignore
//! use snapkv::{Command, Database};
//!
//! let db = Database::in_memory();
//!
//! // Structured transactions nest by closure
//! db.with_transaction(|txn| {
//!     txn.set("user:123", "Alice");
//!     txn.with_transaction(|inner| {
//!         inner.delete("user:123");
//!         inner.rollback();
//!     })?;
//!     txn.commit();
//!     Ok::<_, snapkv::SnapError>(())
//! })??;
//!
//! // Interpreter commands drive an explicit stack
//! db.execute(Command::Begin);
//! db.execute(Command::Set { key: "user:123".into(), value: "Bob".into() });
//! db.execute(Command::Commit);
//! ```
//!
//! # Architecture
//!
//! Both transaction protocols share one primitive: snapshot plus two-phase
//! merge. Internal crates (storage, concurrency, engine) are not re-exported
//! beyond the types the executor API names.

// Re-export the public API from snapkv-executor
pub use snapkv_executor::*;
