//! Database engine for SnapKV
//!
//! This crate orchestrates the lower layers:
//! - Database: owns the store, the interpreter stack and the result log
//! - Structured protocol: `with_transaction` closures with explicit nesting
//! - Interpreter protocol: `execute(Command)` against an explicit stack
//! - Transaction coordination: id allocation and lifecycle metrics
//! - Result log: bounded, non-blocking stream of read results
//!
//! Both protocols share only the snapshot + merge primitive. Neither ever
//! touches the other's stack.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod coordinator;
pub mod database;
pub mod log;
pub mod output;
pub mod transaction;

pub use coordinator::{TransactionCoordinator, TransactionMetrics};
pub use database::{Database, SnapConfig, CONFIG_FILE_NAME};
pub use log::{LogStream, ResultLog};
pub use output::Output;
pub use transaction::TransactionScope;
