//! Database struct and the two transaction protocols
//!
//! ## Transaction API
//!
//! The Database provides two ways to execute transactions:
//!
//! 1. **Closure API**: `db.with_transaction(|scope| { ... })`
//!    - The block runs on the caller's thread against a private snapshot
//!    - Merged into the store only if the block called `scope.commit()`
//!    - Nest with `scope.with_transaction(|inner| { ... })`
//!
//! 2. **Interpreter API**: `db.execute(command)`
//!    - `Begin`/`Commit`/`Rollback` drive an explicit stack
//!    - Other commands apply to the top of the stack, or autocommit
//!
//! ## Confinement
//!
//! The interpreter's stack lives in a `parking_lot::Mutex`. Every interpreter
//! command holds it for its whole duration, and every structured merge into
//! the store takes it too, so merges are linearized. Structured bodies never
//! take it.

pub mod config;
mod interpreter;

pub use config::{SnapConfig, CONFIG_FILE_NAME};
pub(crate) use interpreter::Interpreter;

use std::sync::Arc;

use parking_lot::Mutex;
use snapkv_concurrency::TransactionStack;
use snapkv_core::{Command, SnapResult};
use snapkv_storage::Store;
use tracing::{info, warn};

use crate::coordinator::{TransactionCoordinator, TransactionMetrics};
use crate::log::{LogStream, ResultLog};
use crate::output::Output;
use crate::transaction::{next_database_id, run, BodyGuard, Env, TransactionScope};

/// In-memory transactional key-value database
///
/// Thread-safe: share it behind an `Arc` and call either protocol from any
/// number of threads.
pub struct Database {
    id: u64,
    store: Arc<Store>,
    interpreter: Mutex<Interpreter>,
    log: ResultLog,
    coordinator: TransactionCoordinator,
    config: SnapConfig,
}

impl Database {
    /// Create a database with the default configuration
    pub fn in_memory() -> Arc<Self> {
        Arc::new(Self::build(SnapConfig::default()))
    }

    /// Create a database from a configuration
    ///
    /// # Errors
    ///
    /// Returns `SnapError::Config` if the configuration is invalid.
    pub fn new(config: SnapConfig) -> SnapResult<Arc<Self>> {
        config.validate()?;
        Ok(Arc::new(Self::build(config)))
    }

    fn build(config: SnapConfig) -> Self {
        let store = Arc::new(Store::with_latency(config.io_latency()));
        info!(
            target: "snapkv::txn",
            log_capacity = config.log_capacity,
            io_latency_ms = config.io_latency_ms,
            "Database created"
        );
        Database {
            id: next_database_id(),
            interpreter: Mutex::new(Interpreter::new(Arc::clone(&store))),
            log: ResultLog::new(config.log_capacity),
            coordinator: TransactionCoordinator::new(),
            store,
            config,
        }
    }

    /// Configuration the database was created with
    pub fn config(&self) -> &SnapConfig {
        &self.config
    }

    /// The root store
    pub fn store(&self) -> &Arc<Store> {
        &self.store
    }

    /// Take the result log consumer; `None` after the first call
    pub fn subscribe(&self) -> Option<LogStream> {
        self.log.subscribe()
    }

    /// Result log entries dropped because the queue was full
    pub fn dropped_log_entries(&self) -> u64 {
        self.log.dropped()
    }

    /// Transaction counters for both protocols
    pub fn metrics(&self) -> TransactionMetrics {
        self.coordinator.metrics()
    }

    /// Number of transactions open on the interpreter stack
    pub fn depth(&self) -> usize {
        self.interpreter.lock().depth()
    }

    /// Run `block` in a new transaction branched from the store
    ///
    /// The block's return value is passed through. Its writes reach the
    /// store only if it called `scope.commit()` (last call wins over
    /// `rollback()`). A panic in the block discards the transaction and
    /// resumes unwinding.
    ///
    /// # Errors
    ///
    /// Returns `SnapError::Conflict` if the merge found a key changed since
    /// this transaction first wrote it; nothing was applied.
    ///
    /// # Panics
    ///
    /// Panics with a protocol violation if called from inside a body already
    /// running on this database and thread. Nest with
    /// [`TransactionScope::with_transaction`] instead.
    pub fn with_transaction<R, F>(&self, block: F) -> SnapResult<R>
    where
        F: FnOnce(&mut TransactionScope<'_>) -> R,
    {
        let _body = BodyGuard::enter(self.id);
        let mut stack = TransactionStack::new(Arc::clone(&self.store));
        let env = Env {
            log: &self.log,
            coordinator: &self.coordinator,
            confinement: Some(&self.interpreter),
        };
        run(&mut stack, env, block)
    }

    /// Execute one interpreter command, returning its textual result
    ///
    /// Engine failures (merge conflicts) become `Error: <message>` results
    /// and are appended to the result log.
    pub fn execute(&self, command: Command) -> String {
        match self.try_execute(command) {
            Ok(output) => output.to_string(),
            Err(e) => {
                let message = format!("Error: {}", e);
                warn!(target: "snapkv::txn", error = %e, "Command failed");
                self.log.publish(message.clone());
                message
            }
        }
    }

    /// Execute one interpreter command, returning the typed result
    ///
    /// # Errors
    ///
    /// Returns `SnapError::Conflict` if a `Commit` (or an autocommitted
    /// write) could not be merged; the transaction is discarded.
    pub fn try_execute(&self, command: Command) -> SnapResult<Output> {
        let env = Env {
            log: &self.log,
            coordinator: &self.coordinator,
            confinement: None,
        };
        self.interpreter.lock().execute(command, env)
    }
}

impl std::fmt::Debug for Database {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Database")
            .field("keys", &self.store.len())
            .field("config", &self.config)
            .field("metrics", &self.coordinator.metrics())
            .finish()
    }
}
