//! TransactionScope and the begin/end sequence shared by both protocols
//!
//! ## Lifecycle
//!
//! ```text
//! 1. coordinator.begin()        allocate id, count as started
//! 2. stack.begin(id)            push a frame over the current top
//! 3. block(&mut scope)          reads, writes, commit()/rollback()
//! 4. stack.end(id)              pop the frame (must be the top)
//! 5. IF successful: merge_down  into the new top, or the store
//!    ELSE: drop the snapshot
//! ```
//!
//! A panic in step 3 skips 4-5: the frame is discarded, the transaction is
//! counted as rolled back and the panic continues unwinding.

use std::panic::{self, AssertUnwindSafe};

use parking_lot::Mutex;
use snapkv_concurrency::{Transaction, TransactionStack};
use snapkv_core::{Command, SnapError, SnapResult, TxnId};
use tracing::{debug, info, warn};

use crate::coordinator::TransactionCoordinator;
use crate::database::Interpreter;
use crate::log::ResultLog;
use crate::output::Output;

/// Database services a scope needs
#[derive(Clone, Copy)]
pub(crate) struct Env<'a> {
    pub(crate) log: &'a ResultLog,
    pub(crate) coordinator: &'a TransactionCoordinator,
    /// Confinement lock taken around merges into the store; `None` when
    /// the caller already holds it
    pub(crate) confinement: Option<&'a Mutex<Interpreter>>,
}

/// Operation surface of one open transaction
///
/// `get` and `count` return the textual result and append it to the
/// database's result log. `commit` and `rollback` only set the outcome;
/// the merge happens when the transaction ends.
pub struct TransactionScope<'a> {
    stack: &'a mut TransactionStack,
    id: TxnId,
    env: Env<'a>,
}

impl<'a> TransactionScope<'a> {
    pub(crate) fn new(stack: &'a mut TransactionStack, id: TxnId, env: Env<'a>) -> Self {
        TransactionScope { stack, id, env }
    }

    /// Id of this transaction
    pub fn id(&self) -> TxnId {
        self.id
    }

    /// Nesting depth, 1 for a transaction branched from the store
    pub fn depth(&self) -> usize {
        self.stack.depth()
    }

    /// Read `key`: its value, or `Key <key> not set`
    pub fn get(&self, key: &str) -> String {
        self.report(self.read(key))
    }

    /// Count keys whose visible value equals `value`, as decimal text
    pub fn count(&self, value: &str) -> String {
        self.report(self.tally(value))
    }

    /// Write `key`; returns the empty result
    pub fn set(&mut self, key: &str, value: &str) -> String {
        self.stack.write(key, Some(value.to_string()));
        String::new()
    }

    /// Delete `key`; returns the empty result
    pub fn delete(&mut self, key: &str) -> String {
        self.stack.write(key, None);
        String::new()
    }

    /// Mark this transaction to be merged when it ends
    pub fn commit(&mut self) -> String {
        self.transaction_mut().commit();
        String::new()
    }

    /// Mark this transaction to be discarded when it ends
    pub fn rollback(&mut self) -> String {
        self.transaction_mut().rollback();
        String::new()
    }

    /// Apply one command to this transaction
    ///
    /// `Begin` is rejected; nested transactions are opened with
    /// [`with_transaction`](Self::with_transaction).
    pub fn perform(&mut self, command: &Command) -> SnapResult<Output> {
        let output = match command {
            Command::Get { key } => self.read(key),
            Command::Count { value } => self.tally(value),
            Command::Set { key, value } => {
                self.stack.write(key, Some(value.clone()));
                Output::Done
            }
            Command::Delete { key } => {
                self.stack.write(key, None);
                Output::Done
            }
            Command::Commit => {
                self.transaction_mut().commit();
                Output::Done
            }
            Command::Rollback => {
                self.transaction_mut().rollback();
                Output::Done
            }
            Command::Begin => {
                return Err(SnapError::invalid_input(
                    "Begin is not available inside a transaction scope",
                ))
            }
        };
        if output.is_logged() {
            self.env.log.publish(output.to_string());
        }
        Ok(output)
    }

    /// Run `block` in a transaction nested inside this one
    ///
    /// The nested snapshot branches from this transaction's current state.
    /// If the block commits, its writes merge into this transaction; this
    /// transaction still decides whether they reach the store.
    pub fn with_transaction<R, F>(&mut self, block: F) -> SnapResult<R>
    where
        F: FnOnce(&mut TransactionScope<'_>) -> R,
    {
        run(self.stack, self.env, block)
    }

    fn read(&self, key: &str) -> Output {
        Output::read(key, self.stack.get(key))
    }

    fn tally(&self, value: &str) -> Output {
        Output::Count(self.stack.count(value))
    }

    fn report(&self, output: Output) -> String {
        let text = output.to_string();
        self.env.log.publish(text.clone());
        text
    }

    fn transaction_mut(&mut self) -> &mut Transaction {
        let id = self.id;
        match self.stack.top_mut() {
            Some(txn) if txn.id() == id => txn,
            _ => panic!("protocol violation: {id} is not the innermost open transaction"),
        }
    }
}

/// Begin a transaction on `stack`, run `block` in it and end it
pub(crate) fn run<R, F>(stack: &mut TransactionStack, env: Env<'_>, block: F) -> SnapResult<R>
where
    F: FnOnce(&mut TransactionScope<'_>) -> R,
{
    let id = env.coordinator.begin();
    stack.begin(id);

    let outcome = {
        let mut scope = TransactionScope::new(&mut *stack, id, env);
        panic::catch_unwind(AssertUnwindSafe(|| block(&mut scope)))
    };

    match outcome {
        Ok(value) => settle(stack, id, env).map(|()| value),
        Err(payload) => {
            stack.discard_from(id);
            env.coordinator.record_rollback();
            warn!(target: "snapkv::txn", txn = %id, "Transaction body panicked, changes discarded");
            panic::resume_unwind(payload)
        }
    }
}

/// End transaction `id`, merging it if it was committed
///
/// On conflict the transaction is discarded and the error returned.
pub(crate) fn settle(stack: &mut TransactionStack, id: TxnId, env: Env<'_>) -> SnapResult<()> {
    let txn = stack.end(id);
    if !txn.is_successful() {
        env.coordinator.record_rollback();
        debug!(target: "snapkv::txn", txn = %id, depth = stack.depth(), "Transaction rolled back");
        return Ok(());
    }

    let changes = txn.into_snapshot().into_changes();
    let merged = match env.confinement {
        Some(lock) if stack.is_empty() => {
            let _confined = lock.lock();
            stack.merge_down(changes)
        }
        _ => stack.merge_down(changes),
    };

    match merged {
        Ok(applied) => {
            env.coordinator.record_commit();
            info!(
                target: "snapkv::txn",
                txn = %id,
                depth = stack.depth(),
                written = applied.written,
                deleted = applied.deleted,
                "Transaction committed"
            );
            Ok(())
        }
        Err(e) => {
            env.coordinator.record_conflict();
            warn!(target: "snapkv::txn", txn = %id, error = %e, "Transaction aborted");
            Err(SnapError::from(e))
        }
    }
}
