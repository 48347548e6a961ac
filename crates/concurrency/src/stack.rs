//! Transaction stack
//!
//! Nested transactions are kept in a `Vec`, innermost last. Frame `i`
//! branched from frame `i - 1`, frame 0 from the store. Only the top frame
//! is ever written or ended; frames below it are frozen until it is gone,
//! which is what keeps a nested merge from conflicting with its parent.
//!
//! Misuse (ending a frame that is not the top, writing with no frame) is a
//! defect in the caller and panics.

use std::sync::Arc;

use snapkv_core::{ReadView, TxnId};
use snapkv_storage::Store;
use tracing::trace;

use crate::merge::{merge_into_store, ApplyResult, CommitError};
use crate::snapshot::{ChangeSet, SnapshotChain};
use crate::transaction::Transaction;

/// Arena of open, nested transactions rooted at one store
#[derive(Debug)]
pub struct TransactionStack {
    store: Arc<Store>,
    frames: Vec<Transaction>,
}

impl TransactionStack {
    /// Empty stack over `store`
    pub fn new(store: Arc<Store>) -> Self {
        TransactionStack {
            store,
            frames: Vec::new(),
        }
    }

    /// The root store
    pub fn store(&self) -> &Arc<Store> {
        &self.store
    }

    /// Number of open transactions
    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    /// Whether no transaction is open
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Open a transaction branching from the current top (or the store)
    pub fn begin(&mut self, id: TxnId) {
        trace!(target: "snapkv::txn", txn = %id, depth = self.frames.len(), "push");
        self.frames.push(Transaction::new(id));
    }

    /// Innermost open transaction
    pub fn top(&self) -> Option<&Transaction> {
        self.frames.last()
    }

    /// Innermost open transaction, mutably
    pub fn top_mut(&mut self) -> Option<&mut Transaction> {
        self.frames.last_mut()
    }

    /// Read view through every open transaction down to the store
    pub fn view(&self) -> SnapshotChain<'_, Transaction> {
        SnapshotChain::new(&self.store, &self.frames)
    }

    /// Value of `key` as the innermost transaction sees it
    pub fn get(&self, key: &str) -> Option<String> {
        self.view().get(key)
    }

    /// Count of `value` as the innermost transaction sees it
    pub fn count(&self, value: &str) -> usize {
        self.view().count(value)
    }

    /// Write (`Some`) or delete (`None`) `key` in the innermost transaction
    ///
    /// # Panics
    ///
    /// Panics if no transaction is open.
    pub fn write(&mut self, key: &str, value: Option<String>) {
        let Some((top, below)) = self.frames.split_last_mut() else {
            panic!("protocol violation: write to {key} with no open transaction");
        };
        let parent = SnapshotChain::new(&self.store, &*below);
        top.snapshot_mut().write(&parent, key, value);
    }

    /// Remove and return the innermost transaction, which must be `id`
    ///
    /// # Panics
    ///
    /// Panics if the stack is empty or `id` is not at the top.
    pub fn end(&mut self, id: TxnId) -> Transaction {
        match self.frames.last() {
            Some(top) if top.id() == id => {}
            Some(top) => panic!(
                "protocol violation: ending {id} but {} is at the top of the stack",
                top.id()
            ),
            None => panic!("protocol violation: ending {id} with no open transaction"),
        }
        trace!(target: "snapkv::txn", txn = %id, depth = self.frames.len(), "pop");
        match self.frames.pop() {
            Some(txn) => txn,
            None => unreachable!("top checked above"),
        }
    }

    /// Merge an ended transaction's changes into the new top, or the store
    pub fn merge_down(&mut self, changes: ChangeSet) -> Result<ApplyResult, CommitError> {
        match self.frames.split_last_mut() {
            Some((top, below)) => {
                let parent = SnapshotChain::new(&self.store, &*below);
                top.snapshot_mut().absorb(&parent, changes)
            }
            None => merge_into_store(&self.store, changes),
        }
    }

    /// Drop `id` and every transaction opened above it, without merging
    ///
    /// Returns how many transactions were dropped; 0 if `id` is not open.
    pub fn discard_from(&mut self, id: TxnId) -> usize {
        match self.frames.iter().position(|txn| txn.id() == id) {
            Some(pos) => {
                let discarded = self.frames.len() - pos;
                self.frames.truncate(pos);
                trace!(target: "snapkv::txn", txn = %id, discarded, "discard");
                discarded
            }
            None => 0,
        }
    }
}
