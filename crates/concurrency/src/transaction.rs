//! Transaction: one snapshot plus its outcome flag
//!
//! `successful` starts `false` and only an explicit commit sets it. The flag
//! does not merge anything by itself; whoever ends the transaction reads it
//! and decides whether the snapshot is merged or dropped.

use snapkv_core::TxnId;

use crate::snapshot::Snapshot;

/// An open transaction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transaction {
    id: TxnId,
    snapshot: Snapshot,
    successful: bool,
}

impl Transaction {
    /// Open a transaction with an empty snapshot
    pub fn new(id: TxnId) -> Self {
        Transaction {
            id,
            snapshot: Snapshot::new(),
            successful: false,
        }
    }

    /// Transaction identifier
    pub fn id(&self) -> TxnId {
        self.id
    }

    /// The transaction's private snapshot
    pub fn snapshot(&self) -> &Snapshot {
        &self.snapshot
    }

    /// Mutable access to the snapshot
    pub fn snapshot_mut(&mut self) -> &mut Snapshot {
        &mut self.snapshot
    }

    /// Mark the transaction to be merged when it ends
    pub fn commit(&mut self) {
        self.successful = true;
    }

    /// Mark the transaction to be discarded when it ends
    pub fn rollback(&mut self) {
        self.successful = false;
    }

    /// Whether the last terminal call was a commit
    pub fn is_successful(&self) -> bool {
        self.successful
    }

    /// Consume the transaction, returning its snapshot
    pub fn into_snapshot(self) -> Snapshot {
        self.snapshot
    }
}

impl AsRef<Snapshot> for Transaction {
    fn as_ref(&self) -> &Snapshot {
        &self.snapshot
    }
}
