//! Result log stream
//!
//! Every `get`/`count` result, the `No transaction` sentinel and interpreter
//! error messages are appended to one ordered queue that a presentation
//! layer drains on its own schedule.
//!
//! Producers never block: `try_send` either enqueues or the entry is dropped.
//! A full queue is reported with `warn!` and counted; a queue whose consumer
//! has gone away drops quietly.

use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::Mutex;
use tokio::sync::mpsc::{self, error::TryRecvError, error::TrySendError};
use tracing::{debug, warn};

/// Producer side of the result log, owned by the database
#[derive(Debug)]
pub struct ResultLog {
    sender: mpsc::Sender<String>,
    receiver: Mutex<Option<mpsc::Receiver<String>>>,
    dropped: AtomicU64,
}

impl ResultLog {
    /// Create a log holding at most `capacity` undelivered entries
    ///
    /// A capacity of 0 is raised to 1.
    pub fn new(capacity: usize) -> Self {
        let (sender, receiver) = mpsc::channel(capacity.max(1));
        ResultLog {
            sender,
            receiver: Mutex::new(Some(receiver)),
            dropped: AtomicU64::new(0),
        }
    }

    /// Append an entry without blocking
    pub fn publish(&self, entry: impl Into<String>) {
        match self.sender.try_send(entry.into()) {
            Ok(()) => {}
            Err(TrySendError::Full(entry)) => {
                let dropped = self.dropped.fetch_add(1, Ordering::Relaxed) + 1;
                warn!(target: "snapkv::log", %entry, dropped, "Result log full, entry dropped");
            }
            Err(TrySendError::Closed(entry)) => {
                debug!(target: "snapkv::log", %entry, "Result log closed, entry dropped");
            }
        }
    }

    /// Take the single consumer handle
    ///
    /// Returns `None` once the handle has been taken.
    pub fn subscribe(&self) -> Option<LogStream> {
        self.receiver
            .lock()
            .take()
            .map(|receiver| LogStream { receiver })
    }

    /// Entries dropped because the queue was full
    pub fn dropped(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }
}

/// Consumer side of the result log
///
/// The stream ends (`recv` returns `None`) after the database is dropped and
/// every queued entry has been read.
#[derive(Debug)]
pub struct LogStream {
    receiver: mpsc::Receiver<String>,
}

impl LogStream {
    /// Wait for the next entry from an async task
    pub async fn recv(&mut self) -> Option<String> {
        self.receiver.recv().await
    }

    /// Wait for the next entry from a plain thread
    ///
    /// # Panics
    ///
    /// Panics if called from within an async runtime.
    pub fn blocking_recv(&mut self) -> Option<String> {
        self.receiver.blocking_recv()
    }

    /// Next entry if one is queued
    pub fn try_recv(&mut self) -> Option<String> {
        match self.receiver.try_recv() {
            Ok(entry) => Some(entry),
            Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => None,
        }
    }

    /// Every entry currently queued, oldest first
    pub fn drain(&mut self) -> Vec<String> {
        std::iter::from_fn(|| self.try_recv()).collect()
    }
}
