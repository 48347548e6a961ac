//! Interpreter protocol
//!
//! Commands drive an explicit transaction stack:
//!
//! | Command | Empty stack | Non-empty stack |
//! |---------|-------------|-----------------|
//! | `Begin` | push over the store | push over the top |
//! | `Get`/`Count`/`Set`/`Delete` | autocommit: begin, apply, commit, end | apply to the top |
//! | `Commit`/`Rollback` | `No transaction` | set outcome, pop, merge if committed |
//!
//! The interpreter lives behind the database's confinement mutex; holding
//! the guard is the only way to observe or change the stack.

use std::sync::Arc;

use snapkv_concurrency::TransactionStack;
use snapkv_core::{Command, SnapResult};
use snapkv_storage::Store;
use tracing::debug;

use crate::output::Output;
use crate::transaction::{run, settle, Env, TransactionScope};

/// Stack state of the interpreter protocol
#[derive(Debug)]
pub(crate) struct Interpreter {
    stack: TransactionStack,
}

impl Interpreter {
    pub(crate) fn new(store: Arc<Store>) -> Self {
        Interpreter {
            stack: TransactionStack::new(store),
        }
    }

    pub(crate) fn depth(&self) -> usize {
        self.stack.depth()
    }

    /// Execute one command; `env` must not carry the confinement lock
    pub(crate) fn execute(&mut self, command: Command, env: Env<'_>) -> SnapResult<Output> {
        match command {
            Command::Begin => {
                let id = env.coordinator.begin();
                self.stack.begin(id);
                Ok(Output::Done)
            }
            Command::Commit | Command::Rollback => {
                let Some(top) = self.stack.top_mut() else {
                    debug!(target: "snapkv::txn", command = command.name(), "No transaction");
                    env.log.publish(Output::NoTransaction.to_string());
                    return Ok(Output::NoTransaction);
                };
                if command == Command::Commit {
                    top.commit();
                } else {
                    top.rollback();
                }
                let id = top.id();
                settle(&mut self.stack, id, env)?;
                Ok(Output::Done)
            }
            general => match self.stack.top().map(|txn| txn.id()) {
                Some(id) => TransactionScope::new(&mut self.stack, id, env).perform(&general),
                None => run(&mut self.stack, env, |scope| -> SnapResult<Output> {
                    let output = scope.perform(&general)?;
                    scope.commit();
                    Ok(output)
                })?,
            },
        }
    }
}
