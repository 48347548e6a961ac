//! Transaction scopes shared by both protocols
//!
//! A scope is the operation surface of one open transaction. The structured
//! protocol hands scopes to closures; the interpreter builds one per command
//! against the top of its stack.

mod nesting;
mod scope;

pub(crate) use nesting::{next_database_id, BodyGuard};
pub use scope::TransactionScope;
pub(crate) use scope::{run, settle, Env};
