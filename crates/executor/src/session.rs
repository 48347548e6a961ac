//! Line-driven session over a [`Database`].
//!
//! A [`Session`] turns lines of user input into interpreter commands:
//!
//! 1. The line is parsed. A parse failure is reported and the database is
//!    never touched.
//! 2. Otherwise the line is echoed as `> <input>` and the command executed.
//!
//! Read results reach the presentation layer twice: as the submission's
//! result and as an entry on the database's result log.
//!
//! # Usage
//!
//! ```ignore
//! use snapkv_executor::{Database, Session, Submission};
//!
//! let session = Session::new(Database::in_memory());
//! session.submit("set foo 123");
//! match session.submit("get foo") {
//!     Submission::Executed { echo, result } => println!("{echo}\n{result}"),
//!     Submission::Rejected { error } => eprintln!("{error}"),
//! }
//! ```

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use snapkv_engine::Database;
use tracing::debug;

use crate::parse::parse;

/// Outcome of submitting one line
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Submission {
    /// The line did not parse; nothing was executed
    Rejected {
        /// Parser message, e.g. `Unknown command: fetch`
        error: String,
    },
    /// The line parsed and was executed
    Executed {
        /// `> ` followed by the submitted line
        echo: String,
        /// Textual result of the command
        result: String,
    },
}

impl Submission {
    /// Whether the line was executed
    pub fn is_executed(&self) -> bool {
        matches!(self, Submission::Executed { .. })
    }

    /// Command result, if the line was executed
    pub fn result(&self) -> Option<&str> {
        match self {
            Submission::Executed { result, .. } => Some(result),
            Submission::Rejected { .. } => None,
        }
    }
}

/// Drives a database from lines of text.
///
/// Sessions are cheap handles; any number may share one database and its
/// interpreter stack.
#[derive(Debug, Clone)]
pub struct Session {
    db: Arc<Database>,
}

impl Session {
    /// Create a session over `db`.
    pub fn new(db: Arc<Database>) -> Self {
        Session { db }
    }

    /// The database this session drives.
    pub fn database(&self) -> &Arc<Database> {
        &self.db
    }

    /// Parse and execute one line.
    pub fn submit(&self, line: &str) -> Submission {
        let input = line.trim();
        match parse(input) {
            Ok(command) => {
                let echo = format!("> {}", input);
                let result = self.db.execute(command);
                Submission::Executed { echo, result }
            }
            Err(e) => {
                debug!(target: "snapkv::txn", input, error = %e, "Input rejected");
                Submission::Rejected {
                    error: e.to_string(),
                }
            }
        }
    }
}
