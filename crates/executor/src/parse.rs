//! Text → Command conversion.
//!
//! Input is whitespace-tokenized. The first token names the command and is
//! matched case-insensitively; the remaining tokens are arguments, kept
//! verbatim. Arguments beyond a command's arity are ignored.
//!
//! | Input | Command |
//! |-------|---------|
//! | `get <key>` | `Get` |
//! | `count <value>` | `Count` |
//! | `set <key> <value>` | `Set` |
//! | `delete <key>` | `Delete` |
//! | `begin` / `commit` / `rollback` | `Begin` / `Commit` / `Rollback` |

use snapkv_core::{Command, SnapError, SnapResult};

/// Command names accepted by [`parse`], in help order.
pub const COMMAND_NAMES: &[&str] = &["get", "count", "set", "delete", "begin", "commit", "rollback"];

/// Parse one line of input into a command.
///
/// # Errors
///
/// Returns `SnapError::InvalidInput` for blank input, an unknown command
/// name, or too few arguments.
pub fn parse(input: &str) -> SnapResult<Command> {
    let mut tokens = input.split_whitespace();
    let name = tokens
        .next()
        .ok_or_else(|| SnapError::invalid_input("Blank input"))?
        .to_lowercase();
    let args: Vec<&str> = tokens.collect();

    let command = match name.as_str() {
        "get" => {
            let [key, ..] = require::<1>("Get", &args)?;
            Command::Get { key: key.into() }
        }
        "count" => {
            let [value, ..] = require::<1>("Count", &args)?;
            Command::Count {
                value: value.into(),
            }
        }
        "set" => {
            let [key, value] = require::<2>("Set", &args)?;
            Command::Set {
                key: key.into(),
                value: value.into(),
            }
        }
        "delete" => {
            let [key, ..] = require::<1>("Delete", &args)?;
            Command::Delete { key: key.into() }
        }
        "begin" => Command::Begin,
        "commit" => Command::Commit,
        "rollback" => Command::Rollback,
        _ => return Err(SnapError::invalid_input(format!("Unknown command: {}", name))),
    };
    Ok(command)
}

/// First `N` arguments, or an arity error naming the command.
fn require<'a, const N: usize>(command: &str, args: &[&'a str]) -> SnapResult<[&'a str; N]> {
    match args.get(..N) {
        Some(head) => {
            let mut taken = [""; N];
            taken.copy_from_slice(head);
            Ok(taken)
        }
        None => Err(SnapError::invalid_input(format!(
            "{} command requires {} argument{}",
            command,
            N,
            if N == 1 { "" } else { "s" }
        ))),
    }
}
