//! REPL loop with rustyline.
//!
//! Interactive mode: prompt, meta-commands, history, TAB completion.
//! Pipe mode: read lines from stdin, execute each.

use std::io::{self, BufRead};

use rustyline::completion::{Completer, Pair};
use rustyline::error::ReadlineError;
use rustyline::highlight::Highlighter;
use rustyline::hint::Hinter;
use rustyline::validate::Validator;
use rustyline::{CompletionType, Config, Context, Editor, ExternalPrinter, Helper};

use snapkv_executor::COMMAND_NAMES;

use crate::state::SessionState;

const PROMPT: &str = "snapkv> ";

/// Meta-commands handled by the REPL itself.
const META_COMMANDS: &[&str] = &["help", "quit", "exit", "clear"];

/// Run the interactive REPL.
pub fn run_repl(state: &mut SessionState) -> Result<(), String> {
    let config = Config::builder()
        .history_ignore_space(true)
        .completion_type(CompletionType::List)
        .build();

    let mut rl: Editor<SnapHelper, _> =
        Editor::with_config(config).map_err(|e| format!("Failed to start REPL: {}", e))?;
    rl.set_helper(Some(SnapHelper));

    // Results arrive on another thread; print them above the prompt
    match rl.create_external_printer() {
        Ok(mut printer) => state.attach_printer(move |entry| {
            let _ = printer.print(entry);
        }),
        Err(_) => state.attach_printer(|entry| println!("{}", entry)),
    }

    let history_path = history_file();
    if let Some(ref path) = history_path {
        let _ = rl.load_history(path);
    }

    loop {
        match rl.readline(PROMPT) {
            Ok(line) => {
                let trimmed = line.trim();
                if trimmed.is_empty() {
                    continue;
                }

                let _ = rl.add_history_entry(trimmed);

                match trimmed {
                    "quit" | "exit" => break,
                    "help" => print_help(),
                    // ANSI clear screen
                    "clear" => print!("\x1B[2J\x1B[1;1H"),
                    _ => {
                        state.submit(trimmed);
                    }
                }
            }
            // Ctrl-C: just show a new prompt
            Err(ReadlineError::Interrupted) => continue,
            // Ctrl-D: exit
            Err(ReadlineError::Eof) => break,
            Err(err) => {
                eprintln!("(error) {:?}", err);
                break;
            }
        }
    }

    if let Some(ref path) = history_path {
        let _ = rl.save_history(path);
    }
    Ok(())
}

/// Run in pipe mode: read lines from stdin, execute each.
///
/// Blank lines and `#` comments are skipped. Returns exit code 1 if any line
/// was rejected.
pub fn run_pipe(state: &mut SessionState) -> i32 {
    state.attach_printer(|entry| println!("{}", entry));

    let stdin = io::stdin();
    let mut exit_code = 0;

    for line in stdin.lock().lines() {
        let line = match line {
            Ok(l) => l,
            Err(_) => break,
        };
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        if !state.submit(trimmed) {
            exit_code = 1;
        }
    }

    exit_code
}

fn history_file() -> Option<String> {
    std::env::var("HOME")
        .ok()
        .map(|h| format!("{}/.snapkv_history", h))
}

fn print_help() {
    println!("Available commands:");
    println!("  get <key>            Print the value of a key");
    println!("  count <value>        Count keys holding a value");
    println!("  set <key> <value>    Write a key");
    println!("  delete <key>         Delete a key");
    println!("  begin                Begin a (nested) transaction");
    println!("  commit               Commit the innermost transaction");
    println!("  rollback             Roll back the innermost transaction");
    println!();
    println!("Outside a transaction every command commits on its own.");
    println!();
    println!("Meta-commands:");
    println!("  help                 Show this help");
    println!("  quit / exit          Exit REPL");
    println!("  clear                Clear screen");
}

// =========================================================================
// TAB Completion
// =========================================================================

struct SnapHelper;

impl SnapHelper {
    fn candidates(prefix: &str) -> Vec<Pair> {
        let prefix = prefix.to_lowercase();
        COMMAND_NAMES
            .iter()
            .chain(META_COMMANDS)
            .filter(|cmd| cmd.starts_with(&prefix))
            .map(|cmd| Pair {
                display: cmd.to_string(),
                replacement: cmd.to_string(),
            })
            .collect()
    }
}

impl Helper for SnapHelper {}
impl Validator for SnapHelper {}
impl Highlighter for SnapHelper {}
impl Hinter for SnapHelper {
    type Hint = String;

    fn hint(&self, _line: &str, _pos: usize, _ctx: &Context<'_>) -> Option<String> {
        None
    }
}

impl Completer for SnapHelper {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &Context<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        let line_to_pos = &line[..pos];
        let start = line_to_pos.len() - line_to_pos.trim_start().len();
        let word = &line_to_pos[start..];

        // Only the command name is completed; keys and values are free text
        if word.contains(char::is_whitespace) {
            return Ok((pos, vec![]));
        }
        Ok((start, Self::candidates(word)))
    }
}
