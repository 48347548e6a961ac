//! SnapKV CLI: shell for the SnapKV transactional key-value store.
//!
//! Three modes:
//! - **Shell mode**: `snapkv [flags] COMMAND`: single command, exit
//! - **REPL mode**: `snapkv [flags]`: interactive prompt (if stdin is TTY)
//! - **Pipe mode**: `echo "set k v" | snapkv`: line-by-line from stdin
//!
//! Read results and engine errors come from the database's result log and
//! are printed on stdout; rejected input is reported on stderr.

mod commands;
mod repl;
mod state;

use std::io::IsTerminal;
use std::process;

use tracing_subscriber::EnvFilter;

use commands::build_cli;
use state::SessionState;

fn main() {
    let matches = build_cli().get_matches();

    init_logging(matches.get_count("verbose"));

    let mut state = match SessionState::open(&matches) {
        Ok(state) => state,
        Err(e) => {
            eprintln!("{}", e);
            process::exit(1);
        }
    };

    // Dispatch mode
    let exit_code = if let Some(words) = matches.get_many::<String>("command") {
        // Shell mode: execute one command, exit
        let line = words.map(String::as_str).collect::<Vec<_>>().join(" ");
        state.attach_printer(|entry| println!("{}", entry));
        i32::from(!state.submit(&line))
    } else if std::io::stdin().is_terminal() {
        match repl::run_repl(&mut state) {
            Ok(()) => 0,
            Err(e) => {
                eprintln!("{}", e);
                1
            }
        }
    } else {
        repl::run_pipe(&mut state)
    };

    state.finish();
    process::exit(exit_code);
}

/// Install the stderr diagnostics subscriber.
///
/// `RUST_LOG` wins when set; otherwise `-v` selects debug and `-vv` trace.
fn init_logging(verbosity: u8) {
    let level = match verbosity {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .without_time()
        .init();
}
