//! Clap command definition.
//!
//! Flags configure the database; trailing words, when present, form a single
//! command for shell mode.

use clap::{value_parser, Arg, ArgAction, Command};

/// Build the CLI command.
pub fn build_cli() -> Command {
    Command::new("snapkv")
        .about("Shell for the SnapKV transactional key-value store")
        .version(env!("CARGO_PKG_VERSION"))
        .arg(
            Arg::new("config")
                .long("config")
                .value_name("PATH")
                .help("Config file (default: ./snapkv.toml if present)"),
        )
        .arg(
            Arg::new("io-latency-ms")
                .long("io-latency-ms")
                .value_name("MS")
                .value_parser(value_parser!(u64))
                .help("Simulated store latency upper bound, overrides the config file"),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .action(ArgAction::Count)
                .help("Diagnostic logging on stderr (-v debug, -vv trace)"),
        )
        .arg(
            Arg::new("command")
                .value_name("COMMAND")
                .num_args(1..)
                .trailing_var_arg(true)
                .allow_hyphen_values(true)
                .help("Run one command and exit, e.g. `set foo 123`"),
        )
}
