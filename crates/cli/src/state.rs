//! Session wrapper owning the result printer.
//!
//! The database's result log is drained by a dedicated thread so that
//! results are shown in order without the command loop waiting on output.
//! [`SessionState::finish`] drops the database, which closes the log, and
//! then joins the thread so every queued entry is printed.

use std::path::Path;
use std::thread::{self, JoinHandle};

use clap::ArgMatches;
use snapkv_executor::{Database, LogStream, Session, SnapConfig, Submission, CONFIG_FILE_NAME};
use tracing::debug;

/// Wraps the session and the thread printing its result log.
pub struct SessionState {
    session: Session,
    printer: Option<JoinHandle<()>>,
}

impl SessionState {
    /// Open a database configured from the command line.
    pub fn open(matches: &ArgMatches) -> Result<Self, String> {
        let config = load_config(matches)?;
        let db = Database::new(config).map_err(|e| format!("Failed to open database: {}", e))?;
        Ok(Self {
            session: Session::new(db),
            printer: None,
        })
    }

    /// Start printing result-log entries with `print`.
    pub fn attach_printer<F>(&mut self, print: F)
    where
        F: FnMut(String) + Send + 'static,
    {
        if let Some(stream) = self.session.database().subscribe() {
            self.printer = Some(thread::spawn(move || forward(stream, print)));
        }
    }

    /// Submit one line. Returns false if the line was rejected.
    pub fn submit(&self, line: &str) -> bool {
        match self.session.submit(line) {
            Submission::Executed { .. } => true,
            Submission::Rejected { error } => {
                eprintln!("(error) {}", error);
                false
            }
        }
    }

    /// Close the database and wait for the printer to flush.
    pub fn finish(self) {
        let SessionState { session, printer } = self;
        let metrics = session.database().metrics();
        debug!(
            target: "snapkv::txn",
            committed = metrics.total_committed,
            rolled_back = metrics.total_rolled_back,
            conflicted = metrics.total_conflicted,
            "Session finished"
        );
        drop(session);
        if let Some(handle) = printer {
            if handle.join().is_err() {
                eprintln!("(error) result printer stopped unexpectedly");
            }
        }
    }
}

fn forward<F: FnMut(String)>(mut stream: LogStream, mut print: F) {
    while let Some(entry) = stream.blocking_recv() {
        print(entry);
    }
}

/// `--config`, else `./snapkv.toml` if present, else defaults; then flags.
fn load_config(matches: &ArgMatches) -> Result<SnapConfig, String> {
    let mut config = match matches.get_one::<String>("config") {
        Some(path) => SnapConfig::from_file(Path::new(path)).map_err(|e| e.to_string())?,
        None if Path::new(CONFIG_FILE_NAME).is_file() => {
            SnapConfig::from_file(Path::new(CONFIG_FILE_NAME)).map_err(|e| e.to_string())?
        }
        None => SnapConfig::default(),
    };
    if let Some(ms) = matches.get_one::<u64>("io-latency-ms") {
        config.io_latency_ms = *ms;
    }
    Ok(config)
}
