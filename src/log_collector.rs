//! Decoupled logging pipeline for comparison test runs.
//!
//! Every `log::*` call is queued on an unbounded channel and written to disk by
//! a dedicated persister thread, so a slow disk never stalls the build or run
//! hooks.
//!
//! # Architecture
//!
//! ```text
//! log::info!() / log_parsed!()
//!     |
//! [LogCollector] (non-blocking send)
//!     | (crossbeam unbounded channel)
//!     v
//! [DiskPersister thread] ----> optional listener channel
//!     |
//! logs/full/<ts>_full.log      every line
//! logs/parsed/<ts>_parsed.log  lines logged with target "parsed"
//! ```

use chrono::Local;
use crossbeam_channel::{unbounded, Receiver, Sender};
use log::{Log, Metadata, Record};
use std::collections::HashMap;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

/// Log target routed to the parsed (high-level) log as well as the full one.
pub const PARSED_TARGET: &str = "parsed";

enum LogMessage {
    Line(LogLine),
    /// Flush marker; the sender is signalled once everything before it is on disk
    Flush(Sender<()>),
}

#[derive(Clone, Debug, Default)]
struct SessionState {
    path: Option<PathBuf>,
    /// Bumped on every new session so the persister drops its cached handles
    generation: u64,
}

/// Get the default logs path relative to the current working directory: ./logs
pub fn get_global_logs_path() -> Result<PathBuf, String> {
    let cwd = std::env::current_dir()
        .map_err(|e| format!("Failed to get current working directory: {}", e))?;
    Ok(cwd.join("logs"))
}

/// A log line with metadata
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LogLine {
    pub message: String,
    /// "full" or "parsed"
    pub log_type: String,
    /// Local time, `HH:MM:SS.mmm`
    pub timestamp: String,
}

impl LogLine {
    pub fn new(message: String) -> Self {
        LogLine {
            message,
            log_type: "full".to_string(),
            timestamp: Local::now().format("%H:%M:%S%.3f").to_string(),
        }
    }

    pub fn parsed(message: String) -> Self {
        LogLine {
            log_type: PARSED_TARGET.to_string(),
            ..LogLine::new(message)
        }
    }

    pub fn is_parsed(&self) -> bool {
        self.log_type == PARSED_TARGET
    }

    fn formatted(&self) -> String {
        format!("[{}] {}\n", self.timestamp, self.message)
    }
}

/// Unified logger: disk persistence plus an optional live listener.
#[derive(Clone)]
pub struct LogCollector {
    tx: Sender<LogMessage>,
    log_dir: PathBuf,
    session_state: Arc<Mutex<SessionState>>,
}

impl LogCollector {
    /// Create a collector writing under `log_dir` and start its persister thread.
    pub fn new(log_dir: PathBuf) -> Result<Self, String> {
        Self::build(log_dir, None)
    }

    /// Like `new`, but every line is also forwarded to `listener`.
    ///
    /// A dropped receiver only stops forwarding; disk writes continue.
    pub fn with_listener(log_dir: PathBuf, listener: Sender<LogLine>) -> Result<Self, String> {
        Self::build(log_dir, Some(listener))
    }

    fn build(log_dir: PathBuf, listener: Option<Sender<LogLine>>) -> Result<Self, String> {
        std::fs::create_dir_all(log_dir.join("full"))
            .map_err(|e| format!("Failed to create full log dir: {}", e))?;
        std::fs::create_dir_all(log_dir.join("parsed"))
            .map_err(|e| format!("Failed to create parsed log dir: {}", e))?;

        let (tx, rx) = unbounded::<LogMessage>();
        let session_state = Arc::new(Mutex::new(SessionState::default()));

        let persister = DiskPersister {
            full_dir: log_dir.join("full"),
            parsed_dir: log_dir.join("parsed"),
            session_state: Arc::clone(&session_state),
            handles: HashMap::new(),
            generation: 0,
            listener,
        };
        std::thread::Builder::new()
            .name("log-persister".to_string())
            .spawn(move || persister.run(rx))
            .map_err(|e| format!("Failed to spawn log persister: {}", e))?;

        Ok(LogCollector {
            tx,
            log_dir,
            session_state,
        })
    }

    pub fn log_dir(&self) -> &Path {
        &self.log_dir
    }

    /// Direct the full log to a dedicated file `logs/full/<filename>`.
    pub fn start_new_session(&self, filename: &str) -> Result<PathBuf, String> {
        let log_path = self.log_dir.join("full").join(filename);
        let mut session = self
            .session_state
            .lock()
            .map_err(|e| format!("Failed to lock session state: {}", e))?;
        session.path = Some(log_path.clone());
        session.generation = session.generation.wrapping_add(1);
        Ok(log_path)
    }

    pub fn get_session_log_path(&self) -> Option<PathBuf> {
        self.session_state
            .lock()
            .ok()
            .and_then(|session| session.path.clone())
    }

    /// Queue a line; never blocks.
    pub fn log(&self, line: LogLine) {
        let _ = self.tx.send(LogMessage::Line(line));
    }

    pub fn log_str(&self, message: impl Into<String>) {
        self.log(LogLine::new(message.into()));
    }

    pub fn log_parsed(&self, message: impl Into<String>) {
        self.log(LogLine::parsed(message.into()));
    }

    /// Block until every line queued before this call is written to disk.
    ///
    /// Call before exiting so the final status lines are not lost.
    pub fn wait_for_empty(&self) -> Result<(), String> {
        let (done_tx, done_rx) = crossbeam_channel::bounded::<()>(1);
        self.tx
            .send(LogMessage::Flush(done_tx))
            .map_err(|e| format!("Failed to send flush marker: {}", e))?;
        done_rx
            .recv()
            .map_err(|e| format!("Flush signal interrupted: {}", e))
    }
}

/// Wires `log::info!()` and friends into the collector.
///
/// Level filtering is left to `log::set_max_level`.
impl Log for LogCollector {
    fn enabled(&self, _metadata: &Metadata) -> bool {
        true
    }

    fn log(&self, record: &Record) {
        let message = format!("[{}] {}", record.level(), record.args());
        if record.target() == PARSED_TARGET {
            self.log_parsed(message);
        } else {
            self.log_str(message);
        }
    }

    fn flush(&self) {
        let _ = self.wait_for_empty();
    }
}

struct DiskPersister {
    full_dir: PathBuf,
    parsed_dir: PathBuf,
    session_state: Arc<Mutex<SessionState>>,
    handles: HashMap<&'static str, File>,
    generation: u64,
    listener: Option<Sender<LogLine>>,
}

impl DiskPersister {
    fn run(mut self, rx: Receiver<LogMessage>) {
        while let Ok(msg) = rx.recv() {
            match msg {
                LogMessage::Line(line) => self.persist(line),
                LogMessage::Flush(done) => {
                    for file in self.handles.values_mut() {
                        let _ = file.flush();
                    }
                    let _ = done.send(());
                }
            }
        }
    }

    fn persist(&mut self, line: LogLine) {
        self.check_session();

        if let Some(file) = self.handle("full") {
            let _ = file.write_all(line.formatted().as_bytes());
        }
        if line.is_parsed() {
            if let Some(file) = self.handle("parsed") {
                let _ = file.write_all(line.formatted().as_bytes());
            }
        }

        if let Some(listener) = &self.listener {
            if listener.send(line).is_err() {
                self.listener = None;
            }
        }
    }

    fn check_session(&mut self) {
        if let Ok(session) = self.session_state.lock() {
            if session.generation != self.generation {
                self.handles.clear();
                self.generation = session.generation;
            }
        }
    }

    fn handle(&mut self, kind: &'static str) -> Option<&mut File> {
        if !self.handles.contains_key(kind) {
            let path = match kind {
                "full" => self
                    .session_state
                    .lock()
                    .ok()
                    .and_then(|session| session.path.clone())
                    .or_else(|| new_log_path(&self.full_dir, kind).ok()),
                _ => new_log_path(&self.parsed_dir, kind).ok(),
            }?;
            match OpenOptions::new().create(true).append(true).open(&path) {
                Ok(file) => {
                    self.handles.insert(kind, file);
                }
                Err(e) => {
                    eprintln!("[Log] Failed to open {}: {}", path.display(), e);
                    return None;
                }
            }
        }
        self.handles.get_mut(kind)
    }
}

/// Timestamped file name for a new log in `dir`.
fn new_log_path(dir: &Path, kind: &str) -> Result<PathBuf, String> {
    let timestamp = Local::now().format("%Y%m%d_%H%M%S");
    let path = dir.join(format!("{}_{}.log", timestamp, kind));
    File::create(&path).map_err(|e| format!("Failed to create log file: {}", e))?;
    Ok(path)
}
