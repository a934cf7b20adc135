/// System module: logging setup and logging macros

use std::path::PathBuf;

use crate::log_collector::{get_global_logs_path, LogCollector};

/// Initialize logging: create the collector and register it as the global logger.
///
/// `log_dir` defaults to `./logs`. Fails if the directories cannot be created
/// or a global logger is already installed.
pub fn initialize_logging(
    log_dir: Option<PathBuf>,
    level: log::LevelFilter,
) -> Result<LogCollector, String> {
    let log_dir = match log_dir {
        Some(dir) => dir,
        None => get_global_logs_path()?,
    };
    let collector = LogCollector::new(log_dir)?;

    log::set_boxed_logger(Box::new(collector.clone()))
        .map(|()| log::set_max_level(level))
        .map_err(|e| format!("Failed to set LogCollector as global logger: {}", e))?;

    log::info!("[System] Logging initialized (level {})", level);
    Ok(collector)
}

/// Flush all pending log lines to disk.
pub fn flush_all_logs(collector: &LogCollector) {
    if let Err(e) = collector.wait_for_empty() {
        eprintln!("[System] WARNING: Failed to flush logs: {}", e);
    }
}

/// High-level progress line: written to both the full and the parsed log.
#[macro_export]
macro_rules! log_parsed {
    ($($arg:tt)*) => {{
        let msg = format!($($arg)*);
        log::info!(target: "parsed", "{}", msg);
    }}
}
