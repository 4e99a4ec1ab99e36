//! Logging Infrastructure
//!
//! `RUST_LOG` takes precedence over the configured level when set.

use std::path::Path;
use tracing_subscriber::EnvFilter;

/// Initialize the logger (stdout, `info`)
pub fn init_logger() -> bool {
    init_logger_with_file(None, None)
}

/// Initialize the logger with optional daily-rolling file output
///
/// Returns `false` when a global subscriber was already installed.
pub fn init_logger_with_file(log_level: Option<&str>, log_dir: Option<&str>) -> bool {
    let level = log_level.unwrap_or("info");
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_file(false)
        .with_line_number(false)
        .with_thread_ids(false)
        .with_target(false);

    // daily rolling file when a directory is given
    if let Some(dir) = log_dir {
        let log_path = Path::new(dir);
        if log_path.is_dir() {
            let file_appender = tracing_appender::rolling::daily(log_path, "market-engine");
            return subscriber
                .with_ansi(false)
                .with_writer(file_appender)
                .try_init()
                .is_ok();
        }
        eprintln!("log dir {} does not exist, logging to stdout", dir);
    }

    subscriber.try_init().is_ok()
}
