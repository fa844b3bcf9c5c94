//! Process-wide default logger
//!
//! The default instance is created on first use from
//! [`LoggerConfig::default`], or from whatever logger was handed to
//! [`install`] before that. It lives for the rest of the process, so its
//! dispatch thread does too; call [`flush`] before exiting.
//!
//! ```no_run
//! use level_file_logger::{global, global_printf};
//!
//! global::set_log_directory("/var/log/api");
//! global_printf!("error", "code=%d msg=%s", 400, "bad request");
//! global::flush().ok();
//! ```

use crate::core::{Arg, Logger, LoggerConfig, Result};
use std::path::Path;
use std::sync::OnceLock;

static GLOBAL: OnceLock<Logger> = OnceLock::new();

/// The process-wide logger, created with default settings on first use
pub fn logger() -> &'static Logger {
    GLOBAL.get_or_init(|| Logger::with_config(LoggerConfig::default()))
}

/// Make `logger` the process-wide instance
///
/// Fails, handing the logger back, if the default instance already exists.
pub fn install(logger: Logger) -> std::result::Result<(), Logger> {
    GLOBAL.set(logger)
}

#[track_caller]
pub fn print(level: &str, args: Vec<Arg>) {
    logger().print(level, args);
}

#[track_caller]
pub fn printf(level: &str, template: &str, args: Vec<Arg>) {
    logger().printf(level, template, args);
}

pub fn flush() -> Result<()> {
    logger().flush()
}

pub fn set_log_directory(path: impl AsRef<Path>) {
    logger().set_log_directory(path);
}

pub fn configure_levels<I, S>(names: I)
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    logger().configure_levels(names);
}

pub fn set_min_level(min_level: i64) {
    logger().set_min_level(min_level);
}

pub fn set_log_to_levels(fan_out: bool) {
    logger().set_log_to_levels(fan_out);
}

pub fn set_log_to_stderr(enabled: bool) {
    logger().set_log_to_stderr(enabled);
}
