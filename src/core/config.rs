//! Logger configuration
//!
//! Plain values supplied by the embedding program. Nothing here reads
//! command-line flags or environment variables; callers build the struct
//! directly or deserialize it from their own configuration source.

use super::error::{LoggerError, Result};
use super::level_registry::DEFAULT_LEVELS;
use super::timestamp::TimestampFormat;
use crate::appenders::rotating_file::check_hour;
use crate::appenders::RotationPolicy;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Default capacity of the entry queue
pub const DEFAULT_QUEUE_CAPACITY: usize = 100_000;

/// Default minimum level (rank 1, `INFO` in the default registry)
pub const DEFAULT_MIN_LEVEL: i64 = 1;

/// # Example
///
/// ```
/// use level_file_logger::LoggerConfig;
///
/// let config = LoggerConfig {
///     log_dir: Some("/var/log/api".into()),
///     min_level: 3,
///     ..LoggerConfig::default()
/// };
/// assert!(!config.log_to_levels);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggerConfig {
    /// Directory for per-level files; `None` disables file output
    pub log_dir: Option<PathBuf>,

    /// Mirror every line to stderr
    pub log_to_stderr: bool,

    /// Color the level character of mirrored lines
    pub stderr_colors: bool,

    /// Minimum rank; clamped into the registry's range
    pub min_level: i64,

    /// Give every rank at or above the minimum its own file
    pub log_to_levels: bool,

    /// Ordered level names, least severe first
    pub levels: Vec<String>,

    pub queue_capacity: usize,

    /// File name prefix; defaults to the executable name
    pub file_prefix: Option<String>,

    pub rotation: RotationPolicy,

    pub timestamp_format: TimestampFormat,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            log_dir: None,
            log_to_stderr: false,
            stderr_colors: false,
            min_level: DEFAULT_MIN_LEVEL,
            log_to_levels: false,
            levels: DEFAULT_LEVELS.iter().map(|s| s.to_string()).collect(),
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
            file_prefix: None,
            rotation: RotationPolicy::default(),
            timestamp_format: TimestampFormat::default(),
        }
    }
}

impl LoggerConfig {
    /// Report values the logger would have to correct
    ///
    /// The logger still starts with an invalid config: the queue holds at
    /// least one entry, an unusable level list keeps the defaults, and a
    /// rotation hour past 23 never triggers.
    pub fn validate(&self) -> Result<()> {
        if self.queue_capacity == 0 {
            return Err(LoggerError::config("queue_capacity", "must be at least 1"));
        }

        if self.levels.iter().all(|name| name.trim().is_empty()) {
            return Err(LoggerError::config("levels", "no usable level name"));
        }

        match self.rotation.strategy.hour() {
            Some(hour) => check_hour(hour),
            None => Ok(()),
        }
    }
}
