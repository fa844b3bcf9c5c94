//! # Level File Logger
//!
//! An asynchronous, level-filtered logging backend. Callers tag entries with a
//! severity name; a single background thread renders them and writes each
//! line to stderr and/or to rotating per-level files.
//!
//! ## Features
//!
//! - **Runtime level sets**: any ordered list of level names, rebuilt on the fly
//! - **Per-level files**: one file for the minimum level, or one for every level
//!   at or above it
//! - **Backpressure, not loss**: a full queue makes producers wait
//! - **Deferred errors**: write failures surface through [`Logger::flush`]
//!
//! ```no_run
//! use level_file_logger::prelude::*;
//! use level_file_logger::printf_log;
//!
//! let logger = Logger::builder()
//!     .log_dir("/var/log/api")
//!     .min_level(3)
//!     .build();
//!
//! printf_log!(logger, "error", "code=%d msg=%s", 400, "bad request");
//! logger.flush()?;
//! # Ok::<(), LoggerError>(())
//! ```

pub mod appenders;
pub mod core;
pub mod global;
pub mod macros;

pub mod prelude {
    pub use crate::appenders::{RotatingFileFactory, RotationPolicy, RotationStrategy};
    pub use crate::core::{
        Appender, AppenderFactory, Arg, LevelRegistry, Logger, LoggerBuilder, LoggerConfig,
        LoggerError, LoggerMetrics, Result, TimestampFormat, DEFAULT_SHUTDOWN_TIMEOUT,
    };
}

pub use appenders::{ConsoleAppender, RotatingFileAppender, RotatingFileFactory};
pub use crate::core::{
    Admission, Appender, AppenderFactory, Arg, CallSite, DispatchState, DropReason, EntryKind,
    LevelRegistry, LogEntry, Logger, LoggerBuilder, LoggerConfig, LoggerError, LoggerMetrics,
    Result, RoutingConfig, TimestampFormat, DEFAULT_LEVELS, DEFAULT_SHUTDOWN_TIMEOUT,
};
