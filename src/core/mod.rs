//! Core logger types and traits

pub mod appender;
pub mod config;
pub mod error;
pub mod level_registry;
pub mod log_entry;
pub mod logger;
pub mod metrics;
pub mod router;
pub mod template;
pub mod timestamp;

pub use appender::{Appender, AppenderFactory};
pub use config::{LoggerConfig, DEFAULT_MIN_LEVEL, DEFAULT_QUEUE_CAPACITY};
pub use error::{LoggerError, Result};
pub use level_registry::{LevelRegistry, DEFAULT_LEVELS};
pub use log_entry::{Arg, CallSite, EntryKind, LogEntry};
pub use logger::{
    Admission, DispatchState, DropReason, Logger, LoggerBuilder, DEFAULT_SHUTDOWN_TIMEOUT,
    FLUSH_POLL_INTERVAL,
};
pub use metrics::LoggerMetrics;
pub use router::{RoutingConfig, SharedAppender};
pub use timestamp::TimestampFormat;
