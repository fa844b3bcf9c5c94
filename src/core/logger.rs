//! Main logger implementation
//!
//! Producers resolve the level, capture the call site and timestamp, and push
//! the entry onto a bounded queue. A single dispatch thread drains the queue
//! in FIFO order, renders each line, and writes it to stderr and to every
//! qualifying per-level file.

use super::{
    appender::AppenderFactory,
    config::LoggerConfig,
    error::{LoggerError, Result},
    level_registry::LevelRegistry,
    log_entry::{Arg, CallSite, LogEntry},
    metrics::LoggerMetrics,
    router::{RoutingConfig, SharedAppender},
    timestamp::TimestampFormat,
};
use crate::appenders::{ConsoleAppender, RotatingFileFactory};
use crossbeam_channel::{bounded, Receiver, Sender, TrySendError};
use parking_lot::Mutex;
use std::io::Write;
use std::panic::Location;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Once};
use std::thread;
use std::time::Duration;

/// Default shutdown timeout for logger cleanup (5 seconds)
///
/// Used when the logger is dropped without an explicit `shutdown()`.
pub const DEFAULT_SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(5);

/// Delay between queue checks in [`Logger::flush`]
pub const FLUSH_POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Times a write follows its rank to a fresh handle after a rebuild
const MAX_REOPEN_ATTEMPTS: usize = 3;

/// Why an entry never reached the queue
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropReason {
    /// The level name is not in the registry
    UnknownLevel,
    /// The level ranks below the configured minimum
    BelowThreshold,
    /// The logger has been shut down
    ShutDown,
}

/// Outcome of handing an entry to the logger
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    Accepted,
    Dropped(DropReason),
}

/// Whether the dispatch thread currently has work
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchState {
    Idle,
    Draining,
}

/// Everything guarded by the logger's single lock
struct SharedState {
    registry: LevelRegistry,
    routing: RoutingConfig,
    log_dir: Option<PathBuf>,
    log_to_stderr: bool,
    timestamp_format: TimestampFormat,
    /// First write failure since the last flush
    first_error: Option<LoggerError>,
}

impl SharedState {
    fn record_error(&mut self, error: LoggerError) {
        if self.first_error.is_none() {
            self.first_error = Some(error);
        }
    }

    fn rebuild(&mut self) {
        if let Some(e) = self.routing.rebuild(&self.registry) {
            self.record_error(e);
        }
    }
}

/// What the dispatch thread needs to write one entry, captured under the lock
struct DispatchPlan {
    level_char: char,
    timestamp_format: TimestampFormat,
    log_to_stderr: bool,
    writers: Vec<(usize, SharedAppender)>,
}

/// State shared with the dispatch thread
struct Inner {
    state: Mutex<SharedState>,
    factory: Box<dyn AppenderFactory>,
    console: ConsoleAppender,
    metrics: LoggerMetrics,
    /// Entries enqueued but not yet fully written
    pending: AtomicUsize,
}

impl Inner {
    fn record_failure(&self, error: LoggerError) {
        self.metrics.record_write_error();
        self.state.lock().record_error(error);
    }

    /// Resolve destinations for an entry and open any missing handles
    fn plan(&self, entry: &LogEntry) -> Option<DispatchPlan> {
        let mut guard = self.state.lock();
        let state = &mut *guard;

        // The registry may have shrunk since the entry was accepted
        let level_char = state.registry.rank_char(entry.rank)?;

        let mut writers = Vec::new();
        if let Some(dir) = state.log_dir.clone() {
            let ranks: Vec<usize> = state
                .routing
                .targets_for(entry.rank)
                .map(|(rank, _)| *rank)
                .collect();
            for rank in ranks {
                match state.routing.writer_for(rank, &dir, &*self.factory) {
                    Ok(Some(writer)) => writers.push((rank, writer)),
                    Ok(None) => {}
                    Err(e) => {
                        self.metrics.record_write_error();
                        state.record_error(e);
                    }
                }
            }
        }

        Some(DispatchPlan {
            level_char,
            timestamp_format: state.timestamp_format.clone(),
            log_to_stderr: state.log_to_stderr,
            writers,
        })
    }

    /// Current handle for `rank`, if it is still routed
    fn reopen(&self, rank: usize) -> Option<SharedAppender> {
        let mut guard = self.state.lock();
        let state = &mut *guard;
        let dir = state.log_dir.clone()?;
        match state.routing.writer_for(rank, &dir, &*self.factory) {
            Ok(writer) => writer,
            Err(e) => {
                self.metrics.record_write_error();
                state.record_error(e);
                None
            }
        }
    }

    fn dispatch(&self, entry: &LogEntry) {
        let Some(plan) = self.plan(entry) else {
            return;
        };

        // Arguments render here, outside the lock, so a Display impl that
        // logs cannot deadlock the dispatcher
        let line = entry.render_line(plan.level_char, &plan.timestamp_format);

        if plan.log_to_stderr {
            if let Err(e) = self.console.write_line(&line) {
                self.record_failure(e);
            }
        }

        for (rank, writer) in plan.writers {
            self.write_to(rank, writer, line.as_bytes());
        }
    }

    fn write_to(&self, rank: usize, mut writer: SharedAppender, bytes: &[u8]) {
        let mut attempts = 0;
        loop {
            let result = writer.lock().append(bytes);
            match result {
                Ok(()) => return,
                // Raced with a rebuild; follow the rank to its current handle
                Err(e) if e.is_writer_closed() && attempts < MAX_REOPEN_ATTEMPTS => {
                    attempts += 1;
                    match self.reopen(rank) {
                        Some(current) => writer = current,
                        // No longer routed
                        None => return,
                    }
                }
                Err(e) => {
                    self.record_failure(e);
                    return;
                }
            }
        }
    }

    fn run(self: Arc<Self>, receiver: Receiver<LogEntry>) {
        for entry in receiver.iter() {
            let outcome =
                std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| self.dispatch(&entry)));

            if let Err(panic_info) = outcome {
                let panic_msg = if let Some(s) = panic_info.downcast_ref::<&str>() {
                    s.to_string()
                } else if let Some(s) = panic_info.downcast_ref::<String>() {
                    s.clone()
                } else {
                    "Unknown panic".to_string()
                };
                eprintln!(
                    "[LOGGER CRITICAL] Dispatch of an entry panicked: {}. Continuing with the next entry.",
                    panic_msg
                );
                self.record_failure(LoggerError::other(format!(
                    "dispatch panicked: {}",
                    panic_msg
                )));
            }

            self.metrics.record_dispatched();
            self.pending.fetch_sub(1, Ordering::SeqCst);
        }
    }
}

/// Asynchronous level-routed logger
///
/// # Example
///
/// ```no_run
/// use level_file_logger::{print_log, printf_log, Logger};
///
/// let logger = Logger::builder()
///     .log_dir("/var/log/api")
///     .min_level(1)
///     .log_to_levels(true)
///     .build();
///
/// print_log!(logger, "error", "the error code/message: ", 400, "/", "bad request");
/// printf_log!(logger, "error", "the error code/message: %d/%s", 400, "bad request");
///
/// logger.flush().expect("log files synced");
/// ```
pub struct Logger {
    inner: Arc<Inner>,
    sender: Option<Sender<LogEntry>>,
    receiver: Mutex<Option<Receiver<LogEntry>>>,
    dispatch_started: Once,
    dispatch_handle: Mutex<Option<thread::JoinHandle<()>>>,
}

impl Logger {
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(LoggerConfig::default())
    }

    #[must_use]
    pub fn with_config(config: LoggerConfig) -> Self {
        let factory = default_factory(&config);
        Self::with_factory(config, factory)
    }

    /// Create a logger that opens its per-level writers through `factory`
    #[must_use]
    pub fn with_factory(config: LoggerConfig, factory: Box<dyn AppenderFactory>) -> Self {
        let console = ConsoleAppender::with_colors(config.stderr_colors);
        Self::assemble(config, factory, console)
    }

    fn assemble(
        config: LoggerConfig,
        factory: Box<dyn AppenderFactory>,
        console: ConsoleAppender,
    ) -> Self {
        if let Err(e) = config.validate() {
            eprintln!("[LOGGER WARNING] {}. Continuing with corrected values.", e);
        }

        let mut registry = LevelRegistry::default();
        registry.configure(&config.levels);

        let state = SharedState {
            registry,
            routing: RoutingConfig::new(config.min_level, config.log_to_levels),
            log_dir: config.log_dir.filter(|dir| !dir.as_os_str().is_empty()),
            log_to_stderr: config.log_to_stderr,
            timestamp_format: config.timestamp_format,
            first_error: None,
        };

        let (sender, receiver) = bounded(config.queue_capacity.max(1));

        let logger = Self {
            inner: Arc::new(Inner {
                state: Mutex::new(state),
                factory,
                console,
                metrics: LoggerMetrics::new(),
                pending: AtomicUsize::new(0),
            }),
            sender: Some(sender),
            receiver: Mutex::new(Some(receiver)),
            dispatch_started: Once::new(),
            dispatch_handle: Mutex::new(None),
        };

        logger.reconfigure(|_| true);
        logger
    }

    /// Apply `change` under the shared lock and rebuild the routing if it
    /// reports a change
    fn reconfigure<F>(&self, change: F)
    where
        F: FnOnce(&mut SharedState) -> bool,
    {
        {
            let mut state = self.inner.state.lock();
            if change(&mut state) {
                state.rebuild();
            }
        }
        self.start_dispatcher();
    }

    /// Spawn the dispatch thread; later calls are no-ops
    fn start_dispatcher(&self) {
        self.dispatch_started.call_once(|| {
            let Some(receiver) = self.receiver.lock().take() else {
                return;
            };
            let inner = Arc::clone(&self.inner);
            let spawned = thread::Builder::new()
                .name("level-logger-dispatch".to_string())
                .spawn(move || inner.run(receiver));

            match spawned {
                Ok(handle) => *self.dispatch_handle.lock() = Some(handle),
                Err(e) => eprintln!("[LOGGER ERROR] Failed to start dispatch thread: {}", e),
            }
        });
    }

    /// Log the concatenation of `args` at `level`
    ///
    /// Unknown levels and levels below the minimum are dropped silently.
    #[track_caller]
    pub fn print(&self, level: &str, args: Vec<Arg>) {
        let _ = self.submit(level, None, args, CallSite::from_location(Location::caller()));
    }

    /// Log `template` interpolated with `args` at `level`
    #[track_caller]
    pub fn printf(&self, level: &str, template: &str, args: Vec<Arg>) {
        let _ = self.submit(
            level,
            Some(template),
            args,
            CallSite::from_location(Location::caller()),
        );
    }

    pub(crate) fn submit(
        &self,
        level: &str,
        template: Option<&str>,
        args: Vec<Arg>,
        call_site: CallSite,
    ) -> Admission {
        let rank = {
            let state = self.inner.state.lock();
            match state.registry.rank(level) {
                None => {
                    self.inner.metrics.record_unknown_level();
                    return Admission::Dropped(DropReason::UnknownLevel);
                }
                Some(rank) if rank < state.routing.min_rank() => {
                    self.inner.metrics.record_below_threshold();
                    return Admission::Dropped(DropReason::BelowThreshold);
                }
                Some(rank) => rank,
            }
        };

        let entry = match template {
            Some(template) => LogEntry::formatted(rank, template, args, call_site),
            None => LogEntry::plain(rank, args, call_site),
        };
        self.enqueue(entry)
    }

    fn enqueue(&self, entry: LogEntry) -> Admission {
        let Some(ref sender) = self.sender else {
            return Admission::Dropped(DropReason::ShutDown);
        };

        self.inner.pending.fetch_add(1, Ordering::SeqCst);
        let sent = match sender.try_send(entry) {
            Ok(()) => true,
            Err(TrySendError::Full(entry)) => {
                // Backpressure: wait for the dispatcher instead of dropping
                self.inner.metrics.record_queue_full();
                sender.send(entry).is_ok()
            }
            Err(TrySendError::Disconnected(_)) => false,
        };

        if sent {
            self.inner.metrics.record_enqueued();
            Admission::Accepted
        } else {
            self.inner.pending.fetch_sub(1, Ordering::SeqCst);
            Admission::Dropped(DropReason::ShutDown)
        }
    }

    /// Wait for queued entries to be written, then sync every open file
    ///
    /// Returns the first write failure recorded since the previous flush, or
    /// else the first sync failure. There is no timeout: if producers keep
    /// logging faster than the dispatcher drains, this keeps waiting.
    pub fn flush(&self) -> Result<()> {
        while self.inner.pending.load(Ordering::SeqCst) > 0 {
            thread::sleep(FLUSH_POLL_INTERVAL);
        }

        let (mut first_error, writers, log_to_stderr) = {
            let mut state = self.inner.state.lock();
            (
                state.first_error.take(),
                state.routing.open_writers(),
                state.log_to_stderr,
            )
        };

        for writer in writers {
            if let Err(e) = writer.lock().sync() {
                first_error.get_or_insert(e);
            }
        }

        if log_to_stderr {
            if let Err(e) = self.inner.console.flush() {
                first_error.get_or_insert(e);
            }
        }

        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    /// Set the directory for per-level files; an empty path disables them
    pub fn set_log_directory(&self, path: impl AsRef<Path>) {
        let path = path.as_ref();
        let dir = if path.as_os_str().is_empty() {
            None
        } else {
            Some(path.to_path_buf())
        };
        self.reconfigure(|state| {
            state.log_dir = dir;
            true
        });
    }

    /// Replace the level names; an empty list keeps the current ones
    ///
    /// Names are trimmed and uppercased before ranking, so `" info"` and
    /// `"INFO"` share one rank. Blank names are skipped.
    pub fn configure_levels<I, S>(&self, names: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.reconfigure(|state| state.registry.configure(names));
    }

    /// Set the minimum rank; out-of-range values are clamped
    pub fn set_min_level(&self, min_level: i64) {
        self.reconfigure(|state| {
            state.routing.set_min_level(min_level);
            true
        });
    }

    /// Toggle between one file per qualifying level and a single file
    pub fn set_log_to_levels(&self, fan_out: bool) {
        self.reconfigure(|state| {
            state.routing.set_fan_out(fan_out);
            true
        });
    }

    pub fn set_log_to_stderr(&self, enabled: bool) {
        self.inner.state.lock().log_to_stderr = enabled;
    }

    pub fn set_timestamp_format(&self, format: TimestampFormat) {
        self.inner.state.lock().timestamp_format = format;
    }

    /// `(rank, name)` of each level that currently owns a file
    pub fn active_levels(&self) -> Vec<(usize, String)> {
        self.inner.state.lock().routing.active_levels().to_vec()
    }

    pub fn min_rank(&self) -> usize {
        self.inner.state.lock().routing.min_rank()
    }

    /// Distinct level names in rank order
    pub fn level_names(&self) -> Vec<String> {
        let state = self.inner.state.lock();
        state.registry.ranks().map(|(_, name)| name.to_string()).collect()
    }

    pub fn log_directory(&self) -> Option<PathBuf> {
        self.inner.state.lock().log_dir.clone()
    }

    pub fn open_writer_count(&self) -> usize {
        self.inner.state.lock().routing.open_writer_count()
    }

    /// Entries waiting in the queue
    pub fn queue_len(&self) -> usize {
        self.sender.as_ref().map_or(0, Sender::len)
    }

    pub fn dispatch_state(&self) -> DispatchState {
        if self.inner.pending.load(Ordering::SeqCst) == 0 {
            DispatchState::Idle
        } else {
            DispatchState::Draining
        }
    }

    pub fn metrics(&self) -> &LoggerMetrics {
        &self.inner.metrics
    }

    /// Stop accepting entries, drain the queue, and close every file
    ///
    /// Returns `true` if the dispatch thread finished within `timeout` and all
    /// files closed cleanly.
    pub fn shutdown(&mut self, timeout: Duration) -> bool {
        drop(self.sender.take());

        let mut clean = true;
        if let Some(handle) = self.dispatch_handle.lock().take() {
            let start = std::time::Instant::now();
            loop {
                if handle.is_finished() {
                    if let Err(e) = handle.join() {
                        eprintln!("[LOGGER ERROR] Dispatch thread panicked during shutdown: {:?}", e);
                        clean = false;
                    }
                    break;
                }

                if start.elapsed() >= timeout {
                    eprintln!(
                        "[LOGGER WARNING] Dispatch thread did not finish within {:?}. \
                         Some logs may be lost.",
                        timeout
                    );
                    clean = false;
                    break;
                }

                thread::sleep(FLUSH_POLL_INTERVAL);
            }
        }

        // A dispatch thread past the timeout may still be draining; it must
        // not reopen anything from here on
        let mut state = self.inner.state.lock();
        state.log_dir = None;
        if let Some(e) = state.routing.retire() {
            eprintln!("[LOGGER ERROR] Failed to close log files during shutdown: {}", e);
            clean = false;
        }
        if let Some(e) = state.first_error.take() {
            eprintln!("[LOGGER ERROR] Unreported write failure at shutdown: {}", e);
        }

        clean
    }
}

impl Default for Logger {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for Logger {
    fn drop(&mut self) {
        if self.sender.is_some() {
            self.shutdown(DEFAULT_SHUTDOWN_TIMEOUT);
        }
    }
}

/// Builder for constructing Logger with a fluent API
///
/// # Example
/// ```
/// use level_file_logger::prelude::*;
///
/// let logger = Logger::builder()
///     .levels(["debug", "info", "warn", "error", "fatal"])
///     .min_level(2)
///     .log_to_stderr(true)
///     .queue_capacity(1000)
///     .build();
/// assert_eq!(logger.min_rank(), 2);
/// ```
pub struct LoggerBuilder {
    config: LoggerConfig,
    factory: Option<Box<dyn AppenderFactory>>,
    stderr_writer: Option<ConsoleAppender>,
}

impl LoggerBuilder {
    pub fn new() -> Self {
        Self {
            config: LoggerConfig::default(),
            factory: None,
            stderr_writer: None,
        }
    }

    /// Start from an existing configuration
    #[must_use = "builder methods return a new value"]
    pub fn config(mut self, config: LoggerConfig) -> Self {
        self.config = config;
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn log_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.log_dir = Some(dir.into());
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn log_to_stderr(mut self, enabled: bool) -> Self {
        self.config.log_to_stderr = enabled;
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn stderr_colors(mut self, enabled: bool) -> Self {
        self.config.stderr_colors = enabled;
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn min_level(mut self, min_level: i64) -> Self {
        self.config.min_level = min_level;
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn log_to_levels(mut self, fan_out: bool) -> Self {
        self.config.log_to_levels = fan_out;
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn levels<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.config.levels = names.into_iter().map(Into::into).collect();
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn queue_capacity(mut self, capacity: usize) -> Self {
        self.config.queue_capacity = capacity;
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn file_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.config.file_prefix = Some(prefix.into());
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn rotation(mut self, policy: crate::appenders::RotationPolicy) -> Self {
        self.config.rotation = policy;
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn timestamp_format(mut self, format: TimestampFormat) -> Self {
        self.config.timestamp_format = format;
        self
    }

    /// Open per-level writers through a custom factory
    ///
    /// Overrides `file_prefix` and `rotation`, which only configure the
    /// default rotating file factory.
    #[must_use = "builder methods return a new value"]
    pub fn appender_factory<F: AppenderFactory + 'static>(mut self, factory: F) -> Self {
        self.factory = Some(Box::new(factory));
        self
    }

    /// Mirror lines into `writer` instead of the process stderr
    ///
    /// Only takes effect while `log_to_stderr` is enabled.
    #[must_use = "builder methods return a new value"]
    pub fn stderr_writer<W: Write + Send + 'static>(mut self, writer: W) -> Self {
        self.stderr_writer = Some(ConsoleAppender::new().with_writer(writer));
        self
    }

    pub fn build(self) -> Logger {
        let factory = self
            .factory
            .unwrap_or_else(|| default_factory(&self.config));
        let console = match self.stderr_writer {
            Some(console) => console.colored(self.config.stderr_colors),
            None => ConsoleAppender::with_colors(self.config.stderr_colors),
        };
        Logger::assemble(self.config, factory, console)
    }
}

fn default_factory(config: &LoggerConfig) -> Box<dyn AppenderFactory> {
    let prefix = config
        .file_prefix
        .clone()
        .unwrap_or_else(crate::appenders::rotating_file::default_prefix);
    Box::new(
        RotatingFileFactory::new()
            .with_policy(config.rotation.clone())
            .with_prefix(prefix),
    )
}

impl Default for LoggerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl Logger {
    /// Create a builder for Logger
    #[must_use]
    pub fn builder() -> LoggerBuilder {
        LoggerBuilder::new()
    }
}
