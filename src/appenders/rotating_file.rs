//! Rotating per-level log files
//!
//! Each active level writes to `<dir>/<prefix>.<LEVEL>.log`. Files rotate by
//! size, by calendar day, or by whichever of the two comes first; rotated
//! files are kept as numbered backups (`.1` newest) and may be gzip-compressed.

use crate::core::appender::{Appender, AppenderFactory};
use crate::core::error::{LoggerError, Result};
use chrono::{DateTime, Local, Timelike};
use serde::{Deserialize, Serialize};
use std::ffi::OsString;
use std::fs::{self, File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::SystemTime;

/// Rotation strategy defining when to rotate log files
///
/// # Examples
///
/// ```
/// use level_file_logger::appenders::RotationStrategy;
///
/// // Rotate when file exceeds 100 MB
/// let size_strategy = RotationStrategy::Size { max_bytes: 100 * 1024 * 1024 };
///
/// // Rotate on the first write after 02:00 of a new day
/// let daily_strategy = RotationStrategy::Daily { hour: 2 };
///
/// // Rotate on size OR date, whichever comes first
/// let hybrid_strategy = RotationStrategy::Hybrid { max_bytes: 50 * 1024 * 1024, hour: 0 };
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RotationStrategy {
    /// Rotate when file exceeds size in bytes
    Size { max_bytes: u64 },

    /// Rotate daily at specified hour (0-23)
    Daily { hour: u8 },

    /// Rotate on size OR date, whichever comes first
    Hybrid { max_bytes: u64, hour: u8 },

    /// No rotation (useful for testing or when external rotation is used)
    Never,
}

impl Default for RotationStrategy {
    fn default() -> Self {
        RotationStrategy::Size {
            max_bytes: 100 * 1024 * 1024, // 100 MB
        }
    }
}

impl RotationStrategy {
    #[must_use]
    pub fn size(max_bytes: u64) -> Self {
        RotationStrategy::Size { max_bytes }
    }

    /// Create a daily rotation strategy
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfiguration` if hour is greater than 23
    pub fn daily(hour: u8) -> Result<Self> {
        check_hour(hour)?;
        Ok(RotationStrategy::Daily { hour })
    }

    /// Create a hybrid rotation strategy (size OR date)
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfiguration` if hour is greater than 23
    pub fn hybrid(max_bytes: u64, hour: u8) -> Result<Self> {
        check_hour(hour)?;
        Ok(RotationStrategy::Hybrid { max_bytes, hour })
    }

    /// Rotation hour, for the calendar-based strategies
    pub fn hour(&self) -> Option<u8> {
        match self {
            RotationStrategy::Daily { hour } | RotationStrategy::Hybrid { hour, .. } => Some(*hour),
            RotationStrategy::Size { .. } | RotationStrategy::Never => None,
        }
    }

    #[must_use]
    pub fn never() -> Self {
        RotationStrategy::Never
    }
}

pub(crate) fn check_hour(hour: u8) -> Result<()> {
    if hour > 23 {
        return Err(LoggerError::config(
            "rotation",
            format!("hour {} is out of range 0-23", hour),
        ));
    }
    Ok(())
}

/// Configuration shared by every per-level file
///
/// # Examples
///
/// ```
/// use level_file_logger::appenders::{RotationPolicy, RotationStrategy};
///
/// let policy = RotationPolicy::new()
///     .with_strategy(RotationStrategy::Daily { hour: 0 })
///     .with_max_backups(30)
///     .with_compression(true);
/// assert_eq!(policy.max_file_size(), None);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RotationPolicy {
    /// Rotation strategy defining when to rotate
    pub strategy: RotationStrategy,
    /// Maximum number of rotated files to keep
    pub max_backup_files: usize,
    /// Whether to compress rotated files
    pub compress: bool,
}

impl Default for RotationPolicy {
    fn default() -> Self {
        Self {
            strategy: RotationStrategy::default(),
            max_backup_files: 5,
            compress: false,
        }
    }
}

impl RotationPolicy {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_strategy(mut self, strategy: RotationStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// Shorthand for `with_strategy(RotationStrategy::Size { max_bytes: size })`
    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_max_size(mut self, size: u64) -> Self {
        self.strategy = RotationStrategy::Size { max_bytes: size };
        self
    }

    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_max_backups(mut self, count: usize) -> Self {
        self.max_backup_files = count;
        self
    }

    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_compression(mut self, enabled: bool) -> Self {
        self.compress = enabled;
        self
    }

    /// Size limit, if the strategy has one
    #[must_use]
    pub fn max_file_size(&self) -> Option<u64> {
        match &self.strategy {
            RotationStrategy::Size { max_bytes } => Some(*max_bytes),
            RotationStrategy::Hybrid { max_bytes, .. } => Some(*max_bytes),
            _ => None,
        }
    }
}

/// Appends `suffix` to the final path component (`a.log.1` -> `a.log.1.gz`)
fn with_suffix(path: &Path, suffix: &str) -> PathBuf {
    let mut name: OsString = path.file_name().map(OsString::from).unwrap_or_default();
    name.push(suffix);
    path.with_file_name(name)
}

/// Append-only file for one level, with rotation
pub struct RotatingFileAppender {
    base_path: PathBuf,
    level_name: String,
    policy: RotationPolicy,
    writer: Option<BufWriter<File>>,
    current_size: u64,
    last_rotation: SystemTime,
    /// Counter for consecutive deletion failures (reset on successful deletion)
    deletion_failure_count: usize,
    closed: bool,
}

impl RotatingFileAppender {
    /// Open (or create) the file at `path`, creating parent directories
    ///
    /// # Errors
    ///
    /// Returns error if the directory or file cannot be created or opened
    pub fn open<P: AsRef<Path>>(
        path: P,
        level_name: impl Into<String>,
        policy: RotationPolicy,
    ) -> Result<Self> {
        let base_path = path.as_ref().to_path_buf();

        if let Some(parent) = base_path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                LoggerError::io_operation(
                    "create log directory",
                    format!("Failed to create directory '{}'", parent.display()),
                    e,
                )
            })?;
        }

        let (file, current_size, last_rotation) = Self::open_file(&base_path)?;

        Ok(Self {
            base_path,
            level_name: level_name.into(),
            policy,
            writer: Some(BufWriter::new(file)),
            current_size,
            last_rotation,
            deletion_failure_count: 0,
            closed: false,
        })
    }

    fn open_file(path: &Path) -> Result<(File, u64, SystemTime)> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(|e| {
                LoggerError::file_appender(
                    path.display().to_string(),
                    format!("Failed to open: {}", e),
                )
            })?;

        let metadata = file.metadata().map_err(|e| {
            LoggerError::file_appender(
                path.display().to_string(),
                format!("Cannot access file metadata: {}", e),
            )
        })?;
        let size = metadata.len();
        // File modification time stands in for the last rotation
        let last_rotation = metadata.modified().unwrap_or_else(|_| SystemTime::now());
        Ok((file, size, last_rotation))
    }

    fn crossed_day_boundary(&self, hour: u8) -> bool {
        let now: DateTime<Local> = SystemTime::now().into();
        let last: DateTime<Local> = self.last_rotation.into();
        now.date_naive() != last.date_naive() && now.hour() >= u32::from(hour)
    }

    fn should_rotate(&self) -> bool {
        match &self.policy.strategy {
            RotationStrategy::Never => false,
            RotationStrategy::Size { max_bytes } => self.current_size >= *max_bytes,
            RotationStrategy::Daily { hour } => self.crossed_day_boundary(*hour),
            RotationStrategy::Hybrid { max_bytes, hour } => {
                self.current_size >= *max_bytes || self.crossed_day_boundary(*hour)
            }
        }
    }

    fn backup_path(&self, index: usize) -> PathBuf {
        with_suffix(&self.base_path, &format!(".{}", index))
    }

    fn rotate(&mut self) -> Result<()> {
        if let Some(mut writer) = self.writer.take() {
            writer.flush().map_err(|e| {
                LoggerError::file_rotation(
                    self.base_path.display().to_string(),
                    format!("Failed to flush before rotation: {}", e),
                )
            })?;
        }

        // Drop the backup that falls off the end of the window
        const MAX_DELETION_FAILURES: usize = 5;
        let oldest = self.backup_path(self.policy.max_backup_files);
        let mut deletion_failed = false;
        for candidate in [with_suffix(&oldest, ".gz"), oldest] {
            if candidate.exists() {
                if let Err(e) = fs::remove_file(&candidate) {
                    deletion_failed = true;
                    eprintln!(
                        "[LOGGER WARNING] Failed to remove oldest backup {}: {} (failure #{}/{})",
                        candidate.display(),
                        e,
                        self.deletion_failure_count + 1,
                        MAX_DELETION_FAILURES
                    );
                }
            }
        }

        if deletion_failed {
            self.deletion_failure_count += 1;
            if self.deletion_failure_count >= MAX_DELETION_FAILURES {
                return Err(LoggerError::file_rotation(
                    self.base_path.display().to_string(),
                    format!(
                        "Rotation aborted: failed to delete old backup files {} consecutive times",
                        self.deletion_failure_count
                    ),
                ));
            }
        } else {
            self.deletion_failure_count = 0;
        }

        for i in (1..self.policy.max_backup_files).rev() {
            let old_path = self.backup_path(i);
            let new_path = self.backup_path(i + 1);
            let old_compressed = with_suffix(&old_path, ".gz");

            let (from, to) = if old_compressed.exists() {
                (old_compressed, with_suffix(&new_path, ".gz"))
            } else if old_path.exists() {
                (old_path, new_path)
            } else {
                continue;
            };

            if fs::rename(&from, &to).is_err() {
                // Some platforms refuse to rename over an existing file
                let _ = fs::remove_file(&to);
                fs::rename(&from, &to).map_err(|e| {
                    LoggerError::file_rotation(
                        from.display().to_string(),
                        format!("Failed to rotate backup files: {}", e),
                    )
                })?;
            }
        }

        if self.policy.max_backup_files == 0 {
            if self.base_path.exists() {
                fs::remove_file(&self.base_path).map_err(|e| {
                    LoggerError::file_rotation(
                        self.base_path.display().to_string(),
                        format!("Failed to truncate current log file: {}", e),
                    )
                })?;
            }
        } else if self.base_path.exists() {
            let backup_path = self.backup_path(1);
            fs::rename(&self.base_path, &backup_path).map_err(|e| {
                LoggerError::file_rotation(
                    self.base_path.display().to_string(),
                    format!("Failed to rotate current log file: {}", e),
                )
            })?;

            if self.policy.compress {
                compress_file(&backup_path)?;
            }
        }

        let (file, size, _) = Self::open_file(&self.base_path)?;
        self.writer = Some(BufWriter::new(file));
        self.current_size = size;
        self.last_rotation = SystemTime::now();

        Ok(())
    }

    #[must_use]
    pub fn current_size(&self) -> u64 {
        self.current_size
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.base_path
    }

    #[must_use]
    pub fn policy(&self) -> &RotationPolicy {
        &self.policy
    }

    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.closed
    }
}

/// Gzip `path` into `path.gz`, removing the original only once the archive
/// is complete
fn compress_file(path: &Path) -> Result<()> {
    let gz_path = with_suffix(path, ".gz");
    let temp_gz_path = with_suffix(path, ".gz.tmp");
    let compress_error = |message: String, e: std::io::Error| {
        let _ = fs::remove_file(&temp_gz_path);
        LoggerError::io_operation("compress log file", message, e)
    };

    let mut input = File::open(path)
        .map_err(|e| compress_error(format!("Failed to open {}", path.display()), e))?;
    let output = File::create(&temp_gz_path).map_err(|e| {
        compress_error(format!("Failed to create {}", temp_gz_path.display()), e)
    })?;

    let mut encoder = flate2::write::GzEncoder::new(
        BufWriter::with_capacity(64 * 1024, output),
        flate2::Compression::default(),
    );
    std::io::copy(&mut input, &mut encoder)
        .map_err(|e| compress_error(format!("Failed to compress {}", path.display()), e))?;
    encoder
        .finish()
        .and_then(|mut inner| inner.flush())
        .map_err(|e| compress_error("Failed to finish compression".to_string(), e))?;

    fs::rename(&temp_gz_path, &gz_path).map_err(|e| {
        compress_error(format!("Failed to rename to {}", gz_path.display()), e)
    })?;

    if let Err(e) = fs::remove_file(path) {
        eprintln!(
            "[LOGGER WARNING] Compressed {} but could not remove the original: {}",
            path.display(),
            e
        );
    }

    Ok(())
}

impl Appender for RotatingFileAppender {
    fn append(&mut self, bytes: &[u8]) -> Result<()> {
        if self.closed {
            return Err(LoggerError::writer_closed(&self.level_name));
        }

        if self.should_rotate() {
            if let Err(e) = self.rotate() {
                eprintln!(
                    "[LOGGER WARNING] Log rotation failed: {}. Continuing with current file.",
                    e
                );

                if self.writer.is_none() {
                    let (file, size, last_rotation) = Self::open_file(&self.base_path)?;
                    self.writer = Some(BufWriter::new(file));
                    self.current_size = size;
                    self.last_rotation = last_rotation;
                }

                // Let the file outgrow its limit rather than retry on every write
                self.current_size = 0;
                self.last_rotation = SystemTime::now();
            }
        }

        let writer = self
            .writer
            .as_mut()
            .ok_or_else(|| LoggerError::writer("Writer not initialized"))?;
        writer.write_all(bytes).map_err(|e| {
            LoggerError::file_appender(
                self.base_path.display().to_string(),
                format!("Failed to write log entry: {}", e),
            )
        })?;
        self.current_size += bytes.len() as u64;
        Ok(())
    }

    fn sync(&mut self) -> Result<()> {
        if let Some(ref mut writer) = self.writer {
            writer.flush().map_err(|e| {
                LoggerError::file_appender(
                    self.base_path.display().to_string(),
                    format!("Failed to flush: {}", e),
                )
            })?;
            writer.get_ref().sync_data().map_err(|e| {
                LoggerError::io_operation(
                    "syncing log file",
                    format!("Failed to sync '{}'", self.base_path.display()),
                    e,
                )
            })?;
        }
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        if self.closed {
            return Ok(());
        }
        let result = self.sync();
        self.writer = None;
        self.closed = true;
        result
    }

    fn name(&self) -> &str {
        &self.level_name
    }
}

impl Drop for RotatingFileAppender {
    fn drop(&mut self) {
        if let Some(mut writer) = self.writer.take() {
            let _ = writer.flush();
        }
    }
}

/// Default [`AppenderFactory`]: one [`RotatingFileAppender`] per level
///
/// # Examples
///
/// ```
/// use level_file_logger::appenders::RotatingFileFactory;
/// use std::path::Path;
///
/// let factory = RotatingFileFactory::new().with_prefix("api");
/// assert_eq!(
///     factory.file_path(Path::new("/var/log/api"), "ERROR"),
///     Path::new("/var/log/api/api.ERROR.log")
/// );
/// ```
#[derive(Debug, Clone)]
pub struct RotatingFileFactory {
    prefix: String,
    policy: RotationPolicy,
}

impl RotatingFileFactory {
    pub fn new() -> Self {
        Self {
            prefix: default_prefix(),
            policy: RotationPolicy::default(),
        }
    }

    #[must_use]
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    #[must_use]
    pub fn with_policy(mut self, policy: RotationPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn file_path(&self, dir: &Path, level_name: &str) -> PathBuf {
        dir.join(format!("{}.{}.log", self.prefix, level_name))
    }
}

impl Default for RotatingFileFactory {
    fn default() -> Self {
        Self::new()
    }
}

/// Executable stem, or `app` when it cannot be determined
pub fn default_prefix() -> String {
    std::env::current_exe()
        .ok()
        .and_then(|exe| exe.file_stem().map(|s| s.to_string_lossy().into_owned()))
        .filter(|stem| !stem.is_empty())
        .unwrap_or_else(|| "app".to_string())
}

impl AppenderFactory for RotatingFileFactory {
    fn open(&self, dir: &Path, level_name: &str) -> Result<Box<dyn Appender>> {
        let appender = RotatingFileAppender::open(
            self.file_path(dir, level_name),
            level_name,
            self.policy.clone(),
        )?;
        Ok(Box::new(appender))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;
    use tempfile::tempdir;

    fn line(i: usize) -> Vec<u8> {
        format!("I 2025-01-08 10:30:45.000000 test.rs:1] message number {}\n", i).into_bytes()
    }

    #[test]
    fn test_rotation_strategy_constructors() {
        assert_eq!(RotationStrategy::size(1024), RotationStrategy::Size { max_bytes: 1024 });
        assert_eq!(RotationStrategy::daily(2).unwrap(), RotationStrategy::Daily { hour: 2 });
        assert_eq!(
            RotationStrategy::hybrid(1024, 3).unwrap(),
            RotationStrategy::Hybrid { max_bytes: 1024, hour: 3 }
        );
        assert_eq!(RotationStrategy::never(), RotationStrategy::Never);
    }

    #[test]
    fn test_invalid_hour_is_an_error() {
        let err = RotationStrategy::daily(24).unwrap_err();
        assert!(matches!(err, LoggerError::InvalidConfiguration { .. }));
        assert!(err.to_string().contains("hour 24"));

        assert!(RotationStrategy::hybrid(1024, 255).is_err());
        assert!(RotationStrategy::daily(23).is_ok());
        assert_eq!(RotationStrategy::Daily { hour: 23 }.hour(), Some(23));
        assert_eq!(RotationStrategy::size(1).hour(), None);
    }

    #[test]
    fn test_rotation_policy_builder() {
        let policy = RotationPolicy::new()
            .with_max_size(1024)
            .with_max_backups(3)
            .with_compression(true);

        assert_eq!(policy.max_file_size(), Some(1024));
        assert_eq!(policy.max_backup_files, 3);
        assert!(policy.compress);
        assert_eq!(
            RotationPolicy::new().with_strategy(RotationStrategy::hybrid(7, 0).unwrap()).max_file_size(),
            Some(7)
        );
    }

    #[test]
    fn test_factory_opens_level_file() {
        let dir = tempdir().unwrap();
        let factory = RotatingFileFactory::new().with_prefix("svc");

        let mut appender = factory.open(dir.path(), "WARN").unwrap();
        appender.append(b"W line\n").unwrap();
        appender.sync().unwrap();

        let content = fs::read_to_string(dir.path().join("svc.WARN.log")).unwrap();
        assert_eq!(content, "W line\n");
        assert_eq!(appender.name(), "WARN");
    }

    #[test]
    fn test_creates_missing_directory() {
        let dir = tempdir().unwrap();
        let nested = dir.path().join("a").join("b");
        let factory = RotatingFileFactory::new().with_prefix("svc");

        let mut appender = factory.open(&nested, "INFO").unwrap();
        appender.append(b"I x\n").unwrap();
        appender.close().unwrap();
        assert!(nested.join("svc.INFO.log").exists());
    }

    #[test]
    fn test_append_after_close_fails() {
        let dir = tempdir().unwrap();
        let mut appender =
            RotatingFileAppender::open(dir.path().join("x.ERROR.log"), "ERROR", RotationPolicy::new())
                .unwrap();
        appender.close().unwrap();
        assert!(appender.is_closed());
        // Closing twice is harmless
        appender.close().unwrap();

        let err = appender.append(b"late\n").unwrap_err();
        assert!(err.is_writer_closed());
    }

    #[test]
    fn test_reopen_appends() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("x.INFO.log");

        let mut first = RotatingFileAppender::open(&path, "INFO", RotationPolicy::new()).unwrap();
        first.append(b"one\n").unwrap();
        first.close().unwrap();

        let mut second = RotatingFileAppender::open(&path, "INFO", RotationPolicy::new()).unwrap();
        assert_eq!(second.current_size(), 4);
        second.append(b"two\n").unwrap();
        second.close().unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "one\ntwo\n");
    }

    #[test]
    fn test_log_rotation_size_based() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("rotation.INFO.log");
        let policy = RotationPolicy::new().with_max_size(100).with_max_backups(3);

        let mut appender = RotatingFileAppender::open(&path, "INFO", policy).unwrap();
        for i in 0..20 {
            appender.append(&line(i)).unwrap();
        }
        appender.sync().unwrap();

        assert!(dir.path().join("rotation.INFO.log.1").exists());
        assert!(!dir.path().join("rotation.INFO.log.4").exists());
    }

    #[test]
    fn test_rotation_with_compression() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("zip.INFO.log");
        let policy = RotationPolicy::new()
            .with_max_size(60)
            .with_max_backups(2)
            .with_compression(true);

        let mut appender = RotatingFileAppender::open(&path, "INFO", policy).unwrap();
        for i in 0..3 {
            appender.append(&line(i)).unwrap();
        }
        appender.sync().unwrap();

        let gz = dir.path().join("zip.INFO.log.1.gz");
        assert!(gz.exists());
        assert!(!dir.path().join("zip.INFO.log.1").exists());

        let mut decoded = String::new();
        flate2::read::GzDecoder::new(File::open(gz).unwrap())
            .read_to_string(&mut decoded)
            .unwrap();
        assert!(decoded.contains("message number"));
    }

    #[test]
    fn test_no_rotation_with_never_strategy() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("never.INFO.log");
        let policy = RotationPolicy::new().with_strategy(RotationStrategy::Never);

        let mut appender = RotatingFileAppender::open(&path, "INFO", policy).unwrap();
        for i in 0..100 {
            appender.append(&line(i)).unwrap();
        }
        appender.sync().unwrap();

        assert!(!dir.path().join("never.INFO.log.1").exists());
        assert_eq!(fs::read_to_string(&path).unwrap().lines().count(), 100);
    }

    #[test]
    fn test_multiple_rotations_respect_backup_limit() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("multi.INFO.log");
        let policy = RotationPolicy::new().with_max_size(50).with_max_backups(2);

        let mut appender = RotatingFileAppender::open(&path, "INFO", policy).unwrap();
        for i in 0..100 {
            appender.append(&line(i)).unwrap();
        }
        appender.sync().unwrap();

        let log_files = fs::read_dir(dir.path())
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name().to_string_lossy().starts_with("multi.INFO.log"))
            .count();
        assert!(log_files <= 3); // current + 2 backups
    }

    #[test]
    fn test_default_prefix_is_not_empty() {
        assert!(!default_prefix().is_empty());
    }
}
