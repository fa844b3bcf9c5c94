//! Writer handle traits for per-level output destinations

use super::error::Result;
use std::path::Path;

/// Byte sink for one output level
///
/// Only the dispatch thread writes to a given handle, but handles are
/// created and closed from whichever thread reconfigures the logger.
pub trait Appender: Send {
    /// Append one rendered line
    fn append(&mut self, bytes: &[u8]) -> Result<()>;

    /// Push buffered bytes down to durable storage
    fn sync(&mut self) -> Result<()>;

    /// Release the underlying resource; later appends must fail with
    /// [`LoggerError::WriterClosed`](super::error::LoggerError::WriterClosed)
    fn close(&mut self) -> Result<()>;

    fn name(&self) -> &str;
}

/// Opens the handle for a level the first time a line is routed to it
pub trait AppenderFactory: Send + Sync {
    fn open(&self, dir: &Path, level_name: &str) -> Result<Box<dyn Appender>>;
}
