//! Stderr mirror for rendered log lines

use crate::core::{LoggerError, Result};
use parking_lot::Mutex;
use std::fmt;
use std::io::Write;
use std::sync::Arc;

/// Replacement for the process error stream
pub type ConsoleWriter = Arc<Mutex<Box<dyn Write + Send>>>;

/// Writes every dispatched line to the process error stream
///
/// Output is byte-identical to the file destinations unless colors are
/// enabled, in which case only the leading level character is colored.
#[derive(Clone, Default)]
pub struct ConsoleAppender {
    use_colors: bool,
    /// `None` writes to stderr
    writer: Option<ConsoleWriter>,
}

impl ConsoleAppender {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_colors(use_colors: bool) -> Self {
        Self {
            use_colors,
            writer: None,
        }
    }

    #[must_use]
    pub fn colored(mut self, use_colors: bool) -> Self {
        self.use_colors = use_colors;
        self
    }

    /// Send lines to `writer` instead of stderr
    #[must_use]
    pub fn with_writer<W: Write + Send + 'static>(mut self, writer: W) -> Self {
        self.writer = Some(Arc::new(Mutex::new(Box::new(writer))));
        self
    }

    pub fn write_line(&self, line: &str) -> Result<()> {
        let output = self.decorate(line);
        let result = match self.writer {
            Some(ref writer) => writer.lock().write_all(output.as_bytes()),
            None => std::io::stderr().lock().write_all(output.as_bytes()),
        };
        result.map_err(|e| LoggerError::io_operation("writing to stderr", "mirror write failed", e))
    }

    pub fn flush(&self) -> Result<()> {
        match self.writer {
            Some(ref writer) => writer.lock().flush()?,
            None => std::io::stderr().flush()?,
        }
        Ok(())
    }

    #[cfg(feature = "console")]
    fn decorate(&self, line: &str) -> String {
        use colored::Colorize;

        if !self.use_colors {
            return line.to_string();
        }
        let mut chars = line.chars();
        let Some(level_char) = chars.next() else {
            return String::new();
        };
        let head = level_char.to_string();
        let colored_head = match level_char {
            'D' => head.blue(),
            'I' => head.green(),
            'W' => head.yellow(),
            'E' => head.red(),
            'F' => head.bright_red().bold(),
            _ => head.normal(),
        };
        format!("{}{}", colored_head, chars.as_str())
    }

    #[cfg(not(feature = "console"))]
    fn decorate(&self, line: &str) -> String {
        line.to_string()
    }
}

impl fmt::Debug for ConsoleAppender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConsoleAppender")
            .field("use_colors", &self.use_colors)
            .field("redirected", &self.writer.is_some())
            .finish()
    }
}
