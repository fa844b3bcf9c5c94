//! Log entry structure

use super::template::{render_plain, render_template};
use super::timestamp::TimestampFormat;
use chrono::{DateTime, Local};
use std::fmt;
use std::panic::Location;

/// One argument of a log call, rendered on the dispatch thread
///
/// Values are moved into the entry, so the rendered text reflects the value
/// at call time unless the argument shares interior-mutable state with the
/// caller (an `Arc<Mutex<_>>` wrapper, for instance), in which case it
/// reflects the state at dispatch time.
pub struct Arg(Box<dyn fmt::Display + Send + 'static>);

impl Arg {
    pub fn new<T>(value: T) -> Self
    where
        T: fmt::Display + Send + 'static,
    {
        Arg(Box::new(value))
    }
}

impl fmt::Display for Arg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&*self.0, f)
    }
}

impl fmt::Debug for Arg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Arg").field(&self.0.to_string()).finish()
    }
}

/// How the arguments of an entry become its message
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntryKind {
    /// Arguments concatenated as-is
    Plain,
    /// Arguments interpolated into a printf-style template
    Formatted { template: String },
}

/// Source location of the logging call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CallSite {
    /// File name without its directory
    pub file: &'static str,
    pub line: u32,
}

impl CallSite {
    pub fn from_location(location: &'static Location<'static>) -> Self {
        let path = location.file();
        let file = path.rsplit(['/', '\\']).next().unwrap_or(path);
        Self {
            file,
            line: location.line(),
        }
    }

    /// Placeholder used when no location is available
    pub const fn unknown() -> Self {
        Self { file: "?", line: 1 }
    }
}

impl fmt::Display for CallSite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.file, self.line)
    }
}

#[derive(Debug)]
pub struct LogEntry {
    pub rank: usize,
    pub kind: EntryKind,
    pub args: Vec<Arg>,
    pub call_site: CallSite,
    pub timestamp: DateTime<Local>,
}

impl LogEntry {
    pub fn plain(rank: usize, args: Vec<Arg>, call_site: CallSite) -> Self {
        Self {
            rank,
            kind: EntryKind::Plain,
            args,
            call_site,
            timestamp: Local::now(),
        }
    }

    pub fn formatted(
        rank: usize,
        template: impl Into<String>,
        args: Vec<Arg>,
        call_site: CallSite,
    ) -> Self {
        Self {
            rank,
            kind: EntryKind::Formatted {
                template: template.into(),
            },
            args,
            call_site,
            timestamp: Local::now(),
        }
    }

    #[must_use]
    pub fn with_timestamp(mut self, timestamp: DateTime<Local>) -> Self {
        self.timestamp = timestamp;
        self
    }

    /// Render the message part of the line
    pub fn message(&self) -> String {
        match &self.kind {
            EntryKind::Plain => render_plain(&self.args),
            EntryKind::Formatted { template } => render_template(template, &self.args),
        }
    }

    /// Render the full output line: `<char> <timestamp> <file>:<line>] <message>\n`
    pub fn render_line(&self, level_char: char, timestamp_format: &TimestampFormat) -> String {
        format!(
            "{} {} {}] {}\n",
            level_char,
            timestamp_format.format(&self.timestamp),
            self.call_site,
            self.message()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use std::sync::{Arc, Mutex};

    struct Shared(Arc<Mutex<u32>>);

    impl fmt::Display for Shared {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            let value = *self.0.lock().map_err(|_| fmt::Error)?;
            write!(f, "{}", value)
        }
    }

    fn fixed_time() -> DateTime<Local> {
        Local
            .with_ymd_and_hms(2024, 3, 9, 8, 7, 6)
            .single()
            .expect("valid local time")
            + chrono::Duration::microseconds(42)
    }

    #[test]
    fn test_call_site_basename() {
        let site = CallSite::from_location(Location::caller());
        assert_eq!(site.file, "log_entry.rs");
        assert!(site.line > 0);
        assert_eq!(CallSite::unknown().to_string(), "?:1");
    }

    #[test]
    fn test_plain_line() {
        let entry = LogEntry::plain(
            3,
            vec![
                Arg::new("the error code/message: "),
                Arg::new(400),
                Arg::new("/"),
                Arg::new("bad request"),
            ],
            CallSite { file: "main.rs", line: 12 },
        )
        .with_timestamp(fixed_time());

        let line = entry.render_line('E', &TimestampFormat::LocalMicros);
        assert_eq!(
            line,
            "E 2024-03-09 08:07:06.000042 main.rs:12] the error code/message: 400/bad request\n"
        );
    }

    #[test]
    fn test_formatted_line() {
        let entry = LogEntry::formatted(
            3,
            "code=%d msg=%s",
            vec![Arg::new(400), Arg::new("bad request")],
            CallSite { file: "api.rs", line: 7 },
        )
        .with_timestamp(fixed_time());

        assert_eq!(entry.message(), "code=400 msg=bad request");
        assert!(entry
            .render_line('E', &TimestampFormat::LocalMicros)
            .ends_with("api.rs:7] code=400 msg=bad request\n"));
    }

    #[test]
    fn test_rendering_is_deferred() {
        let counter = Arc::new(Mutex::new(1));
        let entry = LogEntry::plain(
            0,
            vec![Arg::new(Shared(Arc::clone(&counter)))],
            CallSite::unknown(),
        );

        *counter.lock().unwrap() = 2;
        assert_eq!(entry.message(), "2");
    }
}
