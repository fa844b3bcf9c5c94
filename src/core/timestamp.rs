//! Timestamp formatting for log lines
//!
//! Every line carries the capture time of its entry. The default layout is
//! local wall-clock time with microsecond precision, e.g.
//! `2025-01-08 10:30:45.123456`.

use chrono::{DateTime, Local, Utc};
use serde::{Deserialize, Serialize};

/// strftime layout of [`TimestampFormat::LocalMicros`]
pub const LINE_TIMESTAMP_LAYOUT: &str = "%Y-%m-%d %H:%M:%S%.6f";

/// Timestamp layout used when rendering a line
///
/// # Examples
///
/// ```
/// use level_file_logger::TimestampFormat;
/// use chrono::Local;
///
/// let stamp = TimestampFormat::default().format(&Local::now());
/// assert_eq!(stamp.len(), "2025-01-08 10:30:45.123456".len());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimestampFormat {
    /// Local time with microseconds: `2025-01-08 10:30:45.123456`
    #[default]
    LocalMicros,

    /// Same layout in UTC, for hosts whose logs are merged across zones
    UtcMicros,

    /// RFC 3339 with microseconds and offset: `2025-01-08T10:30:45.123456+01:00`
    Rfc3339Micros,

    /// Custom strftime format
    Custom(String),
}

impl TimestampFormat {
    #[must_use]
    pub fn format(&self, datetime: &DateTime<Local>) -> String {
        match self {
            TimestampFormat::LocalMicros => datetime.format(LINE_TIMESTAMP_LAYOUT).to_string(),
            TimestampFormat::UtcMicros => datetime
                .with_timezone(&Utc)
                .format(LINE_TIMESTAMP_LAYOUT)
                .to_string(),
            TimestampFormat::Rfc3339Micros => {
                datetime.to_rfc3339_opts(chrono::SecondsFormat::Micros, false)
            }
            TimestampFormat::Custom(format_str) => datetime.format(format_str).to_string(),
        }
    }
}
