//! Logging macros
//!
//! Each argument is wrapped in [`Arg`](crate::Arg) so callers can pass any
//! owned `Display + Send` value, much like `print!` operands.
//!
//! # Examples
//!
//! ```
//! use level_file_logger::{print_log, printf_log, Logger};
//!
//! let logger = Logger::new();
//!
//! print_log!(logger, "info", "listening on port ", 8080);
//! printf_log!(logger, "warn", "retry %d of %d", 3, 5);
//! ```

/// Log the concatenation of the arguments.
///
/// ```
/// # use level_file_logger::{print_log, Logger};
/// # let logger = Logger::new();
/// print_log!(logger, "error", "the error code/message: ", 400, "/", "bad request");
/// ```
#[macro_export]
macro_rules! print_log {
    ($logger:expr, $level:expr $(, $arg:expr)* $(,)?) => {
        $logger.print($level, vec![$($crate::Arg::new($arg)),*])
    };
}

/// Log a printf-style template interpolated with the arguments.
///
/// ```
/// # use level_file_logger::{printf_log, Logger};
/// # let logger = Logger::new();
/// printf_log!(logger, "error", "the error code/message: %d/%s", 400, "bad request");
/// ```
#[macro_export]
macro_rules! printf_log {
    ($logger:expr, $level:expr, $template:expr $(, $arg:expr)* $(,)?) => {
        $logger.printf($level, $template, vec![$($crate::Arg::new($arg)),*])
    };
}

/// [`print_log!`] against the process-wide logger.
#[macro_export]
macro_rules! global_print {
    ($level:expr $(, $arg:expr)* $(,)?) => {
        $crate::global::print($level, vec![$($crate::Arg::new($arg)),*])
    };
}

/// [`printf_log!`] against the process-wide logger.
#[macro_export]
macro_rules! global_printf {
    ($level:expr, $template:expr $(, $arg:expr)* $(,)?) => {
        $crate::global::printf($level, $template, vec![$($crate::Arg::new($arg)),*])
    };
}
