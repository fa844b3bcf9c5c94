//! Output destinations

pub mod console;
pub mod rotating_file;

pub use console::{ConsoleAppender, ConsoleWriter};
pub use rotating_file::{RotatingFileAppender, RotatingFileFactory, RotationPolicy, RotationStrategy};

// Re-export traits for convenience
pub use crate::core::{Appender, AppenderFactory};
