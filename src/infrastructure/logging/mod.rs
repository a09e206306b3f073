//! Logging infrastructure
//!
//! Structured logging using tracing and tracing-subscriber:
//! - JSON or human-readable console output on stderr
//! - Optional rolling JSON log file

pub mod logger;

pub use logger::{parse_log_level, LoggerImpl, LOG_FILE_NAME};
