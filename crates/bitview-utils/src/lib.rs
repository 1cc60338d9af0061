//! # bitview utilities
//!
//! Shared helpers for the bitview workspace. Currently this is the logging
//! setup built on `tracing`, used by the CLI and by hosts embedding the engine.

pub mod logging;

pub use logging::{
    host_log_path, init_logging, init_logging_for_host, init_logging_with_level, LogFormat, LogLevel, LoggingError, LOG_FILE_ENV,
    LOG_FORMAT_ENV,
};
pub use tracing::{debug, error, info, trace, warn};
