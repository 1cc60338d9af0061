//! # Logging Utilities
//!
//! Logging infrastructure for bitview using `tracing`.
//!
//! The decoding engine logs through `tracing` macros only; this module decides
//! where those events end up:
//! - Console output in a pretty or JSON format (CLI usage)
//! - File-only output for hosts that own the terminal (a debugger embedding the engine)
//! - Log level filtering through `RUST_LOG`
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use bitview_utils::init_logging;
//!
//! // Initialize with default settings (reads from RUST_LOG env var)
//! init_logging().expect("Failed to initialize logging");
//!
//! tracing::info!("Session started");
//! ```
//!
//! ## Environment Variables
//!
//! - `RUST_LOG`: Set log level filter (e.g., `RUST_LOG=debug`, `RUST_LOG=bitview_core=trace`)
//! - `BITVIEW_LOG_FORMAT`: Set output format (`json` or `pretty`, default: `pretty`)
//! - `BITVIEW_LOG_FILE`: Optional path to log file (if not set, logs only to console)

use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::{env, io};

use chrono::{NaiveDate, Utc};
use tracing::{Level, Subscriber};
use tracing_subscriber::fmt::time::ChronoUtc;
use tracing_subscriber::fmt::{self, MakeWriter};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, Registry};

/// Output format override (`pretty` or `json`)
pub const LOG_FORMAT_ENV: &str = "BITVIEW_LOG_FORMAT";

/// Optional log file, written next to the console output
pub const LOG_FILE_ENV: &str = "BITVIEW_LOG_FILE";

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat
{
    /// Pretty-printed, human-readable format (default)
    Pretty,
    /// JSON format, one event per line
    Json,
}

impl FromStr for LogFormat
{
    type Err = LoggingError;

    fn from_str(s: &str) -> Result<Self, Self::Err>
    {
        match s.to_lowercase().as_str() {
            "pretty" | "dev" | "development" => Ok(LogFormat::Pretty),
            "json" | "prod" | "production" => Ok(LogFormat::Json),
            _ => Err(LoggingError::InvalidFormat(format!("{s}. Use 'pretty' or 'json'"))),
        }
    }
}

/// Log level
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel
{
    /// Error level
    Error,
    /// Warning level
    Warn,
    /// Info level (default)
    Info,
    /// Debug level
    Debug,
    /// Trace level (most verbose, includes per-call tracing of the decoder)
    Trace,
}

impl From<LogLevel> for Level
{
    fn from(level: LogLevel) -> Self
    {
        match level {
            LogLevel::Error => Level::ERROR,
            LogLevel::Warn => Level::WARN,
            LogLevel::Info => Level::INFO,
            LogLevel::Debug => Level::DEBUG,
            LogLevel::Trace => Level::TRACE,
        }
    }
}

impl FromStr for LogLevel
{
    type Err = LoggingError;

    fn from_str(s: &str) -> Result<Self, Self::Err>
    {
        match s.to_lowercase().as_str() {
            "error" | "err" => Ok(LogLevel::Error),
            "warn" | "warning" => Ok(LogLevel::Warn),
            "info" => Ok(LogLevel::Info),
            "debug" | "dbg" => Ok(LogLevel::Debug),
            "trace" => Ok(LogLevel::Trace),
            _ => Err(LoggingError::InvalidLevel(format!(
                "{s}. Use 'error', 'warn', 'info', 'debug', or 'trace'"
            ))),
        }
    }
}

/// Initialize logging with default settings
///
/// Reads configuration from environment variables:
/// - `RUST_LOG`: Log level filter (e.g., `debug`, `bitview_core=trace`)
/// - `BITVIEW_LOG_FORMAT`: Output format (`json` or `pretty`, default: `pretty`)
/// - `BITVIEW_LOG_FILE`: Optional path to log file
///
/// ## Errors
///
/// Returns an error if logging is already initialized.
pub fn init_logging() -> Result<(), LoggingError>
{
    let format = env::var(LOG_FORMAT_ENV)
        .ok()
        .and_then(|s| LogFormat::from_str(&s).ok())
        .unwrap_or(LogFormat::Pretty);

    let default_level = env::var("RUST_LOG")
        .unwrap_or_else(|_| "info".to_string())
        .parse::<LogLevel>()
        .map(Into::into)
        .unwrap_or(Level::INFO);

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level.to_string()));
    init_console(format, env_filter)
}

/// Initialize logging with explicit level and format
///
/// ## Example
///
/// ```rust,no_run
/// use bitview_utils::{LogFormat, LogLevel, init_logging_with_level};
///
/// init_logging_with_level(LogLevel::Debug, LogFormat::Pretty)
///     .expect("Failed to initialize logging");
/// ```
///
/// ## Errors
///
/// Returns an error if logging is already initialized.
pub fn init_logging_with_level(level: LogLevel, format: LogFormat) -> Result<(), LoggingError>
{
    init_console(format, EnvFilter::new(Level::from(level).to_string()))
}

/// Initialize logging for an embedding host (file-only, no stdout)
///
/// A debugger that loads the engine owns its console, so events go to
/// `~/.bitview/YYYY-MM-DD-bitview.log` instead, falling back to `/tmp` when
/// the home directory is not available.
///
/// ## Arguments
///
/// * `level` - Optional log level. If `None`, uses `RUST_LOG` or defaults to `INFO`.
///
/// ## Errors
///
/// Returns an error if logging is already initialized or the log directory cannot be created.
pub fn init_logging_for_host(level: Option<LogLevel>) -> Result<PathBuf, LoggingError>
{
    let home = env::var_os("HOME").map(PathBuf::from);
    let log_file = host_log_path(home.as_deref(), Utc::now().date_naive());
    if let Some(directory) = log_file.parent() {
        std::fs::create_dir_all(directory)?;
    }

    // Priority: explicit level, then RUST_LOG, then INFO
    let env_filter = if let Some(level) = level {
        EnvFilter::new(Level::from(level).to_string())
    } else if let Ok(rust_log) = env::var("RUST_LOG") {
        EnvFilter::try_new(&rust_log).unwrap_or_else(|_| EnvFilter::new(Level::INFO.to_string()))
    } else {
        EnvFilter::new(Level::INFO.to_string())
    };

    let file_layer = file_layer(&log_file, LogFormat::Pretty, env_filter, false);
    Registry::default()
        .with(file_layer)
        .try_init()
        .map_err(|err| LoggingError::InitializationFailed(err.to_string()))?;
    Ok(log_file)
}

/// Log file used by [`init_logging_for_host`] on `date`
///
/// `<home>/.bitview/YYYY-MM-DD-bitview.log`, or `/tmp/YYYY-MM-DD-bitview.log`
/// without a home directory.
pub fn host_log_path(home: Option<&Path>, date: NaiveDate) -> PathBuf
{
    let file_name = format!("{}-bitview.log", date.format("%Y-%m-%d"));
    match home {
        Some(home) => home.join(".bitview").join(file_name),
        None => Path::new("/tmp").join(file_name),
    }
}

fn init_console(format: LogFormat, env_filter: EnvFilter) -> Result<(), LoggingError>
{
    let registry = Registry::default().with(event_layer(format, io::stderr, true, env_filter.clone()));
    let result = match env::var(LOG_FILE_ENV).ok().map(PathBuf::from) {
        Some(path) => registry.with(file_layer(&path, format, env_filter, true)).try_init(),
        None => registry.try_init(),
    };
    result.map_err(|err| LoggingError::InitializationFailed(err.to_string()))
}

/// Build a non-blocking file layer
///
/// The appender guard is leaked: dropping it stops the writer thread, and
/// logging lives for the rest of the process.
fn file_layer<S>(path: &Path, format: LogFormat, env_filter: EnvFilter, rolling_daily: bool) -> Box<dyn Layer<S> + Send + Sync>
where
    S: Subscriber + for<'span> LookupSpan<'span>,
{
    let directory = path.parent().unwrap_or_else(|| Path::new("."));
    let file_name = path.file_name().unwrap_or_default();
    let appender = if rolling_daily {
        tracing_appender::rolling::daily(directory, file_name)
    } else {
        // The date is already part of the file name
        tracing_appender::rolling::never(directory, file_name)
    };
    let (non_blocking, guard) = tracing_appender::non_blocking(appender);
    std::mem::forget(guard);

    event_layer(format, non_blocking, false, env_filter)
}

/// One formatting layer: targets, thread ids, source locations and RFC 3339
/// timestamps on every event, plus the span stack in JSON output.
fn event_layer<S, W>(format: LogFormat, writer: W, ansi: bool, env_filter: EnvFilter) -> Box<dyn Layer<S> + Send + Sync>
where
    S: Subscriber + for<'span> LookupSpan<'span>,
    W: for<'writer> MakeWriter<'writer> + Send + Sync + 'static,
{
    let layer = fmt::layer()
        .with_writer(writer)
        .with_target(true)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true)
        .with_timer(ChronoUtc::rfc_3339());

    match format {
        LogFormat::Pretty => layer.with_ansi(ansi).with_filter(env_filter).boxed(),
        LogFormat::Json => layer
            .json()
            .with_current_span(true)
            .with_span_list(true)
            .with_filter(env_filter)
            .boxed(),
    }
}

/// Logging initialization error
#[derive(Debug, thiserror::Error)]
pub enum LoggingError
{
    /// Invalid log format
    #[error("Invalid log format: {0}")]
    InvalidFormat(String),

    /// Invalid log level
    #[error("Invalid log level: {0}")]
    InvalidLevel(String),

    /// Failed to initialize logging
    #[error("Failed to initialize logging: {0}")]
    InitializationFailed(String),

    /// File logging error
    #[error("File logging error: {0}")]
    FileError(#[from] io::Error),
}

#[cfg(test)]
mod tests
{
    use super::*;

    #[test]
    fn test_log_format_from_str()
    {
        assert_eq!(LogFormat::from_str("pretty").unwrap(), LogFormat::Pretty);
        assert_eq!(LogFormat::from_str("JSON").unwrap(), LogFormat::Json);
        assert_eq!(LogFormat::from_str("dev").unwrap(), LogFormat::Pretty);
        assert_eq!(LogFormat::from_str("prod").unwrap(), LogFormat::Json);
        assert!(matches!(LogFormat::from_str("xml"), Err(LoggingError::InvalidFormat(_))));
    }

    #[test]
    fn test_log_level_from_str()
    {
        assert_eq!(LogLevel::from_str("error").unwrap(), LogLevel::Error);
        assert_eq!(LogLevel::from_str("warning").unwrap(), LogLevel::Warn);
        assert_eq!(LogLevel::from_str("info").unwrap(), LogLevel::Info);
        assert_eq!(LogLevel::from_str("dbg").unwrap(), LogLevel::Debug);
        assert_eq!(LogLevel::from_str("trace").unwrap(), LogLevel::Trace);
        assert!(matches!(LogLevel::from_str("loud"), Err(LoggingError::InvalidLevel(_))));
    }

    #[test]
    fn test_host_log_path()
    {
        let date = NaiveDate::from_ymd_opt(2024, 3, 9).unwrap();
        assert_eq!(
            host_log_path(Some(Path::new("/home/dev")), date),
            PathBuf::from("/home/dev/.bitview/2024-03-09-bitview.log")
        );
        assert_eq!(host_log_path(None, date), PathBuf::from("/tmp/2024-03-09-bitview.log"));
    }

    #[test]
    fn test_log_level_to_tracing_level()
    {
        assert_eq!(Level::from(LogLevel::Error), Level::ERROR);
        assert_eq!(Level::from(LogLevel::Warn), Level::WARN);
        assert_eq!(Level::from(LogLevel::Info), Level::INFO);
        assert_eq!(Level::from(LogLevel::Debug), Level::DEBUG);
        assert_eq!(Level::from(LogLevel::Trace), Level::TRACE);
    }
}
