//! Structured logging.
//!
//! # Responsibilities
//! - Build and install the process-wide `tracing` subscriber
//! - Fan every event out to independent sinks (console, combined file,
//!   error-only file, exception file)
//! - Provide the injectable [`Logger`] handle with five leveled operations
//! - Flush non-blocking writers at shutdown through [`LogGuard`]
//!
//! # Design Decisions
//! - Each sink is its own filtered layer; a slow or failing file writer
//!   never blocks the console or the request path (writes go through
//!   `tracing_appender::non_blocking`, which drops lines instead of blocking)
//! - One event is written as one line; appenders never interleave events
//! - Panics are logged with target `exception` and routed to their own file

use std::any::Any;
use std::fmt;
use std::panic;
use std::path::Path;
use std::sync::Arc;

use serde::Serialize;
use thiserror::Error;
use tracing::level_filters::LevelFilter;
use tracing::{Level, Subscriber};
use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_appender::rolling::{InitError, RollingFileAppender, Rotation};
use tracing_subscriber::filter::Targets;
use tracing_subscriber::fmt::time::ChronoLocal;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, Registry};

use crate::config::{LogRotation, LoggingConfig};

/// Millisecond precision, local time.
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.3f";

/// Target used for panics so they can be routed to the exception file.
pub const EXCEPTION_TARGET: &str = "exception";

const COMBINED_PREFIX: &str = "application";
const ERROR_PREFIX: &str = "error";
const EXCEPTION_PREFIX: &str = "exceptions";

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync + 'static>;

/// Errors raised while building the logging stack.
#[derive(Debug, Error)]
pub enum LoggingError {
    #[error("unknown log level '{0}'")]
    Level(String),

    #[error("cannot create log directory {path}: {source}")]
    Directory {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot open {sink} log file: {source}")]
    Appender {
        sink: &'static str,
        #[source]
        source: InitError,
    },

    #[error("failed to install tracing subscriber: {0}")]
    Install(String),
}

/// Severity of a [`Logger`] emission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Verbose,
}

/// Text of a log record. Structured values are rendered as JSON.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogMessage(String);

impl LogMessage {
    /// Render any serializable value. Never fails: a value that cannot be
    /// serialized is replaced by a placeholder.
    pub fn structured<T: Serialize + ?Sized>(value: &T) -> Self {
        match serde_json::to_string(value) {
            Ok(text) => Self(text),
            Err(e) => Self(format!("<unserializable: {e}>")),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LogMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for LogMessage {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for LogMessage {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&String> for LogMessage {
    fn from(value: &String) -> Self {
        Self(value.clone())
    }
}

impl From<serde_json::Value> for LogMessage {
    fn from(value: serde_json::Value) -> Self {
        Self(value.to_string())
    }
}

/// Injectable logging handle.
///
/// Cheap to clone. Every component that logs receives one through the
/// application state instead of reaching for a global.
#[derive(Debug, Clone, Default)]
pub struct Logger {
    context: Option<Arc<str>>,
}

impl Logger {
    pub fn new() -> Self {
        Self::default()
    }

    /// A logger whose records carry `context` unless a call overrides it.
    pub fn with_context(&self, context: impl Into<Arc<str>>) -> Self {
        Self {
            context: Some(context.into()),
        }
    }

    /// A logger that prefixes every message with the request's trace id.
    pub fn for_request(&self, trace_id: impl fmt::Display) -> RequestLogger {
        RequestLogger {
            logger: self.clone(),
            prefix: format!("[{trace_id}]"),
        }
    }

    pub fn log(&self, message: impl Into<LogMessage>, context: Option<&str>) {
        self.emit(LogLevel::Info, message.into(), context, None);
    }

    pub fn info(&self, message: impl Into<LogMessage>, context: Option<&str>) {
        self.emit(LogLevel::Info, message.into(), context, None);
    }

    pub fn error(&self, message: impl Into<LogMessage>, stack: Option<&str>, context: Option<&str>) {
        self.emit(LogLevel::Error, message.into(), context, stack);
    }

    pub fn warn(&self, message: impl Into<LogMessage>, context: Option<&str>) {
        self.emit(LogLevel::Warn, message.into(), context, None);
    }

    pub fn debug(&self, message: impl Into<LogMessage>, context: Option<&str>) {
        self.emit(LogLevel::Debug, message.into(), context, None);
    }

    pub fn verbose(&self, message: impl Into<LogMessage>, context: Option<&str>) {
        self.emit(LogLevel::Verbose, message.into(), context, None);
    }

    /// Emit at an explicit level.
    pub fn emit(
        &self,
        level: LogLevel,
        message: LogMessage,
        context: Option<&str>,
        stack: Option<&str>,
    ) {
        let context = context.or(self.context.as_deref());
        match level {
            LogLevel::Error => tracing::error!(context, stack, "{}", message),
            LogLevel::Warn => tracing::warn!(context, "{}", message),
            LogLevel::Info => tracing::info!(context, "{}", message),
            LogLevel::Debug => tracing::debug!(context, "{}", message),
            LogLevel::Verbose => tracing::trace!(context, "{}", message),
        }
    }
}

/// Request-scoped logger: every message starts with `[<trace id>] `.
#[derive(Debug, Clone)]
pub struct RequestLogger {
    logger: Logger,
    prefix: String,
}

impl RequestLogger {
    fn prefixed(&self, message: impl Into<LogMessage>) -> LogMessage {
        LogMessage(format!("{} {}", self.prefix, message.into()))
    }

    pub fn log(&self, message: impl Into<LogMessage>, context: Option<&str>) {
        self.logger.log(self.prefixed(message), context);
    }

    pub fn info(&self, message: impl Into<LogMessage>, context: Option<&str>) {
        self.logger.info(self.prefixed(message), context);
    }

    pub fn error(&self, message: impl Into<LogMessage>, stack: Option<&str>, context: Option<&str>) {
        self.logger.error(self.prefixed(message), stack, context);
    }

    pub fn warn(&self, message: impl Into<LogMessage>, context: Option<&str>) {
        self.logger.warn(self.prefixed(message), context);
    }

    pub fn debug(&self, message: impl Into<LogMessage>, context: Option<&str>) {
        self.logger.debug(self.prefixed(message), context);
    }

    pub fn verbose(&self, message: impl Into<LogMessage>, context: Option<&str>) {
        self.logger.verbose(self.prefixed(message), context);
    }
}

/// Keeps the non-blocking file writers alive. Dropping it flushes them.
#[must_use = "dropping the guard stops the file writers"]
pub struct LogGuard {
    _workers: Vec<WorkerGuard>,
}

impl LogGuard {
    /// Flush pending records and stop the writer threads.
    pub fn shutdown(self) {
        drop(self);
    }
}

/// Build the subscriber described by `config` without installing it.
pub fn build(
    config: &LoggingConfig,
) -> Result<(impl Subscriber + Send + Sync + 'static, LogGuard), LoggingError> {
    let level: Level = config
        .level
        .parse()
        .map_err(|_| LoggingError::Level(config.level.clone()))?;

    let mut layers: Vec<BoxedLayer> = Vec::new();
    let mut workers = Vec::new();

    if config.console {
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(config.level.as_str()));
        let console = tracing_subscriber::fmt::layer()
            .with_timer(ChronoLocal::new(TIMESTAMP_FORMAT.to_string()))
            .with_target(false);
        let console = if config.json {
            console.json().with_filter(filter).boxed()
        } else {
            console.with_filter(filter).boxed()
        };
        layers.push(console);
    }

    if config.file {
        std::fs::create_dir_all(&config.directory).map_err(|source| LoggingError::Directory {
            path: config.directory.clone(),
            source,
        })?;

        let (combined, guard) = tracing_appender::non_blocking(rolling(config, COMBINED_PREFIX)?);
        workers.push(guard);
        layers.push(
            file_layer(combined)
                .with_filter(LevelFilter::from_level(level))
                .boxed(),
        );

        let (errors, guard) = tracing_appender::non_blocking(rolling(config, ERROR_PREFIX)?);
        workers.push(guard);
        layers.push(file_layer(errors).with_filter(LevelFilter::ERROR).boxed());

        let (exceptions, guard) =
            tracing_appender::non_blocking(rolling(config, EXCEPTION_PREFIX)?);
        workers.push(guard);
        layers.push(
            file_layer(exceptions)
                .with_filter(Targets::new().with_target(EXCEPTION_TARGET, Level::ERROR))
                .boxed(),
        );
    }

    let subscriber = tracing_subscriber::registry().with(layers);
    Ok((subscriber, LogGuard { _workers: workers }))
}

/// Build and install the global subscriber, then route panics through it.
pub fn init(config: &LoggingConfig) -> Result<LogGuard, LoggingError> {
    let (subscriber, guard) = build(config)?;
    subscriber
        .try_init()
        .map_err(|e| LoggingError::Install(e.to_string()))?;
    install_panic_hook();
    Ok(guard)
}

/// Log every panic with target [`EXCEPTION_TARGET`] before the previous hook runs.
pub fn install_panic_hook() {
    let previous = panic::take_hook();
    panic::set_hook(Box::new(move |info| {
        let location = info
            .location()
            .map(|l| format!("{}:{}", l.file(), l.line()))
            .unwrap_or_else(|| "unknown location".to_string());
        let message = panic_message(info.payload());
        tracing::error!(target: EXCEPTION_TARGET, location = %location, "panic: {message}");
        previous(info);
    }));
}

/// Best-effort text of a panic payload.
pub fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}

fn rolling(config: &LoggingConfig, prefix: &'static str) -> Result<RollingFileAppender, LoggingError> {
    let rotation = match config.rotation {
        LogRotation::Hourly => Rotation::HOURLY,
        LogRotation::Daily => Rotation::DAILY,
        LogRotation::Never => Rotation::NEVER,
    };

    let mut builder = RollingFileAppender::builder()
        .rotation(rotation)
        .filename_prefix(prefix)
        .filename_suffix("log");
    if config.max_files > 0 {
        builder = builder.max_log_files(config.max_files);
    }

    builder
        .build(Path::new(&config.directory))
        .map_err(|source| LoggingError::Appender { sink: prefix, source })
}

fn file_layer(writer: NonBlocking) -> impl Layer<Registry> + Send + Sync + 'static {
    tracing_subscriber::fmt::layer()
        .with_ansi(false)
        .with_timer(ChronoLocal::new(TIMESTAMP_FORMAT.to_string()))
        .with_writer(writer)
}
