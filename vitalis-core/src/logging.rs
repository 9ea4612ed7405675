//! Logging for Vitalis, built on the `tracing` ecosystem.
//!
//! [`init_minimal_logging`] is meant for tests and early startup;
//! [`init_logging`] installs the configured console layer plus an optional
//! daily-rolling file layer.

use crate::config::LoggingConfig;
use crate::error::CoreError;
use crate::utils;

use once_cell::sync::Lazy;
use std::io::stdout;
use std::path::Path;
use std::sync::Mutex;
use tracing::Level;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{
    fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer, Registry,
};

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync + 'static>;

/// Keeps the file writer alive so buffered lines get flushed.
static LOG_WORKER_GUARD: Lazy<Mutex<Option<WorkerGuard>>> = Lazy::new(|| Mutex::new(None));

/// Initializes a minimal `stderr` subscriber filtered by `RUST_LOG` (default
/// "info"). Errors, such as a subscriber already being set, are ignored.
pub fn init_minimal_logging() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(Level::INFO.to_string()));

    let _ = fmt::Subscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(atty::is(atty::Stream::Stderr))
        .try_init();
}

fn parse_level(level: &str) -> Result<Level, CoreError> {
    match level.to_lowercase().as_str() {
        "trace" => Ok(Level::TRACE),
        "debug" => Ok(Level::DEBUG),
        "info" => Ok(Level::INFO),
        "warn" => Ok(Level::WARN),
        "error" => Ok(Level::ERROR),
        invalid => Err(CoreError::LoggingInitialization(format!(
            "Invalid log level in config: {}",
            invalid
        ))),
    }
}

fn check_format(format: &str) -> Result<bool, CoreError> {
    match format.to_lowercase().as_str() {
        "json" => Ok(true),
        "text" => Ok(false),
        invalid => Err(CoreError::LoggingInitialization(format!(
            "Invalid log format in config: {}",
            invalid
        ))),
    }
}

/// Creates a daily-rolling file layer and its worker guard.
fn create_file_layer(log_path: &Path, json: bool) -> Result<(BoxedLayer, WorkerGuard), CoreError> {
    let directory = match log_path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    utils::fs::ensure_dir_exists(directory)?;

    let file_name = log_path
        .file_name()
        .unwrap_or_else(|| std::ffi::OsStr::new("vitalis.log"));
    let file_appender = tracing_appender::rolling::daily(directory, file_name);
    let (non_blocking_writer, guard) = tracing_appender::non_blocking(file_appender);

    let layer: BoxedLayer = if json {
        fmt::layer().json().with_writer(non_blocking_writer).with_ansi(false).boxed()
    } else {
        fmt::layer().with_writer(non_blocking_writer).with_ansi(false).boxed()
    };
    Ok((layer, guard))
}

/// Installs the global subscriber described by `config`.
///
/// With `is_reload` set, a failure to replace an existing subscriber is
/// reported on stderr and otherwise ignored; on first initialization it is an
/// error.
pub fn init_logging(config: &LoggingConfig, is_reload: bool) -> Result<(), CoreError> {
    let level = parse_level(&config.level)?;
    let json = check_format(&config.format)?;

    let stdout_layer: BoxedLayer = if json {
        fmt::layer()
            .json()
            .with_writer(stdout)
            .with_ansi(false)
            .with_filter(EnvFilter::new(level.to_string()))
            .boxed()
    } else {
        fmt::layer()
            .with_writer(stdout)
            .with_ansi(atty::is(atty::Stream::Stdout))
            .with_filter(EnvFilter::new(level.to_string()))
            .boxed()
    };

    let mut layers: Vec<BoxedLayer> = vec![stdout_layer];
    let mut new_guard = None;
    if let Some(log_path) = &config.file_path {
        let (file_layer, guard) = create_file_layer(log_path, json)?;
        layers.push(file_layer.with_filter(EnvFilter::new(level.to_string())).boxed());
        new_guard = Some(guard);
    }

    let result = Registry::default().with(layers).try_init();

    match LOG_WORKER_GUARD.lock() {
        Ok(mut slot) => *slot = new_guard,
        Err(e) => eprintln!(
            "[ERROR] Failed to lock LOG_WORKER_GUARD: {}. Log flushing may be affected.",
            e
        ),
    }

    match result {
        Ok(()) => Ok(()),
        Err(e) if is_reload => {
            eprintln!(
                "[INFO] Logging re-initialization attempted; previous subscriber may persist: {}",
                e
            );
            Ok(())
        }
        Err(e) => Err(CoreError::LoggingInitialization(format!(
            "Failed to set global tracing subscriber. Was it already initialized? Error: {}",
            e
        ))),
    }
}
