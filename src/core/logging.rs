//! Console and rolling-file logging setup.

use std::io::IsTerminal;
use std::path::{Path, PathBuf};

use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

use crate::error::{Error, Result};

/// Prefix of the log files; the appender adds a date suffix.
pub const LOG_FILE_PREFIX: &str = "docker_build.log";

const MAX_LOG_FILES: usize = 7;

#[derive(Debug, Clone)]
pub struct LogOptions {
    pub directory: PathBuf,
}

impl Default for LogOptions {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("."),
        }
    }
}

/// Keeps the file writer alive. Dropping it flushes pending log lines.
#[must_use = "dropping the guard stops file logging"]
pub struct LogGuard {
    _file: WorkerGuard,
}

/// Install the global subscriber: stderr plus a daily-rotated file.
///
/// `RUST_LOG` overrides the default `info` level.
pub fn init(options: &LogOptions) -> Result<LogGuard> {
    let appender = file_appender(&options.directory)?;
    let (file_writer, guard) = tracing_appender::non_blocking(appender);

    let console = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_ansi(std::io::stderr().is_terminal())
        .with_target(false)
        .with_filter(env_filter()?);

    let file = tracing_subscriber::fmt::layer()
        .with_writer(file_writer)
        .with_ansi(false)
        .with_thread_names(true)
        .with_filter(env_filter()?);

    tracing_subscriber::registry()
        .with(console)
        .with(file)
        .try_init()
        .map_err(|e| Error::internal_unexpected(format!("Failed to install logger: {}", e)))?;

    Ok(LogGuard { _file: guard })
}

fn env_filter() -> Result<EnvFilter> {
    EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env()
        .map_err(|e| Error::internal_unexpected(format!("Invalid RUST_LOG directives: {}", e)))
}

fn file_appender(directory: &Path) -> Result<RollingFileAppender> {
    RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix(LOG_FILE_PREFIX)
        .max_log_files(MAX_LOG_FILES)
        .build(directory)
        .map_err(|e| {
            Error::internal_io(
                e.to_string(),
                Some(format!("open log directory {}", directory.display())),
            )
        })
}
