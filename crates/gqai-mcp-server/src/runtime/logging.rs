//! Logging config and setup
//!
//! Stdout carries protocol traffic when serving over stdio, so logs go to stderr or to
//! a rolling file.

mod log_rotation_kind;

use std::path::{Path, PathBuf};

pub use log_rotation_kind::LogRotationKind;
use tracing::Level;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::RollingFileAppender;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Logging related options
#[derive(Debug, Clone)]
pub struct Logging {
    /// The log level to use for tracing
    pub level: Level,

    /// The directory to write log files to
    pub path: Option<PathBuf>,

    /// Log file rotation period to use when a directory is provided
    pub rotation: LogRotationKind,
}

impl Default for Logging {
    fn default() -> Self {
        Self {
            level: Level::INFO,
            path: None,
            rotation: LogRotationKind::default(),
        }
    }
}

impl Logging {
    pub fn env_filter(&self) -> Result<EnvFilter, anyhow::Error> {
        let mut env_filter = EnvFilter::from_default_env().add_directive(self.level.into());

        if self.level == Level::INFO {
            env_filter = env_filter
                .add_directive("hyper=warn".parse()?)
                .add_directive("reqwest=warn".parse()?);
        }
        Ok(env_filter)
    }
}

/// Sets up either file logging or stderr logging depending on provided options
pub fn setup_logging(logging: &Logging) -> Result<Option<WorkerGuard>, anyhow::Error> {
    let env_filter = logging.env_filter()?;

    if let Some(path) = &logging.path {
        setup_file_logging(path, env_filter, logging.rotation)
    } else {
        setup_stderr_logging(env_filter)
    }
}

/// Sets up rolling file appender logging but falls back to stderr logging on failure
fn setup_file_logging(
    log_path: &Path,
    env_filter: EnvFilter,
    log_rotation: LogRotationKind,
) -> Result<Option<WorkerGuard>, anyhow::Error> {
    if let Err(e) = std::fs::create_dir_all(log_path) {
        eprintln!("Could not build log path {} ({e}) - falling back to stderr", log_path.display());
        return setup_stderr_logging(env_filter);
    }

    let (non_blocking_writer, guard) = match RollingFileAppender::builder()
        .rotation(log_rotation.into())
        .filename_prefix("gqai")
        .filename_suffix("log")
        .build(log_path)
    {
        Ok(appender) => tracing_appender::non_blocking(appender),
        Err(e) => {
            eprintln!("Log file setup failed ({e}) - falling back to stderr");
            return setup_stderr_logging(env_filter);
        }
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(non_blocking_writer)
                .with_ansi(false)
                .with_target(false),
        )
        .init();

    Ok(Some(guard))
}

/// Sets up stderr logging
fn setup_stderr_logging(env_filter: EnvFilter) -> Result<Option<WorkerGuard>, anyhow::Error> {
    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_ansi(true)
                .with_target(false),
        )
        .init();

    Ok(None)
}
