use std::io;
use std::path::Path;
use tracing::warn;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::fmt;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

const LOG_DIR: &str = "logs";
const LOG_FILE: &str = "vagas.log";
const STDOUT_FILTER: &str = "info,web_request=warn,db=warn,sqlx=off";
const FILE_FILTER: &str = "info,pipeline=debug,slack=debug,sqlx=warn";

/// Daily rolling appender under `dir`. Fails instead of panicking when the directory
/// or file cannot be created.
pub fn file_appender(dir: &Path) -> Result<RollingFileAppender, String> {
    RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix(LOG_FILE)
        .build(dir)
        .map_err(|e| format!("Cannot write logs to {}: {}", dir.display(), e))
}

/// Stdout at info with the noisy targets quieted, plus a daily file with the detail.
/// `RUST_LOG` replaces the stdout filter when set. An unwritable log directory only
/// drops the file layer.
pub fn configure_logging() {
    let stdout_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(STDOUT_FILTER));

    let stdout_log = fmt::layer()
        .with_writer(io::stdout)
        .with_filter(stdout_filter);

    let (file_log, file_error) = match file_appender(Path::new(LOG_DIR)) {
        Ok(appender) => (
            Some(
                fmt::layer()
                    .with_writer(appender)
                    .with_ansi(false)
                    .with_filter(EnvFilter::new(FILE_FILTER)),
            ),
            None,
        ),
        Err(e) => (None, Some(e)),
    };

    tracing_subscriber::Registry::default()
        .with(stdout_log)
        .with(file_log)
        .init();

    if let Some(e) = file_error {
        warn!("{}, logging to stdout only", e);
    }
}
