use std::fs;
use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

use crate::config::LogSettings;
use crate::error::YoloclsError;

/// Installs the global subscriber: stderr always, plus a plain-text file
/// layer when `settings.file` is set.
///
/// Keep the returned guard alive until exit so buffered file records are
/// flushed.
pub fn init_logging(settings: &LogSettings) -> Result<Option<WorkerGuard>, YoloclsError> {
    let filter = EnvFilter::try_new(&settings.level)
        .map_err(|err| YoloclsError::Logging(format!("invalid filter '{}': {err}", settings.level)))?;

    let stderr_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .with_ansi(!settings.no_color);

    let (file_layer, guard) = match &settings.file {
        Some(path) => {
            let dir = path
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .unwrap_or(Path::new("."));
            let file_name = path.file_name().ok_or_else(|| {
                YoloclsError::Logging(format!("log file path '{}' has no file name", path.display()))
            })?;
            fs::create_dir_all(dir)?;

            let appender = tracing_appender::rolling::never(dir, file_name);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::layer().with_writer(writer).with_ansi(false);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(stderr_layer)
        .with(file_layer)
        .try_init()
        .map_err(|err| YoloclsError::Logging(err.to_string()))?;

    Ok(guard)
}
