//! Tracing setup.
//!
//! The terminal UI owns stdout, so events go to a single non-blocking log
//! file. `RUST_LOG` overrides the configured level.

use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter, Registry};

static LOG_GUARD: OnceLock<WorkerGuard> = OnceLock::new();

/// Errors that may occur while initializing logging.
#[derive(Debug, thiserror::Error)]
pub enum LoggingError {
    /// No log path configured and no platform data directory.
    #[error("No suitable data directory available for logs")]
    NoDataDir,
    #[error("Failed to prepare log directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to create log file at {path}: {source}")]
    CreateLogFile {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to install global tracing subscriber: {0}")]
    SetGlobal(#[from] tracing::subscriber::SetGlobalDefaultError),
}

/// Install the global subscriber writing to `file`.
///
/// Subsequent calls are no-ops. Failures are returned so callers can degrade
/// gracefully without aborting startup.
pub fn init(level: &str, file: Option<PathBuf>) -> Result<PathBuf, LoggingError> {
    let log_path = file.ok_or(LoggingError::NoDataDir)?;
    if LOG_GUARD.get().is_some() {
        return Ok(log_path);
    }

    let (dir, name) = split_log_path(&log_path)?;
    fs::create_dir_all(&dir).map_err(|source| LoggingError::CreateDir {
        path: dir.clone(),
        source,
    })?;
    ensure_file_exists(&log_path)?;

    let appender = tracing_appender::rolling::never(&dir, name);
    let (writer, guard) = tracing_appender::non_blocking(appender);
    let file_layer = fmt::layer()
        .with_ansi(false)
        .with_target(true)
        .with_writer(writer);

    let subscriber = Registry::default()
        .with(build_env_filter(level))
        .with(file_layer);
    tracing::subscriber::set_global_default(subscriber)?;
    let _ = LOG_GUARD.set(guard);

    tracing::info!("Logging initialized; log file at {}", log_path.display());
    Ok(log_path)
}

fn split_log_path(path: &Path) -> Result<(PathBuf, String), LoggingError> {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .ok_or_else(|| LoggingError::CreateLogFile {
            path: path.to_path_buf(),
            source: std::io::Error::new(std::io::ErrorKind::InvalidInput, "no file name"),
        })?;
    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."));
    Ok((dir, name))
}

fn ensure_file_exists(path: &Path) -> Result<(), LoggingError> {
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map(|_| ())
        .map_err(|source| LoggingError::CreateLogFile {
            path: path.to_path_buf(),
            source,
        })
}

fn build_env_filter(level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .unwrap_or_else(|_| EnvFilter::new("info"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn split_keeps_directory_and_name() {
        let (dir, name) = split_log_path(Path::new("/var/log/fb/fb.log")).unwrap();
        assert_eq!(dir, PathBuf::from("/var/log/fb"));
        assert_eq!(name, "fb.log");
    }

    #[test]
    fn bare_file_name_logs_to_cwd() {
        let (dir, name) = split_log_path(Path::new("fb.log")).unwrap();
        assert_eq!(dir, PathBuf::from("."));
        assert_eq!(name, "fb.log");
    }

    #[test]
    fn ensure_file_creates_empty_log() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("fb.log");
        ensure_file_exists(&path).unwrap();
        assert!(path.exists());
    }

    #[test]
    fn missing_path_is_reported() {
        assert!(matches!(init("info", None), Err(LoggingError::NoDataDir)));
    }
}
