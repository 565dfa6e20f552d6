//! Path utilities for binder data directories

use std::path::{Path, PathBuf};
use std::sync::OnceLock;

/// Global storage for custom data directory path
static DATA_DIR: OnceLock<PathBuf> = OnceLock::new();

/// Initialize the data directory with an optional custom path.
/// Must be called early in main() before any other path functions are used.
/// If custom_path is None, uses the default ~/.binder location.
pub fn init_data_dir(custom_path: Option<PathBuf>) {
    let path = custom_path.unwrap_or_else(default_data_dir);
    if DATA_DIR.set(path.clone()).is_err() {
        let existing = DATA_DIR
            .get()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "<unknown>".to_string());
        tracing::debug!(
            path = %path.display(),
            existing = %existing,
            "Data directory already initialized"
        );
    }
}

/// Get the default data directory path (~/.binder)
fn default_data_dir() -> PathBuf {
    dirs::home_dir()
        .map(|h| h.join(".binder"))
        .unwrap_or_else(|| PathBuf::from(".binder"))
}

/// Get the base data directory.
/// Returns the custom path if set via init_data_dir(), otherwise ~/.binder
pub fn data_dir() -> PathBuf {
    DATA_DIR.get().cloned().unwrap_or_else(default_data_dir)
}

/// Get the database file path (~/.binder/binder.db)
pub fn database_path() -> PathBuf {
    data_dir().join("binder.db")
}

/// Get the logs directory (~/.binder/logs)
pub fn logs_dir() -> PathBuf {
    data_dir().join("logs")
}

/// Get the default log file path (~/.binder/logs/binder.log)
pub fn log_file_path() -> PathBuf {
    logs_dir().join("binder.log")
}

/// Get the config file path (~/.binder/config.toml)
pub fn config_path() -> PathBuf {
    data_dir().join("config.toml")
}

/// Get the default directory holding installed runtime versions (~/.nvmd/versions)
pub fn default_versions_dir() -> PathBuf {
    dirs::home_dir()
        .map(|h| h.join(".nvmd").join("versions"))
        .unwrap_or_else(|| PathBuf::from(".nvmd").join("versions"))
}

/// Resolve `path` against the current directory if it is relative
pub fn absolute_path(path: &Path) -> std::io::Result<PathBuf> {
    if path.is_absolute() {
        Ok(path.to_path_buf())
    } else {
        Ok(std::env::current_dir()?.join(path))
    }
}
