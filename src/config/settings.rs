use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::util::paths::{config_path, default_versions_dir};

/// Shortest accepted sync timeout; anything lower fails every rebind
pub const MIN_SYNC_TIMEOUT_MS: u64 = 100;

/// Example configuration file contents (bundled with the binary)
pub const EXAMPLE_CONFIG: &str = include_str!("config.toml.example");

/// Application configuration
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Directory with one subdirectory per installed runtime version
    pub versions_dir: PathBuf,
    /// Name of the per-project file recording the bound version
    pub version_file: String,
    /// Upper bound on a single binding sync
    pub sync_timeout: Duration,
    /// Version suggested for added folders that have no version file
    pub default_version: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            versions_dir: default_versions_dir(),
            version_file: ".nvmdrc".to_string(),
            sync_timeout: Duration::from_millis(5000),
            default_version: String::new(),
        }
    }
}

/// TOML representation of the config file
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TomlConfig {
    pub versions_dir: Option<PathBuf>,
    pub version_file: Option<String>,
    pub sync_timeout_ms: Option<u64>,
    pub default_version: Option<String>,
}

impl Config {
    /// Load configuration from the default config file, creating it on first run
    pub fn load() -> Self {
        let config_file = config_path();

        // Create example config on first run
        if !config_file.exists() {
            Self::create_default_config(&config_file);
        }

        Self::load_from(&config_file)
    }

    /// Load configuration from a specific file, falling back to defaults for
    /// anything missing or unparseable
    pub fn load_from(config_file: &Path) -> Self {
        let mut config = Config::default();

        let contents = match fs::read_to_string(config_file) {
            Ok(contents) => contents,
            Err(_) => return config,
        };

        match toml::from_str::<TomlConfig>(&contents) {
            Ok(toml_config) => config.apply(toml_config),
            Err(e) => {
                tracing::warn!(
                    path = %config_file.display(),
                    error = %e,
                    "Failed to parse config file, using defaults"
                );
            }
        }

        config
    }

    /// Merge user settings on top of the current values
    fn apply(&mut self, toml_config: TomlConfig) {
        if let Some(dir) = toml_config.versions_dir {
            self.versions_dir = expand_home(dir);
        }
        if let Some(file) = toml_config.version_file {
            if !file.trim().is_empty() {
                self.version_file = file;
            }
        }
        if let Some(ms) = toml_config.sync_timeout_ms {
            if ms < MIN_SYNC_TIMEOUT_MS {
                tracing::warn!(
                    sync_timeout_ms = ms,
                    min = MIN_SYNC_TIMEOUT_MS,
                    "sync_timeout_ms too small, using the minimum"
                );
            }
            self.sync_timeout = Duration::from_millis(ms.max(MIN_SYNC_TIMEOUT_MS));
        }
        if let Some(version) = toml_config.default_version {
            self.default_version = version;
        }
    }

    /// Write the bundled example config so users can discover the options
    fn create_default_config(config_file: &Path) {
        if let Some(parent) = config_file.parent() {
            if let Err(e) = fs::create_dir_all(parent) {
                tracing::debug!(error = %e, "Failed to create config directory");
                return;
            }
        }
        if let Err(e) = fs::write(config_file, EXAMPLE_CONFIG) {
            tracing::debug!(error = %e, "Failed to write default config");
        }
    }
}

/// Expand a leading `~` to the home directory
fn expand_home(path: PathBuf) -> PathBuf {
    if let (Ok(rest), Some(home)) = (path.strip_prefix("~"), dirs::home_dir()) {
        return home.join(rest);
    }
    path
}
