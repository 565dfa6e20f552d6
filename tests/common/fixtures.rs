//! Filesystem fixtures for registry tests

use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use binder::Config;
use tempfile::TempDir;

/// A throwaway environment with its own database, versions and projects
pub struct TestEnv {
    dir: TempDir,
}

impl TestEnv {
    pub fn new() -> Self {
        let dir = TempDir::new().expect("Failed to create temp dir");
        fs::create_dir_all(dir.path().join("versions")).expect("Failed to create versions dir");
        fs::create_dir_all(dir.path().join("projects")).expect("Failed to create projects dir");
        Self { dir }
    }

    pub fn data_dir(&self) -> PathBuf {
        self.dir.path().join("data")
    }

    pub fn db_path(&self) -> PathBuf {
        self.data_dir().join("binder.db")
    }

    pub fn versions_dir(&self) -> PathBuf {
        self.dir.path().join("versions")
    }

    pub fn config(&self) -> Config {
        Config {
            versions_dir: self.versions_dir(),
            version_file: ".nvmdrc".to_string(),
            sync_timeout: Duration::from_secs(5),
            default_version: String::new(),
        }
    }

    /// Write a config.toml pointing at this environment's versions dir
    pub fn write_config_file(&self) {
        fs::create_dir_all(self.data_dir()).expect("Failed to create data dir");
        let contents = format!(
            "versions_dir = {:?}\nversion_file = \".nvmdrc\"\n",
            self.versions_dir().to_string_lossy()
        );
        fs::write(self.data_dir().join("config.toml"), contents).expect("Failed to write config");
    }

    /// Pretend `version` is installed
    pub fn install(&self, version: &str) {
        fs::create_dir_all(self.versions_dir().join(version)).expect("Failed to install version");
    }

    /// Create a project folder and return its path
    pub fn project(&self, name: &str) -> PathBuf {
        let path = self.dir.path().join("projects").join(name);
        fs::create_dir_all(&path).expect("Failed to create project");
        path
    }
}

impl Default for TestEnv {
    fn default() -> Self {
        Self::new()
    }
}
