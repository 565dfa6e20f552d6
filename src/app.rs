//! Wiring of the registry core to its shipped collaborators.

use std::path::PathBuf;
use std::sync::Arc;

use crate::config::Config;
use crate::core::{MutationGateway, PickerOptions, RegistryError};
use crate::data::{Database, DatabaseError, ProjectStore};
use crate::inventory::DirectoryInventory;
use crate::picker::ArgsFolderPicker;
use crate::sync::VersionFileSync;

#[derive(thiserror::Error, Debug)]
pub enum AppError {
    #[error("Failed to open database: {0}")]
    Database(#[from] DatabaseError),
    #[error(transparent)]
    Registry(#[from] RegistryError),
}

/// Owns the database and a gateway whose store has been loaded from it.
pub struct App {
    config: Config,
    _database: Database,
    gateway: MutationGateway,
}

impl App {
    /// Open the default database and load the registry
    pub async fn open(config: Config) -> Result<Self, AppError> {
        Self::open_at(config, crate::util::database_path()).await
    }

    /// Open the database at `db_path` and load the registry
    pub async fn open_at(config: Config, db_path: PathBuf) -> Result<Self, AppError> {
        let database = Database::open(db_path)?;
        let persistence = Arc::new(ProjectStore::new(database.connection()));
        let inventory = Arc::new(DirectoryInventory::new(config.versions_dir.clone()));
        let sync = Arc::new(VersionFileSync::new(config.version_file.clone()));

        let gateway = MutationGateway::new(persistence, inventory, sync)
            .with_sync_timeout(config.sync_timeout);
        gateway.reload(false).await?;

        tracing::debug!(path = %database.path.display(), "Registry loaded");

        Ok(Self {
            config,
            _database: database,
            gateway,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn gateway(&self) -> &MutationGateway {
        &self.gateway
    }

    /// Picker over command-line paths using the configured version file
    pub fn args_picker(
        &self,
        paths: Vec<PathBuf>,
        fallback_version: Option<String>,
    ) -> ArgsFolderPicker {
        ArgsFolderPicker::new(
            paths,
            self.config.version_file.clone(),
            fallback_version.unwrap_or_else(|| self.config.default_version.clone()),
        )
    }

    /// Options for the "add project" folder dialog
    pub fn project_picker_options() -> PickerOptions {
        PickerOptions {
            title: Some("Select project folders".to_string()),
            multiple: true,
            project: true,
        }
    }
}
