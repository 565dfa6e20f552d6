use std::path::PathBuf;

use thiserror::Error;

use super::adapters::{InventoryError, PersistenceError, PickerError};

/// Errors returned by registry mutations
#[derive(Error, Debug)]
pub enum RegistryError {
    #[error("The project \"{name}\" already exists")]
    DuplicateProject { name: String, path: PathBuf },

    #[error("Project not found, please check it: {}", path.display())]
    ProjectNotFound { path: PathBuf },

    #[error("Index {index} is out of range for {len} projects")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("Something went wrong: {0}")]
    SyncFailed(String),

    #[error("Failed to persist projects: {0}")]
    Persistence(#[from] PersistenceError),

    #[error("Failed to list installed versions: {0}")]
    Inventory(#[from] InventoryError),

    #[error("Folder selection failed: {0}")]
    Picker(#[from] PickerError),
}

impl RegistryError {
    /// Whether retrying the same call may succeed
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            RegistryError::SyncFailed(_)
                | RegistryError::Persistence(_)
                | RegistryError::Inventory(_)
        )
    }
}
