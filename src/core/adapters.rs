//! Collaborator contracts the registry core depends on.
//!
//! Each trait is a narrow seam so the gateway can be driven by the shipped
//! implementations (SQLite, version directory, version file, CLI arguments)
//! or by the doubles in [`crate::core::mock`].

use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

use crate::data::{DatabaseError, InstalledVersions, ProjectCandidate, Registry};

#[derive(Error, Debug)]
pub enum PersistenceError {
    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),
    #[error("Storage task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
    #[error("{0}")]
    Other(String),
}

#[derive(Error, Debug)]
pub enum InventoryError {
    #[error("Failed to read versions directory {path}: {source}")]
    ReadDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("{0}")]
    Other(String),
}

#[derive(Error, Debug)]
pub enum SyncError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("timed out after {}ms", .0.as_millis())]
    TimedOut(Duration),
    #[error("Sync task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
    #[error("{0}")]
    Other(String),
}

#[derive(Error, Debug)]
pub enum PickerError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("{0}")]
    Other(String),
}

/// Durable storage for the ordered registry
#[async_trait]
pub trait RegistryPersistence: Send + Sync {
    /// Persist the full ordered sequence atomically
    async fn save(&self, registry: &Registry) -> Result<(), PersistenceError>;

    /// Last persisted snapshot, or an empty registry if nothing was saved
    async fn load(&self) -> Result<Registry, PersistenceError>;
}

/// Source of installed runtime versions
#[async_trait]
pub trait VersionInventory: Send + Sync {
    /// Currently installed versions; `force_refresh` bypasses any cache
    async fn list_installed(&self, force_refresh: bool)
        -> Result<InstalledVersions, InventoryError>;
}

/// Result of applying a binding at the filesystem level
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncOutcome {
    /// The binding is in place; `previous` is the version it replaced, if any
    Applied { previous: Option<String> },
    /// The project path could not be resolved
    NotFound,
}

/// Applies version bindings to project directories
#[async_trait]
pub trait BindingSync: Send + Sync {
    /// Verify and apply `version` at `path` within `timeout`.
    ///
    /// An unresolvable path is reported as [`SyncOutcome::NotFound`], not as an
    /// error; errors are reserved for transient faults. On
    /// [`SyncError::TimedOut`] nothing has been applied and nothing will be
    /// applied later. An empty `version` clears the binding.
    async fn sync_binding(
        &self,
        path: &Path,
        version: &str,
        timeout: Duration,
    ) -> Result<SyncOutcome, SyncError>;

    /// Undo whatever `sync_binding` left behind for a project that was removed
    async fn release_binding(&self, path: &Path) -> Result<(), SyncError>;
}

/// Options passed to the folder picker
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PickerOptions {
    pub title: Option<String>,
    pub multiple: bool,
    /// Read each folder's version file to suggest a version
    pub project: bool,
}

/// What the user picked
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    Canceled,
    Selected(Vec<ProjectCandidate>),
}

/// User-facing folder selection
#[async_trait]
pub trait FolderPicker: Send + Sync {
    async fn select_folders(&self, options: &PickerOptions) -> Result<Selection, PickerError>;
}
