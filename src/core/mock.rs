//! In-memory collaborators for deterministic testing
//!
//! Each mock implements one of the adapter traits, records the calls it
//! receives and can be told to fail, so gateway behavior can be verified
//! without touching SQLite or the filesystem.
//!
//! # Example
//! ```no_run
//! use std::sync::Arc;
//! use binder::core::mock::{MockInventory, MockPersistence, MockSync};
//! use binder::core::MutationGateway;
//!
//! let gateway = MutationGateway::new(
//!     Arc::new(MockPersistence::default()),
//!     Arc::new(MockInventory::new(["20.11.0"])),
//!     Arc::new(MockSync::new()),
//! );
//! ```

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;

use super::adapters::{
    BindingSync, FolderPicker, InventoryError, PersistenceError, PickerError, PickerOptions,
    RegistryPersistence, Selection, SyncError, SyncOutcome, VersionInventory,
};
use crate::data::{InstalledVersions, ProjectCandidate, Registry};

/// Persistence backed by a single in-memory registry
#[derive(Default)]
pub struct MockPersistence {
    stored: Mutex<Registry>,
    last_saved: Mutex<Option<Registry>>,
    saves: AtomicUsize,
    fail_saves: AtomicBool,
}

impl MockPersistence {
    /// Start with `registry` already "on disk"
    pub fn with_registry(registry: Registry) -> Self {
        Self {
            stored: Mutex::new(registry),
            ..Self::default()
        }
    }

    /// Make every subsequent save fail
    pub fn fail_saves(&self) {
        self.fail_saves.store(true, Ordering::SeqCst);
    }

    pub fn save_count(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }

    /// Registry passed to the most recent successful save
    pub fn saved(&self) -> Option<Registry> {
        self.last_saved.lock().clone()
    }
}

#[async_trait]
impl RegistryPersistence for MockPersistence {
    async fn save(&self, registry: &Registry) -> Result<(), PersistenceError> {
        if self.fail_saves.load(Ordering::SeqCst) {
            return Err(PersistenceError::Other("mock save failure".into()));
        }
        *self.stored.lock() = registry.clone();
        *self.last_saved.lock() = Some(registry.clone());
        self.saves.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn load(&self) -> Result<Registry, PersistenceError> {
        Ok(self.stored.lock().clone())
    }
}

/// Inventory returning a configurable version list
#[derive(Default)]
pub struct MockInventory {
    versions: Mutex<Vec<String>>,
    forced_refreshes: AtomicUsize,
}

impl MockInventory {
    pub fn new<I, S>(versions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            versions: Mutex::new(versions.into_iter().map(Into::into).collect()),
            forced_refreshes: AtomicUsize::new(0),
        }
    }

    /// Replace the installed versions, e.g. after an install
    pub fn set_versions<I, S>(&self, versions: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        *self.versions.lock() = versions.into_iter().map(Into::into).collect();
    }

    /// Number of calls made with `force_refresh = true`
    pub fn forced_refreshes(&self) -> usize {
        self.forced_refreshes.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl VersionInventory for MockInventory {
    async fn list_installed(
        &self,
        force_refresh: bool,
    ) -> Result<InstalledVersions, InventoryError> {
        if force_refresh {
            self.forced_refreshes.fetch_add(1, Ordering::SeqCst);
        }
        Ok(self.versions.lock().iter().collect())
    }
}

/// Sync adapter that succeeds unless told otherwise
#[derive(Default)]
pub struct MockSync {
    not_found: Mutex<HashSet<PathBuf>>,
    fail_sync: AtomicBool,
    fail_release: AtomicBool,
    delay: Mutex<Option<Duration>>,
    synced: Mutex<Vec<(PathBuf, String)>>,
    released: Mutex<Vec<PathBuf>>,
}

impl MockSync {
    pub fn new() -> Self {
        Self::default()
    }

    /// Report `path` as unresolvable
    pub fn not_found(&self, path: &Path) {
        self.not_found.lock().insert(path.to_path_buf());
    }

    /// Make sync calls return a transient error
    pub fn fail_sync(&self) {
        self.fail_sync.store(true, Ordering::SeqCst);
    }

    /// Make release calls return an error
    pub fn fail_release(&self) {
        self.fail_release.store(true, Ordering::SeqCst);
    }

    /// Sleep before answering sync calls
    pub fn delay(&self, delay: Duration) {
        *self.delay.lock() = Some(delay);
    }

    /// Successful or not-found sync calls, in order
    pub fn synced(&self) -> Vec<(PathBuf, String)> {
        self.synced.lock().clone()
    }

    pub fn released(&self) -> Vec<PathBuf> {
        self.released.lock().clone()
    }
}

#[async_trait]
impl BindingSync for MockSync {
    async fn sync_binding(
        &self,
        path: &Path,
        version: &str,
        timeout: Duration,
    ) -> Result<SyncOutcome, SyncError> {
        let delay = *self.delay.lock();
        if let Some(delay) = delay {
            if tokio::time::timeout(timeout, tokio::time::sleep(delay))
                .await
                .is_err()
            {
                return Err(SyncError::TimedOut(timeout));
            }
        }
        if self.fail_sync.load(Ordering::SeqCst) {
            return Err(SyncError::Other("mock sync failure".into()));
        }

        let previous = self
            .synced
            .lock()
            .iter()
            .rev()
            .find(|(synced, _)| synced == path)
            .map(|(_, version)| version.clone())
            .filter(|version| !version.is_empty());
        self.synced
            .lock()
            .push((path.to_path_buf(), version.to_string()));
        if self.not_found.lock().contains(path) {
            Ok(SyncOutcome::NotFound)
        } else {
            Ok(SyncOutcome::Applied { previous })
        }
    }

    async fn release_binding(&self, path: &Path) -> Result<(), SyncError> {
        if self.fail_release.load(Ordering::SeqCst) {
            return Err(SyncError::Other("mock release failure".into()));
        }
        self.released.lock().push(path.to_path_buf());
        Ok(())
    }
}

/// Picker returning a fixed selection
pub struct MockPicker {
    selection: Selection,
}

impl MockPicker {
    pub fn canceled() -> Self {
        Self {
            selection: Selection::Canceled,
        }
    }

    pub fn selecting(candidates: Vec<ProjectCandidate>) -> Self {
        Self {
            selection: Selection::Selected(candidates),
        }
    }
}

#[async_trait]
impl FolderPicker for MockPicker {
    async fn select_folders(&self, _options: &PickerOptions) -> Result<Selection, PickerError> {
        Ok(self.selection.clone())
    }
}
