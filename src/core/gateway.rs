//! The single writer for the project registry.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use parking_lot::RwLock;
use tokio::sync::Mutex;

use super::adapters::{
    BindingSync, FolderPicker, PickerOptions, RegistryPersistence, Selection, SyncOutcome,
    VersionInventory,
};
use super::error::RegistryError;
use super::operations::{self, AddReport};
use super::reconciler::reconcile;
use super::registry_store::RegistryStore;
use crate::data::{InstalledVersions, ProjectBinding, ProjectCandidate, Registry};

const DEFAULT_SYNC_TIMEOUT: Duration = Duration::from_secs(5);

/// How a rebind ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RebindOutcome {
    /// The binding was applied and the project is active
    Bound(ProjectBinding),
    /// The project path could not be resolved; the version is recorded anyway
    /// and the project is marked inactive
    Degraded(ProjectBinding),
}

impl RebindOutcome {
    pub fn binding(&self) -> &ProjectBinding {
        match self {
            RebindOutcome::Bound(binding) | RebindOutcome::Degraded(binding) => binding,
        }
    }

    pub fn is_degraded(&self) -> bool {
        matches!(self, RebindOutcome::Degraded(_))
    }
}

/// Snapshot and inventory produced by a reload
#[derive(Debug, Clone)]
pub struct ReloadReport {
    pub registry: Arc<Registry>,
    pub installed: Arc<InstalledVersions>,
}

/// Translates add/remove/rebind/reorder/reload intents into registry changes.
///
/// Every operation holds the write lock for its whole read-modify-flush cycle,
/// including the sync call. A new snapshot becomes visible in the store only
/// after it has been persisted, so a failed flush leaves both untouched.
pub struct MutationGateway {
    store: Arc<RegistryStore>,
    persistence: Arc<dyn RegistryPersistence>,
    inventory: Arc<dyn VersionInventory>,
    sync: Arc<dyn BindingSync>,
    /// Inventory from the last reload; `None` until the first one
    installed: RwLock<Option<Arc<InstalledVersions>>>,
    write_lock: Mutex<()>,
    sync_timeout: Duration,
}

impl MutationGateway {
    pub fn new(
        persistence: Arc<dyn RegistryPersistence>,
        inventory: Arc<dyn VersionInventory>,
        sync: Arc<dyn BindingSync>,
    ) -> Self {
        Self {
            store: Arc::new(RegistryStore::default()),
            persistence,
            inventory,
            sync,
            installed: RwLock::new(None),
            write_lock: Mutex::new(()),
            sync_timeout: DEFAULT_SYNC_TIMEOUT,
        }
    }

    /// Bound the time a single sync call may take
    pub fn with_sync_timeout(mut self, timeout: Duration) -> Self {
        self.sync_timeout = timeout;
        self
    }

    pub fn store(&self) -> &Arc<RegistryStore> {
        &self.store
    }

    /// Current registry snapshot
    pub fn registry(&self) -> Arc<Registry> {
        self.store.load()
    }

    /// Installed versions seen by the last reload (empty before the first one)
    pub fn installed_versions(&self) -> Arc<InstalledVersions> {
        self.installed.read().clone().unwrap_or_default()
    }

    /// Register new projects, rejecting paths that are already present
    pub async fn add_projects(
        &self,
        candidates: Vec<ProjectCandidate>,
    ) -> Result<AddReport, RegistryError> {
        let _guard = self.write_lock.lock().await;
        let current = self.store.load();

        let (next, report) = operations::add_candidates(&current, candidates, Utc::now());
        for rejection in &report.rejected {
            tracing::warn!(error = %rejection, "Skipping project");
        }
        if !report.has_changes() {
            return Ok(report);
        }

        self.commit(self.annotate(next), None).await?;
        tracing::info!(added = report.added.len(), "Added projects");
        Ok(report)
    }

    /// Ask the picker for folders and add them.
    ///
    /// Returns `None` when the user cancelled.
    pub async fn add_from_picker(
        &self,
        picker: &dyn FolderPicker,
        options: &PickerOptions,
    ) -> Result<Option<AddReport>, RegistryError> {
        match picker.select_folders(options).await? {
            Selection::Canceled => {
                tracing::debug!("Folder selection canceled");
                Ok(None)
            }
            Selection::Selected(candidates) => self.add_projects(candidates).await.map(Some),
        }
    }

    /// Remove the project registered at exactly `path`.
    ///
    /// Removing an unknown path is a no-op and returns `None`.
    pub async fn remove_project(
        &self,
        path: &Path,
    ) -> Result<Option<ProjectBinding>, RegistryError> {
        let _guard = self.write_lock.lock().await;
        let current = self.store.load();

        let Some((next, removed)) = operations::remove(&current, path) else {
            tracing::debug!(path = %path.display(), "Project not registered, nothing to remove");
            return Ok(None);
        };

        self.commit(next, None).await?;
        tracing::info!(path = %path.display(), "Removed project");

        if let Err(e) = self.sync.release_binding(path).await {
            tracing::warn!(
                path = %path.display(),
                error = %e,
                "Failed to release project binding"
            );
        }

        Ok(Some(removed))
    }

    /// Bind the project at `path` to `version`.
    ///
    /// An unresolvable project path is recorded as a degraded binding rather
    /// than an error. Transient sync faults and timeouts leave the registry
    /// untouched and return `SyncFailed`.
    pub async fn rebind_version(
        &self,
        path: &Path,
        version: &str,
    ) -> Result<RebindOutcome, RegistryError> {
        let _guard = self.write_lock.lock().await;
        let current = self.store.load();

        if !current.contains(path) {
            return Err(RegistryError::ProjectNotFound {
                path: path.to_path_buf(),
            });
        }

        let outcome = match self
            .sync
            .sync_binding(path, version, self.sync_timeout)
            .await
        {
            Ok(outcome) => outcome,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Binding sync failed");
                return Err(RegistryError::SyncFailed(e.to_string()));
            }
        };

        let (active, previous) = match outcome {
            SyncOutcome::Applied { previous } => (true, Some(previous)),
            SyncOutcome::NotFound => (false, None),
        };
        let (next, _) = operations::rebind(&current, path, version, active, Utc::now())?;
        let next = self.annotate(next);
        let binding = next
            .get(path)
            .cloned()
            .ok_or_else(|| RegistryError::ProjectNotFound {
                path: path.to_path_buf(),
            })?;

        let bound_version = (active && !version.is_empty()).then(|| version.to_string());
        if let Err(e) = self.commit(next, bound_version).await {
            if let Some(previous) = previous {
                self.restore_binding(path, previous.as_deref()).await;
            }
            return Err(e);
        }

        if active {
            tracing::info!(path = %path.display(), version, "Bound project version");
            Ok(RebindOutcome::Bound(binding))
        } else {
            tracing::warn!(
                path = %path.display(),
                version,
                "Project path not found, binding recorded as inactive"
            );
            Ok(RebindOutcome::Degraded(binding))
        }
    }

    /// Move the project at `from` to position `to`
    pub async fn reorder(&self, from: usize, to: usize) -> Result<(), RegistryError> {
        let _guard = self.write_lock.lock().await;
        let current = self.store.load();

        let next = operations::reorder(&current, from, to)?;
        if from == to {
            return Ok(());
        }

        self.commit(next, None).await?;
        tracing::debug!(from, to, "Reordered projects");
        Ok(())
    }

    /// Fetch the persisted registry and installed versions, reconcile them and
    /// publish the result. Nothing is written back.
    pub async fn reload(&self, force_refresh: bool) -> Result<ReloadReport, RegistryError> {
        let _guard = self.write_lock.lock().await;

        let (registry, installed) = tokio::join!(
            self.persistence.load(),
            self.inventory.list_installed(force_refresh)
        );
        let registry = registry?;
        let installed = Arc::new(installed?);

        let reconciled = reconcile(&registry, &installed);
        let missing = reconciled.missing().count();
        if missing > 0 {
            tracing::info!(missing, "Projects bound to versions that are not installed");
        }

        *self.installed.write() = Some(installed.clone());
        self.store.replace(reconciled);

        Ok(ReloadReport {
            registry: self.store.load(),
            installed,
        })
    }

    /// Put back the binding a failed rebind replaced
    async fn restore_binding(&self, path: &Path, previous: Option<&str>) {
        let previous = previous.unwrap_or_default();
        if let Err(e) = self
            .sync
            .sync_binding(path, previous, self.sync_timeout)
            .await
        {
            tracing::error!(
                path = %path.display(),
                version = previous,
                error = %e,
                "Failed to restore project binding"
            );
        }
    }

    /// Refresh availability against the last known inventory
    fn annotate(&self, registry: Registry) -> Registry {
        match self.installed.read().as_ref() {
            Some(installed) => reconcile(&registry, installed),
            None => registry,
        }
    }

    /// Persist `next`, then publish it
    async fn commit(
        &self,
        next: Registry,
        bound_version: Option<String>,
    ) -> Result<(), RegistryError> {
        if let Err(e) = self.persistence.save(&next).await {
            tracing::error!(error = %e, "Failed to persist projects");
            return Err(e.into());
        }
        self.store.replace_with(next, bound_version);
        Ok(())
    }
}
