use std::io::ErrorKind;
use std::path::PathBuf;

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::core::{InventoryError, VersionInventory};
use crate::data::InstalledVersions;

/// Lists installed versions as the subdirectories of a versions directory
/// (`<versions_dir>/20.11.0/`, `<versions_dir>/v18.19.0/`, ...).
///
/// The listing is cached until a caller asks for a forced refresh.
pub struct DirectoryInventory {
    versions_dir: PathBuf,
    cache: Mutex<Option<InstalledVersions>>,
}

impl DirectoryInventory {
    pub fn new(versions_dir: impl Into<PathBuf>) -> Self {
        Self {
            versions_dir: versions_dir.into(),
            cache: Mutex::new(None),
        }
    }

    async fn scan(&self) -> Result<InstalledVersions, InventoryError> {
        let read_err = |source| InventoryError::ReadDir {
            path: self.versions_dir.clone(),
            source,
        };

        let mut entries = match tokio::fs::read_dir(&self.versions_dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::debug!(
                    path = %self.versions_dir.display(),
                    "Versions directory does not exist"
                );
                return Ok(InstalledVersions::default());
            }
            Err(e) => return Err(read_err(e)),
        };

        let mut names = Vec::new();
        while let Some(entry) = entries.next_entry().await.map_err(read_err)? {
            let is_dir = entry
                .file_type()
                .await
                .map(|kind| kind.is_dir())
                .unwrap_or(false);
            if is_dir {
                names.push(entry.file_name().to_string_lossy().to_string());
            }
        }

        Ok(names.into_iter().collect())
    }
}

#[async_trait]
impl VersionInventory for DirectoryInventory {
    async fn list_installed(
        &self,
        force_refresh: bool,
    ) -> Result<InstalledVersions, InventoryError> {
        if !force_refresh {
            if let Some(cached) = self.cache.lock().clone() {
                return Ok(cached);
            }
        }

        let installed = self.scan().await?;
        tracing::debug!(count = installed.len(), "Scanned installed versions");
        *self.cache.lock() = Some(installed.clone());
        Ok(installed)
    }
}
