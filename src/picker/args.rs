use std::path::PathBuf;

use async_trait::async_trait;

use crate::core::{FolderPicker, PickerError, PickerOptions, Selection};
use crate::data::ProjectCandidate;
use crate::sync::read_version_file;
use crate::util::absolute_path;

/// Picker fed by paths given on the command line.
///
/// Relative paths are resolved against the current directory. When the
/// options ask for project folders, each folder's version file supplies the
/// suggested version; otherwise the fallback version is used.
pub struct ArgsFolderPicker {
    paths: Vec<PathBuf>,
    version_file: String,
    fallback_version: String,
}

impl ArgsFolderPicker {
    pub fn new(
        paths: Vec<PathBuf>,
        version_file: impl Into<String>,
        fallback_version: impl Into<String>,
    ) -> Self {
        Self {
            paths,
            version_file: version_file.into(),
            fallback_version: fallback_version.into(),
        }
    }
}

#[async_trait]
impl FolderPicker for ArgsFolderPicker {
    async fn select_folders(&self, options: &PickerOptions) -> Result<Selection, PickerError> {
        if self.paths.is_empty() {
            return Ok(Selection::Canceled);
        }

        let paths: &[PathBuf] = if options.multiple {
            &self.paths
        } else {
            &self.paths[..1]
        };

        let mut candidates = Vec::with_capacity(paths.len());
        for path in paths {
            let path = absolute_path(path)?;
            let suggested = if options.project {
                read_version_file(&path, &self.version_file).await
            } else {
                None
            };
            let version = suggested.unwrap_or_else(|| self.fallback_version.clone());
            candidates.push(ProjectCandidate::new(path, version));
        }

        Ok(Selection::Selected(candidates))
    }
}
