//! Data models for project bindings and the installed version inventory

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::path::{Path, PathBuf};

/// Result of comparing a binding's version against the installed inventory.
///
/// This is derived state: it is never persisted and a freshly loaded binding
/// is always `Unchecked` until the reconciler has seen it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Availability {
    #[default]
    Unchecked,
    Installed,
    Missing,
    Unbound,
}

impl Availability {
    pub fn as_str(&self) -> &'static str {
        match self {
            Availability::Unchecked => "unchecked",
            Availability::Installed => "installed",
            Availability::Missing => "missing",
            Availability::Unbound => "unbound",
        }
    }
}

impl std::fmt::Display for Availability {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(self.as_str())
    }
}

/// A filesystem project bound to a runtime version
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectBinding {
    /// Display label, taken from the last path segment when the project was added
    pub name: String,
    /// Absolute project path (unique within a registry)
    pub path: PathBuf,
    /// Bound runtime version; empty means unbound
    pub version: String,
    /// False when the last sync reported the path as unresolvable
    pub active: bool,
    /// When the project was added
    pub created_at: DateTime<Utc>,
    /// Last time any field changed
    pub updated_at: DateTime<Utc>,
    /// Reconciler annotation (not persisted)
    #[serde(default)]
    pub availability: Availability,
}

impl ProjectBinding {
    /// Create a new active binding for `path`
    pub fn new(path: impl Into<PathBuf>, version: impl Into<String>, now: DateTime<Utc>) -> Self {
        let path = path.into();
        Self {
            name: project_name(&path),
            path,
            version: version.into(),
            active: true,
            created_at: now,
            updated_at: now,
            availability: Availability::Unchecked,
        }
    }

    /// Whether a version is recorded for this project
    pub fn is_bound(&self) -> bool {
        !self.version.is_empty()
    }

    /// Record a version change and the result of syncing it.
    ///
    /// `updated_at` never moves backwards, even if the wall clock does.
    pub fn rebind(&mut self, version: impl Into<String>, active: bool, now: DateTime<Utc>) {
        self.version = version.into();
        self.active = active;
        self.updated_at = now.max(self.updated_at);
    }
}

/// Derive the display name from the last path segment
pub fn project_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_else(|| path.to_string_lossy().to_string())
}

/// A folder proposed for registration, with its suggested version
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectCandidate {
    pub path: PathBuf,
    pub version: String,
}

impl ProjectCandidate {
    pub fn new(path: impl Into<PathBuf>, version: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            version: version.into(),
        }
    }
}

/// Ordered collection of project bindings.
///
/// Order is display order and is preserved through persistence.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Registry {
    bindings: Vec<ProjectBinding>,
}

impl Registry {
    pub fn new(bindings: Vec<ProjectBinding>) -> Self {
        Self { bindings }
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ProjectBinding> {
        self.bindings.iter()
    }

    pub fn bindings(&self) -> &[ProjectBinding] {
        &self.bindings
    }

    /// Index of the binding registered at exactly `path`
    pub fn position(&self, path: &Path) -> Option<usize> {
        self.bindings.iter().position(|binding| binding.path == path)
    }

    pub fn get(&self, path: &Path) -> Option<&ProjectBinding> {
        self.bindings.iter().find(|binding| binding.path == path)
    }

    pub fn contains(&self, path: &Path) -> bool {
        self.position(path).is_some()
    }

    /// Bindings whose recorded version is not installed (after reconciliation)
    pub fn missing(&self) -> impl Iterator<Item = &ProjectBinding> {
        self.bindings
            .iter()
            .filter(|binding| binding.availability == Availability::Missing)
    }

    pub(crate) fn bindings_mut(&mut self) -> &mut Vec<ProjectBinding> {
        &mut self.bindings
    }
}

impl FromIterator<ProjectBinding> for Registry {
    fn from_iter<T: IntoIterator<Item = ProjectBinding>>(iter: T) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a Registry {
    type Item = &'a ProjectBinding;
    type IntoIter = std::slice::Iter<'a, ProjectBinding>;

    fn into_iter(self) -> Self::IntoIter {
        self.bindings.iter()
    }
}

/// Installed runtime versions, kept newest first
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct InstalledVersions {
    versions: Vec<String>,
}

impl InstalledVersions {
    pub fn len(&self) -> usize {
        self.versions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.versions.is_empty()
    }

    /// Versions newest first
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.versions.iter().map(String::as_str)
    }

    pub fn contains(&self, version: &str) -> bool {
        let version = normalize_version(version);
        self.versions.iter().any(|installed| installed == version)
    }
}

impl<S: AsRef<str>> FromIterator<S> for InstalledVersions {
    fn from_iter<T: IntoIterator<Item = S>>(iter: T) -> Self {
        let mut versions: Vec<String> = iter
            .into_iter()
            .map(|version| normalize_version(version.as_ref()).to_string())
            .filter(|version| !version.is_empty())
            .collect();
        versions.sort_by(|a, b| compare_versions(b, a));
        versions.dedup();
        Self { versions }
    }
}

/// Strip surrounding whitespace and a leading `v`
pub fn normalize_version(version: &str) -> &str {
    let version = version.trim();
    version.strip_prefix('v').unwrap_or(version)
}

/// Compare dotted versions numerically component by component.
///
/// Numeric components sort before non-numeric ones, which compare lexically;
/// a version that is a prefix of another sorts first.
pub fn compare_versions(a: &str, b: &str) -> Ordering {
    let mut left = a.split('.');
    let mut right = b.split('.');
    loop {
        match (left.next(), right.next()) {
            (None, None) => return Ordering::Equal,
            (None, Some(_)) => return Ordering::Less,
            (Some(_), None) => return Ordering::Greater,
            (Some(l), Some(r)) => {
                let ord = match (l.parse::<u64>(), r.parse::<u64>()) {
                    // "01" and "1" are distinct strings, so break the tie
                    (Ok(ln), Ok(rn)) => ln.cmp(&rn).then_with(|| l.cmp(r)),
                    (Ok(_), Err(_)) => Ordering::Less,
                    (Err(_), Ok(_)) => Ordering::Greater,
                    (Err(_), Err(_)) => l.cmp(r),
                };
                if ord != Ordering::Equal {
                    return ord;
                }
            }
        }
    }
}
