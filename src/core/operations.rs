//! Pure registry transitions used by the gateway.
//!
//! Every function takes the current snapshot and returns a new one, so a
//! failed operation never leaves a half-applied registry behind.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};

use super::error::RegistryError;
use crate::data::{project_name, ProjectBinding, ProjectCandidate, Registry};

/// Per-candidate outcome of an add
#[derive(Debug, Default)]
pub struct AddReport {
    /// New bindings, in the order they now appear at the head of the registry
    pub added: Vec<ProjectBinding>,
    /// One `DuplicateProject` per rejected candidate
    pub rejected: Vec<RegistryError>,
}

impl AddReport {
    pub fn has_changes(&self) -> bool {
        !self.added.is_empty()
    }
}

/// Prepend every candidate whose path is not yet registered.
///
/// Accepted candidates form a contiguous block at the head, in input order.
/// A path repeated within the batch is rejected after its first occurrence.
pub fn add_candidates(
    registry: &Registry,
    candidates: Vec<ProjectCandidate>,
    now: DateTime<Utc>,
) -> (Registry, AddReport) {
    let mut seen: HashSet<PathBuf> = registry.iter().map(|b| b.path.clone()).collect();
    let mut report = AddReport::default();

    for candidate in candidates {
        if !seen.insert(candidate.path.clone()) {
            report.rejected.push(RegistryError::DuplicateProject {
                name: project_name(&candidate.path),
                path: candidate.path,
            });
            continue;
        }
        report
            .added
            .push(ProjectBinding::new(candidate.path, candidate.version, now));
    }

    let next = report
        .added
        .iter()
        .chain(registry.iter())
        .cloned()
        .collect();
    (next, report)
}

/// Drop the binding at exactly `path`; `None` when there is none
pub fn remove(registry: &Registry, path: &Path) -> Option<(Registry, ProjectBinding)> {
    let index = registry.position(path)?;
    let mut next = registry.clone();
    let removed = next.bindings_mut().remove(index);
    Some((next, removed))
}

/// Move the binding at `from` to `to`, shifting the ones in between
pub fn reorder(registry: &Registry, from: usize, to: usize) -> Result<Registry, RegistryError> {
    let len = registry.len();
    for index in [from, to] {
        if index >= len {
            return Err(RegistryError::IndexOutOfRange { index, len });
        }
    }

    let mut next = registry.clone();
    let bindings = next.bindings_mut();
    let moved = bindings.remove(from);
    bindings.insert(to, moved);
    Ok(next)
}

/// Record `version` for the binding at `path` with the given sync result
pub fn rebind(
    registry: &Registry,
    path: &Path,
    version: &str,
    active: bool,
    now: DateTime<Utc>,
) -> Result<(Registry, ProjectBinding), RegistryError> {
    let index = registry
        .position(path)
        .ok_or_else(|| RegistryError::ProjectNotFound {
            path: path.to_path_buf(),
        })?;

    let mut next = registry.clone();
    let binding = &mut next.bindings_mut()[index];
    binding.rebind(version, active, now);
    let updated = binding.clone();
    Ok((next, updated))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn paths(registry: &Registry) -> Vec<String> {
        registry
            .iter()
            .map(|b| b.path.to_string_lossy().to_string())
            .collect()
    }

    fn registry_of(names: &[&str]) -> Registry {
        let now = Utc::now();
        names
            .iter()
            .map(|name| ProjectBinding::new(format!("/{}", name), "18.0.0", now))
            .collect()
    }

    #[test]
    fn test_duplicate_rejected_and_existing_untouched() {
        let registry = registry_of(&["a"]);
        let (next, report) = add_candidates(
            &registry,
            vec![ProjectCandidate::new("/a", "20.0.0")],
            Utc::now(),
        );

        assert_eq!(next, registry);
        assert!(report.added.is_empty());
        assert_eq!(report.rejected.len(), 1);
        assert!(matches!(
            &report.rejected[0],
            RegistryError::DuplicateProject { name, .. } if name == "a"
        ));
    }

    #[test]
    fn test_batch_prepended_in_input_order() {
        let registry = registry_of(&["a"]);
        let (next, report) = add_candidates(
            &registry,
            vec![
                ProjectCandidate::new("/b", "20.0.0"),
                ProjectCandidate::new("/a", "20.0.0"),
                ProjectCandidate::new("/c", ""),
                ProjectCandidate::new("/b", "21.0.0"),
            ],
            Utc::now(),
        );

        assert_eq!(paths(&next), vec!["/b", "/c", "/a"]);
        assert_eq!(report.added.len(), 2);
        assert_eq!(report.rejected.len(), 2);
        assert_eq!(next.bindings()[0].version, "20.0.0");
        assert!(next.bindings()[1].active);
    }

    #[test]
    fn test_remove_only_matching_path() {
        let registry = registry_of(&["a", "b", "c"]);
        let (next, removed) = remove(&registry, Path::new("/b")).unwrap();

        assert_eq!(removed.path, PathBuf::from("/b"));
        assert_eq!(next.bindings()[0], registry.bindings()[0]);
        assert_eq!(next.bindings()[1], registry.bindings()[2]);
        assert!(remove(&next, Path::new("/b")).is_none());
    }

    #[test]
    fn test_reorder_out_of_range() {
        let registry = registry_of(&["a", "b"]);
        let err = reorder(&registry, 0, 2).unwrap_err();
        assert!(matches!(err, RegistryError::IndexOutOfRange { index: 2, len: 2 }));
        assert!(reorder(&Registry::default(), 0, 0).is_err());
    }

    #[test]
    fn test_rebind_missing_project() {
        let registry = registry_of(&["a"]);
        let err = rebind(&registry, Path::new("/z"), "20.0.0", true, Utc::now()).unwrap_err();
        assert!(matches!(err, RegistryError::ProjectNotFound { .. }));
    }

    proptest! {
        #[test]
        fn prop_reorder_moves_exactly_one(len in 1usize..12, from in 0usize..12, to in 0usize..12) {
            prop_assume!(from < len && to < len);
            let names: Vec<String> = (0..len).map(|i| i.to_string()).collect();
            let refs: Vec<&str> = names.iter().map(String::as_str).collect();
            let registry = registry_of(&refs);

            let next = reorder(&registry, from, to).unwrap();

            prop_assert_eq!(next.len(), len);
            prop_assert_eq!(&next.bindings()[to], &registry.bindings()[from]);
            let rest_before: Vec<_> = registry.iter().enumerate()
                .filter(|(i, _)| *i != from).map(|(_, b)| b.clone()).collect();
            let rest_after: Vec<_> = next.iter().enumerate()
                .filter(|(i, _)| *i != to).map(|(_, b)| b.clone()).collect();
            prop_assert_eq!(rest_before, rest_after);
        }

        #[test]
        fn prop_reorder_out_of_range_is_rejected(len in 0usize..6, from in 0usize..10, to in 0usize..10) {
            prop_assume!(from >= len || to >= len);
            let names: Vec<String> = (0..len).map(|i| i.to_string()).collect();
            let refs: Vec<&str> = names.iter().map(String::as_str).collect();
            let registry = registry_of(&refs);

            let result = reorder(&registry, from, to);
            let is_out_of_range = matches!(result, Err(RegistryError::IndexOutOfRange { .. }));
            prop_assert!(is_out_of_range);
        }

        #[test]
        fn prop_paths_stay_unique(batches in proptest::collection::vec(
            proptest::collection::vec(0u8..8, 0..6), 1..6)
        ) {
            let mut registry = Registry::default();
            for batch in batches {
                let candidates = batch
                    .into_iter()
                    .map(|n| ProjectCandidate::new(format!("/p{}", n), "20.0.0"))
                    .collect();
                let (next, report) = add_candidates(&registry, candidates, Utc::now());
                prop_assert_eq!(next.len(), registry.len() + report.added.len());
                registry = next;
            }

            let unique: HashSet<_> = registry.iter().map(|b| b.path.clone()).collect();
            prop_assert_eq!(unique.len(), registry.len());
        }
    }
}
