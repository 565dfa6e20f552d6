//! Compares recorded bindings against the installed version inventory.

use crate::data::{Availability, InstalledVersions, Registry};

/// Annotate every binding with whether its version is installed.
///
/// Only `availability` changes; order and every other field are left alone,
/// and `active` in particular is not touched.
pub fn reconcile(registry: &Registry, installed: &InstalledVersions) -> Registry {
    registry
        .iter()
        .map(|binding| {
            let mut binding = binding.clone();
            binding.availability = if !binding.is_bound() {
                Availability::Unbound
            } else if installed.contains(&binding.version) {
                Availability::Installed
            } else {
                Availability::Missing
            };
            binding
        })
        .collect()
}
