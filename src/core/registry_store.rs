//! Canonical in-memory registry snapshot.

use std::sync::Arc;

use parking_lot::RwLock;
use tokio::sync::broadcast;

use crate::data::Registry;

const EVENT_CAPACITY: usize = 64;

/// Emitted after every snapshot replacement
#[derive(Debug, Clone)]
pub struct RegistryChanged {
    pub registry: Arc<Registry>,
    /// Version that was just bound successfully, if the change was a rebind
    pub bound_version: Option<String>,
}

/// Holds the current registry and swaps it atomically.
///
/// Performs no validation; the gateway is the only writer.
pub struct RegistryStore {
    snapshot: RwLock<Arc<Registry>>,
    events: broadcast::Sender<RegistryChanged>,
}

impl RegistryStore {
    pub fn new(initial: Registry) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            snapshot: RwLock::new(Arc::new(initial)),
            events,
        }
    }

    /// Current snapshot. The returned registry is immutable; clone it to edit.
    pub fn load(&self) -> Arc<Registry> {
        self.snapshot.read().clone()
    }

    /// Atomically swap in `registry` and notify subscribers
    pub fn replace(&self, registry: Registry) {
        self.replace_with(registry, None);
    }

    pub(crate) fn replace_with(&self, registry: Registry, bound_version: Option<String>) {
        let registry = Arc::new(registry);
        *self.snapshot.write() = registry.clone();
        // No receivers is fine
        let _ = self.events.send(RegistryChanged {
            registry,
            bound_version,
        });
    }

    pub fn subscribe(&self) -> broadcast::Receiver<RegistryChanged> {
        self.events.subscribe()
    }
}

impl Default for RegistryStore {
    fn default() -> Self {
        Self::new(Registry::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::ProjectBinding;
    use chrono::Utc;

    #[test]
    fn test_load_returns_stable_snapshot() {
        let store = RegistryStore::default();
        let before = store.load();

        store.replace(Registry::new(vec![ProjectBinding::new("/a", "18.0.0", Utc::now())]));

        assert!(before.is_empty());
        assert_eq!(store.load().len(), 1);
    }

    #[tokio::test]
    async fn test_replace_notifies_subscribers() {
        let store = RegistryStore::default();
        let mut rx = store.subscribe();

        store.replace_with(
            Registry::new(vec![ProjectBinding::new("/a", "18.0.0", Utc::now())]),
            Some("18.0.0".to_string()),
        );

        let event = rx.recv().await.unwrap();
        assert_eq!(event.registry.len(), 1);
        assert_eq!(event.bound_version.as_deref(), Some("18.0.0"));
    }
}
