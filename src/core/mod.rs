//! Registry core: the store, the reconciler and the mutation gateway.
//!
//! - [`RegistryStore`] holds the ordered snapshot readers see
//! - [`reconcile`] flags bindings whose version is not installed
//! - [`MutationGateway`] is the only path through which the registry changes
//!
//! Collaborators (persistence, inventory, sync, folder picking) are injected
//! through the traits in [`adapters`].

pub mod adapters;
mod error;
mod gateway;
pub mod mock;
mod operations;
mod reconciler;
mod registry_store;

pub use adapters::{
    BindingSync, FolderPicker, InventoryError, PersistenceError, PickerError, PickerOptions,
    RegistryPersistence, Selection, SyncError, SyncOutcome, VersionInventory,
};
pub use error::RegistryError;
pub use gateway::{MutationGateway, RebindOutcome, ReloadReport};
pub use operations::AddReport;
pub use reconciler::reconcile;
pub use registry_store::{RegistryChanged, RegistryStore};
