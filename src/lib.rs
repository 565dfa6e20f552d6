pub mod app;
pub mod config;
pub mod core;
pub mod data;
pub mod inventory;
pub mod picker;
pub mod sync;
pub mod util;

pub use app::{App, AppError};
pub use config::Config;
pub use crate::core::{
    AddReport, MutationGateway, RebindOutcome, RegistryChanged, RegistryError, RegistryStore,
    ReloadReport,
};
pub use data::{
    Availability, Database, InstalledVersions, ProjectBinding, ProjectCandidate, ProjectStore,
    Registry,
};
pub use inventory::DirectoryInventory;
pub use picker::ArgsFolderPicker;
pub use sync::VersionFileSync;
