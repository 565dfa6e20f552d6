//! Installed runtime version discovery.

mod directory;

pub use directory::DirectoryInventory;
