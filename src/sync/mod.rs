//! Applying version bindings to project directories.

mod version_file;

pub use version_file::{read_version_file, VersionFileSync};
