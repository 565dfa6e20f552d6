//! Folder selection for adding projects.

mod args;

pub use args::ArgsFolderPicker;
