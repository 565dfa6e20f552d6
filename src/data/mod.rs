//! Data persistence layer
//!
//! This module provides the registry models and SQLite-based storage for them.

mod database;
mod migrations;
mod models;
mod project;

pub use database::{Database, DatabaseError};
pub use models::{
    compare_versions, normalize_version, project_name, Availability, InstalledVersions,
    ProjectBinding, ProjectCandidate, Registry,
};
pub use project::ProjectStore;
