//! Shared test utilities
//!
//! - Temporary data, versions and project directories

pub mod fixtures;
