//! Integration tests for binder
//!
//! These tests drive the registry through the real SQLite store, version
//! directory and version files.

#[path = "../common/mod.rs"]
pub mod common;

pub mod cli;
pub mod registry_flow;
