//! Project binding data access object

use super::database::DatabaseError;
use super::models::{Availability, ProjectBinding, Registry};
use crate::core::adapters::{PersistenceError, RegistryPersistence};
use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::types::{Type, ValueRef};
use rusqlite::{params, Connection};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

/// Data access object for the ordered project registry.
///
/// The whole registry is written in one transaction so a reader never sees a
/// partially saved list.
#[derive(Clone)]
pub struct ProjectStore {
    conn: Arc<Mutex<Connection>>,
}

impl ProjectStore {
    /// Create a new ProjectStore
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>, DatabaseError> {
        self.conn.lock().map_err(|_| DatabaseError::LockPoisoned)
    }

    /// Replace every stored project with `registry`, keeping its order
    pub fn replace_all(&self, registry: &Registry) -> Result<(), DatabaseError> {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;
        tx.execute("DELETE FROM projects", [])?;
        {
            let mut stmt = tx.prepare(
                "INSERT INTO projects (path, position, name, version, active, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            )?;
            for (position, binding) in registry.iter().enumerate() {
                stmt.execute(params![
                    path_to_bytes(&binding.path),
                    position as i64,
                    binding.name,
                    binding.version,
                    binding.active as i32,
                    format_timestamp(&binding.created_at),
                    format_timestamp(&binding.updated_at),
                ])?;
            }
        }
        tx.commit()?;
        Ok(())
    }

    /// Get all projects in display order
    pub fn get_all(&self) -> Result<Registry, DatabaseError> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(
            "SELECT path, name, version, active, created_at, updated_at
             FROM projects ORDER BY position",
        )?;

        let bindings = stmt
            .query_map([], Self::row_to_binding)?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(Registry::new(bindings))
    }

    /// Number of stored projects
    pub fn count(&self) -> Result<usize, DatabaseError> {
        let conn = self.lock()?;
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM projects", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    /// Convert a database row to a ProjectBinding
    fn row_to_binding(row: &rusqlite::Row) -> rusqlite::Result<ProjectBinding> {
        let path = match row.get_ref(0)? {
            ValueRef::Blob(bytes) | ValueRef::Text(bytes) => path_from_bytes(bytes.to_vec()),
            other => {
                return Err(rusqlite::Error::InvalidColumnType(
                    0,
                    "path".to_string(),
                    other.data_type(),
                ))
            }
        };
        let active: i32 = row.get(3)?;
        Ok(ProjectBinding {
            name: row.get(1)?,
            path,
            version: row.get(2)?,
            active: active != 0,
            created_at: parse_timestamp(row, 4)?,
            updated_at: parse_timestamp(row, 5)?,
            availability: Availability::Unchecked,
        })
    }
}

/// Raw OS bytes of `path`, so non-UTF-8 paths are stored unchanged
#[cfg(unix)]
fn path_to_bytes(path: &Path) -> Vec<u8> {
    use std::os::unix::ffi::OsStrExt;
    path.as_os_str().as_bytes().to_vec()
}

#[cfg(unix)]
fn path_from_bytes(bytes: Vec<u8>) -> PathBuf {
    use std::os::unix::ffi::OsStringExt;
    PathBuf::from(std::ffi::OsString::from_vec(bytes))
}

// Outside unix the bytes are UTF-8; unpaired surrogates are replaced
#[cfg(not(unix))]
fn path_to_bytes(path: &Path) -> Vec<u8> {
    path.to_string_lossy().into_owned().into_bytes()
}

#[cfg(not(unix))]
fn path_from_bytes(bytes: Vec<u8>) -> PathBuf {
    PathBuf::from(String::from_utf8_lossy(&bytes).into_owned())
}

/// Full-precision RFC 3339 so timestamps survive a round trip unchanged
fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Nanos, true)
}

fn parse_timestamp(row: &rusqlite::Row, idx: usize) -> rusqlite::Result<DateTime<Utc>> {
    let raw: String = row.get(idx)?;
    DateTime::parse_from_rfc3339(&raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

#[async_trait]
impl RegistryPersistence for ProjectStore {
    async fn save(&self, registry: &Registry) -> Result<(), PersistenceError> {
        let store = self.clone();
        let registry = registry.clone();
        tokio::task::spawn_blocking(move || store.replace_all(&registry)).await??;
        Ok(())
    }

    async fn load(&self) -> Result<Registry, PersistenceError> {
        let store = self.clone();
        let registry = tokio::task::spawn_blocking(move || store.get_all()).await??;
        Ok(registry)
    }
}
