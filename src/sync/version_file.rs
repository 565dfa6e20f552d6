use std::fs;
use std::io::{self, ErrorKind};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::core::{BindingSync, SyncError, SyncOutcome};
use crate::data::normalize_version;

static NEXT_TEMP_ID: AtomicU64 = AtomicU64::new(0);

/// Pins a project's version by writing a version file (e.g. `.nvmdrc`) into
/// its directory.
///
/// The file is replaced atomically (temp file plus rename) on a blocking
/// thread. A sync that misses its deadline is cancelled before the rename, so
/// a reported timeout never turns into a late write.
pub struct VersionFileSync {
    file_name: String,
}

impl VersionFileSync {
    pub fn new(file_name: impl Into<String>) -> Self {
        Self {
            file_name: file_name.into(),
        }
    }

    fn file_path(&self, project: &Path) -> PathBuf {
        project.join(&self.file_name)
    }
}

/// Read the version recorded in `dir/file_name`, if any
pub async fn read_version_file(dir: &Path, file_name: &str) -> Option<String> {
    let contents = tokio::fs::read_to_string(dir.join(file_name)).await.ok()?;
    parse_version(&contents)
}

fn parse_version(contents: &str) -> Option<String> {
    let version = normalize_version(contents.lines().next().unwrap_or_default());
    (!version.is_empty()).then(|| version.to_string())
}

fn remove_if_present(path: &Path) -> io::Result<()> {
    match fs::remove_file(path) {
        Err(e) if e.kind() != ErrorKind::NotFound => Err(e),
        _ => Ok(()),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum GateState {
    Open,
    Closed,
    Committed,
}

/// Decides, under one lock, whether the writer or the deadline wins
struct CommitGate {
    state: Mutex<GateState>,
}

impl CommitGate {
    fn new() -> Self {
        Self {
            state: Mutex::new(GateState::Open),
        }
    }

    /// Run `apply` unless the gate was closed; `None` means it was skipped
    fn commit<T>(&self, apply: impl FnOnce() -> io::Result<T>) -> Option<io::Result<T>> {
        let mut state = self.state.lock();
        if *state == GateState::Closed {
            return None;
        }
        let result = apply();
        if result.is_ok() {
            *state = GateState::Committed;
        }
        Some(result)
    }

    /// Refuse any later commit. Returns false if the change already landed.
    fn close(&self) -> bool {
        let mut state = self.state.lock();
        if *state == GateState::Committed {
            return false;
        }
        *state = GateState::Closed;
        true
    }
}

/// Blocking body of a sync; `Ok(None)` when the gate was closed first
fn apply_version(
    project: &Path,
    file: &Path,
    version: &str,
    gate: &CommitGate,
) -> io::Result<Option<SyncOutcome>> {
    match fs::metadata(project) {
        Ok(meta) if meta.is_dir() => {}
        Ok(_) => return Ok(Some(SyncOutcome::NotFound)),
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Some(SyncOutcome::NotFound)),
        Err(e) => return Err(e),
    }

    let previous = match fs::read_to_string(file) {
        Ok(contents) => parse_version(&contents),
        Err(e) if e.kind() == ErrorKind::NotFound => None,
        Err(e) => return Err(e),
    };

    if version.is_empty() {
        return match gate.commit(|| remove_if_present(file)) {
            Some(result) => result.map(|_| Some(SyncOutcome::Applied { previous })),
            None => Ok(None),
        };
    }

    let temp = file.with_file_name(format!(
        ".{}.{}-{}.tmp",
        file.file_name().unwrap_or_default().to_string_lossy(),
        std::process::id(),
        NEXT_TEMP_ID.fetch_add(1, Ordering::Relaxed)
    ));
    fs::write(&temp, version)?;
    match gate.commit(|| fs::rename(&temp, file)) {
        Some(Ok(())) => Ok(Some(SyncOutcome::Applied { previous })),
        Some(Err(e)) => {
            let _ = fs::remove_file(&temp);
            Err(e)
        }
        None => {
            let _ = fs::remove_file(&temp);
            Ok(None)
        }
    }
}

#[async_trait]
impl BindingSync for VersionFileSync {
    async fn sync_binding(
        &self,
        path: &Path,
        version: &str,
        timeout: Duration,
    ) -> Result<SyncOutcome, SyncError> {
        let project = path.to_path_buf();
        let file = self.file_path(path);
        let owned_version = version.to_string();
        let gate = Arc::new(CommitGate::new());

        let mut task = tokio::task::spawn_blocking({
            let gate = gate.clone();
            move || apply_version(&project, &file, &owned_version, &gate)
        });

        let applied = match tokio::time::timeout(timeout, &mut task).await {
            Ok(joined) => joined??,
            Err(_) if gate.close() => return Err(SyncError::TimedOut(timeout)),
            // The write landed just as the deadline passed; report what happened
            Err(_) => task.await??,
        };

        match applied {
            Some(outcome) => {
                tracing::debug!(
                    file = %self.file_path(path).display(),
                    version,
                    outcome = ?outcome,
                    "Synced version file"
                );
                Ok(outcome)
            }
            None => Err(SyncError::TimedOut(timeout)),
        }
    }

    async fn release_binding(&self, path: &Path) -> Result<(), SyncError> {
        let file = self.file_path(path);
        tokio::task::spawn_blocking(move || remove_if_present(&file)).await??;
        Ok(())
    }
}
