//! Stage-then-rename JSON persistence.
//!
//! The payload is written to a temp file in the destination directory,
//! fsynced, then renamed over the target. A crash at any point leaves either
//! the old file or the new one, never a partial write.

use std::io::Write;
use std::path::Path;

use gatekeeper_core::errors::StorageError;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tempfile::NamedTempFile;

fn io_err(path: &Path, e: impl std::fmt::Display) -> StorageError {
    StorageError::Io {
        path: path.display().to_string(),
        message: e.to_string(),
    }
}

pub fn write_json_atomic<T: Serialize>(path: &Path, value: &T) -> Result<(), StorageError> {
    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let bytes = serde_json::to_vec_pretty(value)?;

    let mut staged = NamedTempFile::new_in(dir).map_err(|e| io_err(dir, e))?;
    staged
        .as_file_mut()
        .write_all(&bytes)
        .map_err(|e| io_err(staged.path(), e))?;
    staged
        .as_file()
        .sync_all()
        .map_err(|e| io_err(staged.path(), e))?;
    staged
        .persist(path)
        .map_err(|e| io_err(path, e.error))?;
    Ok(())
}

/// Read a JSON array file; a missing file is an empty table.
pub fn read_json_or_default<T: DeserializeOwned + Default>(path: &Path) -> Result<T, StorageError> {
    match std::fs::read(path) {
        Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(T::default()),
        Err(e) => Err(io_err(path, e)),
    }
}
