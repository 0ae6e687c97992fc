//! Atomic artifact writes and removals.
//!
//! `atomic_write` protocol:
//!
//! 1. Normalise line endings to LF.
//! 2. Create the parent directory.
//! 3. Write `<path>.lineup.tmp`.
//! 4. Rename over the final path (atomic on POSIX).
//!
//! A failed rename removes the temp file and leaves any previous artifact
//! intact.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::error::{io_err, SyncError};

fn tmp_path(path: &Path) -> PathBuf {
    PathBuf::from(format!("{}.lineup.tmp", path.display()))
}

/// Atomically replace the file at `path` with `content`.
pub fn atomic_write(path: &Path, content: &str) -> Result<(), SyncError> {
    atomic_write_with_tmp(path, content, &tmp_path(path))
}

fn atomic_write_with_tmp(path: &Path, content: &str, tmp: &Path) -> Result<(), SyncError> {
    let content = content.replace("\r\n", "\n");

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| io_err(parent, e))?;
    }
    std::fs::write(tmp, &content).map_err(|e| io_err(tmp, e))?;

    if let Err(e) = std::fs::rename(tmp, path) {
        let _ = std::fs::remove_file(tmp);
        return Err(io_err(path, e));
    }
    tracing::info!("wrote: {}", path.display());
    Ok(())
}

/// Raw bytes of an existing artifact; `None` when there is none.
pub fn read_existing_bytes(path: &Path) -> Result<Option<Vec<u8>>, SyncError> {
    match std::fs::read(path) {
        Ok(bytes) => Ok(Some(bytes)),
        Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
        Err(err) => Err(io_err(path, err)),
    }
}

/// Read an existing artifact as LF text; `None` when there is none.
///
/// Bytes that are not UTF-8 are replaced with U+FFFD.
pub fn read_existing(path: &Path) -> Result<Option<String>, SyncError> {
    Ok(read_existing_bytes(path)?
        .map(|bytes| String::from_utf8_lossy(&bytes).replace("\r\n", "\n")))
}

/// Remove a file. Returns `false` if it was already gone.
pub fn remove_file(path: &Path) -> Result<bool, SyncError> {
    match std::fs::remove_file(path) {
        Ok(()) => {
            tracing::info!("removed: {}", path.display());
            Ok(true)
        }
        Err(err) if err.kind() == ErrorKind::NotFound => Ok(false),
        Err(err) => Err(io_err(path, err)),
    }
}
