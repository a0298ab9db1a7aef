//! Atomic file replacement: write a sibling temp file, then rename it over the target.
//!
//! Readers of the target only ever see the old bytes or the new bytes. The write is
//! split into [`stage`] and [`StagedWrite::commit`] so callers (and tests) can act
//! between the two; dropping an uncommitted stage removes the temp file.
//!
//! A replaced file keeps its permission bits. A new file gets the same mode
//! `std::fs::write` would give it, i.e. 0o666 minus the umask.

use std::fmt;
use std::fs::Permissions;
use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use thiserror::Error;

/// Which step of the atomic write failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteStage {
    Create,
    Write,
    Rename,
}

impl fmt::Display for WriteStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Create => "create temp file",
            Self::Write => "write temp file",
            Self::Rename => "rename temp file",
        })
    }
}

#[derive(Debug, Error)]
#[error("failed to {stage} for {}: {source}", .path.display())]
pub struct AtomicWriteError {
    pub stage: WriteStage,
    pub path: PathBuf,
    #[source]
    pub source: std::io::Error,
}

/// Contents written to a temp file next to `target`, not yet visible there.
#[derive(Debug)]
pub struct StagedWrite {
    temp: NamedTempFile,
    target: PathBuf,
}

impl StagedWrite {
    pub fn temp_path(&self) -> &Path {
        self.temp.path()
    }

    pub fn target(&self) -> &Path {
        &self.target
    }

    /// Rename the temp file over the target.
    pub fn commit(self) -> Result<(), AtomicWriteError> {
        let target = self.target;
        self.temp.persist(&target).map_err(|e| AtomicWriteError {
            stage: WriteStage::Rename,
            path: target.clone(),
            source: e.error,
        })?;
        Ok(())
    }
}

/// Write `contents` to a temp file in the target's directory.
pub fn stage(target: &Path, contents: &[u8]) -> Result<StagedWrite, AtomicWriteError> {
    let dir = match target.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let existing = std::fs::metadata(target).ok().map(|m| m.permissions());

    let mut builder = tempfile::Builder::new();
    builder.prefix(".quill-").suffix(".tmp");
    // tempfile defaults to 0o600; a fresh file should look like any other.
    if let (None, Some(mode)) = (&existing, new_file_permissions()) {
        builder.permissions(mode);
    }

    let mut temp = builder.tempfile_in(dir).map_err(|source| AtomicWriteError {
        stage: WriteStage::Create,
        path: target.to_path_buf(),
        source,
    })?;

    if let Some(perms) = existing {
        temp.as_file()
            .set_permissions(perms)
            .map_err(|source| AtomicWriteError {
                stage: WriteStage::Create,
                path: target.to_path_buf(),
                source,
            })?;
    }

    temp.write_all(contents)
        .and_then(|()| temp.as_file().sync_all())
        .map_err(|source| AtomicWriteError {
            stage: WriteStage::Write,
            path: target.to_path_buf(),
            source,
        })?;

    Ok(StagedWrite {
        temp,
        target: target.to_path_buf(),
    })
}

/// Mode requested at creation. The OS masks it with the umask.
#[cfg(unix)]
fn new_file_permissions() -> Option<Permissions> {
    use std::os::unix::fs::PermissionsExt;
    Some(Permissions::from_mode(0o666))
}

#[cfg(not(unix))]
fn new_file_permissions() -> Option<Permissions> {
    None
}

/// Stage and commit in one step.
pub fn write_atomic(target: &Path, contents: &[u8]) -> Result<(), AtomicWriteError> {
    stage(target, contents)?.commit()
}
