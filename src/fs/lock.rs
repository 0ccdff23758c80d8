//! Cross-process locks on store directories

use std::fs::{self, File, OpenOptions};
use std::path::{Path, PathBuf};

use fs2::FileExt;
use tracing::warn;

use crate::errors::{MediateError, Result};

/// Lock file kept inside each locked directory
pub const LOCK_FILE: &str = ".lock";

/// Exclusive advisory lock on a directory, held until dropped.
///
/// Every process (and every handle within one process) that opens its own
/// lock file descriptor is serialized against the others.
pub struct DirLock {
    file: File,
    path: PathBuf,
}

impl DirLock {
    /// Block until the lock on `dir` is held, creating `dir` if needed.
    pub fn acquire(dir: &Path) -> Result<DirLock> {
        fs::create_dir_all(dir)?;
        let path = dir.join(LOCK_FILE);
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&path)?;
        file.lock_exclusive()
            .map_err(|e| MediateError::wrap(e, format!("failed to lock {}", path.display())))?;
        Ok(DirLock { file, path })
    }
}

impl Drop for DirLock {
    fn drop(&mut self) {
        if let Err(e) = FileExt::unlock(&self.file) {
            warn!(path = %self.path.display(), error = %e, "failed to release lock");
        }
    }
}
