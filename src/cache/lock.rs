//! Per-entry advisory locking across processes.

use fs4::fs_std::FileExt;
use std::fs::{self, File};
use std::path::{Path, PathBuf};

use super::key::CacheKey;

/// Exclusive lock on one cache key, released on drop.
///
/// Serializes the fetch-and-populate section when two `sprout` processes
/// request the same template at once.
#[derive(Debug)]
pub struct EntryLock {
    _file: File,
    path: PathBuf,
}

impl EntryLock {
    /// Block until the lock for `key` under `root` is held.
    pub fn acquire(root: &Path, key: &CacheKey) -> std::io::Result<Self> {
        fs::create_dir_all(root)?;
        let path = lock_path(root, key);
        let file = File::create(&path)?;

        tracing::debug!("Waiting for cache lock {}", path.display());
        FileExt::lock_exclusive(&file)?;
        tracing::debug!("Acquired cache lock {}", path.display());

        Ok(Self { _file: file, path })
    }

    /// Path of the lock file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Lock file path for `key` under `root`.
pub fn lock_path(root: &Path, key: &CacheKey) -> PathBuf {
    root.join(format!("{}.lock", key))
}
