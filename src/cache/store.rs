//! Cache storage implementation.
//!
//! Layout under the cache root, one pair per entry:
//!
//! ```text
//! <root>/<key>/        template content
//! <root>/<key>.json    metadata
//! <root>/<key>.lock    advisory lock (see [`super::lock`])
//! ```

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;
use walkdir::WalkDir;

use super::entry::{now_millis, CacheMetadata, CacheOptions, CacheStats};
use super::key::CacheKey;
use crate::error::{Result, SproutError};

/// Storage for cached template directories.
#[derive(Debug, Clone)]
pub struct CacheStore {
    /// Root directory for cache.
    root: PathBuf,
    /// How long an entry stays valid after it was fetched.
    ttl: Duration,
}

impl CacheStore {
    /// Create a new cache store.
    pub fn new(root: impl Into<PathBuf>, ttl: Duration) -> Self {
        Self {
            root: root.into(),
            ttl,
        }
    }

    /// Get the cache root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Get the entry time-to-live.
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Directory holding the content for `key`.
    pub fn entry_dir(&self, key: &CacheKey) -> PathBuf {
        self.root.join(key.as_str())
    }

    /// Metadata file path for `key`.
    pub fn metadata_path(&self, key: &CacheKey) -> PathBuf {
        self.root.join(format!("{}.json", key))
    }

    /// Whether a fresh, complete entry exists for `reference`.
    pub fn is_valid(&self, reference: &str) -> bool {
        self.is_valid_at(&CacheKey::for_reference(reference), now_millis())
    }

    fn is_valid_at(&self, key: &CacheKey, now: i64) -> bool {
        if !self.entry_dir(key).is_dir() {
            return false;
        }

        match self.load_metadata(key) {
            Some(meta) => meta.is_fresh_at(now, self.ttl),
            None => false,
        }
    }

    /// Return the entry directory for `reference` if it is valid.
    pub fn get(&self, reference: &str) -> Option<PathBuf> {
        let key = CacheKey::for_reference(reference);
        if self.is_valid_at(&key, now_millis()) {
            tracing::debug!("Cache hit for '{}' ({})", reference, key);
            Some(self.entry_dir(&key))
        } else {
            tracing::debug!("Cache miss for '{}' ({})", reference, key);
            None
        }
    }

    /// Record fresh metadata for `reference`.
    ///
    /// The entry directory must already be populated. The metadata file is
    /// written to a temporary name and renamed into place so readers never
    /// observe a partial document.
    pub fn put(&self, reference: &str, options: &CacheOptions) -> Result<PathBuf> {
        let key = CacheKey::for_reference(reference);
        let meta = CacheMetadata::new(reference, key.as_str(), now_millis(), options);
        let meta_path = self.metadata_path(&key);

        write_metadata(&meta_path, &meta).map_err(|e| SproutError::CacheWriteFailed {
            path: meta_path.clone(),
            message: e.to_string(),
        })?;

        tracing::debug!("Recorded cache metadata {}", meta_path.display());
        Ok(self.entry_dir(&key))
    }

    /// Remove the directory and metadata for `key`, if present.
    pub fn invalidate(&self, key: &CacheKey) -> Result<()> {
        let dir = self.entry_dir(key);
        match fs::remove_dir_all(&dir) {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => return Err(e.into()),
        }

        let meta_path = self.metadata_path(key);
        match fs::remove_file(&meta_path) {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => return Err(e.into()),
        }

        Ok(())
    }

    /// Invalidate every expired entry. Returns the number removed.
    ///
    /// Entries whose metadata cannot be read are removed as well.
    pub fn sweep_expired(&self) -> Result<usize> {
        let now = now_millis();
        let mut removed = 0;

        for key in self.metadata_keys()? {
            let fresh = self
                .load_metadata(&key)
                .is_some_and(|meta| meta.is_fresh_at(now, self.ttl));

            if !fresh {
                self.invalidate(&key)?;
                removed += 1;
            }
        }

        Ok(removed)
    }

    /// Remove the entire cache root.
    pub fn clear(&self) -> Result<()> {
        match fs::remove_dir_all(&self.root) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    /// Compute entry counts and disk usage.
    pub fn stats(&self) -> Result<CacheStats> {
        let now = now_millis();
        let mut stats = CacheStats::default();

        for key in self.metadata_keys()? {
            stats.total_items += 1;
            let fresh = self
                .load_metadata(&key)
                .is_some_and(|meta| meta.is_fresh_at(now, self.ttl));
            if !fresh {
                stats.expired_items += 1;
            }
        }

        if self.root.exists() {
            for entry in WalkDir::new(&self.root) {
                let entry = entry.map_err(io::Error::from)?;
                if entry.file_type().is_file() {
                    stats.total_size_bytes += entry.metadata().map_err(io::Error::from)?.len();
                }
            }
        }

        Ok(stats)
    }

    /// List readable entries, most recently fetched first.
    pub fn list(&self) -> Result<Vec<CacheMetadata>> {
        let mut entries: Vec<CacheMetadata> = self
            .metadata_keys()?
            .iter()
            .filter_map(|key| self.load_metadata(key))
            .collect();

        entries.sort_by(|a, b| b.cached_at.cmp(&a.cached_at));
        Ok(entries)
    }

    /// Whether `meta` is fresh right now under this store's TTL.
    pub fn is_fresh(&self, meta: &CacheMetadata) -> bool {
        meta.is_fresh_at(now_millis(), self.ttl)
    }

    /// Read metadata for `key`, treating any failure as absent.
    fn load_metadata(&self, key: &CacheKey) -> Option<CacheMetadata> {
        let path = self.metadata_path(key);
        let json = fs::read_to_string(&path).ok()?;

        match serde_json::from_str::<CacheMetadata>(&json) {
            Ok(meta) => Some(meta),
            Err(e) => {
                tracing::debug!("Ignoring corrupt cache metadata {}: {}", path.display(), e);
                None
            }
        }
    }

    /// Keys of every `<key>.json` file in the root.
    fn metadata_keys(&self) -> Result<Vec<CacheKey>> {
        let read_dir = match fs::read_dir(&self.root) {
            Ok(rd) => rd,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut keys = Vec::new();
        for entry in read_dir {
            let path = entry?.path();
            if path.extension().is_some_and(|e| e == "json") {
                if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                    keys.push(CacheKey::from_raw(stem));
                }
            }
        }

        Ok(keys)
    }
}

fn write_metadata(path: &Path, meta: &CacheMetadata) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let json = serde_json::to_string_pretty(meta)?;
    let tmp = path.with_extension("json.tmp");
    {
        let mut file = fs::File::create(&tmp)?;
        file.write_all(json.as_bytes())?;
        file.sync_all()?;
    }
    fs::rename(&tmp, path)
}
