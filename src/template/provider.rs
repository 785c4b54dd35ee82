//! Template acquisition with caching.
//!
//! [`TemplateProvider`] is the single entry point the generator uses to turn
//! a remote reference into a local directory. Valid cache entries are
//! returned without touching the network; misses are resolved, fetched,
//! narrowed to their subdirectory and recorded.

use std::path::PathBuf;

use super::extract::extract_subdirectory;
use super::fetch::{is_populated, Fetcher, RemoteFetcher};
use super::reference::resolve;
use crate::cache::{CacheKey, CacheOptions, CacheStats, CacheStore, EntryLock};
use crate::config::SproutConfig;
use crate::error::{Result, SproutError};

/// Cache-backed template retrieval.
pub struct TemplateProvider<F: Fetcher = RemoteFetcher> {
    cache: CacheStore,
    fetcher: F,
    cache_enabled: bool,
}

impl TemplateProvider<RemoteFetcher> {
    /// Build a provider from loaded configuration.
    pub fn from_config(config: &SproutConfig) -> Result<Self> {
        let store = CacheStore::new(config.cache_dir(), config.cache_ttl()?);
        let fetcher = RemoteFetcher::with_timeout(config.fetch_timeout()?)?;

        Ok(Self::new(store, fetcher).with_cache_enabled(config.cache.enabled))
    }
}

impl<F: Fetcher> TemplateProvider<F> {
    /// Create a provider with caching enabled.
    pub fn new(cache: CacheStore, fetcher: F) -> Self {
        Self {
            cache,
            fetcher,
            cache_enabled: true,
        }
    }

    /// Enable or disable cache reads.
    ///
    /// A disabled cache still stores what it fetches; it just never
    /// answers from an existing entry.
    pub fn with_cache_enabled(mut self, enabled: bool) -> Self {
        self.cache_enabled = enabled;
        self
    }

    /// Whether cache reads are enabled.
    pub fn cache_enabled(&self) -> bool {
        self.cache_enabled
    }

    /// The underlying cache store.
    pub fn cache(&self) -> &CacheStore {
        &self.cache
    }

    /// Return a local directory holding the template `reference` names.
    ///
    /// On failure the cache entry for `reference` is removed, so no partial
    /// entry survives, and the cause is wrapped in
    /// [`SproutError::TemplateUnavailable`].
    pub fn get_template(&self, reference: &str, options: &CacheOptions) -> Result<PathBuf> {
        if self.cache_enabled {
            if let Some(path) = self.cache.get(reference) {
                return Ok(path);
            }
        }

        let key = CacheKey::for_reference(reference);
        self.populate(reference, &key, options)
            .map_err(|source| SproutError::TemplateUnavailable {
                reference: reference.to_string(),
                source: Box::new(source),
            })
    }

    /// Fill the entry for `key` while holding its lock. A failed fill is
    /// rolled back before the lock is released.
    fn populate(&self, reference: &str, key: &CacheKey, options: &CacheOptions) -> Result<PathBuf> {
        let _lock = EntryLock::acquire(self.cache.root(), key)?;

        if self.cache_enabled {
            if let Some(path) = self.cache.get(reference) {
                tracing::debug!("Cache entry {} was populated while waiting", key);
                return Ok(path);
            }
        }

        self.fill(reference, key, options).inspect_err(|_| {
            if let Err(e) = self.cache.invalidate(key) {
                tracing::warn!("Failed to roll back cache entry {}: {}", key, e);
            }
        })
    }

    fn fill(&self, reference: &str, key: &CacheKey, options: &CacheOptions) -> Result<PathBuf> {
        let locator = resolve(reference);
        let destination = self.cache.entry_dir(key);
        self.cache.invalidate(key)?;

        tracing::info!("Fetching template {}", locator);
        self.fetcher.fetch(&locator, &destination)?;

        if let Some(subdir) = &locator.subdir {
            extract_subdirectory(&destination, subdir)?;
        }

        self.cache.put(reference, options)
    }

    /// Remove every cached template. Returns whether anything was removed.
    pub fn clear_all_cache(&self) -> Result<bool> {
        let had_content = is_populated(self.cache.root())?;
        self.cache.clear()?;
        Ok(had_content)
    }

    /// Remove expired entries. Returns the number removed.
    pub fn clean_expired_cache(&self) -> Result<usize> {
        self.cache.sweep_expired()
    }

    /// Summarize cache contents.
    pub fn cache_stats(&self) -> Result<CacheStats> {
        self.cache.stats()
    }
}
