//! Template caching system.
//!
//! Fetched templates are stored on disk, one directory per cache key, with a
//! JSON metadata file recording when the entry was fetched. Entries expire
//! after a TTL and are re-fetched on the next request.

pub mod entry;
pub mod key;
pub mod lock;
pub mod store;
pub mod ttl;

pub use entry::{now_millis, CacheMetadata, CacheOptions, CacheStats, METADATA_VERSION};
pub use key::CacheKey;
pub use lock::EntryLock;
pub use store::CacheStore;
pub use ttl::{format_duration, parse_ttl};

/// Get the default cache directory.
pub fn default_cache_dir() -> std::path::PathBuf {
    dirs::cache_dir()
        .unwrap_or_else(|| std::path::PathBuf::from("."))
        .join("sprout")
        .join("templates")
}
