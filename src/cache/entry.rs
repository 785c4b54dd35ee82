//! Cache entry metadata and statistics types.

use chrono::{TimeZone, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::time::Duration;

/// Opaque caller-supplied fields stored alongside an entry's metadata.
pub type CacheOptions = Map<String, Value>;

/// Version written into every metadata file.
///
/// Bump when the metadata shape changes; entries with any other version are
/// treated as invalid and re-fetched.
pub const METADATA_VERSION: u32 = 1;

/// Field names owned by [`CacheMetadata`] that caller options cannot override.
const RESERVED_FIELDS: [&str; 4] = ["version", "originalReference", "cachedAt", "cacheKey"];

/// Metadata persisted next to each cached template directory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheMetadata {
    /// Metadata schema version. Missing in pre-versioned files, hence the default of 0.
    #[serde(default)]
    pub version: u32,
    /// Reference string exactly as the caller supplied it.
    pub original_reference: String,
    /// Fetch time in milliseconds since the Unix epoch.
    pub cached_at: i64,
    /// Hex cache key of the entry.
    pub cache_key: String,
    /// Caller-supplied extra fields.
    #[serde(flatten)]
    pub options: CacheOptions,
}

impl CacheMetadata {
    /// Create metadata for an entry fetched at `cached_at` (epoch millis).
    pub fn new(reference: &str, cache_key: &str, cached_at: i64, options: &CacheOptions) -> Self {
        let options = options
            .iter()
            .filter(|(k, _)| !RESERVED_FIELDS.contains(&k.as_str()))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();

        Self {
            version: METADATA_VERSION,
            original_reference: reference.to_string(),
            cached_at,
            cache_key: cache_key.to_string(),
            options,
        }
    }

    /// Whether this metadata was written by the current schema.
    pub fn is_current_version(&self) -> bool {
        self.version == METADATA_VERSION
    }

    /// Age of the entry at `now` (epoch millis), in milliseconds.
    pub fn age_millis(&self, now: i64) -> i64 {
        now.saturating_sub(self.cached_at)
    }

    /// Whether the entry is still within `ttl` at `now`.
    ///
    /// An entry aged exactly `ttl` is still fresh.
    pub fn is_fresh_at(&self, now: i64, ttl: Duration) -> bool {
        let ttl_ms = i64::try_from(ttl.as_millis()).unwrap_or(i64::MAX);
        self.is_current_version() && self.age_millis(now) <= ttl_ms
    }

    /// Human-readable fetch time, for listings.
    pub fn cached_at_display(&self) -> String {
        Utc.timestamp_millis_opt(self.cached_at)
            .single()
            .map(|t| t.format("%Y-%m-%d %H:%M:%S UTC").to_string())
            .unwrap_or_else(|| self.cached_at.to_string())
    }
}

/// Aggregate cache statistics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheStats {
    /// Number of entries with a metadata file.
    pub total_items: usize,
    /// Bytes used by everything under the cache root.
    pub total_size_bytes: u64,
    /// Entries that are expired or have unreadable metadata.
    pub expired_items: usize,
}

/// Current time in milliseconds since the Unix epoch.
pub fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const TTL: Duration = Duration::from_secs(3600);

    fn metadata_at(cached_at: i64) -> CacheMetadata {
        CacheMetadata::new("user/repo", "abc", cached_at, &CacheOptions::new())
    }

    #[test]
    fn serializes_with_camel_case_fields() {
        let mut options = CacheOptions::new();
        options.insert("projectName".into(), json!("demo"));
        let meta = CacheMetadata::new("user/repo", "abc123", 1_700_000_000_000, &options);

        let value = serde_json::to_value(&meta).unwrap();
        assert_eq!(value["version"], json!(1));
        assert_eq!(value["originalReference"], json!("user/repo"));
        assert_eq!(value["cachedAt"], json!(1_700_000_000_000i64));
        assert_eq!(value["cacheKey"], json!("abc123"));
        assert_eq!(value["projectName"], json!("demo"));
    }

    #[test]
    fn options_cannot_override_core_fields() {
        let mut options = CacheOptions::new();
        options.insert("cachedAt".into(), json!(0));
        options.insert("cacheKey".into(), json!("spoofed"));
        options.insert("extra".into(), json!(true));

        let meta = CacheMetadata::new("user/repo", "real", 42, &options);
        let value = serde_json::to_value(&meta).unwrap();
        assert_eq!(value["cachedAt"], json!(42));
        assert_eq!(value["cacheKey"], json!("real"));
        assert_eq!(value["extra"], json!(true));
    }

    #[test]
    fn parses_back_with_options() {
        let raw = r#"{"version":1,"originalReference":"a/b","cachedAt":5,"cacheKey":"k","git":true}"#;
        let meta: CacheMetadata = serde_json::from_str(raw).unwrap();
        assert_eq!(meta.original_reference, "a/b");
        assert_eq!(meta.options.get("git"), Some(&json!(true)));
        assert!(meta.is_current_version());
    }

    #[test]
    fn missing_version_is_not_current() {
        let raw = r#"{"originalReference":"a/b","cachedAt":5,"cacheKey":"k"}"#;
        let meta: CacheMetadata = serde_json::from_str(raw).unwrap();
        assert_eq!(meta.version, 0);
        assert!(!meta.is_current_version());
        assert!(!meta.is_fresh_at(5, TTL));
    }

    #[test]
    fn ttl_boundary() {
        let now = 10_000_000;
        let ttl_ms = TTL.as_millis() as i64;

        assert!(!metadata_at(now - ttl_ms - 1).is_fresh_at(now, TTL));
        assert!(metadata_at(now - ttl_ms).is_fresh_at(now, TTL));
        assert!(metadata_at(now - ttl_ms + 1).is_fresh_at(now, TTL));
    }

    #[test]
    fn future_timestamp_is_fresh() {
        let now = 1_000;
        assert!(metadata_at(now + 500).is_fresh_at(now, TTL));
    }

    #[test]
    fn cached_at_display_formats_utc() {
        let meta = metadata_at(0);
        assert_eq!(meta.cached_at_display(), "1970-01-01 00:00:00 UTC");
    }
}
