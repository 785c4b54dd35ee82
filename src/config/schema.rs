//! Configuration schema types.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::cache::{default_cache_dir, parse_ttl};
use crate::error::Result;
use crate::shell::expand_home;

/// Default time-to-live for cached templates.
pub const DEFAULT_CACHE_TTL: &str = "7d";

/// Default deadline for one template fetch.
pub const DEFAULT_TIMEOUT: &str = "2m";

/// Built-in template used when none is given.
pub const DEFAULT_TEMPLATE: &str = "vanilla";

/// Root configuration (`~/.sprout/config.yml`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SproutConfig {
    /// Template cache settings
    pub cache: CacheSettings,

    /// Remote fetch settings
    pub fetch: FetchSettings,

    /// Defaults for `sprout create`
    pub defaults: Defaults,
}

/// Template cache settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheSettings {
    /// Cache root; defaults to the platform cache directory
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dir: Option<PathBuf>,

    /// Entry lifetime, e.g. `7d`, `12h`, `30m`, `90s`
    pub ttl: String,

    /// Whether cached templates may be reused
    pub enabled: bool,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            dir: None,
            ttl: DEFAULT_CACHE_TTL.to_string(),
            enabled: true,
        }
    }
}

/// Remote fetch settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FetchSettings {
    /// Deadline for a single fetch
    pub timeout: String,
}

impl Default for FetchSettings {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT.to_string(),
        }
    }
}

/// Defaults applied to `sprout create`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Defaults {
    /// Template used when `--template` is not given
    pub template: String,

    /// Initialize a git repository in new projects
    pub git: bool,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            template: DEFAULT_TEMPLATE.to_string(),
            git: true,
        }
    }
}

impl SproutConfig {
    /// Cache root with `~/` expanded, or the platform default.
    pub fn cache_dir(&self) -> PathBuf {
        match &self.cache.dir {
            Some(dir) => expand_home(&dir.to_string_lossy()),
            None => default_cache_dir(),
        }
    }

    /// Parsed cache TTL.
    pub fn cache_ttl(&self) -> Result<Duration> {
        parse_ttl(&self.cache.ttl)
    }

    /// Parsed fetch timeout.
    pub fn fetch_timeout(&self) -> Result<Duration> {
        parse_ttl(&self.fetch.timeout)
    }
}
