//! Configuration loading, parsing, and validation for Sprout.
//!
//! - Schema definitions in [`schema`]
//! - File discovery and loading in [`loader`]
//! - Validation in [`validator`]
//!
//! # Example
//!
//! ```
//! use sprout::config::load_config;
//! use tempfile::TempDir;
//! use std::fs;
//!
//! let temp = TempDir::new().unwrap();
//! let path = temp.path().join("config.yml");
//! fs::write(&path, "cache:\n  ttl: 12h\n").unwrap();
//!
//! let config = load_config(Some(&path)).unwrap();
//! assert_eq!(config.cache.ttl, "12h");
//! assert_eq!(config.defaults.template, "vanilla");
//! ```
//!
//! # Configuration File Location
//!
//! `--config <path>` (or `SPROUT_CONFIG`) names the file explicitly;
//! otherwise `~/.sprout/config.yml` is used when it exists.

pub mod loader;
pub mod schema;
pub mod validator;

pub use loader::{default_config_path, load_config, load_config_file, parse_config, ConfigOverrides};
pub use schema::{
    CacheSettings, Defaults, FetchSettings, SproutConfig, DEFAULT_CACHE_TTL,
    DEFAULT_TIMEOUT, DEFAULT_TEMPLATE,
};
pub use validator::{validate, validate_config, ValidationError};
