//! Configuration file discovery and loading.

use crate::config::schema::SproutConfig;
use crate::config::validator::validate;
use crate::error::{Result, SproutError};
use std::fs;
use std::path::{Path, PathBuf};

/// User config location: `~/.sprout/config.yml`.
pub fn default_config_path() -> Option<PathBuf> {
    Some(dirs::home_dir()?.join(".sprout").join("config.yml"))
}

/// Command-line and environment overrides applied after loading.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    /// Replaces `cache.dir`
    pub cache_dir: Option<PathBuf>,
    /// Forces `cache.enabled = false`
    pub no_cache: bool,
}

impl ConfigOverrides {
    /// Apply these overrides to `config`.
    pub fn apply(&self, config: &mut SproutConfig) {
        if let Some(dir) = &self.cache_dir {
            config.cache.dir = Some(dir.clone());
        }
        if self.no_cache {
            config.cache.enabled = false;
        }
    }
}

/// Load a single config file and parse it into SproutConfig.
///
/// # Errors
///
/// Returns `ConfigNotFound` if the file doesn't exist.
/// Returns `ConfigParseError` if the YAML is invalid.
pub fn load_config_file(path: &Path) -> Result<SproutConfig> {
    let content = fs::read_to_string(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            SproutError::ConfigNotFound {
                path: path.to_path_buf(),
            }
        } else {
            SproutError::Io(e)
        }
    })?;

    parse_config(&content, path)
}

/// Parse YAML content into SproutConfig.
///
/// Empty documents give the default configuration.
pub fn parse_config(content: &str, source_path: &Path) -> Result<SproutConfig> {
    if content.trim().is_empty() {
        return Ok(SproutConfig::default());
    }

    serde_yaml::from_str(content).map_err(|e| SproutError::ConfigParseError {
        path: source_path.to_path_buf(),
        message: e.to_string(),
    })
}

/// Load configuration with an optional path override, then validate it.
///
/// An explicit path must exist. Without one, the user config is read if
/// present and defaults are used otherwise.
pub fn load_config(config_override: Option<&Path>) -> Result<SproutConfig> {
    let config = match config_override {
        Some(path) => load_config_file(path)?,
        None => match default_config_path().filter(|p| p.exists()) {
            Some(path) => {
                tracing::debug!("Loading config from {}", path.display());
                load_config_file(&path)?
            }
            None => SproutConfig::default(),
        },
    };

    validate(&config)?;
    Ok(config)
}
