//! Error types for Sprout operations.
//!
//! This module defines [`SproutError`], the primary error type used throughout
//! the application, and a [`Result`] type alias for convenience.
//!
//! # Error Handling Strategy
//!
//! - Use `SproutError` for domain-specific errors that need distinct handling
//! - Use `anyhow::Error` (via `SproutError::Other`) for unexpected errors
//! - Cache read failures never surface here; they are treated as cache misses

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Core error type for Sprout operations.
#[derive(Debug, Error)]
pub enum SproutError {
    /// Configuration file not found at expected location.
    #[error("Configuration not found: {path}")]
    ConfigNotFound { path: PathBuf },

    /// Failed to parse configuration file.
    #[error("Failed to parse config at {path}: {message}")]
    ConfigParseError { path: PathBuf, message: String },

    /// Invalid configuration structure or values.
    #[error("Invalid configuration: {message}")]
    ConfigValidationError { message: String },

    /// Referenced built-in template does not exist.
    #[error("Unknown template: {name}")]
    UnknownTemplate { name: String },

    /// Network, transport, or repository lookup failure while fetching.
    #[error("Failed to fetch {locator} into {}: {message}", .destination.display())]
    FetchFailed {
        locator: String,
        destination: PathBuf,
        message: String,
    },

    /// The fetch did not complete before the configured deadline.
    #[error(
        "Timed out after {}s fetching {locator} into {}",
        .timeout.as_secs(),
        .destination.display()
    )]
    FetchTimeout {
        locator: String,
        destination: PathBuf,
        timeout: Duration,
    },

    /// A requested subdirectory is missing from the downloaded template.
    #[error(
        "Subdirectory '{segment}' not found under {} (available: {})",
        .path.display(),
        format_available(.available)
    )]
    SubdirectoryNotFound {
        path: PathBuf,
        segment: String,
        available: Vec<String>,
    },

    /// Cache metadata could not be recorded after a successful fetch.
    #[error("Failed to write cache entry at {}: {message}", .path.display())]
    CacheWriteFailed { path: PathBuf, message: String },

    /// Acquiring a template failed; wraps the underlying cause.
    #[error("Failed to get template '{reference}': {source}")]
    TemplateUnavailable {
        reference: String,
        #[source]
        source: Box<SproutError>,
    },

    /// The project directory already contains files.
    #[error("Target directory is not empty: {}", .path.display())]
    TargetNotEmpty { path: PathBuf },

    /// External command failed.
    #[error("Command failed with exit code {code:?}: {command}")]
    CommandFailed { command: String, code: Option<i32> },

    /// IO error wrapper.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic wrapped error for anyhow interop.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

fn format_available(available: &[String]) -> String {
    if available.is_empty() {
        "none".to_string()
    } else {
        available.join(", ")
    }
}

/// Result type alias for Sprout operations.
pub type Result<T> = std::result::Result<T, SproutError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn config_not_found_displays_path() {
        let err = SproutError::ConfigNotFound {
            path: PathBuf::from("/foo/config.yml"),
        };
        assert!(err.to_string().contains("/foo/config.yml"));
    }

    #[test]
    fn fetch_failed_names_locator_and_destination() {
        let err = SproutError::FetchFailed {
            locator: "direct:https://github.com/a/b/archive/refs/heads/main.tar.gz".into(),
            destination: PathBuf::from("/cache/abc"),
            message: "repository or branch not found".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("github.com/a/b"));
        assert!(msg.contains("/cache/abc"));
        assert!(msg.contains("not found"));
    }

    #[test]
    fn fetch_timeout_displays_seconds() {
        let err = SproutError::FetchTimeout {
            locator: "direct:https://example.com/x.tar.gz".into(),
            destination: PathBuf::from("/cache/abc"),
            timeout: Duration::from_secs(30),
        };
        let msg = err.to_string();
        assert!(msg.contains("30s"));
        assert!(msg.contains("/cache/abc"));
    }

    #[test]
    fn subdirectory_not_found_lists_siblings() {
        let err = SproutError::SubdirectoryNotFound {
            path: "packages/foo".into(),
            segment: "foo".into(),
            available: vec!["bar".into(), "baz".into()],
        };
        let msg = err.to_string();
        assert!(msg.contains("'foo'"));
        assert!(msg.contains("bar, baz"));
    }

    #[test]
    fn subdirectory_not_found_without_siblings() {
        let err = SproutError::SubdirectoryNotFound {
            path: "src".into(),
            segment: "src".into(),
            available: vec![],
        };
        assert!(err.to_string().contains("available: none"));
    }

    #[test]
    fn template_unavailable_chains_source() {
        let inner = SproutError::FetchFailed {
            locator: "direct:x".into(),
            destination: PathBuf::from("/tmp/x"),
            message: "HTTP 500".into(),
        };
        let err = SproutError::TemplateUnavailable {
            reference: "user/repo".into(),
            source: Box::new(inner),
        };
        assert!(err.to_string().contains("user/repo"));
        assert!(err.to_string().contains("HTTP 500"));
        assert!(err.source().is_some());
    }

    #[test]
    fn io_error_converts_from_std() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file missing");
        let err: SproutError = io_err.into();
        assert!(matches!(err, SproutError::Io(_)));
    }

    #[test]
    fn result_type_alias_works() {
        fn returns_error() -> Result<()> {
            Err(SproutError::ConfigValidationError {
                message: "test".into(),
            })
        }
        assert!(returns_error().is_err());
    }
}
