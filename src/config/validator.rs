//! Configuration validation rules.
//!
//! - `cache.ttl` and `fetch.timeout` must be valid durations
//! - `fetch.timeout` must be non-zero
//! - `defaults.template` must not be empty

use crate::cache::parse_ttl;
use crate::config::schema::SproutConfig;
use crate::error::{Result, SproutError};

/// Validation error with context.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationError {
    /// Dotted path of the offending field
    pub field: String,
    /// Human-readable error message
    pub message: String,
}

/// Validate a configuration and return all errors.
pub fn validate_config(config: &SproutConfig) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    if let Err(e) = parse_ttl(&config.cache.ttl) {
        errors.push(ValidationError {
            field: "cache.ttl".to_string(),
            message: e.to_string(),
        });
    }

    match parse_ttl(&config.fetch.timeout) {
        Ok(timeout) if timeout.is_zero() => errors.push(ValidationError {
            field: "fetch.timeout".to_string(),
            message: "timeout must be greater than zero".to_string(),
        }),
        Ok(_) => {}
        Err(e) => errors.push(ValidationError {
            field: "fetch.timeout".to_string(),
            message: e.to_string(),
        }),
    }

    if config.defaults.template.trim().is_empty() {
        errors.push(ValidationError {
            field: "defaults.template".to_string(),
            message: "default template must not be empty".to_string(),
        });
    }

    errors
}

/// Validate, failing with every problem joined into one message.
pub fn validate(config: &SproutConfig) -> Result<()> {
    let errors = validate_config(config);
    if errors.is_empty() {
        return Ok(());
    }

    let message = errors
        .iter()
        .map(|e| format!("{}: {}", e.field, e.message))
        .collect::<Vec<_>>()
        .join("; ");
    Err(SproutError::ConfigValidationError { message })
}
