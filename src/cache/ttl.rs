//! Duration strings for TTLs and timeouts.

use std::time::Duration;

use crate::error::{Result, SproutError};

/// Parse a duration string like "7d", "24h", "30m", "90s".
///
/// A bare number is taken as seconds.
pub fn parse_ttl(ttl: &str) -> Result<Duration> {
    let ttl = ttl.trim().to_lowercase();

    let (digits, unit_secs) = if let Some(days) = ttl.strip_suffix('d') {
        (days, 86_400)
    } else if let Some(hours) = ttl.strip_suffix('h') {
        (hours, 3_600)
    } else if let Some(mins) = ttl.strip_suffix('m') {
        (mins, 60)
    } else if let Some(secs) = ttl.strip_suffix('s') {
        (secs, 1)
    } else {
        (ttl.as_str(), 1)
    };

    let n: u64 = digits
        .trim()
        .parse()
        .map_err(|_| SproutError::ConfigValidationError {
            message: format!("invalid duration '{}' (expected e.g. 7d, 24h, 30m, 90s)", ttl),
        })?;

    Ok(Duration::from_secs(n.saturating_mul(unit_secs)))
}

/// Format a duration for display using its largest whole unit.
pub fn format_duration(duration: Duration) -> String {
    let secs = duration.as_secs();

    if secs >= 86_400 {
        format!("{}d", secs / 86_400)
    } else if secs >= 3_600 {
        format!("{}h", secs / 3_600)
    } else if secs >= 60 {
        format!("{}m", secs / 60)
    } else {
        format!("{}s", secs)
    }
}
