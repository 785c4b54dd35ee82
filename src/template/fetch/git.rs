//! Git template fetching.
//!
//! Shallow-clones a repository and strips its `.git` directory so the
//! result is plain template content.

use std::fs;
use std::path::Path;
use std::time::Duration;

use crate::error::{Result, SproutError};
use crate::shell;

/// Fetches templates with `git clone --depth 1`.
pub struct GitFetcher {
    timeout: Duration,
}

impl GitFetcher {
    /// Create a fetcher whose clones are killed after `timeout`.
    pub fn with_timeout(timeout: Duration) -> Self {
        Self { timeout }
    }

    /// Get the configured timeout.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Clone `url` (optionally one `branch`) into `destination`.
    pub fn fetch(&self, url: &str, branch: Option<&str>, destination: &Path) -> Result<()> {
        if let Some(parent) = destination.parent() {
            fs::create_dir_all(parent)?;
        }

        let dest = destination.to_string_lossy();
        let mut args = vec!["clone", "--depth", "1", "--quiet"];
        if let Some(b) = branch {
            args.extend(["--branch", b]);
        }
        args.extend([url, dest.as_ref()]);

        let output = shell::run("git", &args, None, Some(self.timeout))?;

        if output.timed_out {
            return Err(SproutError::FetchTimeout {
                locator: url.to_string(),
                destination: destination.to_path_buf(),
                timeout: self.timeout,
            });
        }

        if !output.success {
            return Err(SproutError::FetchFailed {
                locator: url.to_string(),
                destination: destination.to_path_buf(),
                message: format!("git clone failed: {}", output.stderr.trim()),
            });
        }

        let git_dir = destination.join(".git");
        if git_dir.exists() {
            fs::remove_dir_all(&git_dir)?;
        }

        Ok(())
    }
}
