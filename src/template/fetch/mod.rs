//! Template fetching from remote sources.
//!
//! A [`Fetcher`] materializes a [`CanonicalLocator`] into a destination
//! directory. [`RemoteFetcher`] picks one of two strategies from the locator
//! alone, so the same locator is always fetched the same way:
//!
//! - [`FetchStrategy::Archive`] downloads and unpacks a `.tar.gz` snapshot
//! - [`FetchStrategy::Clone`] runs a shallow `git clone`

pub mod archive;
pub mod git;

pub use archive::ArchiveFetcher;
pub use git::GitFetcher;

use std::fs;
use std::path::Path;
use std::time::Duration;

use super::reference::CanonicalLocator;
use crate::error::{Result, SproutError};

/// Default deadline for a single fetch.
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(120);

/// Retrieves template content into a directory.
pub trait Fetcher {
    /// Populate `destination` with the content `locator` points at.
    ///
    /// `destination` must be absent or empty. On failure the destination is
    /// removed on a best-effort basis before the error is returned.
    fn fetch(&self, locator: &CanonicalLocator, destination: &Path) -> Result<()>;
}

/// Physical retrieval strategy for a locator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchStrategy {
    /// Download and unpack a compressed snapshot.
    Archive { url: String },
    /// Shallow version-control clone, optionally of one branch.
    Clone { url: String, branch: Option<String> },
}

impl FetchStrategy {
    /// Select the strategy for `locator`, or `None` if it is not fetchable.
    pub fn for_locator(locator: &CanonicalLocator) -> Option<Self> {
        let url = locator.url();

        let (base, branch) = match url.rsplit_once('#') {
            Some((base, branch)) if !branch.is_empty() => (base, Some(branch.to_string())),
            _ => (url, None),
        };

        if base.ends_with(".git") || base.starts_with("git@") || base.starts_with("ssh://") {
            return Some(Self::Clone {
                url: base.to_string(),
                branch,
            });
        }

        let is_http = url.starts_with("https://") || url.starts_with("http://");
        let is_tarball = url.ends_with(".tar.gz") || url.ends_with(".tgz");
        if is_http && is_tarball {
            return Some(Self::Archive {
                url: url.to_string(),
            });
        }

        None
    }
}

/// Production fetcher dispatching to the archive or clone strategy.
pub struct RemoteFetcher {
    archive: ArchiveFetcher,
    git: GitFetcher,
    timeout: Duration,
}

impl RemoteFetcher {
    /// Create a fetcher with the default deadline.
    pub fn new() -> Result<Self> {
        Self::with_timeout(DEFAULT_FETCH_TIMEOUT)
    }

    /// Create a fetcher whose every fetch is bounded by `timeout`.
    pub fn with_timeout(timeout: Duration) -> Result<Self> {
        Ok(Self {
            archive: ArchiveFetcher::with_timeout(timeout)?,
            git: GitFetcher::with_timeout(timeout),
            timeout,
        })
    }

    /// Get the configured deadline.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

impl Fetcher for RemoteFetcher {
    fn fetch(&self, locator: &CanonicalLocator, destination: &Path) -> Result<()> {
        let fail = |message: String| SproutError::FetchFailed {
            locator: locator.source.clone(),
            destination: destination.to_path_buf(),
            message,
        };

        if is_populated(destination)? {
            return Err(fail("destination already contains files".to_string()));
        }

        let strategy = FetchStrategy::for_locator(locator)
            .ok_or_else(|| fail("unsupported template locator".to_string()))?;
        tracing::debug!("Fetching {} with {:?}", locator.source, strategy);

        let result = match &strategy {
            FetchStrategy::Archive { url } => self.archive.fetch(url, destination),
            FetchStrategy::Clone { url, branch } => {
                self.git.fetch(url, branch.as_deref(), destination)
            }
        };

        result.map_err(|e| {
            remove_best_effort(destination);
            attach_locator(e, locator, destination)
        })
    }
}

/// Whether `dir` exists and has at least one entry.
pub fn is_populated(dir: &Path) -> Result<bool> {
    match fs::read_dir(dir) {
        Ok(mut entries) => Ok(entries.next().is_some()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(e.into()),
    }
}

fn remove_best_effort(dir: &Path) {
    if let Err(e) = fs::remove_dir_all(dir) {
        if e.kind() != std::io::ErrorKind::NotFound {
            tracing::warn!("Failed to clean up {}: {}", dir.display(), e);
        }
    }
}

/// Strategy fetchers report with bare URLs; name the full locator instead.
fn attach_locator(err: SproutError, locator: &CanonicalLocator, destination: &Path) -> SproutError {
    match err {
        SproutError::FetchFailed { message, .. } => SproutError::FetchFailed {
            locator: locator.source.clone(),
            destination: destination.to_path_buf(),
            message,
        },
        SproutError::FetchTimeout { timeout, .. } => SproutError::FetchTimeout {
            locator: locator.source.clone(),
            destination: destination.to_path_buf(),
            timeout,
        },
        other => SproutError::FetchFailed {
            locator: locator.source.clone(),
            destination: destination.to_path_buf(),
            message: other.to_string(),
        },
    }
}
