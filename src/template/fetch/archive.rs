//! Snapshot archive fetching.
//!
//! Downloads a `.tar.gz` and unpacks it with the top-level wrapper directory
//! removed, so `repo-main/src/app` lands at `<destination>/src/app`.

use flate2::read::GzDecoder;
use reqwest::blocking::Client;
use reqwest::StatusCode;
use std::fs;
use std::path::{Component, Path, PathBuf};
use std::time::Duration;
use tar::{Archive, EntryType};

use crate::error::{Result, SproutError};

/// Fetches and unpacks compressed snapshot archives over HTTP(S).
pub struct ArchiveFetcher {
    client: Client,
    timeout: Duration,
}

impl ArchiveFetcher {
    /// Create a fetcher whose requests are bounded by `timeout`.
    pub fn with_timeout(timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("sprout/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()
            .map_err(anyhow::Error::from)?;

        Ok(Self { client, timeout })
    }

    /// Download `url` and unpack it into `destination`.
    pub fn fetch(&self, url: &str, destination: &Path) -> Result<()> {
        let fail = |message: String| SproutError::FetchFailed {
            locator: url.to_string(),
            destination: destination.to_path_buf(),
            message,
        };
        let timed_out = || SproutError::FetchTimeout {
            locator: url.to_string(),
            destination: destination.to_path_buf(),
            timeout: self.timeout,
        };

        tracing::debug!("Downloading {}", url);
        let response = self.client.get(url).send().map_err(|e| {
            if e.is_timeout() {
                timed_out()
            } else {
                fail(format!("request failed: {}", e))
            }
        })?;

        match response.status() {
            StatusCode::NOT_FOUND => {
                return Err(fail("repository or branch not found (HTTP 404)".to_string()))
            }
            status if !status.is_success() => return Err(fail(format!("HTTP {}", status))),
            _ => {}
        }

        let bytes = response.bytes().map_err(|e| {
            if e.is_timeout() {
                timed_out()
            } else {
                fail(format!("download interrupted: {}", e))
            }
        })?;
        tracing::debug!("Downloaded {} bytes from {}", bytes.len(), url);

        let written = unpack(&bytes, destination).map_err(|e| fail(e.to_string()))?;
        if written == 0 {
            return Err(fail("archive contained no files".to_string()));
        }

        Ok(())
    }
}

/// Unpack a gzip-compressed tarball, dropping the first path component of
/// every entry. Returns the number of entries written.
pub fn unpack(data: &[u8], destination: &Path) -> Result<usize> {
    fs::create_dir_all(destination)?;
    let root = destination.canonicalize()?;

    let mut archive = Archive::new(GzDecoder::new(data));
    let mut written = 0;

    for entry in archive.entries()? {
        let mut entry = entry?;

        if matches!(
            entry.header().entry_type(),
            EntryType::XGlobalHeader | EntryType::XHeader
        ) {
            continue;
        }

        let path = entry.path()?.into_owned();
        let Some(relative) = strip_wrapper(&path)? else {
            continue;
        };

        let target = destination.join(&relative);
        let parent = target.parent().unwrap_or(destination);
        fs::create_dir_all(parent)?;
        let depth = contained_depth(&root, parent, &path)?;

        match entry.header().entry_type() {
            EntryType::Symlink => {
                let link = entry.link_name()?.map(|l| l.into_owned()).unwrap_or_default();
                check_link_target(&link, depth, &path)?;
                entry.unpack(&target)?;
            }
            EntryType::Link => {
                // Hard links name another archive member, wrapper included
                let link = entry.link_name()?.map(|l| l.into_owned()).unwrap_or_default();
                let Some(source) = strip_wrapper(&link)? else {
                    return Err(escapes(&path));
                };
                let source = destination.join(source);
                if let Some(parent) = source.parent() {
                    contained_depth(&root, parent, &path)?;
                }
                fs::hard_link(&source, &target)?;
            }
            _ => {
                entry.unpack(&target)?;
            }
        }
        written += 1;
    }

    Ok(written)
}

/// Drop the first component. `None` for the wrapper itself.
fn strip_wrapper(path: &Path) -> Result<Option<PathBuf>> {
    let mut relative = PathBuf::new();

    for (index, component) in path.components().enumerate() {
        match component {
            Component::Normal(part) if index > 0 => relative.push(part),
            Component::Normal(_) | Component::CurDir => {}
            _ => return Err(escapes(path)),
        }
    }

    Ok((!relative.as_os_str().is_empty()).then_some(relative))
}

/// A symlink in a directory `depth` levels below the destination must point
/// somewhere under the destination.
fn check_link_target(link: &Path, mut depth: usize, entry: &Path) -> Result<()> {
    if link.as_os_str().is_empty() {
        return Err(escapes(entry));
    }

    for component in link.components() {
        match component {
            Component::Normal(_) => depth += 1,
            Component::CurDir => {}
            Component::ParentDir if depth > 0 => depth -= 1,
            _ => return Err(escapes(entry)),
        }
    }
    Ok(())
}

/// How far `dir` sits below `root` once links already unpacked are followed.
/// Fails if it resolves outside `root`.
fn contained_depth(root: &Path, dir: &Path, entry: &Path) -> Result<usize> {
    let resolved = dir.canonicalize()?;
    resolved
        .strip_prefix(root)
        .map(|inside| inside.components().count())
        .map_err(|_| escapes(entry))
}

fn escapes(entry: &Path) -> SproutError {
    anyhow::anyhow!("archive entry escapes destination: {}", entry.display()).into()
}
