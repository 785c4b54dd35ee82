//! Resolution of user-supplied repository references.
//!
//! Accepted forms (first match wins):
//!
//! 1. `https://github.com/<owner>/<repo>[/tree/<branch>[/<subdir>...]]`
//! 2. `<owner>/<repo>`
//! 3. `<owner>/<repo>#<branch>`
//! 4. `<owner>/<repo>#<branch>:<subdir>`
//! 5. `direct:<url>` (already canonical)
//!
//! Anything else passes through unchanged and is left for the fetcher to
//! reject.
//!
//! # Example
//!
//! ```
//! use sprout::template::resolve;
//!
//! let locator = resolve("user/repo#dev:src/app");
//! assert_eq!(
//!     locator.source,
//!     "direct:https://github.com/user/repo/archive/refs/heads/dev.tar.gz"
//! );
//! assert_eq!(locator.subdir.as_deref(), Some("src/app"));
//! ```

use regex::Regex;
use std::fmt;
use std::sync::LazyLock;

/// Prefix marking a locator that points straight at a fetchable URL.
pub const DIRECT_PREFIX: &str = "direct:";

/// Branch used when a reference does not name one.
pub const DEFAULT_BRANCH: &str = "main";

const GITHUB_HOST: &str = "github.com";

static OWNER_REPO: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([\w.-]+)/([\w.-]+)$").expect("valid regex"));

static OWNER_REPO_BRANCH: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([\w.-]+)/([\w.-]+)#([^:#\s]+)$").expect("valid regex"));

static OWNER_REPO_BRANCH_SUBDIR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([\w.-]+)/([\w.-]+)#([^:#\s]+):(\S+)$").expect("valid regex")
});

/// A normalized, deterministically fetchable template location.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CanonicalLocator {
    /// Fetchable source, usually `direct:<archive-url>`.
    pub source: String,
    /// Path inside the repository to use as the template root.
    pub subdir: Option<String>,
}

impl CanonicalLocator {
    /// Locator for the snapshot archive of `owner/repo` at `branch`.
    pub fn archive(owner: &str, repo: &str, branch: &str, subdir: Option<&str>) -> Self {
        Self {
            source: format!("{}{}", DIRECT_PREFIX, archive_url(owner, repo, branch)),
            subdir: subdir.and_then(normalize_subdir),
        }
    }

    /// Locator that passes `reference` through untouched.
    fn passthrough(reference: &str) -> Self {
        Self {
            source: reference.to_string(),
            subdir: None,
        }
    }

    /// The fetchable URL with any `direct:` marker removed.
    pub fn url(&self) -> &str {
        self.source
            .strip_prefix(DIRECT_PREFIX)
            .unwrap_or(&self.source)
    }
}

impl fmt::Display for CanonicalLocator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.subdir {
            Some(subdir) => write!(f, "{} (subdirectory {})", self.source, subdir),
            None => f.write_str(&self.source),
        }
    }
}

/// Snapshot archive URL for `owner/repo` at `branch`.
pub fn archive_url(owner: &str, repo: &str, branch: &str) -> String {
    format!(
        "https://{}/{}/{}/archive/refs/heads/{}.tar.gz",
        GITHUB_HOST, owner, repo, branch
    )
}

/// Resolve a reference into its canonical locator.
///
/// Pure and infallible: unrecognized input comes back unchanged.
pub fn resolve(reference: &str) -> CanonicalLocator {
    let reference = reference.trim();

    if let Some(locator) = resolve_github_url(reference) {
        return locator;
    }

    if let Some(caps) = OWNER_REPO.captures(reference) {
        return CanonicalLocator::archive(&caps[1], &caps[2], DEFAULT_BRANCH, None);
    }

    if let Some(caps) = OWNER_REPO_BRANCH.captures(reference) {
        return CanonicalLocator::archive(&caps[1], &caps[2], &caps[3], None);
    }

    if let Some(caps) = OWNER_REPO_BRANCH_SUBDIR.captures(reference) {
        return CanonicalLocator::archive(&caps[1], &caps[2], &caps[3], Some(&caps[4]));
    }

    if !reference.starts_with(DIRECT_PREFIX) {
        tracing::debug!("Reference '{}' matched no known form; using as-is", reference);
    }

    CanonicalLocator::passthrough(reference)
}

/// Parse `[scheme://]github.com/<owner>/<repo>[.git][/tree/<branch>[/<subdir>]]`.
fn resolve_github_url(reference: &str) -> Option<CanonicalLocator> {
    if reference.starts_with(DIRECT_PREFIX) {
        return None;
    }

    let without_scheme = reference
        .split_once("://")
        .map_or(reference, |(_, rest)| rest);
    let without_query = without_scheme
        .split(['?', '#'])
        .next()
        .unwrap_or(without_scheme);

    let mut segments = without_query.split('/').filter(|s| !s.is_empty());
    let host = segments.next()?;
    let host = host.rsplit('@').next().unwrap_or(host);
    if !host.eq_ignore_ascii_case(GITHUB_HOST) && !host.eq_ignore_ascii_case("www.github.com") {
        return None;
    }

    let owner = segments.next()?;
    let repo = segments.next()?;
    let repo = repo.strip_suffix(".git").unwrap_or(repo);

    let rest: Vec<&str> = segments.collect();
    match rest.as_slice() {
        ["tree", branch, subdir @ ..] => {
            let subdir = subdir.join("/");
            let subdir = (!subdir.is_empty()).then_some(subdir.as_str());
            Some(CanonicalLocator::archive(owner, repo, branch, subdir))
        }
        _ => Some(CanonicalLocator::archive(
            owner,
            repo,
            DEFAULT_BRANCH,
            None,
        )),
    }
}

/// Trim separators and drop empty or `.` segments. `None` if nothing remains.
pub fn normalize_subdir(subdir: &str) -> Option<String> {
    let cleaned: Vec<&str> = subdir
        .split(['/', '\\'])
        .filter(|s| !s.is_empty() && *s != ".")
        .collect();

    if cleaned.is_empty() {
        None
    } else {
        Some(cleaned.join("/"))
    }
}
