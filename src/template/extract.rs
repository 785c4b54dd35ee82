//! Subdirectory extraction.
//!
//! Replaces the contents of a download root with one nested subtree. Works
//! on both wrapped layouts (`root/repo-main/<subdir>`) and unwrapped ones
//! (`root/<subdir>`); the layout is detected from the directory structure
//! alone.

use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use super::reference::normalize_subdir;
use crate::error::{Result, SproutError};

/// Scratch directory created inside the download root while extracting.
pub const STAGING_DIR: &str = ".sprout-staging";

/// Promote `subdir` of `download_root` to be the whole of `download_root`.
///
/// An empty or `.` subdirectory leaves the root untouched.
pub fn extract_subdirectory(download_root: &Path, subdir: &str) -> Result<()> {
    let Some(subdir) = normalize_subdir(subdir) else {
        return Ok(());
    };

    if subdir.split('/').any(|segment| segment == "..") {
        return Err(SproutError::SubdirectoryNotFound {
            path: download_root.to_path_buf(),
            segment: "..".to_string(),
            available: child_dirs(download_root),
        });
    }

    let resolved = locate(download_root, &subdir)?;
    if !resolved.canonicalize()?.starts_with(download_root.canonicalize()?) {
        return Err(SproutError::SubdirectoryNotFound {
            path: download_root.to_path_buf(),
            segment: subdir,
            available: child_dirs(download_root),
        });
    }
    tracing::debug!("Extracting {} from {}", subdir, resolved.display());

    let staging = download_root.join(STAGING_DIR);
    if staging.exists() {
        fs::remove_dir_all(&staging)?;
    }
    copy_tree(&resolved, &staging)?;

    for entry in fs::read_dir(download_root)? {
        let entry = entry?;
        if entry.file_name() == STAGING_DIR {
            continue;
        }
        remove_path(&entry.path())?;
    }

    for entry in fs::read_dir(&staging)? {
        let entry = entry?;
        fs::rename(entry.path(), download_root.join(entry.file_name()))?;
    }
    fs::remove_dir(&staging)?;

    Ok(())
}

/// Find the directory `subdir` names.
///
/// A match directly under the root wins over one inside a lone wrapper
/// directory, so a repository whose only top-level directory is `X/` still
/// resolves `X/...` against the root. The wrapper is tried when the root
/// has no match.
fn locate(download_root: &Path, subdir: &str) -> Result<PathBuf> {
    let candidates: Vec<PathBuf> = single_wrapper(download_root)?
        .into_iter()
        .chain(std::iter::once(download_root.to_path_buf()))
        .collect();

    if let Some(found) = candidates
        .iter()
        .rev()
        .map(|c| c.join(subdir))
        .find(|p| p.is_dir())
    {
        return Ok(found);
    }

    // Report from whichever candidate got furthest; earlier candidates win ties.
    let mut deepest: Option<(usize, SproutError)> = None;
    for candidate in &candidates {
        let (depth, err) = walk_segments(candidate, subdir);
        if deepest.as_ref().is_none_or(|(best, _)| depth > *best) {
            deepest = Some((depth, err));
        }
    }

    Err(deepest
        .map(|(_, err)| err)
        .unwrap_or_else(|| SproutError::SubdirectoryNotFound {
            path: download_root.to_path_buf(),
            segment: subdir.to_string(),
            available: Vec::new(),
        }))
}

/// The sole top-level directory of `root`, if it has exactly one entry.
fn single_wrapper(root: &Path) -> Result<Option<PathBuf>> {
    let mut entries = fs::read_dir(root)?
        .filter_map(|e| e.ok())
        .filter(|e| e.file_name() != STAGING_DIR);

    match (entries.next(), entries.next()) {
        (Some(only), None) if only.path().is_dir() => Ok(Some(only.path())),
        _ => Ok(None),
    }
}

/// Follow `subdir` from `start` until a segment is missing.
fn walk_segments(start: &Path, subdir: &str) -> (usize, SproutError) {
    let mut current = start.to_path_buf();

    for (depth, segment) in subdir.split('/').enumerate() {
        let next = current.join(segment);
        if !next.is_dir() {
            return (
                depth,
                SproutError::SubdirectoryNotFound {
                    available: child_dirs(&current),
                    path: current,
                    segment: segment.to_string(),
                },
            );
        }
        current = next;
    }

    (
        usize::MAX,
        SproutError::SubdirectoryNotFound {
            path: start.to_path_buf(),
            segment: subdir.to_string(),
            available: child_dirs(start),
        },
    )
}

fn child_dirs(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(dir)
        .into_iter()
        .flatten()
        .filter_map(|e| e.ok())
        .filter(|e| e.path().is_dir())
        .map(|e| e.file_name().to_string_lossy().into_owned())
        .filter(|name| name != STAGING_DIR)
        .collect();
    names.sort();
    names
}

/// Recursively copy the contents of `src` into `dst`.
pub(crate) fn copy_tree(src: &Path, dst: &Path) -> Result<()> {
    fs::create_dir_all(dst)?;

    for entry in WalkDir::new(src).min_depth(1) {
        let entry = entry.map_err(|e| anyhow::anyhow!(e))?;
        let relative = entry
            .path()
            .strip_prefix(src)
            .map_err(|e| anyhow::anyhow!(e))?;
        let target = dst.join(relative);
        let file_type = entry.file_type();

        if file_type.is_dir() {
            fs::create_dir_all(&target)?;
        } else if file_type.is_symlink() {
            copy_symlink(entry.path(), &target)?;
        } else {
            fs::copy(entry.path(), &target)?;
        }
    }

    Ok(())
}

#[cfg(unix)]
fn copy_symlink(src: &Path, dst: &Path) -> Result<()> {
    let link = fs::read_link(src)?;
    std::os::unix::fs::symlink(link, dst)?;
    Ok(())
}

#[cfg(not(unix))]
fn copy_symlink(src: &Path, dst: &Path) -> Result<()> {
    fs::copy(src, dst)?;
    Ok(())
}

fn remove_path(path: &Path) -> Result<()> {
    let meta = fs::symlink_metadata(path)?;
    if meta.is_dir() {
        fs::remove_dir_all(path)?;
    } else {
        fs::remove_file(path)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write(root: &Path, rel: &str, contents: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, contents).unwrap();
    }

    fn listing(root: &Path) -> Vec<String> {
        let mut paths: Vec<String> = WalkDir::new(root)
            .min_depth(1)
            .into_iter()
            .map(|e| e.unwrap())
            .filter(|e| e.file_type().is_file())
            .map(|e| {
                e.path()
                    .strip_prefix(root)
                    .unwrap()
                    .to_string_lossy()
                    .replace('\\', "/")
            })
            .collect();
        paths.sort();
        paths
    }

    #[test]
    fn wrapped_layout_promotes_subdirectory() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        write(root, "repo-main/README.md", "top");
        write(root, "repo-main/packages/foo/index.js", "foo");
        write(root, "repo-main/packages/foo/lib/util.js", "util");
        write(root, "repo-main/packages/bar/index.js", "bar");

        extract_subdirectory(root, "packages/foo").unwrap();

        assert_eq!(listing(root), vec!["index.js", "lib/util.js"]);
        assert!(!root.join("repo-main").exists());
        assert!(!root.join(STAGING_DIR).exists());
        assert_eq!(fs::read_to_string(root.join("index.js")).unwrap(), "foo");
    }

    #[test]
    fn unwrapped_layout_promotes_subdirectory() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        write(root, "README.md", "top");
        write(root, "src/app/main.js", "app");
        write(root, "src/other.js", "other");

        extract_subdirectory(root, "src/app").unwrap();

        assert_eq!(listing(root), vec!["main.js"]);
    }

    #[test]
    fn single_top_level_dir_that_is_not_a_wrapper() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        write(root, "packages/foo/index.js", "foo");

        extract_subdirectory(root, "packages/foo").unwrap();

        assert_eq!(listing(root), vec!["index.js"]);
    }

    #[test]
    fn missing_segment_names_siblings() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        write(root, "repo-main/packages/beta/x", "");
        write(root, "repo-main/packages/alpha/x", "");
        write(root, "repo-main/packages/notes.txt", "");

        let err = extract_subdirectory(root, "packages/missing/deeper").unwrap_err();

        match err {
            SproutError::SubdirectoryNotFound {
                path,
                segment,
                available,
            } => {
                assert_eq!(segment, "missing");
                assert_eq!(available, vec!["alpha", "beta"]);
                assert_eq!(path, root.join("repo-main/packages"));
            }
            other => panic!("unexpected error: {}", other),
        }

        // Nothing was touched
        assert!(root.join("repo-main/packages/alpha/x").exists());
    }

    #[test]
    fn missing_first_segment_reports_from_wrapper() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        write(root, "repo-main/docs/x", "");

        let err = extract_subdirectory(root, "nope").unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("nope"), "{}", msg);
        assert!(msg.contains("docs"), "{}", msg);
    }

    #[test]
    fn empty_or_dot_subdir_is_noop() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        write(root, "a.txt", "a");
        write(root, "b/c.txt", "c");

        extract_subdirectory(root, "").unwrap();
        extract_subdirectory(root, ".").unwrap();

        assert_eq!(listing(root), vec!["a.txt", "b/c.txt"]);
    }

    #[test]
    fn extraction_is_deterministic() {
        let build = || {
            let temp = TempDir::new().unwrap();
            write(temp.path(), "repo-main/pkg/a.txt", "a");
            write(temp.path(), "repo-main/pkg/b/c.txt", "c");
            write(temp.path(), "repo-main/other.txt", "o");
            extract_subdirectory(temp.path(), "pkg").unwrap();
            listing(temp.path())
        };

        assert_eq!(build(), build());
    }

    #[test]
    fn extracting_an_exact_layout_converges() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        write(root, "pkg/a.txt", "a");
        write(root, "pkg/b/c.txt", "c");

        extract_subdirectory(root, "pkg").unwrap();
        assert_eq!(listing(root), vec!["a.txt", "b/c.txt"]);

        // Same state as extracting the wrapped form of the same tree
        let wrapped = TempDir::new().unwrap();
        write(wrapped.path(), "repo-main/pkg/a.txt", "a");
        write(wrapped.path(), "repo-main/pkg/b/c.txt", "c");
        extract_subdirectory(wrapped.path(), "pkg").unwrap();
        assert_eq!(listing(wrapped.path()), listing(root));

        // Nothing left to promote
        extract_subdirectory(root, ".").unwrap();
        assert_eq!(listing(root), vec!["a.txt", "b/c.txt"]);
        assert_eq!(fs::read_to_string(root.join("b/c.txt")).unwrap(), "c");
    }

    #[test]
    fn parent_segments_are_rejected() {
        let temp = TempDir::new().unwrap();
        let cache = temp.path();
        write(cache, "secret/token.txt", "t");
        write(cache, "key/README.md", "r");
        let root = cache.join("key");

        for subdir in ["../secret", "..", "docs/../../secret"] {
            let err = extract_subdirectory(&root, subdir).unwrap_err();
            assert!(
                matches!(err, SproutError::SubdirectoryNotFound { ref segment, .. } if segment == ".."),
                "{}: {}",
                subdir,
                err
            );
        }

        assert_eq!(listing(&root), vec!["README.md"]);
        assert!(cache.join("secret/token.txt").exists());
    }

    #[cfg(unix)]
    #[test]
    fn symlinked_subdir_outside_root_is_rejected() {
        let temp = TempDir::new().unwrap();
        write(temp.path(), "secret/token.txt", "t");
        let root = temp.path().join("key");
        write(&root, "README.md", "r");
        std::os::unix::fs::symlink(temp.path().join("secret"), root.join("out")).unwrap();

        let err = extract_subdirectory(&root, "out").unwrap_err();

        assert!(matches!(err, SproutError::SubdirectoryNotFound { .. }));
        assert!(root.join("README.md").exists());
    }

    #[test]
    fn root_match_wins_over_same_named_wrapper() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        write(root, "site/docs/right.txt", "r");
        write(root, "site/site/docs/wrong.txt", "w");

        extract_subdirectory(root, "site/docs").unwrap();

        assert_eq!(listing(root), vec!["right.txt"]);
    }

    #[test]
    fn stale_staging_dir_is_replaced() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        write(root, "pkg/a.txt", "a");
        write(root, "other.txt", "o");
        write(root, &format!("{}/stale.txt", STAGING_DIR), "stale");

        extract_subdirectory(root, "pkg").unwrap();

        assert_eq!(listing(root), vec!["a.txt"]);
    }

    #[cfg(unix)]
    #[test]
    fn symlinks_are_preserved() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        write(root, "pkg/target.txt", "t");
        write(root, "other.txt", "o");
        std::os::unix::fs::symlink("target.txt", root.join("pkg/link.txt")).unwrap();

        extract_subdirectory(root, "pkg").unwrap();

        assert_eq!(
            fs::read_link(root.join("link.txt")).unwrap(),
            PathBuf::from("target.txt")
        );
    }
}
