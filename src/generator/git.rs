//! Git repository initialization for new projects.

use std::path::Path;

use crate::error::{Result, SproutError};
use crate::shell;

/// Message used for the first commit of a generated project.
pub const INITIAL_COMMIT_MESSAGE: &str = "Initial commit from sprout";

/// Outcome of [`git_init`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GitInit {
    /// Repository created and all files committed.
    Committed,
    /// Repository created; the commit failed (usually missing identity).
    InitializedOnly,
}

/// Whether a `git` executable can be run.
pub fn is_git_available() -> bool {
    shell::run("git", &["--version"], None, None).is_ok_and(|out| out.success)
}

/// Initialize a repository in `dir` and commit everything in it.
pub fn git_init(dir: &Path) -> Result<GitInit> {
    let init = shell::run("git", &["init", "--quiet"], Some(dir), None)?;
    if !init.success {
        return Err(SproutError::CommandFailed {
            command: "git init".to_string(),
            code: init.exit_code,
        });
    }

    let add = shell::run("git", &["add", "-A"], Some(dir), None)?;
    if !add.success {
        tracing::debug!("git add failed: {}", add.stderr.trim());
        return Ok(GitInit::InitializedOnly);
    }

    let commit = shell::run(
        "git",
        &["commit", "--quiet", "-m", INITIAL_COMMIT_MESSAGE],
        Some(dir),
        None,
    )?;
    if !commit.success {
        tracing::debug!("git commit failed: {}", commit.stderr.trim());
        return Ok(GitInit::InitializedOnly);
    }

    Ok(GitInit::Committed)
}
