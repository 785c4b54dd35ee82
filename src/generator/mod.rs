//! Project generation.
//!
//! Turns a [`TemplateSource`] into a populated project directory:
//! built-ins are written from the binary, local directories are copied, and
//! remote references go through the [`TemplateProvider`] cache first.

pub mod copy;
pub mod git;
pub mod interpolation;

pub use copy::{copy_template, write_template_file};
pub use git::{git_init, is_git_available, GitInit};
pub use interpolation::{render, TemplateContext};

use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};

use crate::cache::CacheOptions;
use crate::error::{Result, SproutError};
use crate::template::{builtin, Fetcher, TemplateProvider, TemplateSource};

/// Check that `target` can receive a new project, creating it if needed.
///
/// A non-empty target is an error unless `force` is set, in which case its
/// contents are removed.
pub fn prepare_target(target: &Path, force: bool) -> Result<()> {
    if !target.exists() {
        fs::create_dir_all(target)?;
        return Ok(());
    }

    let mut entries = fs::read_dir(target)?.peekable();
    if entries.peek().is_none() {
        return Ok(());
    }

    if !force {
        return Err(SproutError::TargetNotEmpty {
            path: target.to_path_buf(),
        });
    }

    for entry in entries {
        let path = entry?.path();
        if fs::symlink_metadata(&path)?.is_dir() {
            fs::remove_dir_all(&path)?;
        } else {
            fs::remove_file(&path)?;
        }
    }
    tracing::debug!("Emptied {}", target.display());

    Ok(())
}

/// Result of generating a project.
#[derive(Debug, Clone)]
pub struct Generated {
    /// Project directory.
    pub target: PathBuf,
    /// Number of files written.
    pub files: usize,
}

/// Writes projects from templates.
pub struct Generator<'a, F: Fetcher> {
    provider: &'a TemplateProvider<F>,
}

impl<'a, F: Fetcher> Generator<'a, F> {
    /// Create a generator that fetches remote templates through `provider`.
    pub fn new(provider: &'a TemplateProvider<F>) -> Self {
        Self { provider }
    }

    /// Populate `target` from `source`. The target must already be prepared.
    pub fn generate(
        &self,
        source: &TemplateSource,
        target: &Path,
        context: &TemplateContext,
    ) -> Result<Generated> {
        let files = match source {
            TemplateSource::Builtin(name) => builtin::materialize(name, target, context)?,
            TemplateSource::Local(path) => {
                if !path.is_dir() {
                    return Err(SproutError::UnknownTemplate {
                        name: path.display().to_string(),
                    });
                }
                copy_template(path, target, context)?
            }
            TemplateSource::Remote(reference) => {
                let dir = self
                    .provider
                    .get_template(reference, &cache_options(reference))?;
                copy_template(&dir, target, context)?
            }
        };

        Ok(Generated {
            target: target.to_path_buf(),
            files,
        })
    }
}

fn cache_options(reference: &str) -> CacheOptions {
    let mut options = CacheOptions::new();
    options.insert("template".into(), Value::String(reference.to_string()));
    options.insert(
        "sproutVersion".into(),
        Value::String(env!("CARGO_PKG_VERSION").to_string()),
    );
    options
}
