//! Copying template trees into a new project.

use std::fs;
use std::path::{Component, Path, PathBuf};
use walkdir::WalkDir;

use super::interpolation::{render, TemplateContext};
use crate::error::Result;

/// Stand-in name for `.gitignore`, which packaging tools tend to drop.
pub const GITIGNORE_PLACEHOLDER: &str = "_gitignore";

/// Directories never copied out of a template.
const SKIPPED_DIRS: [&str; 1] = [".git"];

/// Output file name for a template file name.
pub fn output_name(name: &str, context: &TemplateContext) -> String {
    if name == GITIGNORE_PLACEHOLDER {
        return ".gitignore".to_string();
    }
    render(name, context)
}

/// Write one template file to `target_root/relative`.
///
/// UTF-8 contents have their placeholders rendered; anything else is copied
/// byte for byte.
pub fn write_template_file(
    target_root: &Path,
    relative: &Path,
    contents: &[u8],
    context: &TemplateContext,
) -> Result<PathBuf> {
    let mut target = target_root.to_path_buf();
    for component in relative.components() {
        if let Component::Normal(part) = component {
            target.push(output_name(&part.to_string_lossy(), context));
        }
    }

    if let Some(parent) = target.parent() {
        fs::create_dir_all(parent)?;
    }

    match std::str::from_utf8(contents) {
        Ok(text) => fs::write(&target, render(text, context))?,
        Err(_) => fs::write(&target, contents)?,
    }

    Ok(target)
}

/// Copy the template at `source` into `target`. Returns files written.
pub fn copy_template(source: &Path, target: &Path, context: &TemplateContext) -> Result<usize> {
    fs::create_dir_all(target)?;
    let mut written = 0;

    let walker = WalkDir::new(source)
        .min_depth(1)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| {
            !(e.file_type().is_dir()
                && SKIPPED_DIRS.iter().any(|skip| e.file_name() == *skip))
        });

    for entry in walker {
        let entry = entry.map_err(|e| anyhow::anyhow!(e))?;
        if !entry.file_type().is_file() {
            continue;
        }

        let relative = entry
            .path()
            .strip_prefix(source)
            .map_err(|e| anyhow::anyhow!(e))?;
        let contents = fs::read(entry.path())?;
        let written_to = write_template_file(target, relative, &contents, context)?;

        let permissions = entry.metadata().map_err(|e| anyhow::anyhow!(e))?.permissions();
        fs::set_permissions(&written_to, permissions)?;

        written += 1;
    }

    tracing::debug!(
        "Copied {} files from {} to {}",
        written,
        source.display(),
        target.display()
    );
    Ok(written)
}
