//! Built-in templates embedded at compile time.

use include_dir::{include_dir, Dir, DirEntry};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{Result, SproutError};
use crate::generator::copy::write_template_file;
use crate::generator::TemplateContext;

/// Embedded templates directory.
static TEMPLATES_DIR: Dir<'_> = include_dir!("$CARGO_MANIFEST_DIR/templates");

const MANIFEST_FILE: &str = "manifest.yml";

/// Index of the embedded templates.
#[derive(Debug, Clone, Deserialize)]
pub struct BuiltinManifest {
    /// Templates in display order.
    pub templates: Vec<BuiltinTemplate>,
}

/// One embedded template.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct BuiltinTemplate {
    /// Name used with `--template`.
    pub name: String,
    /// One-line summary.
    pub description: String,
}

/// Load the built-in template manifest.
pub fn load_manifest() -> Result<BuiltinManifest> {
    let manifest_path = Path::new("templates").join(MANIFEST_FILE);

    let content = TEMPLATES_DIR
        .get_file(MANIFEST_FILE)
        .and_then(|f| f.contents_utf8())
        .ok_or_else(|| SproutError::ConfigNotFound {
            path: manifest_path.clone(),
        })?;

    serde_yaml::from_str(content).map_err(|e| SproutError::ConfigParseError {
        path: manifest_path,
        message: e.to_string(),
    })
}

/// All built-in templates, in manifest order.
pub fn list() -> Result<Vec<BuiltinTemplate>> {
    Ok(load_manifest()?.templates)
}

/// Names of all built-in templates.
pub fn names() -> Vec<String> {
    list()
        .map(|templates| templates.into_iter().map(|t| t.name).collect())
        .unwrap_or_default()
}

/// Look up a built-in template by name.
pub fn get(name: &str) -> Option<BuiltinTemplate> {
    list().ok()?.into_iter().find(|t| t.name == name)
}

/// Write built-in template `name` into `target`, rendering placeholders.
///
/// Returns the number of files written.
pub fn materialize(name: &str, target: &Path, context: &TemplateContext) -> Result<usize> {
    let dir = get(name)
        .and_then(|_| TEMPLATES_DIR.get_dir(name))
        .ok_or_else(|| SproutError::UnknownTemplate {
            name: name.to_string(),
        })?;

    let root = dir.path();
    let mut written = 0;
    write_dir(dir, root, target, context, &mut written)?;

    tracing::debug!("Materialized built-in '{}' ({} files)", name, written);
    Ok(written)
}

fn write_dir(
    dir: &Dir<'_>,
    root: &Path,
    target: &Path,
    context: &TemplateContext,
    written: &mut usize,
) -> Result<()> {
    for entry in dir.entries() {
        match entry {
            DirEntry::Dir(sub) => write_dir(sub, root, target, context, written)?,
            DirEntry::File(file) => {
                let relative = file
                    .path()
                    .strip_prefix(root)
                    .map_err(|e| anyhow::anyhow!(e))?;
                write_template_file(target, relative, file.contents(), context)?;
                *written += 1;
            }
        }
    }
    Ok(())
}
