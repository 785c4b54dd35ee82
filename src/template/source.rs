//! Classification of `--template` arguments.

use std::fmt;
use std::path::{Path, PathBuf};

use crate::shell::expand_home;

/// Where a template comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TemplateSource {
    /// Template embedded in the binary.
    Builtin(String),
    /// Directory on the local filesystem.
    Local(PathBuf),
    /// Remote reference, resolved and cached by the template provider.
    Remote(String),
}

impl TemplateSource {
    /// Classify `input` against the names of the built-in templates.
    ///
    /// Built-in names win. Explicit paths (`./`, `../`, `/`, `~/`) and
    /// existing directories are local. Everything else is remote.
    pub fn classify(input: &str, builtins: &[String]) -> Self {
        let input = input.trim();

        if builtins.iter().any(|name| name == input) {
            return Self::Builtin(input.to_string());
        }

        let looks_like_path = ["./", "../", "/", "~/", ".\\", "..\\"]
            .iter()
            .any(|prefix| input.starts_with(prefix));
        if looks_like_path || Path::new(input).is_dir() {
            return Self::Local(expand_home(input));
        }

        Self::Remote(input.to_string())
    }

    /// Whether fetching this source may touch the network.
    pub fn is_remote(&self) -> bool {
        matches!(self, Self::Remote(_))
    }
}

impl fmt::Display for TemplateSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Builtin(name) => write!(f, "built-in template '{}'", name),
            Self::Local(path) => write!(f, "local template {}", path.display()),
            Self::Remote(reference) => write!(f, "remote template {}", reference),
        }
    }
}
