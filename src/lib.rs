//! Sprout - Scaffold new front-end projects from templates.
//!
//! Sprout creates a project directory from a built-in template, a local
//! directory, or a remote repository reference such as `owner/repo`,
//! `owner/repo#branch:sub/dir` or a GitHub URL. Remote templates are
//! downloaded once and served from an on-disk cache until they expire.
//!
//! # Modules
//!
//! - [`cache`] - On-disk template cache with TTL expiry
//! - [`cli`] - Command-line interface and argument parsing
//! - [`config`] - Configuration loading, parsing, and validation
//! - [`error`] - Error types and result aliases
//! - [`generator`] - Writing projects from templates
//! - [`shell`] - External process execution
//! - [`template`] - Reference resolution, fetching, and the template provider
//! - [`ui`] - Interactive prompts, spinners, and terminal output
//!
//! # Example
//!
//! ```
//! use sprout::template::resolve;
//!
//! let locator = resolve("vitejs/vite#main:packages/create-vite/template-vanilla");
//! assert_eq!(
//!     locator.url(),
//!     "https://github.com/vitejs/vite/archive/refs/heads/main.tar.gz"
//! );
//! assert_eq!(
//!     locator.subdir.as_deref(),
//!     Some("packages/create-vite/template-vanilla")
//! );
//! ```

pub mod cache;
pub mod cli;
pub mod config;
pub mod error;
pub mod generator;
pub mod shell;
pub mod template;
pub mod ui;

pub use error::{Result, SproutError};
