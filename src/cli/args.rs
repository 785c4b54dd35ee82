//! CLI argument definitions.
//!
//! This module defines all CLI arguments using clap's derive macros.
//! The main entry point is the [`Cli`] struct.

use clap::{Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

use super::commands::cache::CacheArgs;

/// Sprout - Scaffold front-end projects from built-in or remote templates.
#[derive(Debug, Parser)]
#[command(name = "sprout")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to config file (overrides default ~/.sprout/config.yml)
    #[arg(short, long, global = true, env = "SPROUT_CONFIG")]
    pub config: Option<PathBuf>,

    /// Template cache directory
    #[arg(long, global = true, env = "SPROUT_CACHE_DIR")]
    pub cache_dir: Option<PathBuf>,

    /// Always fetch remote templates, ignoring cached copies
    #[arg(long, global = true)]
    pub no_cache: bool,

    /// Show verbose output
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    pub verbose: bool,

    /// Minimal output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Create a new project from a template
    Create(CreateArgs),

    /// List built-in templates
    List(ListArgs),

    /// Manage the remote template cache
    Cache(CacheArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

/// Arguments for the `create` command.
#[derive(Debug, Clone, Default, clap::Args)]
pub struct CreateArgs {
    /// Project name (also the target directory)
    pub name: Option<String>,

    /// Built-in template name, local path, or remote reference
    /// (e.g. `owner/repo`, `owner/repo#branch:sub/dir`, GitHub URL)
    #[arg(short, long)]
    pub template: Option<String>,

    /// Initialize a git repository in the new project
    #[arg(long, overrides_with = "no_git")]
    pub git: bool,

    /// Skip git initialization
    #[arg(long, overrides_with = "git")]
    pub no_git: bool,

    /// Empty a non-empty target directory without asking
    #[arg(short, long)]
    pub force: bool,

    /// Never prompt; use arguments, environment and defaults
    #[arg(long)]
    pub non_interactive: bool,
}

impl CreateArgs {
    /// Explicit git choice from flags, if any.
    pub fn git_choice(&self) -> Option<bool> {
        match (self.git, self.no_git) {
            (true, _) => Some(true),
            (_, true) => Some(false),
            _ => None,
        }
    }
}

/// Arguments for the `list` command.
#[derive(Debug, Clone, Default, clap::Args)]
pub struct ListArgs {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `completions` command.
#[derive(Debug, Clone, clap::Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: Shell,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::commands::cache::CacheSubcommand;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_create_with_flags() {
        let cli = Cli::parse_from([
            "sprout",
            "create",
            "my-app",
            "-t",
            "vitejs/vite#main:packages/create-vite/template-vue",
            "--no-git",
            "--force",
        ]);

        match cli.command {
            Commands::Create(args) => {
                assert_eq!(args.name.as_deref(), Some("my-app"));
                assert_eq!(
                    args.template.as_deref(),
                    Some("vitejs/vite#main:packages/create-vite/template-vue")
                );
                assert_eq!(args.git_choice(), Some(false));
                assert!(args.force);
            }
            other => panic!("Expected Create, got {:?}", other),
        }
    }

    #[test]
    fn git_choice_defaults_to_none() {
        let args = CreateArgs::default();
        assert_eq!(args.git_choice(), None);
    }

    #[test]
    fn last_git_flag_wins() {
        let cli = Cli::parse_from(["sprout", "create", "app", "--no-git", "--git"]);
        match cli.command {
            Commands::Create(args) => assert_eq!(args.git_choice(), Some(true)),
            other => panic!("Expected Create, got {:?}", other),
        }
    }

    #[test]
    fn global_flags_after_subcommand() {
        let cli = Cli::parse_from([
            "sprout",
            "cache",
            "stats",
            "--cache-dir",
            "/tmp/sprout-cache",
            "--no-cache",
            "--quiet",
        ]);

        assert_eq!(cli.cache_dir, Some(PathBuf::from("/tmp/sprout-cache")));
        assert!(cli.no_cache);
        assert!(cli.quiet);
        match cli.command {
            Commands::Cache(args) => assert!(matches!(args.command, CacheSubcommand::Stats)),
            other => panic!("Expected Cache, got {:?}", other),
        }
    }

    #[test]
    fn verbose_conflicts_with_quiet() {
        let result = Cli::try_parse_from(["sprout", "list", "--verbose", "--quiet"]);
        assert!(result.is_err());
    }
}
