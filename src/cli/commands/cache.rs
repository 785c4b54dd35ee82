//! Cache command implementation.
//!
//! Provides `sprout cache list`, `sprout cache clear`, etc.

use anyhow::Result;
use clap::{Args, Subcommand};
use std::time::Duration;

use crate::cache::{format_duration, now_millis, CacheMetadata};
use crate::config::SproutConfig;
use crate::template::TemplateProvider;
use crate::ui::{Prompt, PromptResult, UserInterface};

use super::dispatcher::{Command, CommandResult};

/// Arguments for the cache command.
#[derive(Debug, Clone, Args)]
pub struct CacheArgs {
    #[command(subcommand)]
    pub command: CacheSubcommand,
}

/// Cache subcommands.
#[derive(Debug, Clone, Subcommand)]
pub enum CacheSubcommand {
    /// Show cache statistics.
    Stats,
    /// Remove expired entries.
    Clean,
    /// Remove every cached template.
    Clear {
        /// Don't prompt for confirmation.
        #[arg(short, long)]
        force: bool,
    },
    /// List cached entries.
    List {
        /// Output as JSON.
        #[arg(long)]
        json: bool,
    },
    /// Print the cache directory.
    Path,
}

/// The cache command implementation.
pub struct CacheCommand {
    config: SproutConfig,
    args: CacheArgs,
}

impl CacheCommand {
    /// Create a new cache command.
    pub fn new(config: SproutConfig, args: CacheArgs) -> Self {
        Self { config, args }
    }
}

impl Command for CacheCommand {
    fn execute(&self, ui: &mut dyn UserInterface) -> crate::error::Result<CommandResult> {
        let provider = TemplateProvider::from_config(&self.config)?;

        let exit_code = match &self.args.command {
            CacheSubcommand::Stats => show_stats(&provider, ui)?,
            CacheSubcommand::Clean => clean_cache(&provider, ui)?,
            CacheSubcommand::Clear { force } => clear_cache(&provider, *force, ui)?,
            CacheSubcommand::List { json } => list_cache(&provider, *json, ui)?,
            CacheSubcommand::Path => {
                ui.output(&provider.cache().root().display().to_string());
                0
            }
        };

        Ok(if exit_code == 0 {
            CommandResult::success()
        } else {
            CommandResult::failure(exit_code)
        })
    }
}

fn show_stats(provider: &TemplateProvider, ui: &mut dyn UserInterface) -> Result<i32> {
    let stats = provider.cache_stats()?;
    let fresh = stats.total_items - stats.expired_items;

    ui.message("Cache Statistics:\n");
    ui.message(&format!("  Total entries: {}", stats.total_items));
    ui.message(&format!("  Fresh: {}", fresh));
    ui.message(&format!("  Expired: {}", stats.expired_items));
    ui.message(&format!("  Total size: {}", format_size(stats.total_size_bytes)));
    ui.message(&format!("  TTL: {}", format_duration(provider.cache().ttl())));
    ui.message(&format!("  Location: {}", provider.cache().root().display()));

    Ok(0)
}

fn clean_cache(provider: &TemplateProvider, ui: &mut dyn UserInterface) -> Result<i32> {
    let removed = provider.clean_expired_cache()?;
    if removed == 0 {
        ui.message("No expired entries");
    } else {
        ui.success(&format!("Removed {} expired entries", removed));
    }
    Ok(0)
}

fn clear_cache(provider: &TemplateProvider, force: bool, ui: &mut dyn UserInterface) -> Result<i32> {
    if !force && ui.is_interactive() {
        let count = provider.cache().list()?.len();
        let prompt = Prompt::confirm(
            "clear-cache",
            &format!("Clear {} cached templates?", count),
            false,
        );

        match ui.prompt(&prompt)? {
            PromptResult::Bool(true) => {}
            _ => {
                ui.message("Cancelled");
                return Ok(0);
            }
        }
    }

    if provider.clear_all_cache()? {
        ui.success("Cache cleared");
    } else {
        ui.message("Cache is already empty");
    }

    Ok(0)
}

fn list_cache(provider: &TemplateProvider, json: bool, ui: &mut dyn UserInterface) -> Result<i32> {
    let entries = provider.cache().list()?;

    if json {
        ui.output(&serde_json::to_string_pretty(&entries)?);
        return Ok(0);
    }

    if entries.is_empty() {
        ui.message("Cache is empty");
        return Ok(0);
    }

    ui.message(&format!("{} cached templates:\n", entries.len()));
    let ttl = provider.cache().ttl();
    for entry in &entries {
        ui.message(&format!(
            "  {} [{}] {}",
            entry.original_reference,
            freshness(entry, ttl),
            entry.cached_at_display()
        ));
        ui.detail(&format!("    key: {}", entry.cache_key));
    }

    Ok(0)
}

fn freshness(entry: &CacheMetadata, ttl: Duration) -> String {
    let now = now_millis();
    if !entry.is_fresh_at(now, ttl) {
        return "expired".to_string();
    }
    let age = Duration::from_millis(u64::try_from(entry.age_millis(now)).unwrap_or(0));
    format!("fresh, {} left", format_duration(ttl.saturating_sub(age)))
}

fn format_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;

    if bytes >= MB {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} bytes", bytes)
    }
}
