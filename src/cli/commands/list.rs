//! List command implementation.
//!
//! The `sprout list` command lists the built-in templates.

use crate::cli::args::ListArgs;
use crate::error::Result;
use crate::template::builtin::{self, BuiltinTemplate};
use crate::ui::UserInterface;

use super::dispatcher::{Command, CommandResult};

/// The list command implementation.
pub struct ListCommand {
    args: ListArgs,
}

impl ListCommand {
    /// Create a new list command.
    pub fn new(args: ListArgs) -> Self {
        Self { args }
    }

    /// Get the command arguments.
    pub fn args(&self) -> &ListArgs {
        &self.args
    }
}

impl Command for ListCommand {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let templates = builtin::list()?;

        if self.args.json {
            let output = serde_json::to_string_pretty(&templates)
                .map_err(|e| anyhow::anyhow!("Failed to serialize templates: {}", e))?;
            ui.output(&output);
            return Ok(CommandResult::success());
        }

        ui.message("  Built-in templates:");
        for line in format_listing(&templates) {
            ui.message(&line);
        }
        ui.message("");
        ui.message("  Remote templates: sprout create <name> -t owner/repo[#branch[:path]]");

        Ok(CommandResult::success())
    }
}

fn format_listing(templates: &[BuiltinTemplate]) -> Vec<String> {
    let width = templates.iter().map(|t| t.name.len()).max().unwrap_or(0);
    templates
        .iter()
        .map(|t| {
            format!(
                "    {:<width$}  {}",
                t.name,
                t.description,
                width = width
            )
        })
        .collect()
}
