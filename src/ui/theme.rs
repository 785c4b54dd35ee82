//! Terminal styling.

use console::Style;

/// Outcome shown at the start of a status line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Success,
    Warning,
    Error,
}

impl Status {
    fn marker(self) -> &'static str {
        match self {
            Status::Success => "✓",
            Status::Warning => "⚠",
            Status::Error => "✗",
        }
    }
}

/// Styles for the lines sprout prints.
#[derive(Debug, Clone)]
pub struct SproutTheme {
    success: Style,
    warning: Style,
    error: Style,
    /// Secondary text such as details and descriptions.
    pub dim: Style,
    title: Style,
}

impl SproutTheme {
    /// Colored styles, or unstyled ones when `colors` is false.
    pub fn for_colors(colors: bool) -> Self {
        if !colors {
            return Self::plain();
        }
        Self {
            success: Style::new().green(),
            warning: Style::new().yellow(),
            error: Style::new().red().bold(),
            dim: Style::new().dim(),
            title: Style::new().bold().green(),
        }
    }

    /// No styling at all.
    pub fn plain() -> Self {
        Self {
            success: Style::new(),
            warning: Style::new(),
            error: Style::new(),
            dim: Style::new(),
            title: Style::new(),
        }
    }

    /// `✓ msg`, `⚠ msg` or `✗ msg` in the matching color.
    pub fn status(&self, status: Status, msg: &str) -> String {
        let style = match status {
            Status::Success => &self.success,
            Status::Warning => &self.warning,
            Status::Error => &self.error,
        };
        style
            .apply_to(format!("{} {}", status.marker(), msg))
            .to_string()
    }

    /// Banner printed above a command's output.
    pub fn header(&self, title: &str) -> String {
        format!("🌱 {}", self.title.apply_to(title))
    }
}

/// Styling is off under `NO_COLOR` or when stdout is not a terminal.
pub fn should_use_colors() -> bool {
    std::env::var_os("NO_COLOR").is_none() && console::Term::stdout().is_term()
}
