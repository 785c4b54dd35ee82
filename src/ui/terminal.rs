//! Interactive terminal UI.

use console::Term;
use std::io::Write;

use crate::error::Result;

use super::theme::Status;
use super::{
    prompt_user, should_use_colors, NonInteractiveUI, OutputMode, ProgressSpinner, Prompt,
    PromptResult, SpinnerHandle, SproutTheme, UserInterface,
};

/// UI for a user sitting at a terminal: styled output and real prompts.
pub struct TerminalUI {
    term: Term,
    theme: SproutTheme,
    mode: OutputMode,
}

impl TerminalUI {
    pub fn new(mode: OutputMode, colors: bool) -> Self {
        Self {
            term: Term::stdout(),
            theme: SproutTheme::for_colors(colors),
            mode,
        }
    }

    fn line(&self, visible: bool, text: &str) {
        if visible {
            writeln!(&self.term, "{}", text).ok();
        }
    }
}

impl UserInterface for TerminalUI {
    fn output_mode(&self) -> OutputMode {
        self.mode
    }

    fn message(&mut self, msg: &str) {
        self.line(self.mode.shows_messages(), msg);
    }

    fn detail(&mut self, msg: &str) {
        let text = self.theme.dim.apply_to(msg).to_string();
        self.line(self.mode.shows_details(), &text);
    }

    fn success(&mut self, msg: &str) {
        self.line(self.mode.shows_status(), &self.theme.status(Status::Success, msg));
    }

    fn warning(&mut self, msg: &str) {
        self.line(self.mode.shows_status(), &self.theme.status(Status::Warning, msg));
    }

    fn error(&mut self, msg: &str) {
        writeln!(&Term::stderr(), "{}", self.theme.status(Status::Error, msg)).ok();
    }

    fn output(&mut self, data: &str) {
        self.line(true, data);
    }

    fn prompt(&mut self, prompt: &Prompt) -> Result<PromptResult> {
        prompt_user(prompt, &self.term)
    }

    fn start_spinner(&mut self, message: &str) -> Box<dyn SpinnerHandle> {
        if self.mode.shows_spinners() {
            Box::new(ProgressSpinner::new(message, self.theme.clone()))
        } else {
            Box::new(ProgressSpinner::hidden())
        }
    }

    fn show_header(&mut self, title: &str) {
        let banner = format!("\n{}\n", self.theme.header(title));
        self.line(self.mode.shows_messages(), &banner);
    }

    fn is_interactive(&self) -> bool {
        self.term.is_term()
    }
}

/// Terminal UI when a user can answer prompts, otherwise the headless one.
///
/// Styling additionally requires [`should_use_colors`].
pub fn create_ui(interactive: bool, mode: OutputMode, colors: bool) -> Box<dyn UserInterface> {
    if interactive {
        Box::new(TerminalUI::new(mode, colors && should_use_colors()))
    } else {
        Box::new(NonInteractiveUI::new(mode))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn headless_ui_when_not_interactive() {
        let ui = create_ui(false, OutputMode::Quiet, true);
        assert_eq!(ui.output_mode(), OutputMode::Quiet);
        assert!(!ui.is_interactive());
    }

    #[test]
    fn silent_mode_hides_spinner() {
        let mut ui = TerminalUI::new(OutputMode::Silent, false);
        let mut spinner = ui.start_spinner("Fetching");
        spinner.finish_clear();
    }
}
