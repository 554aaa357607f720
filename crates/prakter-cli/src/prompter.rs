use dialoguer::theme::ColorfulTheme;
use dialoguer::{Confirm, Input, Select};
use prakter_core::prompt::{NoPrompt, Prompter};
use std::io::IsTerminal;

/// Prompts on the terminal. Esc, Ctrl-C and I/O errors count as dismissal.
pub struct TerminalPrompter {
    theme: ColorfulTheme,
}

impl TerminalPrompter {
    pub fn new() -> Self {
        Self {
            theme: ColorfulTheme::default(),
        }
    }
}

impl Prompter for TerminalPrompter {
    fn input(&mut self, prompt: &str) -> Option<String> {
        Input::<String>::with_theme(&self.theme)
            .with_prompt(prompt)
            .allow_empty(true)
            .interact_text()
            .map_err(|e| tracing::debug!(error = %e, "input prompt aborted"))
            .ok()
    }

    fn select(&mut self, prompt: &str, options: &[String]) -> Option<usize> {
        Select::with_theme(&self.theme)
            .with_prompt(prompt)
            .items(options)
            .default(0)
            .interact_opt()
            .map_err(|e| tracing::debug!(error = %e, "select prompt aborted"))
            .ok()
            .flatten()
    }

    fn confirm(&mut self, prompt: &str) -> bool {
        Confirm::with_theme(&self.theme)
            .with_prompt(prompt)
            .default(false)
            .interact_opt()
            .ok()
            .flatten()
            .unwrap_or(false)
    }
}

/// Terminal prompts when stdin is interactive; otherwise every prompt is
/// dismissed and commands need their values from flags.
pub fn for_stdin() -> Box<dyn Prompter> {
    if std::io::stdin().is_terminal() {
        Box::new(TerminalPrompter::new())
    } else {
        Box::new(NoPrompt)
    }
}
