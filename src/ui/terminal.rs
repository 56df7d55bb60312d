//! Attended-terminal UI.

use std::time::Duration;

use console::style;
use indicatif::{ProgressBar, ProgressStyle};

use super::{NonInteractiveUI, OutputMode, SpinnerHandle, UserInterface};

/// Create the right UI for the execution context.
pub fn create_ui(interactive: bool, mode: OutputMode) -> Box<dyn UserInterface> {
    if interactive {
        Box::new(TerminalUI::new(mode))
    } else {
        Box::new(NonInteractiveUI::new(mode))
    }
}

/// Styled output for an attended terminal.
pub struct TerminalUI {
    mode: OutputMode,
}

impl TerminalUI {
    pub fn new(mode: OutputMode) -> Self {
        Self { mode }
    }

    fn quiet(&self) -> bool {
        self.mode == OutputMode::Quiet
    }
}

impl UserInterface for TerminalUI {
    fn output_mode(&self) -> OutputMode {
        self.mode
    }

    fn message(&mut self, msg: &str) {
        if !self.quiet() {
            println!("{}", msg);
        }
    }

    fn success(&mut self, msg: &str) {
        if !self.quiet() {
            println!("{} {}", style("✓").green(), msg);
        }
    }

    fn warning(&mut self, msg: &str) {
        if !self.quiet() {
            println!("{} {}", style("!").yellow(), msg);
        }
    }

    fn error(&mut self, msg: &str) {
        eprintln!("{} {}", style("✗").red(), msg);
    }

    fn show_header(&mut self, title: &str) {
        if !self.quiet() {
            println!("{}", style(title).bold());
        }
    }

    fn start_spinner(&mut self, message: &str) -> Box<dyn SpinnerHandle> {
        if self.quiet() {
            return Box::new(SilentSpinner);
        }
        let bar = ProgressBar::new_spinner();
        bar.set_style(
            ProgressStyle::with_template("{spinner} {msg}")
                .expect("static spinner template is valid"),
        );
        bar.set_message(message.to_string());
        bar.enable_steady_tick(Duration::from_millis(100));
        Box::new(TerminalSpinner { bar })
    }

    fn is_interactive(&self) -> bool {
        true
    }
}

struct TerminalSpinner {
    bar: ProgressBar,
}

impl SpinnerHandle for TerminalSpinner {
    fn set_message(&mut self, msg: &str) {
        self.bar.set_message(msg.to_string());
    }

    fn finish_success(&mut self, msg: &str) {
        self.bar
            .finish_with_message(format!("{} {}", style("✓").green(), msg));
    }

    fn finish_error(&mut self, msg: &str) {
        self.bar
            .finish_with_message(format!("{} {}", style("✗").red(), msg));
    }
}

/// Spinner that renders nothing, for quiet mode.
pub(super) struct SilentSpinner;

impl SpinnerHandle for SilentSpinner {
    fn set_message(&mut self, _msg: &str) {}
    fn finish_success(&mut self, _msg: &str) {}
    fn finish_error(&mut self, _msg: &str) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_ui_interactive_flag_is_respected() {
        let ui = create_ui(true, OutputMode::Normal);
        assert!(ui.is_interactive());

        let ui = create_ui(false, OutputMode::Normal);
        assert!(!ui.is_interactive());
    }

    #[test]
    fn terminal_ui_reports_its_mode() {
        let ui = TerminalUI::new(OutputMode::Verbose);
        assert_eq!(ui.output_mode(), OutputMode::Verbose);
    }
}
