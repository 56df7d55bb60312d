//! Plain-text UI for CI and pipelines.

use super::{OutputMode, SpinnerHandle, UserInterface};

/// Unstyled line output; spinners collapse to a single message.
pub struct NonInteractiveUI {
    mode: OutputMode,
}

impl NonInteractiveUI {
    pub fn new(mode: OutputMode) -> Self {
        Self { mode }
    }

    fn quiet(&self) -> bool {
        self.mode == OutputMode::Quiet
    }
}

impl UserInterface for NonInteractiveUI {
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
            println!("{}", msg);
        }
    }

    fn warning(&mut self, msg: &str) {
        if !self.quiet() {
            println!("warning: {}", msg);
        }
    }

    fn error(&mut self, msg: &str) {
        eprintln!("error: {}", msg);
    }

    fn show_header(&mut self, title: &str) {
        if !self.quiet() {
            println!("{}", title);
        }
    }

    fn start_spinner(&mut self, message: &str) -> Box<dyn SpinnerHandle> {
        if !self.quiet() {
            println!("{}", message);
        }
        Box::new(LineSpinner {
            quiet: self.quiet(),
        })
    }

    fn is_interactive(&self) -> bool {
        false
    }
}

/// Spinner stand-in that prints its terminal state as plain lines, so
/// per-dependency outcomes still show up in CI logs.
struct LineSpinner {
    quiet: bool,
}

impl SpinnerHandle for LineSpinner {
    fn set_message(&mut self, _msg: &str) {}

    fn finish_success(&mut self, msg: &str) {
        if !self.quiet {
            println!("{}", msg);
        }
    }

    fn finish_error(&mut self, msg: &str) {
        eprintln!("error: {}", msg);
    }
}
