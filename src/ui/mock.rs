//! Recording UI for tests.

use std::sync::{Arc, Mutex};

use super::{OutputMode, SpinnerHandle, UserInterface};

/// Records everything a command would have shown.
#[derive(Debug, Default)]
pub struct MockUI {
    pub messages: Vec<String>,
    pub successes: Vec<String>,
    pub warnings: Vec<String>,
    pub errors: Vec<String>,
    pub headers: Vec<String>,
    spinner_lines: Arc<Mutex<Vec<String>>>,
}

impl MockUI {
    pub fn new() -> Self {
        Self::default()
    }

    /// Terminal lines emitted through spinner handles.
    pub fn spinner_lines(&self) -> Vec<String> {
        self.spinner_lines.lock().unwrap().clone()
    }

    /// Every recorded line, flattened per kind for contains-style assertions.
    pub fn all_output(&self) -> String {
        let mut lines = Vec::new();
        lines.extend(self.headers.iter().cloned());
        lines.extend(self.messages.iter().cloned());
        lines.extend(self.successes.iter().cloned());
        lines.extend(self.warnings.iter().cloned());
        lines.extend(self.errors.iter().cloned());
        lines.extend(self.spinner_lines());
        lines.join("\n")
    }
}

impl UserInterface for MockUI {
    fn output_mode(&self) -> OutputMode {
        OutputMode::Normal
    }

    fn message(&mut self, msg: &str) {
        self.messages.push(msg.to_string());
    }

    fn success(&mut self, msg: &str) {
        self.successes.push(msg.to_string());
    }

    fn warning(&mut self, msg: &str) {
        self.warnings.push(msg.to_string());
    }

    fn error(&mut self, msg: &str) {
        self.errors.push(msg.to_string());
    }

    fn show_header(&mut self, title: &str) {
        self.headers.push(title.to_string());
    }

    fn start_spinner(&mut self, message: &str) -> Box<dyn SpinnerHandle> {
        self.messages.push(message.to_string());
        Box::new(MockSpinner {
            lines: Arc::clone(&self.spinner_lines),
        })
    }

    fn is_interactive(&self) -> bool {
        false
    }
}

struct MockSpinner {
    lines: Arc<Mutex<Vec<String>>>,
}

impl SpinnerHandle for MockSpinner {
    fn set_message(&mut self, _msg: &str) {}

    fn finish_success(&mut self, msg: &str) {
        self.lines.lock().unwrap().push(msg.to_string());
    }

    fn finish_error(&mut self, msg: &str) {
        self.lines.lock().unwrap().push(msg.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn records_each_kind_of_output() {
        let mut ui = MockUI::new();
        ui.message("m");
        ui.success("s");
        ui.warning("w");
        ui.error("e");
        ui.show_header("h");

        assert_eq!(ui.messages, vec!["m"]);
        assert_eq!(ui.successes, vec!["s"]);
        assert_eq!(ui.warnings, vec!["w"]);
        assert_eq!(ui.errors, vec!["e"]);
        assert_eq!(ui.headers, vec!["h"]);
    }

    #[test]
    fn all_output_flattens_buffers() {
        let mut ui = MockUI::new();
        ui.message("hello");
        ui.error("boom");
        let out = ui.all_output();
        assert!(out.contains("hello"));
        assert!(out.contains("boom"));
    }

    #[test]
    fn spinner_finish_lines_are_recorded() {
        let mut ui = MockUI::new();
        let mut spinner = ui.start_spinner("working...");
        spinner.finish_success("done");
        drop(spinner);

        assert_eq!(ui.spinner_lines(), vec!["done"]);
        assert!(ui.all_output().contains("working..."));
        assert!(ui.all_output().contains("done"));
    }
}
