//! Init command implementation.
//!
//! `tether init` scaffolds a `.tether.yml` and prints a starter dependency
//! section. The README itself is never modified; where to put the section
//! is the project's call.

use std::fs;

use crate::cli::args::InitArgs;
use crate::cli::commands::dispatcher::{Command, CommandResult, ProjectContext};
use crate::config::{TetherConfig, CONFIG_FILE};
use crate::error::Result;
use crate::ui::UserInterface;

const SECTION_SNIPPET: &str = "\
## Dependencies

<!-- name  source  version  target  requires -->
libfoo  https://example.com/libfoo.git  v1.2  vendor/libfoo
";

/// The init command implementation.
pub struct InitCommand {
    context: ProjectContext,
    #[allow(dead_code)]
    args: InitArgs,
}

impl InitCommand {
    pub fn new(context: &ProjectContext, args: InitArgs) -> Self {
        Self {
            context: context.clone(),
            args,
        }
    }
}

impl Command for InitCommand {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let config_path = self.context.repo_root.join(CONFIG_FILE);
        if config_path.exists() {
            ui.error(&format!(
                "Configuration already exists: {}",
                config_path.display()
            ));
            return Ok(CommandResult::failure(1));
        }

        fs::write(&config_path, TetherConfig::starter_yaml())?;
        ui.success(&format!("Created {}", CONFIG_FILE));

        ui.message("Add a dependency section to your README, for example:");
        ui.message(SECTION_SNIPPET);
        Ok(CommandResult::success())
    }
}
