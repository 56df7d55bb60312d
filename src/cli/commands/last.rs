//! Last command implementation.
//!
//! `tether last` shows the persisted report of the most recent resolve run.

use crate::cli::args::LastArgs;
use crate::cli::commands::dispatcher::{Command, CommandResult, ProjectContext};
use crate::error::Result;
use crate::state;
use crate::ui::{Table, UserInterface};

/// The last command implementation.
pub struct LastCommand {
    context: ProjectContext,
    #[allow(dead_code)]
    args: LastArgs,
}

impl LastCommand {
    pub fn new(context: &ProjectContext, args: LastArgs) -> Self {
        Self {
            context: context.clone(),
            args,
        }
    }
}

impl Command for LastCommand {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let workspace = self.context.workspace();
        let Some(report) = state::load_last_run(&workspace)? else {
            ui.message("No resolve runs recorded.");
            return Ok(CommandResult::success());
        };

        ui.show_header(&format!(
            "Last run: {} ({})",
            report.started_at.format("%Y-%m-%d %H:%M:%S UTC"),
            report.document.display()
        ));

        let mut table = Table::new(&["NAME", "TARGET", "STATUS", "DETAIL"]);
        for outcome in &report.outcomes {
            table.add_row(&[
                outcome.name.as_str(),
                outcome.target.as_str(),
                outcome.status.label(),
                outcome.detail.as_str(),
            ]);
        }
        ui.message(&table.render());

        if report.success() {
            ui.success("Run succeeded.");
        } else {
            ui.warning("Run had failures.");
        }
        Ok(CommandResult::success())
    }
}
