//! List command implementation.
//!
//! `tether list` shows the parsed declarations without touching the
//! filesystem beyond reading the manifest.

use crate::cli::args::ListArgs;
use crate::cli::commands::dispatcher::{Command, CommandResult, ProjectContext};
use crate::error::{Result, TetherError};
use crate::manifest::parse_file;
use crate::ui::{Table, UserInterface};

/// The list command implementation.
pub struct ListCommand {
    context: ProjectContext,
    #[allow(dead_code)]
    args: ListArgs,
}

impl ListCommand {
    pub fn new(context: &ProjectContext, args: ListArgs) -> Self {
        Self {
            context: context.clone(),
            args,
        }
    }
}

impl Command for ListCommand {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let manifest = match parse_file(&self.context.manifest_path) {
            Ok(manifest) => manifest,
            Err(e @ TetherError::ManifestNotFound { .. })
            | Err(e @ TetherError::MalformedManifest { .. }) => {
                ui.error(&e.to_string());
                return Ok(CommandResult::failure(2));
            }
            Err(e) => return Err(e),
        };

        if manifest.is_empty() {
            ui.message("No dependencies declared.");
            return Ok(CommandResult::success());
        }

        let mut table = Table::new(&["NAME", "SOURCE", "VERSION", "TARGET", "REQUIRES"]);
        for decl in manifest.declarations() {
            let target = decl.target_or_default(&self.context.config.vendor_dir);
            let requires = decl.requires.join(",");
            table.add_row(&[
                decl.name.as_str(),
                decl.source.as_str(),
                decl.version.as_deref().unwrap_or("-"),
                target.as_str(),
                requires.as_str(),
            ]);
        }
        ui.message(&table.render());

        Ok(CommandResult::success())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TetherConfig;
    use crate::ui::MockUI;
    use std::fs;
    use tempfile::TempDir;

    fn context(temp: &TempDir) -> ProjectContext {
        ProjectContext {
            repo_root: temp.path().to_path_buf(),
            manifest_path: temp.path().join("README.md"),
            config: TetherConfig::default(),
        }
    }

    #[test]
    fn lists_declarations_with_defaults_applied() {
        let temp = TempDir::new().unwrap();
        fs::write(
            temp.path().join("README.md"),
            "## Dependencies\n\
             libfoo https://example/libfoo v1.2\n\
             libbar https://example/libbar - deps/bar libfoo\n",
        )
        .unwrap();

        let cmd = ListCommand::new(&context(&temp), ListArgs::default());
        let mut ui = MockUI::new();

        let result = cmd.execute(&mut ui).unwrap();
        assert_eq!(result.exit_code, 0);

        let out = ui.all_output();
        assert!(out.contains("vendor/libfoo"));
        assert!(out.contains("deps/bar"));
        assert!(out.contains("libfoo"));
    }

    #[test]
    fn empty_manifest_prints_notice() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("README.md"), "# no section\n").unwrap();

        let cmd = ListCommand::new(&context(&temp), ListArgs::default());
        let mut ui = MockUI::new();

        assert_eq!(cmd.execute(&mut ui).unwrap().exit_code, 0);
        assert!(ui.all_output().contains("No dependencies declared."));
    }

    #[test]
    fn malformed_manifest_exits_two() {
        let temp = TempDir::new().unwrap();
        fs::write(
            temp.path().join("README.md"),
            "## Dependencies\nonlyonefield\n",
        )
        .unwrap();

        let cmd = ListCommand::new(&context(&temp), ListArgs::default());
        let mut ui = MockUI::new();

        assert_eq!(cmd.execute(&mut ui).unwrap().exit_code, 2);
    }
}
