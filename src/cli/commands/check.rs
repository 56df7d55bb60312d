//! Check command implementation.
//!
//! `tether check` runs the presence check for every declaration without
//! fetching anything. Exit 0 when everything is present.

use serde::Serialize;

use crate::cli::args::{CheckArgs, ReportFormat};
use crate::cli::commands::dispatcher::{Command, CommandResult, ProjectContext};
use crate::error::{Result, TetherError};
use crate::fetch::BackendSet;
use crate::manifest::parse_file;
use crate::ui::{Table, UserInterface};
use crate::version::Constraint;

/// The check command implementation.
pub struct CheckCommand {
    context: ProjectContext,
    args: CheckArgs,
}

/// One row of the check report.
#[derive(Debug, Serialize)]
struct CheckEntry {
    name: String,
    target: String,
    constraint: String,
    present: bool,
}

impl CheckCommand {
    pub fn new(context: &ProjectContext, args: CheckArgs) -> Self {
        Self {
            context: context.clone(),
            args,
        }
    }
}

impl Command for CheckCommand {
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

        let workspace = self.context.workspace();
        let backends =
            BackendSet::standard(self.context.config.clone_cache_dir(&self.context.repo_root));

        let mut entries = Vec::with_capacity(manifest.len());
        for decl in manifest.declarations() {
            let constraint = Constraint::parse(decl.version.as_deref());
            let (target, present) = match workspace.target_key(decl) {
                Ok(key) => {
                    let target_dir = workspace.root().join(&key);
                    let backend = backends.for_source(&decl.source);
                    let present = backend.check_present(&target_dir, &constraint);
                    (key, present)
                }
                Err(_) => (String::new(), false),
            };
            entries.push(CheckEntry {
                name: decl.name.clone(),
                target,
                constraint: constraint.to_string(),
                present,
            });
        }

        let missing = entries.iter().filter(|e| !e.present).count();

        match self.args.format {
            ReportFormat::Json => {
                println!(
                    "{}",
                    serde_json::to_string_pretty(&entries).map_err(anyhow::Error::from)?
                );
            }
            ReportFormat::Text => {
                let mut table = Table::new(&["NAME", "TARGET", "VERSION", "STATE"]);
                for entry in &entries {
                    table.add_row(&[
                        entry.name.as_str(),
                        entry.target.as_str(),
                        entry.constraint.as_str(),
                        if entry.present { "present" } else { "missing" },
                    ]);
                }
                ui.message(&table.render());

                if missing == 0 {
                    ui.success("All dependencies present.");
                } else {
                    ui.warning(&format!("{} missing; run 'tether resolve'", missing));
                }
            }
        }

        if missing == 0 {
            Ok(CommandResult::success())
        } else {
            Ok(CommandResult::failure(1))
        }
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

    fn write_readme(temp: &TempDir, section: &str) {
        fs::write(
            temp.path().join("README.md"),
            format!("## Dependencies\n{}", section),
        )
        .unwrap();
    }

    #[test]
    fn unresolved_dependencies_are_missing() {
        let temp = TempDir::new().unwrap();
        write_readme(&temp, "libfoo https://example/libfoo\n");

        let cmd = CheckCommand::new(&context(&temp), CheckArgs::default());
        let mut ui = MockUI::new();

        let result = cmd.execute(&mut ui).unwrap();
        assert_eq!(result.exit_code, 1);
        assert!(ui.all_output().contains("missing"));
    }

    #[test]
    fn materialized_dependency_is_present() {
        let temp = TempDir::new().unwrap();
        write_readme(&temp, "libfoo https://example/libfoo v1.2 vendor/libfoo\n");

        let target = temp.path().join("vendor/libfoo");
        fs::create_dir_all(&target).unwrap();
        crate::workspace::marker::write(&target, Some("v1.2")).unwrap();

        let cmd = CheckCommand::new(&context(&temp), CheckArgs::default());
        let mut ui = MockUI::new();

        let result = cmd.execute(&mut ui).unwrap();
        assert_eq!(result.exit_code, 0);
        assert!(ui.all_output().contains("All dependencies present."));
    }

    #[test]
    fn stale_version_counts_as_missing() {
        let temp = TempDir::new().unwrap();
        write_readme(&temp, "libfoo https://example/libfoo v2.0 vendor/libfoo\n");

        let target = temp.path().join("vendor/libfoo");
        fs::create_dir_all(&target).unwrap();
        crate::workspace::marker::write(&target, Some("v1.2")).unwrap();

        let cmd = CheckCommand::new(&context(&temp), CheckArgs::default());
        let mut ui = MockUI::new();

        assert_eq!(cmd.execute(&mut ui).unwrap().exit_code, 1);
    }

    #[test]
    fn missing_manifest_exits_two() {
        let temp = TempDir::new().unwrap();
        let cmd = CheckCommand::new(&context(&temp), CheckArgs::default());
        let mut ui = MockUI::new();

        assert_eq!(cmd.execute(&mut ui).unwrap().exit_code, 2);
    }

    #[test]
    fn empty_manifest_succeeds() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("README.md"), "# nothing\n").unwrap();
        let cmd = CheckCommand::new(&context(&temp), CheckArgs::default());
        let mut ui = MockUI::new();

        assert_eq!(cmd.execute(&mut ui).unwrap().exit_code, 0);
    }
}
