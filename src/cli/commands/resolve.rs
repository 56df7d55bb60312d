//! Resolve command implementation.
//!
//! `tether resolve` parses the manifest and ensures every declaration is
//! materialized. Parse errors abort before any resolution (exit 2); fetch
//! failures are collected into the report (exit 1); a fully-satisfied run
//! exits 0.

use std::collections::HashSet;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use std::time::Duration;

use crate::cli::args::{ReportFormat, ResolveArgs};
use crate::cli::commands::dispatcher::{Command, CommandResult, ProjectContext};
use crate::error::{Result, TetherError};
use crate::fetch::BackendSet;
use crate::manifest::parse_file;
use crate::resolver::{ResolutionStatus, ResolveOptions, ResolveProgress, Resolver, RunReport};
use crate::state;
use crate::ui::{SpinnerHandle, UserInterface};

/// The resolve command implementation.
pub struct ResolveCommand {
    context: ProjectContext,
    args: ResolveArgs,
}

impl ResolveCommand {
    /// Create a new resolve command.
    pub fn new(context: &ProjectContext, args: ResolveArgs) -> Self {
        Self {
            context: context.clone(),
            args,
        }
    }

    fn build_options(&self) -> ResolveOptions {
        ResolveOptions {
            timeout: Duration::from_secs(
                self.args.timeout.unwrap_or(self.context.config.timeout_secs),
            ),
            jobs: self.args.jobs.or(self.context.config.jobs).unwrap_or(1),
        }
    }
}

impl Command for ResolveCommand {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        // Parse errors are fail-fast: nothing is resolved against a
        // manifest that cannot be trusted.
        let manifest = match parse_file(&self.context.manifest_path) {
            Ok(manifest) => manifest,
            Err(e @ TetherError::ManifestNotFound { .. })
            | Err(e @ TetherError::MalformedManifest { .. }) => {
                ui.error(&e.to_string());
                return Ok(CommandResult::failure(2));
            }
            Err(e) => return Err(e),
        };

        let manifest = if self.args.only.is_empty() {
            manifest
        } else {
            if let Some(unknown) = self
                .args
                .only
                .iter()
                .find(|n| manifest.get(n.as_str()).is_none())
            {
                ui.error(&format!("Unknown declaration: {}", unknown));
                return Ok(CommandResult::failure(1));
            }
            let keep: HashSet<String> = self.args.only.iter().cloned().collect();
            manifest.restricted_to(&keep)
        };

        if manifest.is_empty() {
            ui.message("No dependencies declared.");
            return Ok(CommandResult::success());
        }

        let noun = if manifest.len() == 1 {
            "dependency"
        } else {
            "dependencies"
        };
        ui.show_header(&format!(
            "Resolving {} {} from {}",
            manifest.len(),
            noun,
            self.context.manifest_path.display()
        ));

        let workspace = self.context.workspace();
        let backends =
            BackendSet::standard(self.context.config.clone_cache_dir(&self.context.repo_root));
        let resolver = Resolver::new(workspace.clone(), backends, self.build_options());
        install_cancel_handler(resolver.cancel_flag());

        let mut spinner: Option<Box<dyn SpinnerHandle>> = None;
        let report = resolver.resolve_with_progress(&manifest, &mut |event| match event {
            ResolveProgress::Starting { name, index, total } => {
                spinner = Some(ui.start_spinner(&format!(
                    "[{}/{}] fetching {}...",
                    index + 1,
                    total,
                    name
                )));
            }
            ResolveProgress::Finished { outcome } => {
                let line = match outcome.status {
                    ResolutionStatus::Resolved => {
                        format!("{} -> {}", outcome.name, outcome.target)
                    }
                    ResolutionStatus::AlreadyPresent => {
                        format!("{} already present", outcome.name)
                    }
                    ResolutionStatus::Failed => {
                        format!("{} failed: {}", outcome.name, outcome.detail)
                    }
                };
                match spinner.take() {
                    Some(mut s) => {
                        if outcome.status.is_ok() {
                            s.finish_success(&line);
                        } else {
                            s.finish_error(&line);
                        }
                    }
                    // blocked declarations finish without ever starting
                    None => {
                        if outcome.status.is_ok() {
                            ui.success(&line);
                        } else {
                            ui.error(&line);
                        }
                    }
                }
            }
        });

        if let Err(e) = state::save_last_run(&workspace, &report) {
            tracing::warn!(error = %e, "could not persist run report");
        }

        if self.args.format == ReportFormat::Json {
            println!("{}", serde_json::to_string_pretty(&report).map_err(anyhow::Error::from)?);
        }

        report_summary(ui, &report);
        if report.success() {
            Ok(CommandResult::success())
        } else {
            Ok(CommandResult::failure(report.exit_code()))
        }
    }
}

fn report_summary(ui: &mut dyn UserInterface, report: &RunReport) {
    let resolved = report.count(ResolutionStatus::Resolved);
    let present = report.count(ResolutionStatus::AlreadyPresent);

    if report.success() {
        ui.success(&format!(
            "Resolution complete ({} fetched, {} already present)",
            resolved, present
        ));
    } else {
        let failed: Vec<&str> = report
            .with_status(ResolutionStatus::Failed)
            .into_iter()
            .map(|o| o.name.as_str())
            .collect();
        ui.error(&format!("Resolution failed for: {}", failed.join(", ")));
    }
}

/// Flip the resolver's cancel flag on SIGINT so in-flight work lands in a
/// consistent state before the process winds down.
#[cfg(unix)]
fn install_cancel_handler(flag: Arc<AtomicBool>) {
    use std::sync::OnceLock;

    static CANCEL: OnceLock<Arc<AtomicBool>> = OnceLock::new();

    extern "C" fn on_sigint(_sig: libc::c_int) {
        if let Some(flag) = CANCEL.get() {
            flag.store(true, std::sync::atomic::Ordering::SeqCst);
        }
    }

    if CANCEL.set(flag).is_ok() {
        let handler = on_sigint as extern "C" fn(libc::c_int);
        unsafe {
            libc::signal(libc::SIGINT, handler as libc::sighandler_t);
        }
    }
}

#[cfg(not(unix))]
fn install_cancel_handler(_flag: Arc<AtomicBool>) {}
