//! Command dispatching.
//!
//! This module provides the core command infrastructure:
//! - [`Command`] trait for implementing commands
//! - [`CommandResult`] for uniform result reporting
//! - [`ProjectContext`] resolving the repo root, manifest path, and config
//! - [`CommandDispatcher`] for routing CLI subcommands

use std::env;
use std::path::{Path, PathBuf};

use crate::cli::args::{Cli, Commands, ResolveArgs};
use crate::config::TetherConfig;
use crate::error::Result;
use crate::ui::UserInterface;
use crate::workspace::Workspace;

/// Trait for command implementations.
///
/// Each CLI subcommand implements this trait to provide its execution logic.
pub trait Command {
    /// Execute the command against the given UI, returning the exit status.
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult>;
}

/// Result of command execution.
#[derive(Debug)]
pub struct CommandResult {
    /// Whether the command succeeded.
    pub success: bool,

    /// Exit code to use (0 for success, non-zero for failure).
    pub exit_code: i32,
}

impl CommandResult {
    /// Create a successful result.
    pub fn success() -> Self {
        Self {
            success: true,
            exit_code: 0,
        }
    }

    /// Create a failure result.
    pub fn failure(exit_code: i32) -> Self {
        Self {
            success: false,
            exit_code,
        }
    }
}

/// Where a command runs: repository root, manifest document, configuration.
#[derive(Debug, Clone)]
pub struct ProjectContext {
    pub repo_root: PathBuf,
    pub manifest_path: PathBuf,
    pub config: TetherConfig,
}

impl ProjectContext {
    /// Resolve the context from CLI flags and the current directory.
    ///
    /// An explicit `--root` wins; an explicit `--manifest` implies its parent
    /// directory as the root; otherwise the nearest ancestor holding a
    /// `.tether.yml` or `README.md` is the root, falling back to the current
    /// directory.
    pub fn discover(cli: &Cli) -> Result<Self> {
        let cwd = env::current_dir()?;

        if let Some(root) = &cli.root {
            let repo_root = absolutize(&cwd, root);
            let config = TetherConfig::load(&repo_root)?;
            let manifest_path = match &cli.manifest {
                Some(m) => absolutize(&cwd, m),
                None => repo_root.join(&config.manifest),
            };
            return Ok(Self {
                repo_root,
                manifest_path,
                config,
            });
        }

        if let Some(manifest) = &cli.manifest {
            let manifest_path = absolutize(&cwd, manifest);
            let repo_root = manifest_path
                .parent()
                .map(Path::to_path_buf)
                .unwrap_or_else(|| cwd.clone());
            let config = TetherConfig::load(&repo_root)?;
            return Ok(Self {
                repo_root,
                manifest_path,
                config,
            });
        }

        let repo_root = Workspace::discover_root(&cwd, Path::new(crate::config::CONFIG_FILE))
            .or_else(|| Workspace::discover_root(&cwd, Path::new("README.md")))
            .unwrap_or(cwd);
        let config = TetherConfig::load(&repo_root)?;
        let manifest_path = repo_root.join(&config.manifest);
        Ok(Self {
            repo_root,
            manifest_path,
            config,
        })
    }

    /// The workspace this context operates on.
    pub fn workspace(&self) -> Workspace {
        Workspace::new(&self.repo_root, &self.config.vendor_dir)
    }
}

fn absolutize(cwd: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        cwd.join(path)
    }
}

/// Dispatches CLI commands to their implementations.
pub struct CommandDispatcher {
    context: ProjectContext,
}

impl CommandDispatcher {
    /// Create a dispatcher with a resolved project context.
    pub fn new(context: ProjectContext) -> Self {
        Self { context }
    }

    /// Resolve the context from CLI flags and build a dispatcher.
    pub fn from_cli(cli: &Cli) -> Result<Self> {
        Ok(Self::new(ProjectContext::discover(cli)?))
    }

    pub fn context(&self) -> &ProjectContext {
        &self.context
    }

    /// Dispatch and execute a command.
    pub fn dispatch(&self, cli: &Cli, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        match &cli.command {
            Some(Commands::Resolve(args)) => {
                let cmd = super::resolve::ResolveCommand::new(&self.context, args.clone());
                cmd.execute(ui)
            }
            Some(Commands::Check(args)) => {
                let cmd = super::check::CheckCommand::new(&self.context, args.clone());
                cmd.execute(ui)
            }
            Some(Commands::List(args)) => {
                let cmd = super::list::ListCommand::new(&self.context, args.clone());
                cmd.execute(ui)
            }
            Some(Commands::Last(args)) => {
                let cmd = super::last::LastCommand::new(&self.context, args.clone());
                cmd.execute(ui)
            }
            Some(Commands::Init(args)) => {
                let cmd = super::init::InitCommand::new(&self.context, args.clone());
                cmd.execute(ui)
            }
            Some(Commands::Completions(args)) => {
                let cmd = super::completions::CompletionsCommand::new(args.clone());
                cmd.execute(ui)
            }
            None => {
                // Default to resolve with default args
                let cmd =
                    super::resolve::ResolveCommand::new(&self.context, ResolveArgs::default());
                cmd.execute(ui)
            }
        }
    }
}
