//! Command-line interface.
//!
//! # Modules
//!
//! - [`args`] - clap argument definitions
//! - [`commands`] - Command trait, dispatcher, and subcommand implementations

pub mod args;
pub mod commands;

pub use args::{Cli, Commands};
pub use commands::dispatcher::{CommandDispatcher, ProjectContext};
