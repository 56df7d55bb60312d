//! Dependency resolution.
//!
//! Given a workspace and a parsed manifest, ensure each declaration is
//! present at its target, fetching what is missing through the pluggable
//! backends. Failures are best-effort and per-declaration; prerequisites
//! short-circuit their dependents.
//!
//! # Modules
//!
//! - [`engine`] - The resolver and per-declaration state machine
//! - [`graph`] - Prerequisite ordering and levels
//! - [`outcome`] - Outcomes and the run report
//! - `parallel` - Worker-pool mode for mutually-independent declarations

pub mod engine;
pub mod graph;
pub mod outcome;
mod parallel;

pub use engine::{ResolveOptions, ResolveProgress, Resolver};
pub use outcome::{Outcome, ResolutionStatus, RunReport};
