//! Tether - vendors dependencies declared in a repository's README.
//!
//! Tether reads a delimited dependency section out of a text document
//! (usually `README.md`), then ensures each declared dependency is
//! materialized at its target subpath inside the repository, fetching
//! whatever is missing through pluggable backends.
//!
//! # Modules
//!
//! - [`cli`] - Command-line interface and argument parsing
//! - [`config`] - Optional `.tether.yml` configuration
//! - [`error`] - Error types and result aliases
//! - [`fetch`] - Fetch/presence backends (filesystem, git, archive)
//! - [`manifest`] - Manifest parsing and validation
//! - [`resolver`] - Resolution engine, ordering, and outcomes
//! - [`state`] - Run report persistence
//! - [`ui`] - Terminal output
//! - [`version`] - Version constraint parsing and comparison
//! - [`workspace`] - Repository layout and marker files
//!
//! # Example
//!
//! ```
//! use std::path::Path;
//! use tether::manifest::parse_str;
//!
//! let doc = "## Dependencies\nlibfoo  https://example/libfoo  v1.2  vendor/libfoo\n";
//! let manifest = parse_str(doc, Path::new("README.md")).unwrap();
//! assert_eq!(manifest.declarations()[0].name, "libfoo");
//! ```

pub mod cli;
pub mod config;
pub mod error;
pub mod fetch;
pub mod manifest;
pub mod resolver;
pub mod state;
pub mod ui;
pub mod version;
pub mod workspace;

pub use error::{Result, TetherError};
