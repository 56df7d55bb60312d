//! Manifest parsing.
//!
//! A manifest is a delimited dependency-declaration section embedded in a
//! text document, usually the repository's README. This module extracts the
//! ordered list of [`Declaration`]s from such a document.
//!
//! # Modules
//!
//! - [`declaration`] - A single dependency declaration and its field grammar
//! - [`parser`] - Document scanning, section extraction, and validation

pub mod declaration;
pub mod parser;

pub use declaration::Declaration;
pub use parser::{parse_file, parse_str, Manifest};
