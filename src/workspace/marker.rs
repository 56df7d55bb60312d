//! Version marker files.
//!
//! Promotion writes a `.tether-version` marker into each materialized target.
//! The default presence check reads it back and compares against the
//! declaration's constraint. A target directory without a marker is treated
//! as absent, so trees that predate tether (or partial manual copies) get
//! re-fetched rather than trusted.

use std::fs;
use std::io;
use std::path::Path;

use crate::version::Constraint;

/// Marker file name inside a materialized target.
pub const MARKER_FILE: &str = ".tether-version";

/// Marker content recorded when a declaration has no version constraint.
pub const ANY_VERSION: &str = "*";

/// Read the marker out of a target directory.
pub fn read(target_dir: &Path) -> Option<String> {
    let content = fs::read_to_string(target_dir.join(MARKER_FILE)).ok()?;
    let trimmed = content.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Write the marker into a directory (staging, before promotion).
pub fn write(dir: &Path, version: Option<&str>) -> io::Result<()> {
    let content = version.unwrap_or(ANY_VERSION);
    fs::write(dir.join(MARKER_FILE), format!("{}\n", content))
}

/// Whether a target directory satisfies a constraint.
///
/// The `*` marker satisfies only the unconstrained case: content fetched
/// without a version pin cannot vouch for any specific version.
pub fn satisfies(target_dir: &Path, constraint: &Constraint) -> bool {
    match read(target_dir) {
        None => false,
        Some(marker) if marker == ANY_VERSION => constraint.is_any(),
        Some(marker) => constraint.satisfied_by(&marker),
    }
}
