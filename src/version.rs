//! Version constraint parsing and comparison.
//!
//! Declarations carry an opaque version constraint string. The marker-based
//! presence check interprets three forms: no constraint (`-` or absent),
//! an exact version (`v1.2`, `1.2.0`), and a minimum version (`>=1.2`).

use std::cmp::Ordering;
use std::fmt;
use std::sync::OnceLock;

use regex::Regex;

/// A parsed version constraint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Constraint {
    /// No constraint: any materialized version satisfies.
    Any,
    /// Exact version match (numeric components compared, `v` prefix ignored).
    Exact(String),
    /// Minimum version: the given version or higher.
    AtLeast(String),
}

impl Constraint {
    /// Parse a raw constraint string from a declaration.
    ///
    /// `None`, an empty string, and the `-` placeholder all mean "any".
    pub fn parse(raw: Option<&str>) -> Self {
        match raw.map(str::trim) {
            None | Some("") | Some("-") => Constraint::Any,
            Some(s) => {
                if let Some(rest) = s.strip_prefix(">=") {
                    Constraint::AtLeast(rest.trim().to_string())
                } else {
                    Constraint::Exact(s.to_string())
                }
            }
        }
    }

    /// Whether this constraint accepts any version.
    pub fn is_any(&self) -> bool {
        matches!(self, Constraint::Any)
    }

    /// Check whether a materialized version satisfies this constraint.
    pub fn satisfied_by(&self, version: &str) -> bool {
        match self {
            Constraint::Any => true,
            Constraint::Exact(want) => versions_equal(want, version),
            Constraint::AtLeast(min) => {
                compare_versions(version, min) != Ordering::Less
            }
        }
    }
}

impl fmt::Display for Constraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Constraint::Any => write!(f, "*"),
            Constraint::Exact(v) => write!(f, "{}", v),
            Constraint::AtLeast(v) => write!(f, ">={}", v),
        }
    }
}

fn number_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\d+").unwrap())
}

/// Extract numeric components from a version string (`v1.2.0` -> `[1, 2, 0]`).
fn extract_numbers(version: &str) -> Vec<u64> {
    number_pattern()
        .find_iter(version)
        .filter_map(|m| m.as_str().parse().ok())
        .collect()
}

/// Compare two version strings component by component.
///
/// Missing components compare as zero, so `1.2` equals `1.2.0`.
fn compare_versions(a: &str, b: &str) -> Ordering {
    let a_parts = extract_numbers(a);
    let b_parts = extract_numbers(b);

    let len = a_parts.len().max(b_parts.len());
    for i in 0..len {
        let x = a_parts.get(i).copied().unwrap_or(0);
        let y = b_parts.get(i).copied().unwrap_or(0);
        match x.cmp(&y) {
            Ordering::Equal => continue,
            other => return other,
        }
    }
    Ordering::Equal
}

/// Whether two version strings name the same version.
///
/// Versions with numeric components compare numerically; versions without
/// (branch names, commit refs) compare as trimmed strings.
fn versions_equal(a: &str, b: &str) -> bool {
    let a_parts = extract_numbers(a);
    let b_parts = extract_numbers(b);
    if a_parts.is_empty() && b_parts.is_empty() {
        return a.trim() == b.trim();
    }
    compare_versions(a, b) == Ordering::Equal
}
