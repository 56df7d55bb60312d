//! Document scanning and manifest extraction.
//!
//! The dependency section starts at a Markdown heading whose text is
//! `Dependencies` (any level, case-insensitive) and runs until the next
//! heading or end of file. Inside the section, blank lines and HTML comment
//! lines are ignored, fenced code blocks are skipped, and an optional list
//! bullet is stripped before fields are split on whitespace.
//!
//! A document without a dependency section parses to an empty manifest;
//! declaring no dependencies is valid. A section that exists but cannot be
//! decomposed is fatal: resolution against a half-parsed manifest is unsafe.

use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{Result, TetherError};
use crate::manifest::Declaration;

/// An ordered, validated set of dependency declarations.
///
/// Immutable after parsing. Declaration order is the file order, which the
/// resolver preserves wherever prerequisites allow.
#[derive(Debug, Clone)]
pub struct Manifest {
    declarations: Vec<Declaration>,
    document: PathBuf,
}

impl Manifest {
    /// The declarations in file order.
    pub fn declarations(&self) -> &[Declaration] {
        &self.declarations
    }

    /// The document this manifest was parsed from, for error reporting.
    pub fn document(&self) -> &Path {
        &self.document
    }

    /// Look up a declaration by name.
    pub fn get(&self, name: &str) -> Option<&Declaration> {
        self.declarations.iter().find(|d| d.name == name)
    }

    /// Position of a declaration in file order.
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.declarations.iter().position(|d| d.name == name)
    }

    pub fn len(&self) -> usize {
        self.declarations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.declarations.is_empty()
    }

    /// A manifest restricted to `keep` plus the transitive prerequisites of
    /// every kept declaration, preserving file order.
    pub fn restricted_to(&self, keep: &HashSet<String>) -> Manifest {
        let mut wanted: HashSet<String> = keep.clone();
        let mut frontier: Vec<String> = keep.iter().cloned().collect();
        while let Some(name) = frontier.pop() {
            if let Some(decl) = self.get(&name) {
                for prereq in &decl.requires {
                    if wanted.insert(prereq.clone()) {
                        frontier.push(prereq.clone());
                    }
                }
            }
        }

        Manifest {
            declarations: self
                .declarations
                .iter()
                .filter(|d| wanted.contains(&d.name))
                .cloned()
                .collect(),
            document: self.document.clone(),
        }
    }
}

/// Parse the manifest section out of a document on disk.
pub fn parse_file(path: &Path) -> Result<Manifest> {
    let content = fs::read_to_string(path).map_err(|_| TetherError::ManifestNotFound {
        path: path.to_path_buf(),
    })?;
    parse_str(&content, path)
}

/// Parse the manifest section out of document text.
pub fn parse_str(content: &str, document: &Path) -> Result<Manifest> {
    let malformed = |line: usize, message: String| TetherError::MalformedManifest {
        path: document.to_path_buf(),
        line,
        message,
    };

    let mut declarations: Vec<Declaration> = Vec::new();
    let mut seen: HashMap<String, usize> = HashMap::new();
    let mut in_section = false;
    let mut in_fence = false;

    for (idx, raw) in content.lines().enumerate() {
        let line_no = idx + 1;
        let line = raw.trim();

        // Code fences toggle regardless of section state so that a fenced
        // example of a dependency section is never parsed as a real one.
        if line.starts_with("```") || line.starts_with("~~~") {
            in_fence = !in_fence;
            continue;
        }
        if in_fence {
            continue;
        }

        if let Some(heading) = heading_text(line) {
            if in_section {
                break;
            }
            in_section = heading.eq_ignore_ascii_case("dependencies");
            continue;
        }

        if !in_section || line.is_empty() || line.starts_with("<!--") {
            continue;
        }

        let body = strip_bullet(line);
        if body.is_empty() || is_rule(body) {
            continue;
        }

        let fields: Vec<&str> = body.split_whitespace().collect();
        let decl = Declaration::from_fields(&fields).map_err(|msg| malformed(line_no, msg))?;

        if seen.insert(decl.name.clone(), line_no).is_some() {
            return Err(malformed(
                line_no,
                format!("duplicate declaration '{}'", decl.name),
            ));
        }
        declarations.push(decl);
    }

    validate_prerequisites(&declarations, document)?;

    Ok(Manifest {
        declarations,
        document: document.to_path_buf(),
    })
}

/// Extract the text of a Markdown heading line, if this is one.
fn heading_text(line: &str) -> Option<&str> {
    if !line.starts_with('#') {
        return None;
    }
    let text = line.trim_start_matches('#');
    // `#foo` is an anchor-ish token, not a heading
    if !text.is_empty() && !text.starts_with(' ') {
        return None;
    }
    Some(text.trim())
}

/// Strip a leading Markdown list bullet (`* ` or `- `).
fn strip_bullet(line: &str) -> &str {
    line.strip_prefix("* ")
        .or_else(|| line.strip_prefix("- "))
        .unwrap_or(line)
        .trim_start()
}

/// Thematic breaks and setext underlines are layout, not declarations.
fn is_rule(body: &str) -> bool {
    body.chars().all(|c| matches!(c, '-' | '=' | '*' | '_'))
}

/// Reject unknown prerequisite references and prerequisite cycles.
///
/// Both make the declared resolution order unsatisfiable, so they are
/// manifest errors rather than per-declaration failures.
fn validate_prerequisites(declarations: &[Declaration], document: &Path) -> Result<()> {
    let names: HashSet<&str> = declarations.iter().map(|d| d.name.as_str()).collect();

    for decl in declarations {
        for prereq in &decl.requires {
            if !names.contains(prereq.as_str()) {
                return Err(TetherError::MalformedManifest {
                    path: document.to_path_buf(),
                    line: 0,
                    message: format!(
                        "'{}' requires unknown declaration '{}'",
                        decl.name, prereq
                    ),
                });
            }
        }
    }

    if let Some(cycle) = find_cycle(declarations) {
        return Err(TetherError::MalformedManifest {
            path: document.to_path_buf(),
            line: 0,
            message: format!("prerequisite cycle: {}", cycle.join(" -> ")),
        });
    }

    Ok(())
}

/// Depth-first search for a prerequisite cycle, returning its path.
fn find_cycle(declarations: &[Declaration]) -> Option<Vec<String>> {
    #[derive(Clone, Copy, PartialEq)]
    enum State {
        Unvisited,
        Visiting,
        Visited,
    }

    let requires: HashMap<&str, &[String]> = declarations
        .iter()
        .map(|d| (d.name.as_str(), d.requires.as_slice()))
        .collect();

    let mut state: HashMap<&str, State> = declarations
        .iter()
        .map(|d| (d.name.as_str(), State::Unvisited))
        .collect();

    fn dfs<'a>(
        node: &'a str,
        requires: &HashMap<&'a str, &'a [String]>,
        state: &mut HashMap<&'a str, State>,
        path: &mut Vec<String>,
    ) -> Option<Vec<String>> {
        state.insert(node, State::Visiting);
        path.push(node.to_string());

        if let Some(prereqs) = requires.get(node) {
            for prereq in prereqs.iter() {
                match state.get(prereq.as_str()) {
                    Some(State::Visiting) => {
                        let start = path.iter().position(|s| s == prereq)?;
                        let mut cycle: Vec<String> = path[start..].to_vec();
                        cycle.push(prereq.clone());
                        return Some(cycle);
                    }
                    Some(State::Unvisited) => {
                        if let Some(cycle) = dfs(prereq, requires, state, path) {
                            return Some(cycle);
                        }
                    }
                    _ => {}
                }
            }
        }

        path.pop();
        state.insert(node, State::Visited);
        None
    }

    let mut path = Vec::new();
    for decl in declarations {
        if state.get(decl.name.as_str()) == Some(&State::Unvisited) {
            if let Some(cycle) = dfs(&decl.name, &requires, &mut state, &mut path) {
                return Some(cycle);
            }
        }
    }
    None
}
