//! Repository workspace layout.
//!
//! A [`Workspace`] owns the repository root and answers where things live:
//! target directories for declarations, the staging area used for atomic
//! materialization, and the `.tether` state directory.
//!
//! # Modules
//!
//! - [`marker`] - Version marker files used by the default presence check

pub mod marker;

use std::path::{Component, Path, PathBuf};

use crate::manifest::Declaration;

/// Name of the per-repository state directory.
pub const STATE_DIR: &str = ".tether";

/// A repository root plus target-path policy.
#[derive(Debug, Clone)]
pub struct Workspace {
    root: PathBuf,
    vendor_dir: String,
}

impl Workspace {
    pub fn new(root: impl Into<PathBuf>, vendor_dir: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            vendor_dir: vendor_dir.into(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// The `.tether` state directory.
    pub fn state_dir(&self) -> PathBuf {
        self.root.join(STATE_DIR)
    }

    /// The staging area for in-flight fetches. Lives under the repository
    /// root so that promotion is a same-filesystem rename.
    pub fn staging_root(&self) -> PathBuf {
        self.state_dir().join("staging")
    }

    /// Normalized target subpath for a declaration, used both for the
    /// on-disk location and as the mutual-exclusion key in concurrent mode.
    ///
    /// Rejects absolute targets and targets that escape the repository root.
    pub fn target_key(&self, decl: &Declaration) -> Result<String, String> {
        normalize_subpath(&decl.target_or_default(&self.vendor_dir))
    }

    /// Absolute directory a declaration materializes into.
    pub fn target_dir(&self, decl: &Declaration) -> Result<PathBuf, String> {
        Ok(self.root.join(self.target_key(decl)?))
    }

    /// Walk up from `start` looking for a directory containing `marker_file`.
    pub fn discover_root(start: &Path, marker_file: &Path) -> Option<PathBuf> {
        start
            .ancestors()
            .find(|dir| dir.join(marker_file).is_file())
            .map(Path::to_path_buf)
    }
}

/// Normalize a target subpath: collapse `.`, forbid `..` and absolute paths.
fn normalize_subpath(raw: &str) -> Result<String, String> {
    let path = Path::new(raw);
    let mut parts: Vec<&str> = Vec::new();

    for component in path.components() {
        match component {
            Component::Normal(part) => match part.to_str() {
                Some(s) => parts.push(s),
                None => return Err(format!("target '{}' is not valid UTF-8", raw)),
            },
            Component::CurDir => {}
            Component::ParentDir => {
                return Err(format!("target '{}' escapes the repository root", raw));
            }
            Component::RootDir | Component::Prefix(_) => {
                return Err(format!("target '{}' must be relative", raw));
            }
        }
    }

    if parts.is_empty() {
        return Err(format!("target '{}' resolves to the repository root", raw));
    }
    Ok(parts.join("/"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manifest::Declaration;

    fn decl(target: Option<&str>) -> Declaration {
        Declaration {
            name: "libfoo".into(),
            source: "https://example/libfoo".into(),
            version: None,
            target: target.map(String::from),
            requires: Vec::new(),
        }
    }

    #[test]
    fn explicit_target_is_joined_to_root() {
        let ws = Workspace::new("/repo", "vendor");
        let dir = ws.target_dir(&decl(Some("deps/foo"))).unwrap();
        assert_eq!(dir, PathBuf::from("/repo/deps/foo"));
    }

    #[test]
    fn default_target_uses_vendor_dir() {
        let ws = Workspace::new("/repo", "vendor");
        let dir = ws.target_dir(&decl(None)).unwrap();
        assert_eq!(dir, PathBuf::from("/repo/vendor/libfoo"));
    }

    #[test]
    fn target_key_is_normalized() {
        let ws = Workspace::new("/repo", "vendor");
        assert_eq!(
            ws.target_key(&decl(Some("./deps//foo/."))).unwrap(),
            "deps/foo"
        );
    }

    #[test]
    fn parent_dir_escape_is_rejected() {
        let ws = Workspace::new("/repo", "vendor");
        let err = ws.target_key(&decl(Some("../outside"))).unwrap_err();
        assert!(err.contains("escapes"));
    }

    #[test]
    fn absolute_target_is_rejected() {
        let ws = Workspace::new("/repo", "vendor");
        let err = ws.target_key(&decl(Some("/etc/foo"))).unwrap_err();
        assert!(err.contains("relative"));
    }

    #[test]
    fn dot_only_target_is_rejected() {
        let ws = Workspace::new("/repo", "vendor");
        let err = ws.target_key(&decl(Some("."))).unwrap_err();
        assert!(err.contains("repository root"));
    }

    #[test]
    fn staging_lives_under_state_dir() {
        let ws = Workspace::new("/repo", "vendor");
        assert_eq!(ws.staging_root(), PathBuf::from("/repo/.tether/staging"));
    }

    #[test]
    fn discover_root_walks_ancestors() {
        let temp = tempfile::TempDir::new().unwrap();
        let nested = temp.path().join("a/b");
        std::fs::create_dir_all(&nested).unwrap();
        std::fs::write(temp.path().join("README.md"), "# hi\n").unwrap();

        let root = Workspace::discover_root(&nested, Path::new("README.md")).unwrap();
        assert_eq!(root, temp.path());
    }

    #[test]
    fn discover_root_without_marker_is_none() {
        let temp = tempfile::TempDir::new().unwrap();
        assert!(Workspace::discover_root(temp.path(), Path::new("NOPE.md")).is_none());
    }
}
