//! Local directory backend.
//!
//! Handles plain-path and `file://` sources by copying the source tree into
//! staging. Relative sources resolve against the repository root, matching
//! the sibling-checkout layout README manifests commonly point at
//! (`../libs/common`).

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use anyhow::anyhow;

use crate::fetch::{Backend, FetchError, FetchRequest};
use crate::workspace::marker::MARKER_FILE;

/// Top-level entries never copied from a source tree.
const SKIP_TOP_LEVEL: &[&str] = &[".git", MARKER_FILE];

/// Copies local directories.
#[derive(Debug, Default)]
pub struct FsBackend;

impl FsBackend {
    pub fn new() -> Self {
        Self
    }

    fn source_path(request: &FetchRequest<'_>) -> PathBuf {
        let raw = request.source.strip_prefix("file://").unwrap_or(request.source);
        let path = Path::new(raw);
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            request.base.join(path)
        }
    }
}

impl Backend for FsBackend {
    fn name(&self) -> &'static str {
        "filesystem"
    }

    fn fetch(&self, request: &FetchRequest<'_>) -> Result<(), FetchError> {
        let source = Self::source_path(request);
        if !source.is_dir() {
            return Err(FetchError::Other(anyhow!(
                "source directory not found: {}",
                source.display()
            )));
        }
        copy_dir(&source, request.dest, SKIP_TOP_LEVEL)?;
        Ok(())
    }
}

/// Recursively copy a directory tree, skipping `skip` entries at the top
/// level. Symlinks are not followed.
pub(crate) fn copy_dir(src: &Path, dst: &Path, skip: &[&str]) -> io::Result<()> {
    fs::create_dir_all(dst)?;
    for entry in fs::read_dir(src)? {
        let entry = entry?;
        let name = entry.file_name();
        if skip.iter().any(|s| name.to_str() == Some(*s)) {
            continue;
        }

        let file_type = entry.file_type()?;
        let to = dst.join(&name);
        if file_type.is_dir() {
            copy_dir(&entry.path(), &to, &[])?;
        } else if file_type.is_file() {
            fs::copy(entry.path(), &to)?;
        }
        // symlinks are dropped; a vendored tree must be self-contained
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tempfile::TempDir;

    fn request<'a>(
        source: &'a str,
        dest: &'a Path,
        base: &'a Path,
    ) -> FetchRequest<'a> {
        FetchRequest {
            source,
            version: None,
            dest,
            base,
            timeout: Duration::from_secs(5),
        }
    }

    #[test]
    fn copies_tree_into_staging() {
        let temp = TempDir::new().unwrap();
        let source = temp.path().join("source");
        fs::create_dir_all(source.join("sub")).unwrap();
        fs::write(source.join("a.txt"), "a").unwrap();
        fs::write(source.join("sub/b.txt"), "b").unwrap();

        let dest = temp.path().join("staging");
        fs::create_dir(&dest).unwrap();

        FsBackend::new()
            .fetch(&request(source.to_str().unwrap(), &dest, temp.path()))
            .unwrap();

        assert_eq!(fs::read_to_string(dest.join("a.txt")).unwrap(), "a");
        assert_eq!(fs::read_to_string(dest.join("sub/b.txt")).unwrap(), "b");
    }

    #[test]
    fn relative_source_resolves_against_base() {
        let temp = TempDir::new().unwrap();
        fs::create_dir_all(temp.path().join("libs/common")).unwrap();
        fs::write(temp.path().join("libs/common/x"), "x").unwrap();

        let dest = temp.path().join("staging");
        fs::create_dir(&dest).unwrap();

        FsBackend::new()
            .fetch(&request("libs/common", &dest, temp.path()))
            .unwrap();

        assert!(dest.join("x").exists());
    }

    #[test]
    fn file_url_prefix_is_stripped() {
        let temp = TempDir::new().unwrap();
        let source = temp.path().join("source");
        fs::create_dir(&source).unwrap();
        fs::write(source.join("x"), "x").unwrap();

        let dest = temp.path().join("staging");
        fs::create_dir(&dest).unwrap();

        let url = format!("file://{}", source.display());
        FsBackend::new()
            .fetch(&request(&url, &dest, temp.path()))
            .unwrap();

        assert!(dest.join("x").exists());
    }

    #[test]
    fn missing_source_is_an_error() {
        let temp = TempDir::new().unwrap();
        let dest = temp.path().join("staging");
        fs::create_dir(&dest).unwrap();

        let err = FsBackend::new()
            .fetch(&request("does/not/exist", &dest, temp.path()))
            .unwrap_err();
        assert!(err.to_string().contains("not found"));
    }

    #[test]
    fn git_dir_and_marker_are_not_copied() {
        let temp = TempDir::new().unwrap();
        let source = temp.path().join("source");
        fs::create_dir_all(source.join(".git")).unwrap();
        fs::write(source.join(".git/HEAD"), "ref").unwrap();
        fs::write(source.join(MARKER_FILE), "v0.0").unwrap();
        fs::write(source.join("keep"), "k").unwrap();

        let dest = temp.path().join("staging");
        fs::create_dir(&dest).unwrap();

        FsBackend::new()
            .fetch(&request(source.to_str().unwrap(), &dest, temp.path()))
            .unwrap();

        assert!(dest.join("keep").exists());
        assert!(!dest.join(".git").exists());
        assert!(!dest.join(MARKER_FILE).exists());
    }
}
