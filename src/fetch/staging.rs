//! Staging directories and atomic promotion.
//!
//! Backends never write into a target directly. They populate a staging
//! directory under `.tether/staging` (same filesystem as the target), and
//! the resolver promotes it into place with a rename. A dependency is
//! therefore either absent, fully materialized, or untouched at its previous
//! state — a killed run leaves no partial target.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::workspace::marker;

static STAGING_SEQ: AtomicUsize = AtomicUsize::new(0);

/// An in-flight staging directory. Removed on drop unless promoted.
#[derive(Debug)]
pub struct Staging {
    dir: PathBuf,
    promoted: bool,
}

impl Staging {
    /// Create a fresh, empty staging directory for a declaration.
    pub fn create(staging_root: &Path, name: &str) -> io::Result<Self> {
        fs::create_dir_all(staging_root)?;
        let seq = STAGING_SEQ.fetch_add(1, Ordering::Relaxed);
        let dir = staging_root.join(format!("{}-{}-{}", name, std::process::id(), seq));
        if dir.exists() {
            // leftover from a crashed run with the same pid
            fs::remove_dir_all(&dir)?;
        }
        fs::create_dir(&dir)?;
        Ok(Self {
            dir,
            promoted: false,
        })
    }

    /// The directory backends populate.
    pub fn path(&self) -> &Path {
        &self.dir
    }

    /// Move the staged content into place, writing the version marker first.
    ///
    /// An existing target is swapped aside and only removed once the new
    /// tree is in place; on rename failure the old tree is restored.
    pub fn promote(mut self, target_dir: &Path, version: Option<&str>) -> io::Result<()> {
        marker::write(&self.dir, version)?;

        if let Some(parent) = target_dir.parent() {
            fs::create_dir_all(parent)?;
        }

        // The aside path derives from the unique staging name, so concurrent
        // promotions never collide on it.
        let displaced = if target_dir.exists() {
            let staged_name = self
                .dir
                .file_name()
                .and_then(|n| n.to_str())
                .unwrap_or("staging");
            let aside = self.dir.with_file_name(format!("{}-displaced", staged_name));
            if aside.exists() {
                fs::remove_dir_all(&aside)?;
            }
            fs::rename(target_dir, &aside)?;
            Some(aside)
        } else {
            None
        };

        if let Err(e) = fs::rename(&self.dir, target_dir) {
            if let Some(aside) = &displaced {
                let _ = fs::rename(aside, target_dir);
            }
            return Err(e);
        }
        self.promoted = true;

        if let Some(aside) = displaced {
            let _ = fs::remove_dir_all(aside);
        }
        Ok(())
    }
}

impl Drop for Staging {
    fn drop(&mut self) {
        if !self.promoted && self.dir.exists() {
            let _ = fs::remove_dir_all(&self.dir);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::version::Constraint;
    use tempfile::TempDir;

    #[test]
    fn create_makes_empty_directory() {
        let temp = TempDir::new().unwrap();
        let staging = Staging::create(&temp.path().join("staging"), "libfoo").unwrap();
        assert!(staging.path().is_dir());
        assert_eq!(fs::read_dir(staging.path()).unwrap().count(), 0);
    }

    #[test]
    fn sequential_stagings_get_distinct_paths() {
        let temp = TempDir::new().unwrap();
        let root = temp.path().join("staging");
        let a = Staging::create(&root, "libfoo").unwrap();
        let b = Staging::create(&root, "libfoo").unwrap();
        assert_ne!(a.path(), b.path());
    }

    #[test]
    fn unpromoted_staging_is_removed_on_drop() {
        let temp = TempDir::new().unwrap();
        let path = {
            let staging = Staging::create(&temp.path().join("staging"), "libfoo").unwrap();
            fs::write(staging.path().join("file"), "content").unwrap();
            staging.path().to_path_buf()
        };
        assert!(!path.exists());
    }

    #[test]
    fn promote_moves_content_and_writes_marker() {
        let temp = TempDir::new().unwrap();
        let target = temp.path().join("vendor/libfoo");

        let staging = Staging::create(&temp.path().join("staging"), "libfoo").unwrap();
        fs::write(staging.path().join("lib.c"), "int x;").unwrap();
        staging.promote(&target, Some("v1.2")).unwrap();

        assert_eq!(fs::read_to_string(target.join("lib.c")).unwrap(), "int x;");
        assert!(marker::satisfies(&target, &Constraint::parse(Some("v1.2"))));
    }

    #[test]
    fn promote_replaces_existing_target() {
        let temp = TempDir::new().unwrap();
        let target = temp.path().join("vendor/libfoo");
        fs::create_dir_all(&target).unwrap();
        fs::write(target.join("stale"), "old").unwrap();

        let staging = Staging::create(&temp.path().join("staging"), "libfoo").unwrap();
        fs::write(staging.path().join("fresh"), "new").unwrap();
        staging.promote(&target, None).unwrap();

        assert!(!target.join("stale").exists());
        assert!(target.join("fresh").exists());
    }

    #[test]
    fn promoted_staging_path_is_gone() {
        let temp = TempDir::new().unwrap();
        let target = temp.path().join("vendor/libfoo");

        let staging = Staging::create(&temp.path().join("staging"), "libfoo").unwrap();
        let staged_path = staging.path().to_path_buf();
        staging.promote(&target, None).unwrap();

        assert!(!staged_path.exists());
        assert!(target.is_dir());
    }
}
