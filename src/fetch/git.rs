//! Git backend.
//!
//! Clones are kept in a cache directory keyed by a hash of the source URL,
//! so repeated resolves fetch instead of re-cloning. The declaration's
//! version constraint is used as the git ref to pin; sources without a
//! constraint track the remote default branch. The working tree (minus
//! `.git`) is copied into staging.

use std::path::{Path, PathBuf};
use std::process::Command;

use anyhow::anyhow;
use sha2::{Digest, Sha256};

use crate::fetch::filesystem::copy_dir;
use crate::fetch::process::{run_with_deadline, CommandOutput, Deadline};
use crate::fetch::{Backend, FetchError, FetchRequest};
use crate::workspace::marker::MARKER_FILE;

/// Fetches dependencies from git remotes.
#[derive(Debug)]
pub struct GitBackend {
    /// Directory for cached clones.
    clone_cache: PathBuf,
}

impl GitBackend {
    pub fn new(clone_cache: impl Into<PathBuf>) -> Self {
        Self {
            clone_cache: clone_cache.into(),
        }
    }

    pub fn clone_cache(&self) -> &Path {
        &self.clone_cache
    }

    /// Cache path for a repository.
    ///
    /// Uses a hash of the URL to create a deterministic, unique path.
    pub fn repo_path(&self, url: &str) -> PathBuf {
        let hash = Sha256::digest(url.as_bytes());
        let hash_str = hex::encode(&hash[..8]);
        self.clone_cache.join(hash_str)
    }

    fn git(
        &self,
        args: &[&str],
        cwd: Option<&Path>,
        deadline: &Deadline,
    ) -> Result<CommandOutput, FetchError> {
        let mut cmd = Command::new("git");
        cmd.args(args);
        if let Some(cwd) = cwd {
            cmd.current_dir(cwd);
        }
        run_with_deadline(&mut cmd, deadline.remaining()?)
    }

    fn clone_repo(
        &self,
        url: &str,
        path: &Path,
        refspec: Option<&str>,
        deadline: &Deadline,
    ) -> Result<(), FetchError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let path_str = path.to_string_lossy().to_string();

        // Shallow clone pinned to the ref when one is given; branch and tag
        // refs resolve this way, commit hashes need the full-clone fallback.
        if let Some(r) = refspec {
            let output = self.git(
                &["clone", "--depth", "1", "--branch", r, url, path_str.as_str()],
                None,
                deadline,
            )?;
            if output.success {
                return Ok(());
            }
            if path.exists() {
                let _ = std::fs::remove_dir_all(path);
            }

            let output = self.git(&["clone", url, path_str.as_str()], None, deadline)?;
            if !output.success {
                return Err(FetchError::Other(anyhow!(
                    "git clone failed: {}",
                    output.stderr.trim()
                )));
            }
            let output = self.git(&["checkout", "--detach", r], Some(path), deadline)?;
            if !output.success {
                return Err(FetchError::Other(anyhow!(
                    "ref '{}' not found in {}: {}",
                    r,
                    url,
                    output.stderr.trim()
                )));
            }
            return Ok(());
        }

        let output = self.git(
            &["clone", "--depth", "1", url, path_str.as_str()],
            None,
            deadline,
        )?;
        if !output.success {
            return Err(FetchError::Other(anyhow!(
                "git clone failed: {}",
                output.stderr.trim()
            )));
        }
        Ok(())
    }

    fn update_repo(
        &self,
        path: &Path,
        refspec: Option<&str>,
        deadline: &Deadline,
    ) -> Result<(), FetchError> {
        let output = self.git(&["fetch", "--tags", "origin"], Some(path), deadline)?;
        if !output.success {
            return Err(FetchError::Other(anyhow!(
                "git fetch failed: {}",
                output.stderr.trim()
            )));
        }

        // Branches must pin to the origin-qualified ref or the cached clone
        // never advances; tags and commits only resolve unqualified.
        let candidates: Vec<String> = match refspec {
            Some(r) => vec![format!("origin/{}", r), r.to_string()],
            None => vec!["origin/HEAD".to_string()],
        };

        let mut last_err = String::new();
        for candidate in &candidates {
            let output = self.git(&["reset", "--hard", candidate.as_str()], Some(path), deadline)?;
            if output.success {
                return Ok(());
            }
            last_err = output.stderr.trim().to_string();
        }

        Err(FetchError::Other(anyhow!(
            "could not pin {} to '{}': {}",
            path.display(),
            refspec.unwrap_or("HEAD"),
            last_err
        )))
    }
}

impl Backend for GitBackend {
    fn name(&self) -> &'static str {
        "git"
    }

    fn fetch(&self, request: &FetchRequest<'_>) -> Result<(), FetchError> {
        let url = request.source.strip_prefix("git+").unwrap_or(request.source);

        if let Some(v) = request.version {
            if v.starts_with(">=") {
                return Err(FetchError::Unsupported {
                    src: request.source.to_string(),
                    reason: "range constraints need an exact git ref".to_string(),
                });
            }
        }

        let deadline = Deadline::new(request.timeout);
        let repo = self.repo_path(url);

        if repo.exists() {
            self.update_repo(&repo, request.version, &deadline)?;
        } else {
            self.clone_repo(url, &repo, request.version, &deadline)?;
        }

        copy_dir(&repo, request.dest, &[".git", MARKER_FILE])?;
        Ok(())
    }
}
