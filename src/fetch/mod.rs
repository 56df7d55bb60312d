//! Fetch and presence capabilities.
//!
//! The resolver never touches the network or clones anything itself: it
//! talks to a [`Backend`], which answers two questions — is this dependency
//! already materialized, and can you stage its content. Concrete backends
//! cover local directories, git repositories, and zip archives.
//!
//! Backend selection is carried by an explicit [`BackendSet`] handed to the
//! resolver at construction time; there is no process-wide registry.
//!
//! # Modules
//!
//! - [`archive`] - Zip archive downloads
//! - [`filesystem`] - Local directory copies
//! - [`git`] - Git clones with a hashed clone cache
//! - [`process`] - Child processes with deadlines
//! - [`staging`] - Staging directories and atomic promotion

pub mod archive;
pub mod filesystem;
pub mod git;
pub mod process;
pub mod staging;

pub use archive::ArchiveBackend;
pub use filesystem::FsBackend;
pub use git::GitBackend;
pub use staging::Staging;

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;

use crate::version::Constraint;
use crate::workspace::marker;

/// Why a fetch failed. Per-declaration and non-fatal to the run.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The caller-supplied timeout expired.
    #[error("timeout")]
    Timeout,

    /// The backend cannot handle this source.
    #[error("unsupported source '{src}': {reason}")]
    Unsupported { src: String, reason: String },

    /// IO error wrapper.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic wrapped error for anyhow interop.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// One fetch: materialize `source` at `version` into the staging dir `dest`.
#[derive(Debug)]
pub struct FetchRequest<'a> {
    /// Source location from the declaration (URL or path).
    pub source: &'a str,

    /// Raw version constraint, if any (git backends use it as a ref).
    pub version: Option<&'a str>,

    /// Staging directory to populate. Exists and is empty.
    pub dest: &'a Path,

    /// Repository root, for resolving relative filesystem sources.
    pub base: &'a Path,

    /// Deadline for the whole fetch.
    pub timeout: Duration,
}

/// A pluggable fetch/presence capability.
pub trait Backend: Send + Sync {
    /// Short backend name for logs and reports.
    fn name(&self) -> &'static str;

    /// Whether `target_dir` already satisfies the constraint.
    ///
    /// The default is the marker-file check; backends with a cheaper or
    /// stricter notion of presence may override it.
    fn check_present(&self, target_dir: &Path, constraint: &Constraint) -> bool {
        marker::satisfies(target_dir, constraint)
    }

    /// Stage the dependency's content into `request.dest`.
    fn fetch(&self, request: &FetchRequest<'_>) -> Result<(), FetchError>;
}

/// Which backend a source string routes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    Git,
    Archive,
    Filesystem,
}

/// Classify a declaration's source location.
///
/// `git+` and `file://` prefixes force a backend; otherwise HTTP(S) URLs
/// ending in `.zip` are archives, other URLs and `.git`/scp-style locations
/// are git remotes, and anything else is a local path.
pub fn classify_source(source: &str) -> SourceKind {
    if source.starts_with("git+") {
        return SourceKind::Git;
    }
    if source.starts_with("file://") {
        return SourceKind::Filesystem;
    }

    let lower = source.to_ascii_lowercase();
    if lower.starts_with("http://") || lower.starts_with("https://") {
        if lower.ends_with(".zip") {
            SourceKind::Archive
        } else {
            SourceKind::Git
        }
    } else if lower.ends_with(".git") || source.starts_with("git@") || lower.starts_with("ssh://")
    {
        SourceKind::Git
    } else {
        SourceKind::Filesystem
    }
}

/// The capability set the resolver is constructed with.
#[derive(Clone)]
pub struct BackendSet {
    git: Arc<dyn Backend>,
    archive: Arc<dyn Backend>,
    filesystem: Arc<dyn Backend>,
}

impl BackendSet {
    /// The production set: git, archive, and filesystem backends.
    pub fn standard(clone_cache: PathBuf) -> Self {
        Self {
            git: Arc::new(GitBackend::new(clone_cache)),
            archive: Arc::new(ArchiveBackend::new()),
            filesystem: Arc::new(FsBackend::new()),
        }
    }

    /// A custom set, mainly for substituting backends in tests.
    pub fn custom(
        git: Arc<dyn Backend>,
        archive: Arc<dyn Backend>,
        filesystem: Arc<dyn Backend>,
    ) -> Self {
        Self {
            git,
            archive,
            filesystem,
        }
    }

    /// One backend for every source kind.
    pub fn uniform(backend: Arc<dyn Backend>) -> Self {
        Self {
            git: Arc::clone(&backend),
            archive: Arc::clone(&backend),
            filesystem: backend,
        }
    }

    /// The backend responsible for a source location.
    pub fn for_source(&self, source: &str) -> &dyn Backend {
        match classify_source(source) {
            SourceKind::Git => self.git.as_ref(),
            SourceKind::Archive => self.archive.as_ref(),
            SourceKind::Filesystem => self.filesystem.as_ref(),
        }
    }
}

impl std::fmt::Debug for BackendSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BackendSet")
            .field("git", &self.git.name())
            .field("archive", &self.archive.name())
            .field("filesystem", &self.filesystem.name())
            .finish()
    }
}
