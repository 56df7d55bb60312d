//! Configuration loading.
//!
//! Tether works without any configuration: every setting has a default that
//! matches the common layout (manifest in `README.md`, targets under
//! `vendor/`). An optional `.tether.yml` at the repository root overrides
//! those defaults. A missing file yields defaults; a file that exists but
//! does not parse is fatal, mirroring the manifest's fail-fast contract.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Result, TetherError};

/// Name of the optional configuration file at the repository root.
pub const CONFIG_FILE: &str = ".tether.yml";

/// Resolved configuration for a repository.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TetherConfig {
    /// Manifest document path, relative to the repository root.
    #[serde(default = "default_manifest")]
    pub manifest: PathBuf,

    /// Directory for declarations without an explicit target, relative to
    /// the repository root.
    #[serde(default = "default_vendor_dir")]
    pub vendor_dir: String,

    /// Per-fetch timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Default worker count for `resolve`. `None` means sequential.
    #[serde(default)]
    pub jobs: Option<usize>,

    /// Clone cache directory for git sources, relative to the repository
    /// root. Defaults to `.tether/clones`.
    #[serde(default)]
    pub clone_cache: Option<PathBuf>,
}

fn default_manifest() -> PathBuf {
    PathBuf::from("README.md")
}

fn default_vendor_dir() -> String {
    "vendor".to_string()
}

fn default_timeout_secs() -> u64 {
    300
}

impl Default for TetherConfig {
    fn default() -> Self {
        Self {
            manifest: default_manifest(),
            vendor_dir: default_vendor_dir(),
            timeout_secs: default_timeout_secs(),
            jobs: None,
            clone_cache: None,
        }
    }
}

impl TetherConfig {
    /// Load configuration for a repository root.
    ///
    /// A missing config file is not an error.
    pub fn load(repo_root: &Path) -> Result<Self> {
        let path = repo_root.join(CONFIG_FILE);
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&path)?;
        serde_yaml::from_str(&content).map_err(|e| TetherError::ConfigParse {
            path,
            message: e.to_string(),
        })
    }

    /// The clone cache directory, resolved against the repository root.
    pub fn clone_cache_dir(&self, repo_root: &Path) -> PathBuf {
        match &self.clone_cache {
            Some(dir) if dir.is_absolute() => dir.clone(),
            Some(dir) => repo_root.join(dir),
            None => repo_root.join(".tether").join("clones"),
        }
    }

    /// Starter configuration written by `tether init`.
    pub fn starter_yaml() -> &'static str {
        "\
# tether configuration (all fields optional)
#
# manifest: README.md        # document holding the dependency section
# vendor_dir: vendor         # default target directory for declarations
# timeout_secs: 300          # per-fetch timeout
# jobs: 4                    # parallel fetch workers
# clone_cache: .tether/clones

vendor_dir: vendor
"
    }
}
