//! Zip archive backend.
//!
//! Downloads a `.zip` source over HTTP(S) and extracts it into staging.
//! Archives with a single top-level directory (the GitHub/GitLab export
//! layout) are flattened so the target holds the tree itself.

use std::fs;
use std::io::Cursor;
use std::path::Path;

use anyhow::{anyhow, Context};

use crate::fetch::{Backend, FetchError, FetchRequest};

/// Fetches zip archives over HTTP/HTTPS.
#[derive(Debug, Default)]
pub struct ArchiveBackend;

impl ArchiveBackend {
    pub fn new() -> Self {
        Self
    }
}

impl Backend for ArchiveBackend {
    fn name(&self) -> &'static str {
        "archive"
    }

    fn fetch(&self, request: &FetchRequest<'_>) -> Result<(), FetchError> {
        let client = reqwest::blocking::Client::builder()
            .user_agent(concat!("tether/", env!("CARGO_PKG_VERSION")))
            .timeout(request.timeout)
            .build()
            .context("failed to build HTTP client")?;

        let response = client.get(request.source).send().map_err(map_reqwest)?;
        if !response.status().is_success() {
            return Err(FetchError::Other(anyhow!(
                "HTTP {} fetching {}",
                response.status(),
                request.source
            )));
        }

        let bytes = response.bytes().map_err(map_reqwest)?;

        let mut archive = zip::ZipArchive::new(Cursor::new(bytes.as_ref()))
            .with_context(|| format!("invalid zip archive from {}", request.source))?;
        archive
            .extract(request.dest)
            .with_context(|| format!("failed to extract archive from {}", request.source))?;

        flatten_single_root(request.dest)?;
        Ok(())
    }
}

fn map_reqwest(e: reqwest::Error) -> FetchError {
    if e.is_timeout() {
        FetchError::Timeout
    } else {
        FetchError::Other(e.into())
    }
}

/// If extraction produced exactly one top-level directory, hoist its
/// contents so the staged tree starts at the content root.
fn flatten_single_root(dest: &Path) -> std::io::Result<()> {
    let entries: Vec<_> = fs::read_dir(dest)?.collect::<Result<_, _>>()?;
    if entries.len() != 1 {
        return Ok(());
    }
    let root = &entries[0];
    if !root.file_type()?.is_dir() {
        return Ok(());
    }

    let root_path = root.path();
    for child in fs::read_dir(&root_path)? {
        let child = child?;
        fs::rename(child.path(), dest.join(child.file_name()))?;
    }
    fs::remove_dir(root_path)
}
