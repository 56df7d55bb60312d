//! Run state persistence.
//!
//! Each resolve writes its report to `.tether/last-run.json` so that
//! `tether last` and post-mortem diagnostics can see what happened without
//! re-running anything. Persistence is best-effort: a repository that is
//! read-only should still resolve.

use std::fs;
use std::path::PathBuf;

use crate::error::{Result, TetherError};
use crate::resolver::RunReport;
use crate::workspace::Workspace;

/// File name of the persisted report, under the `.tether` state directory.
pub const LAST_RUN_FILE: &str = "last-run.json";

fn last_run_path(workspace: &Workspace) -> PathBuf {
    workspace.state_dir().join(LAST_RUN_FILE)
}

/// Persist a run report.
pub fn save_last_run(workspace: &Workspace, report: &RunReport) -> Result<()> {
    let path = last_run_path(workspace);
    fs::create_dir_all(workspace.state_dir())?;
    let json = serde_json::to_string_pretty(report).map_err(|e| TetherError::State {
        path: path.clone(),
        message: e.to_string(),
    })?;
    fs::write(&path, json)?;
    Ok(())
}

/// Load the most recent run report, if any.
pub fn load_last_run(workspace: &Workspace) -> Result<Option<RunReport>> {
    let path = last_run_path(workspace);
    if !path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(&path)?;
    let report = serde_json::from_str(&content).map_err(|e| TetherError::State {
        path,
        message: e.to_string(),
    })?;
    Ok(Some(report))
}
