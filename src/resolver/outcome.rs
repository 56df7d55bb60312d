//! Per-declaration outcomes and the run-level report.
//!
//! Every declaration ends in exactly one terminal status. Failures carry a
//! human-readable detail; the run report aggregates outcomes in declaration
//! order and is what gets rendered, persisted, and turned into an exit code.

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Terminal status of one declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolutionStatus {
    /// Fetched and promoted into place this run.
    Resolved,
    /// The target already satisfied the constraint; nothing fetched.
    AlreadyPresent,
    /// Fetch failed, promotion failed, or a prerequisite failed.
    Failed,
}

impl ResolutionStatus {
    /// Whether this status counts as success for the run.
    pub fn is_ok(self) -> bool {
        !matches!(self, ResolutionStatus::Failed)
    }

    /// Human-readable label for reports.
    pub fn label(self) -> &'static str {
        match self {
            ResolutionStatus::Resolved => "resolved",
            ResolutionStatus::AlreadyPresent => "already present",
            ResolutionStatus::Failed => "failed",
        }
    }
}

/// The result of resolving one declaration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Outcome {
    /// Declaration name.
    pub name: String,

    /// Normalized target subpath, empty when the target itself was invalid.
    pub target: String,

    pub status: ResolutionStatus,

    /// Failure reason; empty for successful outcomes.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub detail: String,
}

impl Outcome {
    pub fn resolved(name: &str, target: &str) -> Self {
        Self {
            name: name.to_string(),
            target: target.to_string(),
            status: ResolutionStatus::Resolved,
            detail: String::new(),
        }
    }

    pub fn already_present(name: &str, target: &str) -> Self {
        Self {
            name: name.to_string(),
            target: target.to_string(),
            status: ResolutionStatus::AlreadyPresent,
            detail: String::new(),
        }
    }

    pub fn failed(name: &str, target: &str, detail: impl Into<String>) -> Self {
        Self {
            name: name.to_string(),
            target: target.to_string(),
            status: ResolutionStatus::Failed,
            detail: detail.into(),
        }
    }

    /// Failure derived from a failed prerequisite. The wording is part of
    /// the report contract.
    pub fn blocked(name: &str, target: &str, prereq: &str) -> Self {
        Self::failed(name, target, format!("blocked by {}", prereq))
    }
}

/// Aggregated result of one resolve run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    /// Manifest document the run was parsed from.
    pub document: PathBuf,

    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,

    /// One outcome per declaration, in declaration order.
    pub outcomes: Vec<Outcome>,
}

impl RunReport {
    /// Whether every declaration ended `Resolved` or `AlreadyPresent`.
    pub fn success(&self) -> bool {
        self.outcomes.iter().all(|o| o.status.is_ok())
    }

    /// Outcomes with a given status.
    pub fn with_status(&self, status: ResolutionStatus) -> Vec<&Outcome> {
        self.outcomes
            .iter()
            .filter(|o| o.status == status)
            .collect()
    }

    /// Count of outcomes with a given status.
    pub fn count(&self, status: ResolutionStatus) -> usize {
        self.outcomes.iter().filter(|o| o.status == status).count()
    }

    /// Process exit code: 0 when the run succeeded, 1 otherwise.
    pub fn exit_code(&self) -> i32 {
        if self.success() {
            0
        } else {
            1
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report(outcomes: Vec<Outcome>) -> RunReport {
        RunReport {
            document: PathBuf::from("README.md"),
            started_at: Utc::now(),
            finished_at: Utc::now(),
            outcomes,
        }
    }

    #[test]
    fn resolved_and_present_are_ok() {
        assert!(ResolutionStatus::Resolved.is_ok());
        assert!(ResolutionStatus::AlreadyPresent.is_ok());
        assert!(!ResolutionStatus::Failed.is_ok());
    }

    #[test]
    fn blocked_outcome_carries_contractual_detail() {
        let outcome = Outcome::blocked("libbar", "vendor/libbar", "libfoo");
        assert_eq!(outcome.status, ResolutionStatus::Failed);
        assert_eq!(outcome.detail, "blocked by libfoo");
    }

    #[test]
    fn all_ok_report_succeeds_with_exit_zero() {
        let r = report(vec![
            Outcome::resolved("a", "vendor/a"),
            Outcome::already_present("b", "vendor/b"),
        ]);
        assert!(r.success());
        assert_eq!(r.exit_code(), 0);
    }

    #[test]
    fn one_failure_fails_the_run_with_exit_one() {
        let r = report(vec![
            Outcome::resolved("a", "vendor/a"),
            Outcome::failed("b", "vendor/b", "timeout"),
        ]);
        assert!(!r.success());
        assert_eq!(r.exit_code(), 1);
    }

    #[test]
    fn counts_group_by_status() {
        let r = report(vec![
            Outcome::resolved("a", "vendor/a"),
            Outcome::resolved("b", "vendor/b"),
            Outcome::failed("c", "vendor/c", "x"),
        ]);
        assert_eq!(r.count(ResolutionStatus::Resolved), 2);
        assert_eq!(r.count(ResolutionStatus::Failed), 1);
        assert_eq!(r.count(ResolutionStatus::AlreadyPresent), 0);
    }

    #[test]
    fn report_round_trips_through_json() {
        let r = report(vec![Outcome::failed("a", "vendor/a", "timeout")]);
        let json = serde_json::to_string(&r).unwrap();
        let back: RunReport = serde_json::from_str(&json).unwrap();
        assert_eq!(back.outcomes, r.outcomes);
    }

    #[test]
    fn empty_detail_is_omitted_from_json() {
        let json = serde_json::to_string(&Outcome::resolved("a", "vendor/a")).unwrap();
        assert!(!json.contains("detail"));
    }
}
