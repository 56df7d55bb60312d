//! Resolution engine.
//!
//! Walks the manifest in prerequisite-respecting declaration order. Each
//! declaration gets a presence check first, then a staged fetch and an
//! atomic promotion. Failures are collected into outcomes rather than
//! raised, so one broken dependency never hides the state of the others.

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;

use crate::fetch::{BackendSet, FetchRequest, Staging};
use crate::manifest::{Declaration, Manifest};
use crate::resolver::graph::PrereqGraph;
use crate::resolver::outcome::{Outcome, ResolutionStatus, RunReport};
use crate::resolver::parallel;
use crate::version::Constraint;
use crate::workspace::Workspace;

/// Tuning for a resolve run.
#[derive(Debug, Clone)]
pub struct ResolveOptions {
    /// Per-fetch timeout handed to backends.
    pub timeout: Duration,

    /// Worker count; 1 resolves sequentially in declaration order.
    pub jobs: usize,
}

impl Default for ResolveOptions {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(300),
            jobs: 1,
        }
    }
}

/// Progress events emitted during a run.
#[derive(Debug)]
pub enum ResolveProgress<'a> {
    /// A declaration is about to fetch (not emitted for blocked ones).
    Starting {
        name: &'a str,
        index: usize,
        total: usize,
    },
    /// A declaration reached a terminal status.
    Finished { outcome: &'a Outcome },
}

/// Resolves a manifest against a workspace through a set of backends.
pub struct Resolver {
    workspace: Workspace,
    backends: BackendSet,
    options: ResolveOptions,
    cancel: Arc<AtomicBool>,
}

impl Resolver {
    pub fn new(workspace: Workspace, backends: BackendSet, options: ResolveOptions) -> Self {
        Self {
            workspace,
            backends,
            options,
            cancel: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn workspace(&self) -> &Workspace {
        &self.workspace
    }

    pub fn options(&self) -> &ResolveOptions {
        &self.options
    }

    /// Flag a signal handler can set to stop the run between declarations.
    /// In-flight work either completes its promotion or discards staging;
    /// already-promoted dependencies are left complete.
    pub fn cancel_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.cancel)
    }

    pub(crate) fn cancelled(&self) -> bool {
        self.cancel.load(Ordering::SeqCst)
    }

    /// Resolve every declaration, reporting nothing along the way.
    pub fn resolve(&self, manifest: &Manifest) -> RunReport {
        self.resolve_with_progress(manifest, &mut |_| {})
    }

    /// Resolve every declaration, emitting progress events.
    ///
    /// The report lists outcomes in declaration order regardless of the
    /// order work actually ran in.
    pub fn resolve_with_progress(
        &self,
        manifest: &Manifest,
        progress: &mut dyn FnMut(ResolveProgress<'_>),
    ) -> RunReport {
        let started_at = Utc::now();
        let graph = PrereqGraph::from_manifest(manifest);

        let mut outcomes = if self.options.jobs > 1 {
            parallel::resolve_levels(self, manifest, &graph, progress)
        } else {
            self.resolve_sequential(manifest, &graph, progress)
        };

        outcomes.sort_by_key(|o| manifest.index_of(&o.name).unwrap_or(usize::MAX));

        RunReport {
            document: manifest.document().to_path_buf(),
            started_at,
            finished_at: Utc::now(),
            outcomes,
        }
    }

    fn resolve_sequential(
        &self,
        manifest: &Manifest,
        graph: &PrereqGraph,
        progress: &mut dyn FnMut(ResolveProgress<'_>),
    ) -> Vec<Outcome> {
        let decls = manifest.declarations();
        let total = decls.len();
        let mut failed: HashSet<String> = HashSet::new();
        let mut outcomes = Vec::with_capacity(total);

        for (position, index) in graph.stable_topological_order().into_iter().enumerate() {
            let decl = &decls[index];
            let outcome = self.decide(decl, &failed, || {
                progress(ResolveProgress::Starting {
                    name: &decl.name,
                    index: position,
                    total,
                });
            });

            if outcome.status == ResolutionStatus::Failed {
                failed.insert(decl.name.clone());
            }
            progress(ResolveProgress::Finished { outcome: &outcome });
            outcomes.push(outcome);
        }
        outcomes
    }

    /// Route one declaration through the per-dependency state machine:
    /// cancelled and blocked short-circuit without touching the backend.
    pub(crate) fn decide(
        &self,
        decl: &Declaration,
        failed: &HashSet<String>,
        on_start: impl FnOnce(),
    ) -> Outcome {
        let target = match self.workspace.target_key(decl) {
            Ok(key) => key,
            Err(message) => return Outcome::failed(&decl.name, "", message),
        };

        if self.cancelled() {
            return Outcome::failed(&decl.name, &target, "cancelled");
        }
        if let Some(prereq) = decl.requires.iter().find(|r| failed.contains(r.as_str())) {
            tracing::debug!(name = %decl.name, prereq = %prereq, "short-circuited by failed prerequisite");
            return Outcome::blocked(&decl.name, &target, prereq);
        }

        on_start();
        self.resolve_one(decl, &target)
    }

    fn resolve_one(&self, decl: &Declaration, target: &str) -> Outcome {
        let target_dir = self.workspace.root().join(target);
        let constraint = Constraint::parse(decl.version.as_deref());
        let backend = self.backends.for_source(&decl.source);

        if backend.check_present(&target_dir, &constraint) {
            tracing::debug!(name = %decl.name, target = %target, "already present");
            return Outcome::already_present(&decl.name, target);
        }

        tracing::info!(
            name = %decl.name,
            source = %decl.source,
            backend = backend.name(),
            "fetching"
        );

        let staging = match Staging::create(&self.workspace.staging_root(), &decl.name) {
            Ok(staging) => staging,
            Err(e) => {
                return Outcome::failed(&decl.name, target, format!("failed to stage: {}", e))
            }
        };

        let request = FetchRequest {
            source: &decl.source,
            version: decl.version.as_deref(),
            dest: staging.path(),
            base: self.workspace.root(),
            timeout: self.options.timeout,
        };

        match backend.fetch(&request) {
            Ok(()) => match staging.promote(&target_dir, decl.version.as_deref()) {
                Ok(()) => Outcome::resolved(&decl.name, target),
                Err(e) => Outcome::failed(
                    &decl.name,
                    target,
                    format!("failed to promote into place: {}", e),
                ),
            },
            Err(e) => {
                tracing::warn!(name = %decl.name, error = %e, "fetch failed");
                Outcome::failed(&decl.name, target, e.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::{Backend, FetchError};
    use crate::manifest::parse_str;
    use std::fs;
    use std::path::Path;
    use std::sync::Mutex;
    use tempfile::TempDir;

    /// Backend that materializes a single file, failing (or timing out) for
    /// configured declaration sources, and records every fetch it was asked
    /// to perform.
    struct ScriptedBackend {
        fail_sources: Vec<String>,
        fetched: Mutex<Vec<String>>,
    }

    impl ScriptedBackend {
        fn new(fail_sources: &[&str]) -> Arc<Self> {
            Arc::new(Self {
                fail_sources: fail_sources.iter().map(|s| s.to_string()).collect(),
                fetched: Mutex::new(Vec::new()),
            })
        }

        fn fetched(&self) -> Vec<String> {
            self.fetched.lock().unwrap().clone()
        }
    }

    impl Backend for ScriptedBackend {
        fn name(&self) -> &'static str {
            "scripted"
        }

        fn fetch(&self, request: &FetchRequest<'_>) -> Result<(), FetchError> {
            self.fetched.lock().unwrap().push(request.source.to_string());
            if self.fail_sources.iter().any(|s| s == request.source) {
                return Err(FetchError::Timeout);
            }
            fs::write(request.dest.join("content"), request.source)?;
            Ok(())
        }
    }

    fn manifest(section: &str) -> Manifest {
        parse_str(
            &format!("## Dependencies\n{}", section),
            Path::new("README.md"),
        )
        .unwrap()
    }

    fn resolver(temp: &TempDir, backend: Arc<ScriptedBackend>, jobs: usize) -> Resolver {
        Resolver::new(
            Workspace::new(temp.path(), "vendor"),
            BackendSet::uniform(backend),
            ResolveOptions {
                timeout: Duration::from_secs(5),
                jobs,
            },
        )
    }

    #[test]
    fn resolves_declarations_in_order() {
        let temp = TempDir::new().unwrap();
        let backend = ScriptedBackend::new(&[]);
        let r = resolver(&temp, Arc::clone(&backend), 1);

        let report = r.resolve(&manifest(
            "libfoo https://example/libfoo v1.2 vendor/libfoo\n\
             libbar https://example/libbar - vendor/libbar\n",
        ));

        assert!(report.success());
        assert_eq!(report.outcomes.len(), 2);
        assert!(report
            .outcomes
            .iter()
            .all(|o| o.status == ResolutionStatus::Resolved));
        assert!(temp.path().join("vendor/libfoo/content").exists());
        assert!(temp.path().join("vendor/libbar/content").exists());
        assert_eq!(
            backend.fetched(),
            vec!["https://example/libfoo", "https://example/libbar"]
        );
    }

    #[test]
    fn second_run_is_already_present() {
        let temp = TempDir::new().unwrap();
        let backend = ScriptedBackend::new(&[]);
        let r = resolver(&temp, Arc::clone(&backend), 1);
        let m = manifest("libfoo https://example/libfoo v1.2\n");

        assert!(r.resolve(&m).success());
        let second = r.resolve(&m);

        assert_eq!(second.count(ResolutionStatus::AlreadyPresent), 1);
        // only the first run fetched
        assert_eq!(backend.fetched().len(), 1);
    }

    #[test]
    fn independent_failure_does_not_spread() {
        let temp = TempDir::new().unwrap();
        let backend = ScriptedBackend::new(&["https://example/b"]);
        let r = resolver(&temp, backend, 1);

        let report = r.resolve(&manifest(
            "a https://example/a\n\
             b https://example/b\n\
             c https://example/c\n",
        ));

        let statuses: Vec<ResolutionStatus> =
            report.outcomes.iter().map(|o| o.status).collect();
        assert_eq!(
            statuses,
            vec![
                ResolutionStatus::Resolved,
                ResolutionStatus::Failed,
                ResolutionStatus::Resolved
            ]
        );
        assert_eq!(report.outcomes[1].detail, "timeout");
    }

    #[test]
    fn failed_prerequisite_blocks_dependent_without_fetching() {
        let temp = TempDir::new().unwrap();
        let backend = ScriptedBackend::new(&["https://example/a"]);
        let r = resolver(&temp, Arc::clone(&backend), 1);

        let report = r.resolve(&manifest(
            "a https://example/a\n\
             b https://example/b - - a\n",
        ));

        assert_eq!(report.outcomes[1].status, ResolutionStatus::Failed);
        assert_eq!(report.outcomes[1].detail, "blocked by a");
        // b's fetch was never invoked
        assert_eq!(backend.fetched(), vec!["https://example/a"]);
    }

    #[test]
    fn blocking_is_transitive() {
        let temp = TempDir::new().unwrap();
        let backend = ScriptedBackend::new(&["https://example/a"]);
        let r = resolver(&temp, backend, 1);

        let report = r.resolve(&manifest(
            "a https://example/a\n\
             b https://example/b - - a\n\
             c https://example/c - - b\n",
        ));

        assert_eq!(report.outcomes[2].detail, "blocked by b");
    }

    #[test]
    fn out_of_order_prerequisite_is_resolved_first() {
        let temp = TempDir::new().unwrap();
        let backend = ScriptedBackend::new(&[]);
        let r = resolver(&temp, Arc::clone(&backend), 1);

        let report = r.resolve(&manifest(
            "b https://example/b - - a\n\
             a https://example/a\n",
        ));

        assert!(report.success());
        assert_eq!(
            backend.fetched(),
            vec!["https://example/a", "https://example/b"]
        );
        // report stays in declaration order
        assert_eq!(report.outcomes[0].name, "b");
        assert_eq!(report.outcomes[1].name, "a");
    }

    #[test]
    fn invalid_target_fails_that_declaration_only() {
        let temp = TempDir::new().unwrap();
        let backend = ScriptedBackend::new(&[]);
        let r = resolver(&temp, backend, 1);

        let report = r.resolve(&manifest(
            "evil https://example/evil - ../outside\n\
             good https://example/good\n",
        ));

        assert_eq!(report.outcomes[0].status, ResolutionStatus::Failed);
        assert!(report.outcomes[0].detail.contains("escapes"));
        assert_eq!(report.outcomes[1].status, ResolutionStatus::Resolved);
    }

    #[test]
    fn cancelled_run_keeps_completed_work() {
        let temp = TempDir::new().unwrap();
        let backend = ScriptedBackend::new(&[]);
        let r = resolver(&temp, Arc::clone(&backend), 1);
        r.cancel_flag().store(true, Ordering::SeqCst);

        let report = r.resolve(&manifest("a https://example/a\n"));

        assert_eq!(report.outcomes[0].detail, "cancelled");
        assert!(backend.fetched().is_empty());
    }

    #[test]
    fn progress_events_cover_fetched_declarations() {
        let temp = TempDir::new().unwrap();
        let backend = ScriptedBackend::new(&["https://example/a"]);
        let r = resolver(&temp, backend, 1);

        let mut started = Vec::new();
        let mut finished = Vec::new();
        r.resolve_with_progress(
            &manifest(
                "a https://example/a\n\
                 b https://example/b - - a\n",
            ),
            &mut |event| match event {
                ResolveProgress::Starting { name, .. } => started.push(name.to_string()),
                ResolveProgress::Finished { outcome } => finished.push(outcome.name.clone()),
            },
        );

        // blocked declarations never start, but always finish
        assert_eq!(started, vec!["a"]);
        assert_eq!(finished, vec!["a", "b"]);
    }

    #[test]
    fn parallel_mode_matches_sequential_results() {
        let temp = TempDir::new().unwrap();
        let backend = ScriptedBackend::new(&["https://example/b"]);
        let r = resolver(&temp, backend, 4);

        let report = r.resolve(&manifest(
            "a https://example/a\n\
             b https://example/b\n\
             c https://example/c\n\
             d https://example/d - - b\n",
        ));

        assert_eq!(report.outcomes[0].status, ResolutionStatus::Resolved);
        assert_eq!(report.outcomes[1].status, ResolutionStatus::Failed);
        assert_eq!(report.outcomes[2].status, ResolutionStatus::Resolved);
        assert_eq!(report.outcomes[3].detail, "blocked by b");
    }
}
