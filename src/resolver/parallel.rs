//! Concurrent resolution.
//!
//! Prerequisite levels are barriers: a level only starts once the previous
//! one is fully decided. Within a level, declarations are grouped into lanes
//! keyed by their normalized target path and the lanes are drained by a
//! worker pool, so declarations sharing a target never run concurrently.
//! Progress events and outcome collection stay on the coordinating thread.

use std::collections::hash_map::Entry;
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::{mpsc, Mutex};
use std::thread;

use crate::manifest::Manifest;
use crate::resolver::engine::{ResolveProgress, Resolver};
use crate::resolver::graph::PrereqGraph;
use crate::resolver::outcome::{Outcome, ResolutionStatus};

enum WorkerEvent {
    Started(usize),
    Finished(Outcome),
}

pub(crate) fn resolve_levels(
    resolver: &Resolver,
    manifest: &Manifest,
    graph: &PrereqGraph,
    progress: &mut dyn FnMut(ResolveProgress<'_>),
) -> Vec<Outcome> {
    let decls = manifest.declarations();
    let total = decls.len();
    // Workers see an empty failed-set: everything blocked by a previous
    // level was already decided here on the coordinator.
    let empty: HashSet<String> = HashSet::new();
    let mut failed: HashSet<String> = HashSet::new();
    let mut outcomes: Vec<Outcome> = Vec::with_capacity(total);
    let mut position = 0usize;

    for level in graph.levels() {
        let mut lanes: Vec<Vec<usize>> = Vec::new();
        let mut lane_by_target: HashMap<String, usize> = HashMap::new();

        for index in level {
            let decl = &decls[index];

            if let Some(prereq) = decl.requires.iter().find(|r| failed.contains(r.as_str())) {
                let target = resolver.workspace().target_key(decl).unwrap_or_default();
                let outcome = Outcome::blocked(&decl.name, &target, prereq);
                failed.insert(decl.name.clone());
                progress(ResolveProgress::Finished { outcome: &outcome });
                outcomes.push(outcome);
                continue;
            }

            match resolver.workspace().target_key(decl) {
                Ok(key) => match lane_by_target.entry(key) {
                    Entry::Occupied(slot) => lanes[*slot.get()].push(index),
                    Entry::Vacant(slot) => {
                        slot.insert(lanes.len());
                        lanes.push(vec![index]);
                    }
                },
                Err(message) => {
                    let outcome = Outcome::failed(&decl.name, "", message);
                    failed.insert(decl.name.clone());
                    progress(ResolveProgress::Finished { outcome: &outcome });
                    outcomes.push(outcome);
                }
            }
        }

        if lanes.is_empty() {
            continue;
        }

        let workers = resolver.options().jobs.min(lanes.len()).max(1);
        let queue: Mutex<VecDeque<Vec<usize>>> = Mutex::new(lanes.into());
        let (tx, rx) = mpsc::channel::<WorkerEvent>();

        thread::scope(|scope| {
            for _ in 0..workers {
                let tx = tx.clone();
                let queue = &queue;
                let empty = &empty;
                scope.spawn(move || loop {
                    let lane = queue.lock().unwrap_or_else(|e| e.into_inner()).pop_front();
                    let Some(lane) = lane else { break };
                    for index in lane {
                        let decl = &decls[index];
                        let outcome = resolver.decide(decl, empty, || {
                            let _ = tx.send(WorkerEvent::Started(index));
                        });
                        let _ = tx.send(WorkerEvent::Finished(outcome));
                    }
                });
            }
            drop(tx);

            for event in rx {
                match event {
                    WorkerEvent::Started(index) => {
                        progress(ResolveProgress::Starting {
                            name: &decls[index].name,
                            index: position,
                            total,
                        });
                        position += 1;
                    }
                    WorkerEvent::Finished(outcome) => {
                        if outcome.status == ResolutionStatus::Failed {
                            failed.insert(outcome.name.clone());
                        }
                        progress(ResolveProgress::Finished { outcome: &outcome });
                        outcomes.push(outcome);
                    }
                }
            }
        });
    }

    outcomes
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::{Backend, BackendSet, FetchError, FetchRequest};
    use crate::manifest::parse_str;
    use crate::resolver::engine::ResolveOptions;
    use crate::workspace::Workspace;
    use std::path::Path;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;
    use tempfile::TempDir;

    /// Tracks the peak number of concurrently-running fetches.
    struct ConcurrencyProbe {
        current: AtomicUsize,
        peak: AtomicUsize,
    }

    impl ConcurrencyProbe {
        fn new() -> Arc<Self> {
            Arc::new(Self {
                current: AtomicUsize::new(0),
                peak: AtomicUsize::new(0),
            })
        }
    }

    impl Backend for ConcurrencyProbe {
        fn name(&self) -> &'static str {
            "probe"
        }

        fn fetch(&self, request: &FetchRequest<'_>) -> Result<(), FetchError> {
            let now = self.current.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(now, Ordering::SeqCst);
            std::thread::sleep(Duration::from_millis(20));
            std::fs::write(request.dest.join("content"), request.source)?;
            self.current.fetch_sub(1, Ordering::SeqCst);
            Ok(())
        }
    }

    fn run(section: &str, jobs: usize, backend: Arc<dyn Backend>) -> Vec<Outcome> {
        let temp = TempDir::new().unwrap();
        let manifest = parse_str(
            &format!("## Dependencies\n{}", section),
            Path::new("README.md"),
        )
        .unwrap();
        let resolver = Resolver::new(
            Workspace::new(temp.path(), "vendor"),
            BackendSet::uniform(backend),
            ResolveOptions {
                timeout: Duration::from_secs(5),
                jobs,
            },
        );
        resolver.resolve(&manifest).outcomes
    }

    #[test]
    fn independent_declarations_run_concurrently() {
        let probe = ConcurrencyProbe::new();
        let outcomes = run(
            "a https://example/a\n\
             b https://example/b\n\
             c https://example/c\n\
             d https://example/d\n",
            4,
            Arc::clone(&probe) as Arc<dyn Backend>,
        );

        assert!(outcomes.iter().all(|o| o.status.is_ok()));
        assert!(probe.peak.load(Ordering::SeqCst) > 1);
    }

    #[test]
    fn shared_target_declarations_never_overlap() {
        let probe = ConcurrencyProbe::new();
        let outcomes = run(
            "a https://example/a - shared/dir\n\
             b https://example/b - shared/dir\n",
            4,
            Arc::clone(&probe) as Arc<dyn Backend>,
        );

        assert_eq!(outcomes.len(), 2);
        assert!(outcomes.iter().all(|o| o.status.is_ok()));
        assert_eq!(probe.peak.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn every_declaration_gets_an_outcome() {
        let probe = ConcurrencyProbe::new();
        let outcomes = run(
            "a https://example/a\n\
             b https://example/b - - a\n\
             c https://example/c - - a\n",
            2,
            probe as Arc<dyn Backend>,
        );
        assert_eq!(outcomes.len(), 3);
    }
}
