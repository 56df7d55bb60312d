//! Prerequisite ordering.
//!
//! Built from an already-validated manifest (names unique, prerequisites
//! known, no cycles), so ordering here cannot fail. Declaration order is
//! preserved wherever prerequisites allow: the topological sort breaks ties
//! by declaration index.

use std::collections::BTreeSet;

use crate::manifest::Manifest;

/// Prerequisite relationships between declarations, by declaration index.
#[derive(Debug)]
pub struct PrereqGraph {
    /// Direct prerequisites of each declaration.
    requires: Vec<Vec<usize>>,
    /// Declarations that list each declaration as a prerequisite.
    dependents: Vec<Vec<usize>>,
}

impl PrereqGraph {
    pub fn from_manifest(manifest: &Manifest) -> Self {
        let decls = manifest.declarations();
        let mut requires = vec![Vec::new(); decls.len()];
        let mut dependents = vec![Vec::new(); decls.len()];

        for (i, decl) in decls.iter().enumerate() {
            for prereq in &decl.requires {
                // validated at parse time
                if let Some(j) = manifest.index_of(prereq) {
                    requires[i].push(j);
                    dependents[j].push(i);
                }
            }
        }

        Self {
            requires,
            dependents,
        }
    }

    pub fn len(&self) -> usize {
        self.requires.len()
    }

    pub fn is_empty(&self) -> bool {
        self.requires.is_empty()
    }

    /// Direct prerequisites of a declaration.
    pub fn requires_of(&self, index: usize) -> &[usize] {
        &self.requires[index]
    }

    /// Declaration indices in a stable topological order: prerequisites
    /// first, file order among whatever is ready.
    pub fn stable_topological_order(&self) -> Vec<usize> {
        let mut in_degree: Vec<usize> = self.requires.iter().map(Vec::len).collect();
        let mut ready: BTreeSet<usize> = in_degree
            .iter()
            .enumerate()
            .filter(|(_, &d)| d == 0)
            .map(|(i, _)| i)
            .collect();

        let mut order = Vec::with_capacity(self.len());
        while let Some(&next) = ready.iter().next() {
            ready.remove(&next);
            order.push(next);
            for &dependent in &self.dependents[next] {
                in_degree[dependent] -= 1;
                if in_degree[dependent] == 0 {
                    ready.insert(dependent);
                }
            }
        }
        order
    }

    /// Groups of declarations whose prerequisites are satisfied by all
    /// previous groups. Groups are barriers for the concurrent mode; within
    /// a group, members are mutually independent and listed in file order.
    pub fn levels(&self) -> Vec<Vec<usize>> {
        let mut levels: Vec<Vec<usize>> = Vec::new();
        let mut placed = vec![false; self.len()];
        let mut placed_count = 0;

        while placed_count < self.len() {
            let ready: Vec<usize> = (0..self.len())
                .filter(|&i| !placed[i])
                .filter(|&i| self.requires[i].iter().all(|&p| placed[p]))
                .collect();

            if ready.is_empty() {
                break;
            }
            for &i in &ready {
                placed[i] = true;
            }
            placed_count += ready.len();
            levels.push(ready);
        }

        levels
    }
}
