//! The mutable dependency graph over pending tests.

use super::test::TestId;
use std::collections::{BTreeMap, BTreeSet};

/// Maps each not-yet-started test to its remaining dependencies.
///
/// The key set is exactly the set of pending tests.  Value sets may mention
/// tests that have already finished (for instance after a failover resume);
/// callers treat such entries as satisfied via their own finish bookkeeping.
#[derive(Clone, Debug, Default)]
pub struct Graph {
    pending: BTreeMap<TestId, BTreeSet<TestId>>,
}

impl Graph {
    /// Constructs a graph from a dependency map.
    #[must_use]
    pub fn new(pending: BTreeMap<TestId, BTreeSet<TestId>>) -> Self {
        Self { pending }
    }

    /// Whether any tests are still pending.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Gets the number of pending tests.
    #[must_use]
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    /// Whether test `id` is still pending.
    #[must_use]
    pub fn contains(&self, id: TestId) -> bool {
        self.pending.contains_key(&id)
    }

    /// Gets the remaining dependencies of pending test `id`.
    #[must_use]
    pub fn remaining(&self, id: TestId) -> Option<&BTreeSet<TestId>> {
        self.pending.get(&id)
    }

    /// Removes test `id` from the pending set.  Its dependency entries in
    /// other tests' sets are untouched; use [Graph::release] for those.
    pub fn erase(&mut self, id: TestId) {
        self.pending.remove(&id);
    }

    /// Removes `id` from the remaining-dependency set of every pending test.
    /// Called when `id` finishes.
    pub fn release(&mut self, id: TestId) {
        for deps in self.pending.values_mut() {
            deps.remove(&id);
        }
    }

    /// Searches the graph for a dependency cycle, returning a test on the
    /// cycle if one exists.
    ///
    /// This is a depth-first traversal keeping the current ancestor set;
    /// ancestors are pushed on entry and popped on exit of each node, and
    /// fully-explored nodes are never revisited.  Edges that leave the
    /// pending set (dependencies already finished) are leaves.
    #[must_use]
    pub fn find_cycle(&self) -> Option<TestId> {
        let mut done = BTreeSet::new();
        for &root in self.pending.keys() {
            let mut ancestors = BTreeSet::new();
            if let Some(hit) = self.visit(root, &mut ancestors, &mut done) {
                return Some(hit);
            }
        }
        None
    }

    fn visit(
        &self,
        node: TestId,
        ancestors: &mut BTreeSet<TestId>,
        done: &mut BTreeSet<TestId>,
    ) -> Option<TestId> {
        if done.contains(&node) {
            return None;
        }
        ancestors.insert(node);
        if let Some(deps) = self.pending.get(&node) {
            for &dep in deps {
                if ancestors.contains(&dep) {
                    return Some(dep);
                }
                if let Some(hit) = self.visit(dep, ancestors, done) {
                    return Some(hit);
                }
            }
        }
        ancestors.remove(&node);
        done.insert(node);
        None
    }
}
