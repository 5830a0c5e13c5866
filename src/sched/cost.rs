//! The cost-priority index: pending tests grouped by cost bucket.

use crate::model::TestId;
use std::{
    cmp::Ordering,
    collections::{BTreeMap, BTreeSet},
    fmt,
};

/// A test cost usable as an ordered map key.
///
/// Costs are non-negative reals; wrapping them gives the bucket map a total
/// order.
///
/// # Examples
///
/// ```
/// use testudo::sched::Cost;
/// assert!(Cost::new(2.5) < Cost::new(10.0));
/// assert_eq!(Cost::new(1.0), Cost::new(1.0));
/// ```
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Cost(f64);

impl Cost {
    /// Wraps a raw cost value.
    #[must_use]
    pub fn new(value: f64) -> Self {
        Self(value)
    }

    /// Gets the raw cost value.
    #[must_use]
    pub fn value(self) -> f64 {
        self.0
    }
}

impl Eq for Cost {}

impl Ord for Cost {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

impl PartialOrd for Cost {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Cost {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Groups pending tests by their cost, for descending-cost dispatch.
///
/// Within one bucket the member order is an implementation detail; callers
/// must not rely on it.  Buckets emptied by removal may linger; iteration
/// tolerates them.
#[derive(Clone, Debug, Default)]
pub struct Index {
    buckets: BTreeMap<Cost, BTreeSet<TestId>>,
}

impl Index {
    /// Constructs an empty index.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts test `id` under the bucket for `cost`.
    pub fn insert(&mut self, cost: f64, id: TestId) {
        self.buckets.entry(Cost::new(cost)).or_default().insert(id);
    }

    /// Removes test `id` from whichever bucket holds it.
    pub fn remove(&mut self, id: TestId) {
        for members in self.buckets.values_mut() {
            if members.remove(&id) {
                return;
            }
        }
    }

    /// Iterates over buckets in descending cost order.
    pub fn descending(&self) -> impl Iterator<Item = (Cost, &BTreeSet<TestId>)> {
        self.buckets.iter().rev().map(|(c, m)| (*c, m))
    }

    /// Counts members across all buckets.
    #[must_use]
    pub fn len(&self) -> usize {
        self.buckets.values().map(BTreeSet::len).sum()
    }

    /// Whether the index holds no tests.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
