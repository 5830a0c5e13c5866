//! The property store: immutable per-test facts, keyed by [TestId].

use super::test::{TestId, TestProperties};
use crate::err;
use std::collections::BTreeMap;

/// Holds the properties of every test in the run.
///
/// The store is filled once at configuration time.  Afterwards it is only
/// touched in two places: cost hydration from the persisted history, and
/// removal of tests a failover checkpoint records as already done.
#[derive(Clone, Debug, Default)]
pub struct Store {
    props: BTreeMap<TestId, TestProperties>,
}

impl Store {
    /// Constructs a store from a ready-made property map.
    #[must_use]
    pub fn new(props: BTreeMap<TestId, TestProperties>) -> Self {
        Self { props }
    }

    /// Gets the properties of the test with id `id`.
    ///
    /// # Errors
    ///
    /// Fails with [err::Error::UnknownTest] if the store has no such test.
    pub fn get(&self, id: TestId) -> err::Result<&TestProperties> {
        self.props.get(&id).ok_or(err::Error::UnknownTest(id))
    }

    /// Whether the store knows the test with id `id`.
    #[must_use]
    pub fn contains(&self, id: TestId) -> bool {
        self.props.contains_key(&id)
    }

    /// Iterates over ids in the store, in ascending order.
    pub fn ids(&self) -> impl Iterator<Item = TestId> + '_ {
        self.props.keys().copied()
    }

    /// Iterates over (id, properties) pairs in ascending id order.
    pub fn iter(&self) -> impl Iterator<Item = (TestId, &TestProperties)> {
        self.props.iter().map(|(k, v)| (*k, v))
    }

    /// Gets the highest id in the store, or id 0 if the store is empty.
    #[must_use]
    pub fn max_id(&self) -> TestId {
        self.props.keys().next_back().copied().unwrap_or(TestId(0))
    }

    /// Gets the number of tests in the store.
    #[must_use]
    pub fn len(&self) -> usize {
        self.props.len()
    }

    /// Whether the store is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.props.is_empty()
    }

    /// Sets the cost of test `id` to `cost`, but only if its configured cost
    /// is zero.  Unknown ids are ignored; persisted history may mention
    /// tests that no longer exist.
    pub fn hydrate_cost(&mut self, id: TestId, cost: f64) {
        if let Some(p) = self.props.get_mut(&id) {
            if p.cost == 0.0 {
                p.cost = cost;
            }
        }
    }

    /// Removes test `id` from the store, returning its properties if it was
    /// present.  Used when a failover checkpoint marks the test as done.
    pub fn remove(&mut self, id: TestId) -> Option<TestProperties> {
        self.props.remove(&id)
    }
}
