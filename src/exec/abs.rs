//! The abstract execution API.
//!
//! The scheduler drives tests through a narrow handle contract; everything
//! about how a test actually runs lives behind these traits.

use crate::model::{Outcome, TestId, TestProperties};

/// Trait of live handles to one dispatched test.
pub trait RunTest {
    /// Gets the id of the test this handle runs.
    fn id(&self) -> TestId;

    /// Gets the properties of the test this handle runs.
    fn properties(&self) -> &TestProperties;

    /// Attempts to launch the test; `total` is the number of tests in the
    /// run, for progress display.  Returns false if the test could not
    /// start.  A failed start is final: the handle will not be started
    /// again.
    fn start(&mut self, total: usize) -> bool;

    /// Pumps any pending output from the test.  Returns true while the test
    /// is still live; once it returns false the test has exited and its
    /// execution time is known.  May block briefly waiting for output.
    fn check_output(&mut self) -> bool;

    /// Concludes the test and reports its verdict.  `started` is false when
    /// [RunTest::start] failed, in which case the verdict is a failure.
    fn end_test(&mut self, completed: usize, total: usize, started: bool) -> Outcome;

    /// Gets the test's wall-clock execution time in seconds.  Meaningful
    /// once the test has exited; zero if it never started.
    fn execution_time(&self) -> f64;
}

/// Trait of factories that create run handles.
pub trait Spawn {
    /// The type of handle this factory creates.
    type Test: RunTest;

    /// Receives the highest test id of the run, before any dispatch.
    /// Implementations typically use it to size the id column of their
    /// progress output.
    fn set_max_id(&mut self, _max: TestId) {}

    /// Creates a (not yet started) handle for the test `id`.
    fn spawn(&mut self, id: TestId, props: &TestProperties) -> Self::Test;
}
