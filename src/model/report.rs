//! The [Report] type: the completion log of a finished run.

use super::{outcome::Outcome, test::TestId};
use serde::{Deserialize, Serialize};

/// A final report of a scheduling run.
///
/// Names land in `passed` and `failed` in completion order.  Tests removed
/// by a failover resume count towards `completed` but appear in neither
/// sequence, so `completed` may exceed `passed.len() + failed.len()`.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Report {
    /// The total number of tests configured for the run.
    pub total: usize,

    /// The number of tests accounted for so far (run, failed to start, or
    /// skipped by a failover resume).
    pub completed: usize,

    /// Names of tests that passed, in completion order.
    pub passed: Vec<String>,

    /// Names of tests that failed, in completion order.
    pub failed: Vec<String>,

    /// One record per test that actually ran (or failed to start).
    pub results: Vec<TestResult>,
}

impl Report {
    /// Constructs an empty report for `total` tests.
    #[must_use]
    pub fn new(total: usize) -> Self {
        Self {
            total,
            ..Self::default()
        }
    }

    /// Appends a result record, filing its name under the right sequence.
    pub fn push(&mut self, result: TestResult) {
        match result.outcome {
            Outcome::Passed => self.passed.push(result.name.clone()),
            Outcome::Failed => self.failed.push(result.name.clone()),
        }
        self.results.push(result);
    }

    /// Whether every test passed.
    #[must_use]
    pub fn all_passed(&self) -> bool {
        self.failed.is_empty()
    }
}

/// The record of one finished test.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TestResult {
    /// The test's id.
    pub id: TestId,
    /// The test's name.
    pub name: String,
    /// The verdict.
    pub outcome: Outcome,
    /// Wall-clock execution time, in seconds.  Zero for tests that never
    /// started.
    pub execution_time: f64,
}
