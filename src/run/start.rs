//! Dispatch: choosing and starting runnable tests.

use super::Runner;
use crate::{
    err,
    exec::abs::{RunTest, Spawn},
    model::{report::TestResult, TestId},
};
use rand::seq::SliceRandom;

impl<S: Spawn> Runner<S> {
    /// Starts as many tests as the current budget allows, walking cost
    /// buckets in descending order.
    ///
    /// The walk aborts as soon as a candidate doesn't fit the remaining
    /// budget: a later completion will free budget and re-enable the
    /// expensive candidate, preserving the high-cost-first bias.
    pub(super) fn start_next_tests(&mut self) -> err::Result<()> {
        if self.halt.is_raised() {
            return Ok(());
        }
        let mut slots = self.budget.level() - self.running_count;
        if slots == 0 {
            return Ok(());
        }
        for id in self.candidates() {
            // A candidate may already be underway: dependency-driven
            // launches start tests out of bucket order.
            if self.started.contains(&id) || self.finished.contains(&id) {
                continue;
            }
            let weight = self.budget.weight(self.store.get(id)?);
            if weight > slots {
                return Ok(());
            }
            if self.try_start(id)? {
                slots -= weight;
            } else {
                tracing::debug!("test {} did not start, waiting on dependencies", id);
            }
            if slots == 0 {
                return Ok(());
            }
        }
        Ok(())
    }

    /// Snapshots the pending tests in dispatch-preference order.
    fn candidates(&self) -> Vec<TestId> {
        let mut out: Vec<TestId> = self
            .costs
            .descending()
            .flat_map(|(_, bucket)| bucket.iter().copied())
            .collect();
        if self.shuffle {
            out.shuffle(&mut rand::thread_rng());
        }
        out
    }

    /// Tries to start `id`, or failing that, the first unfinished
    /// dependency on its path to readiness.  At most one test starts per
    /// call.  Returns whether a start was attempted.
    fn try_start(&mut self, id: TestId) -> err::Result<bool> {
        // Walk a snapshot: completions edit the live set underneath us.
        let deps: Vec<TestId> = self
            .graph
            .remaining(id)
            .map(|d| d.iter().copied().collect())
            .unwrap_or_default();
        let mut unmet = deps.len();
        for dep in deps {
            if self.started.contains(&dep) {
                continue;
            }
            if self.finished.contains(&dep) {
                unmet -= 1;
                continue;
            }
            return self.try_start(dep);
        }
        if unmet == 0 {
            self.start_test_process(id)?;
            return Ok(true);
        }
        Ok(false)
    }

    /// Moves `id` out of the pending structures and launches its handle.
    ///
    /// A handle that fails to start becomes an immediate failure
    /// completion; the run carries on.
    fn start_test_process(&mut self, id: TestId) -> err::Result<()> {
        self.started.insert(id);
        self.graph.erase(id);
        self.costs.remove(id);

        let props = self.store.get(id)?.clone();
        let weight = self.budget.weight(&props);
        let mut handle = self.spawner.spawn(id, &props);
        if handle.start(self.report.total) {
            self.running_count += weight;
            self.running.push(handle);
        } else {
            self.report.completed += 1;
            self.started.remove(&id);
            self.finished.insert(id);
            let outcome = handle.end_test(self.report.completed, self.report.total, false);
            self.report.push(TestResult {
                id,
                name: props.name,
                outcome,
                execution_time: handle.execution_time(),
            });
        }
        Ok(())
    }
}
