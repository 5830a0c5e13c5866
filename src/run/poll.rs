//! Polling the in-flight pool and retiring completions.

use super::Runner;
use crate::{
    exec::abs::{RunTest, Spawn},
    model::report::TestResult,
    persist,
};

impl<S: Spawn> Runner<S> {
    /// Polls every live handle once, retiring those that have exited in the
    /// order the poll found them.  Returns false when the pool is empty.
    pub(super) fn poll(&mut self) -> bool {
        if self.running.is_empty() {
            return false;
        }
        let mut live = Vec::new();
        let mut finished = Vec::new();
        for mut handle in std::mem::take(&mut self.running) {
            if handle.check_output() {
                live.push(handle);
            } else {
                finished.push(handle);
            }
        }
        self.running = live;
        for mut handle in finished {
            self.complete(&mut handle);
        }
        true
    }

    /// Books one finished test: verdict, dependency release, budget
    /// return, and the persisted completion trail.
    fn complete(&mut self, handle: &mut S::Test) {
        let id = handle.id();
        self.report.completed += 1;
        let outcome = handle.end_test(self.report.completed, self.report.total, true);
        let name = handle.properties().name.clone();
        let weight = self.budget.weight(handle.properties());
        let execution_time = handle.execution_time();

        self.graph.release(id);
        self.finished.insert(id);
        self.started.remove(&id);
        self.running_count -= weight;

        let checkpoint = persist::checkpoint::path(&self.binary_dir);
        if let Err(err) = persist::checkpoint::append(&checkpoint, id) {
            tracing::warn!("couldn't extend checkpoint for test {}: {}", id, err);
        }
        let costs = persist::cost::path(&self.binary_dir);
        if let Err(err) = persist::cost::append(&costs, id, execution_time) {
            tracing::warn!("couldn't record cost sample for test {}: {}", id, err);
        }

        self.report.push(TestResult {
            id,
            name,
            outcome,
            execution_time,
        });
    }
}
