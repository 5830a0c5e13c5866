//! The scheduling engine: dispatch, polling, and the main loop.
//!
//! A [Runner] owns every moving part of one run: the property store, the
//! dependency graph, the cost-priority index, the in-flight handle pool,
//! and the persistence paths.  Construction goes through [Builder]; the
//! consuming [Runner::run] drives the whole schedule and returns the final
//! [Report].

use crate::{
    err,
    exec::abs::Spawn,
    model::{Graph, Report, Store, TestId},
    persist,
    sched::{self, Budget},
    ux,
};
use std::{
    collections::{BTreeMap, BTreeSet},
    io,
    path::PathBuf,
};

pub mod halt;
mod poll;
mod start;

/// A builder for scheduling runs.
pub struct Builder<S> {
    spawner: S,
    store: Store,
    deps: BTreeMap<TestId, BTreeSet<TestId>>,
    parallel: usize,
    failover: bool,
    shuffle: bool,
    binary_dir: PathBuf,
    halt: halt::Flag,
}

impl<S: Spawn> Builder<S> {
    /// Constructs a builder around the handle factory `spawner`.
    pub fn new(spawner: S) -> Self {
        Self {
            spawner,
            store: Store::default(),
            deps: BTreeMap::new(),
            parallel: 1,
            failover: false,
            shuffle: false,
            binary_dir: PathBuf::from("."),
            halt: halt::Flag::new(),
        }
    }

    /// Supplies the test model: the property store and the dependency map.
    #[must_use]
    pub fn tests(mut self, store: Store, deps: BTreeMap<TestId, BTreeSet<TestId>>) -> Self {
        self.store = store;
        self.deps = deps;
        self
    }

    /// Sets the parallel level (clamped to at least 1).
    #[must_use]
    pub fn parallel(mut self, level: usize) -> Self {
        self.parallel = level;
        self
    }

    /// Enables or disables failover resume from an existing checkpoint.
    #[must_use]
    pub fn failover(mut self, on: bool) -> Self {
        self.failover = on;
        self
    }

    /// Enables or disables random dispatch order.  Dependencies and the
    /// budget are still honoured; cost precedence is not.
    #[must_use]
    pub fn shuffle(mut self, on: bool) -> Self {
        self.shuffle = on;
        self
    }

    /// Sets the binary directory the persistence files live under.
    #[must_use]
    pub fn binary_dir<P: Into<PathBuf>>(mut self, dir: P) -> Self {
        self.binary_dir = dir.into();
        self
    }

    /// Attaches a halt flag the run will honour between poll cycles.
    #[must_use]
    pub fn halt(mut self, flag: halt::Flag) -> Self {
        self.halt = flag;
        self
    }

    /// Freezes the builder into a [Runner].
    pub fn build(self) -> Runner<S> {
        let total = self.store.len();
        Runner {
            spawner: self.spawner,
            graph: Graph::new(self.deps),
            costs: sched::cost::Index::new(),
            budget: Budget::new(self.parallel),
            failover: self.failover,
            shuffle: self.shuffle,
            binary_dir: self.binary_dir,
            halt: self.halt,
            store: self.store,
            running: Vec::new(),
            running_count: 0,
            started: BTreeSet::new(),
            finished: BTreeSet::new(),
            report: Report::new(total),
        }
    }
}

/// One scheduling run over a fixed set of tests.
pub struct Runner<S: Spawn> {
    spawner: S,
    store: Store,
    graph: Graph,
    costs: sched::cost::Index,
    budget: Budget,
    failover: bool,
    shuffle: bool,
    binary_dir: PathBuf,
    halt: halt::Flag,
    running: Vec<S::Test>,
    running_count: usize,
    started: BTreeSet<TestId>,
    finished: BTreeSet<TestId>,
    report: Report,
}

impl<S: Spawn> Runner<S> {
    /// Runs the whole schedule to completion and reports on it.
    ///
    /// # Errors
    ///
    /// Fails with [err::Error::DependencyCycle] before dispatching anything
    /// if the dependency graph is cyclic, and propagates setup I/O errors.
    /// Per-test failures are data in the report, not errors.
    pub fn run(mut self) -> err::Result<Report> {
        self.prepare()?;
        tracing::debug!("{} tests pending after setup", self.graph.len());
        self.spawner.set_max_id(self.store.max_id());
        self.start_next_tests()?;
        while !self.graph.is_empty() {
            if self.halt.is_raised() {
                tracing::warn!("interrupted; draining running tests");
                break;
            }
            self.poll();
            self.start_next_tests()?;
        }
        while self.poll() {}
        if !self.halt.is_raised() {
            self.mark_finished()?;
        }
        Ok(self.report)
    }

    /// Writes the dry-run test listing to `w`.  Never spawns anything.
    ///
    /// # Errors
    ///
    /// Propagates I/O errors from `w`.
    pub fn print_test_list<W: io::Write>(&self, w: W) -> io::Result<()> {
        ux::list::print(&self.store, w)
    }

    /// Brings persisted state in and verifies the graph, in order: load
    /// cost history, build cost buckets, apply any failover checkpoint,
    /// check for cycles.
    fn prepare(&mut self) -> err::Result<()> {
        self.read_cost_data()?;
        self.create_cost_list();
        self.check_resume()?;
        self.check_cycles()
    }

    /// Hydrates zero costs from the persisted history, then deletes it so
    /// the new run starts a fresh record.  History is only consulted when
    /// the run is actually parallel.
    fn read_cost_data(&mut self) -> err::Result<()> {
        let path = persist::cost::path(&self.binary_dir);
        if self.budget.level() > 1 {
            for (id, cost) in persist::cost::read(&path)? {
                self.store.hydrate_cost(id, cost);
            }
        }
        persist::cost::remove(&path)?;
        Ok(())
    }

    /// Buckets every pending test by its (possibly hydrated) cost.
    fn create_cost_list(&mut self) {
        for (id, props) in self.store.iter() {
            if self.graph.contains(id) {
                self.costs.insert(props.cost, id);
            }
        }
    }

    /// Applies the checkpoint: with failover on, tests it records are
    /// removed from the run; with failover off, a stale file is deleted.
    fn check_resume(&mut self) -> err::Result<()> {
        let path = persist::checkpoint::path(&self.binary_dir);
        if self.failover {
            if persist::checkpoint::exists(&path) {
                tracing::info!("Resuming previously interrupted test set");
                for id in persist::checkpoint::read(&path)? {
                    self.remove_test(id);
                }
            }
        } else {
            persist::checkpoint::remove(&path)?;
        }
        Ok(())
    }

    /// Removes one already-done test from the run, counting it as
    /// completed without a verdict.
    fn remove_test(&mut self, id: TestId) {
        if !self.store.contains(id) {
            tracing::debug!("checkpoint names unknown test {}", id);
            return;
        }
        self.graph.erase(id);
        self.costs.remove(id);
        self.store.remove(id);
        self.finished.insert(id);
        self.report.completed += 1;
    }

    /// Rejects cyclic dependency graphs, naming a test on the cycle.
    fn check_cycles(&self) -> err::Result<()> {
        tracing::debug!("checking test dependency graph");
        match self.graph.find_cycle() {
            None => Ok(()),
            Some(id) => {
                let name = self
                    .store
                    .get(id)
                    .map_or_else(|_| id.to_string(), |p| p.name.clone());
                Err(err::Error::DependencyCycle(name))
            }
        }
    }

    /// Deletes the checkpoint after a clean end.
    fn mark_finished(&mut self) -> err::Result<()> {
        persist::checkpoint::remove(&persist::checkpoint::path(&self.binary_dir))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exec::abs::test_helpers::{FakeSpawner, Script};
    use crate::model::{Outcome, TestProperties};
    use std::path::Path;

    /// One fixture test: (id, cost, dependency ids, processors, serial).
    type Case = (usize, f64, &'static [usize], usize, bool);

    fn fixture(cases: &[Case]) -> (Store, BTreeMap<TestId, BTreeSet<TestId>>) {
        let mut props = BTreeMap::new();
        let mut deps = BTreeMap::new();
        for (id, cost, dep_ids, processors, serial) in cases {
            let depends: BTreeSet<TestId> = dep_ids.iter().map(|d| TestId(*d)).collect();
            deps.insert(TestId(*id), depends.clone());
            props.insert(
                TestId(*id),
                TestProperties {
                    name: format!("t{}", id),
                    directory: PathBuf::from("."),
                    command: vec!["x".to_owned()],
                    depends,
                    processors: *processors,
                    run_serial: *serial,
                    cost: *cost,
                },
            );
        }
        (Store::new(props), deps)
    }

    fn builder(
        spawner: FakeSpawner,
        cases: &[Case],
        parallel: usize,
        dir: &Path,
    ) -> Builder<FakeSpawner> {
        let (store, deps) = fixture(cases);
        Builder::new(spawner)
            .tests(store, deps)
            .parallel(parallel)
            .binary_dir(dir)
    }

    /// A linear chain dispatches in dependency order, one at a time, even
    /// with budget to spare.
    #[test]
    fn test_linear_chain() {
        let dir = tempfile::tempdir().unwrap();
        let spawner = FakeSpawner::new();
        let log = spawner.log();
        let cases: &[Case] = &[
            (1, 1.0, &[], 1, false),
            (2, 1.0, &[1], 1, false),
            (3, 1.0, &[2], 1, false),
        ];
        let report = builder(spawner, cases, 4, dir.path()).build().run().unwrap();
        let log = log.borrow();
        assert_eq!(
            log.started,
            vec![TestId(1), TestId(2), TestId(3)]
        );
        assert!(log.concurrent.iter().all(|s| s.len() == 1));
        assert_eq!(report.completed, 3);
        assert_eq!(report.passed.len(), 3);
    }

    /// With a budget of one, the costlier of two independent tests goes
    /// first.
    #[test]
    fn test_cost_order_budget_one() {
        let dir = tempfile::tempdir().unwrap();
        let spawner = FakeSpawner::new();
        let log = spawner.log();
        let cases: &[Case] = &[(1, 10.0, &[], 1, false), (2, 5.0, &[], 1, false)];
        builder(spawner, cases, 1, dir.path()).build().run().unwrap();
        assert_eq!(log.borrow().started, vec![TestId(1), TestId(2)]);
    }

    /// A serial test never overlaps any other test.
    #[test]
    fn test_serial_barrier() {
        let dir = tempfile::tempdir().unwrap();
        let spawner = FakeSpawner::new();
        let log = spawner.log();
        let cases: &[Case] = &[
            (1, 0.0, &[], 1, false),
            (2, 0.0, &[], 1, true),
            (3, 0.0, &[], 1, false),
        ];
        let report = builder(spawner, cases, 4, dir.path()).build().run().unwrap();
        assert_eq!(report.completed, 3);
        for snapshot in &log.borrow().concurrent {
            if snapshot.contains(&TestId(2)) {
                assert_eq!(snapshot.len(), 1);
            }
        }
    }

    /// A dependency cycle aborts the run before anything starts, naming a
    /// test on the cycle.
    #[test]
    fn test_cycle_aborts() {
        let dir = tempfile::tempdir().unwrap();
        let spawner = FakeSpawner::new();
        let log = spawner.log();
        let cases: &[Case] = &[(1, 0.0, &[2], 1, false), (2, 0.0, &[1], 1, false)];
        let outcome = builder(spawner, cases, 2, dir.path()).build().run();
        match outcome {
            Err(err::Error::DependencyCycle(name)) => {
                assert!(name == "t1" || name == "t2");
            }
            other => panic!("expected a cycle error, got {:?}", other.map(|r| r.completed)),
        }
        assert!(log.borrow().started.is_empty());
    }

    /// Failover resume skips tests the checkpoint records, counts them as
    /// completed, and deletes the checkpoint at the clean end.
    #[test]
    fn test_failover_resume() {
        let dir = tempfile::tempdir().unwrap();
        let checkpoint = persist::checkpoint::path(dir.path());
        persist::checkpoint::append(&checkpoint, TestId(1)).unwrap();
        persist::checkpoint::append(&checkpoint, TestId(3)).unwrap();

        let spawner = FakeSpawner::new();
        let log = spawner.log();
        let cases: &[Case] = &[
            (1, 0.0, &[], 1, false),
            (2, 0.0, &[1], 1, false),
            (3, 0.0, &[], 1, false),
            (4, 0.0, &[3], 1, false),
        ];
        let report = builder(spawner, cases, 2, dir.path())
            .failover(true)
            .build()
            .run()
            .unwrap();

        let started: BTreeSet<TestId> = log.borrow().started.iter().copied().collect();
        assert_eq!(started, [TestId(2), TestId(4)].iter().copied().collect());
        assert_eq!(report.completed, 4);
        assert_eq!(report.total, 4);
        assert_eq!(report.passed.len(), 2);
        assert!(!persist::checkpoint::exists(&checkpoint));
    }

    /// With failover off, a stale checkpoint is deleted and everything
    /// runs.
    #[test]
    fn test_stale_checkpoint_deleted() {
        let dir = tempfile::tempdir().unwrap();
        let checkpoint = persist::checkpoint::path(dir.path());
        persist::checkpoint::append(&checkpoint, TestId(1)).unwrap();

        let spawner = FakeSpawner::new();
        let cases: &[Case] = &[(1, 0.0, &[], 1, false), (2, 0.0, &[], 1, false)];
        let report = builder(spawner, cases, 2, dir.path()).build().run().unwrap();
        assert_eq!(report.completed, 2);
        assert!(!persist::checkpoint::exists(&checkpoint));
    }

    /// Persisted cost history hydrates zero-cost tests, is deleted after
    /// loading, and drives the priority buckets.
    #[test]
    fn test_cost_loading() {
        let dir = tempfile::tempdir().unwrap();
        let cost_path = persist::cost::path(dir.path());
        persist::cost::append(&cost_path, TestId(7), 12.5).unwrap();

        let spawner = FakeSpawner::new();
        let cases: &[Case] = &[(7, 0.0, &[], 1, false), (8, 1.0, &[], 1, false)];
        let mut runner = builder(spawner, cases, 2, dir.path()).build();
        runner.prepare().unwrap();

        assert_eq!(runner.store.get(TestId(7)).unwrap().cost, 12.5);
        assert!(!cost_path.exists());
        let top: Vec<f64> = runner.costs.descending().map(|(c, _)| c.value()).collect();
        assert_eq!(top, vec![12.5, 1.0]);
    }

    /// With a parallel level of one, cost history is not consumed for
    /// hydration but the file is still deleted.
    #[test]
    fn test_cost_skipped_when_not_parallel() {
        let dir = tempfile::tempdir().unwrap();
        let cost_path = persist::cost::path(dir.path());
        persist::cost::append(&cost_path, TestId(1), 12.5).unwrap();

        let spawner = FakeSpawner::new();
        let cases: &[Case] = &[(1, 0.0, &[], 1, false)];
        let mut runner = builder(spawner, cases, 1, dir.path()).build();
        runner.prepare().unwrap();

        assert_eq!(runner.store.get(TestId(1)).unwrap().cost, 0.0);
        assert!(!cost_path.exists());
    }

    /// A costly test whose dependency is cheap still gets its dependency
    /// started first, through dependency-driven launch.
    #[test]
    fn test_dependency_driven_launch() {
        let dir = tempfile::tempdir().unwrap();
        let spawner = FakeSpawner::new();
        let log = spawner.log();
        let cases: &[Case] = &[(1, 10.0, &[2], 1, false), (2, 1.0, &[], 1, false)];
        builder(spawner, cases, 1, dir.path()).build().run().unwrap();
        assert_eq!(log.borrow().started, vec![TestId(2), TestId(1)]);
    }

    /// The budget caps concurrency in processor units, not test count.
    #[test]
    fn test_budget_in_processor_units() {
        let dir = tempfile::tempdir().unwrap();
        let spawner = FakeSpawner::new();
        let log = spawner.log();
        let cases: &[Case] = &[
            (1, 4.0, &[], 2, false),
            (2, 3.0, &[], 2, false),
            (3, 2.0, &[], 1, false),
            (4, 1.0, &[], 1, false),
        ];
        let report = builder(spawner, cases, 3, dir.path()).build().run().unwrap();
        assert_eq!(report.completed, 4);
        // Weights: 1 and 2 cost two units each, 3 and 4 one unit.
        let weight = |id: &TestId| if id.0 <= 2 { 2 } else { 1 };
        for snapshot in &log.borrow().concurrent {
            assert!(snapshot.iter().map(weight).sum::<usize>() <= 3);
        }
    }

    /// A test that fails to start is a failure for that test only, and
    /// leaves no cost sample behind.
    #[test]
    fn test_start_failure_is_local() {
        let dir = tempfile::tempdir().unwrap();
        let spawner = FakeSpawner::new().script(
            TestId(1),
            Script {
                start_ok: false,
                ..Script::default()
            },
        );
        let cases: &[Case] = &[(1, 5.0, &[], 1, false), (2, 1.0, &[], 1, false)];
        let report = builder(spawner, cases, 2, dir.path()).build().run().unwrap();
        assert_eq!(report.failed, vec!["t1".to_owned()]);
        assert_eq!(report.passed, vec!["t2".to_owned()]);
        assert_eq!(report.completed, 2);

        let samples = persist::cost::read(&persist::cost::path(dir.path())).unwrap();
        assert_eq!(samples.len(), 1);
        assert_eq!(samples[0].0, TestId(2));
    }

    /// A failing child's name lands in `failed`, in completion order.
    #[test]
    fn test_failed_outcome_recorded() {
        let dir = tempfile::tempdir().unwrap();
        let spawner = FakeSpawner::new().script(
            TestId(2),
            Script {
                outcome: Outcome::Failed,
                ..Script::default()
            },
        );
        let cases: &[Case] = &[(1, 2.0, &[], 1, false), (2, 1.0, &[], 1, false)];
        let report = builder(spawner, cases, 1, dir.path()).build().run().unwrap();
        assert_eq!(report.passed, vec!["t1".to_owned()]);
        assert_eq!(report.failed, vec!["t2".to_owned()]);
        assert!(!report.all_passed());
    }

    /// A halt raised before the run starts suppresses all dispatch and
    /// leaves an existing checkpoint in place for the next failover run.
    #[test]
    fn test_halt_before_dispatch() {
        let dir = tempfile::tempdir().unwrap();
        let checkpoint = persist::checkpoint::path(dir.path());
        persist::checkpoint::append(&checkpoint, TestId(1)).unwrap();

        let spawner = FakeSpawner::new();
        let log = spawner.log();
        let flag = halt::Flag::new();
        flag.raise();
        let cases: &[Case] = &[(1, 0.0, &[], 1, false), (2, 0.0, &[], 1, false)];
        let report = builder(spawner, cases, 2, dir.path())
            .failover(true)
            .halt(flag)
            .build()
            .run()
            .unwrap();

        assert!(log.borrow().started.is_empty());
        assert_eq!(report.completed, 1);
        assert!(persist::checkpoint::exists(&checkpoint));
    }

    /// Random dispatch still honours dependencies.
    #[test]
    fn test_shuffle_honours_dependencies() {
        let dir = tempfile::tempdir().unwrap();
        let spawner = FakeSpawner::new();
        let log = spawner.log();
        let cases: &[Case] = &[
            (1, 0.0, &[], 1, false),
            (2, 0.0, &[1], 1, false),
            (3, 0.0, &[2], 1, false),
        ];
        builder(spawner, cases, 1, dir.path())
            .shuffle(true)
            .build()
            .run()
            .unwrap();
        assert_eq!(
            log.borrow().started,
            vec![TestId(1), TestId(2), TestId(3)]
        );
    }

    /// The highest id is published to the spawner before dispatch.
    #[test]
    fn test_max_id_published() {
        let dir = tempfile::tempdir().unwrap();
        let spawner = FakeSpawner::new();
        let log = spawner.log();
        let cases: &[Case] = &[(1, 0.0, &[], 1, false), (9, 0.0, &[], 1, false)];
        builder(spawner, cases, 1, dir.path()).build().run().unwrap();
        assert_eq!(log.borrow().max_id, Some(TestId(9)));
    }

    /// An empty model runs to a clean, empty report.
    #[test]
    fn test_empty_run() {
        let dir = tempfile::tempdir().unwrap();
        let report = builder(FakeSpawner::new(), &[], 2, dir.path())
            .build()
            .run()
            .unwrap();
        assert_eq!(report.total, 0);
        assert_eq!(report.completed, 0);
    }

    /// Completions append a checkpoint trail during the run; the trail is
    /// gone after the clean end but the cost samples remain.
    #[test]
    fn test_persistence_after_clean_run() {
        let dir = tempfile::tempdir().unwrap();
        let spawner = FakeSpawner::new();
        let cases: &[Case] = &[(1, 0.0, &[], 1, false), (2, 0.0, &[], 1, false)];
        builder(spawner, cases, 2, dir.path()).build().run().unwrap();

        assert!(!persist::checkpoint::exists(&persist::checkpoint::path(
            dir.path()
        )));
        let samples = persist::cost::read(&persist::cost::path(dir.path())).unwrap();
        let ids: BTreeSet<TestId> = samples.iter().map(|(id, _)| *id).collect();
        assert_eq!(ids, [TestId(1), TestId(2)].iter().copied().collect());
    }
}
