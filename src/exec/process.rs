//! Child-process test execution.
//!
//! Each test runs as one child process with piped stdout and stderr.  A
//! reader thread per pipe streams lines over a channel; the poll side drains
//! the channel with a short timeout so aggregate polling never starves.

use super::abs;
use crate::model::{Outcome, TestId, TestProperties};
use colored::Colorize;
use crossbeam::channel::{self, Receiver, Sender};
use std::{
    io::{BufRead, BufReader, Read},
    process::{Child, Command, Stdio},
    thread,
    time::{Duration, Instant},
};

/// How long one output pump blocks waiting for a line before yielding.
const POLL_WAIT: Duration = Duration::from_millis(10);

/// Spawns [Process] handles.
#[derive(Clone, Debug, Default)]
pub struct Spawner {
    id_width: usize,
}

impl Spawner {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl abs::Spawn for Spawner {
    type Test = Process;

    fn set_max_id(&mut self, max: TestId) {
        self.id_width = max.width();
    }

    fn spawn(&mut self, id: TestId, props: &TestProperties) -> Process {
        Process {
            id,
            props: props.clone(),
            id_width: self.id_width.max(1),
            child: None,
            output: None,
            readers: Vec::new(),
            transcript: Vec::new(),
            started_at: None,
            execution_time: 0.0,
            exit_ok: None,
        }
    }
}

/// A handle to one test running as a child process.
pub struct Process {
    id: TestId,
    props: TestProperties,
    id_width: usize,
    child: Option<Child>,
    output: Option<Receiver<String>>,
    readers: Vec<thread::JoinHandle<()>>,
    transcript: Vec<String>,
    started_at: Option<Instant>,
    execution_time: f64,
    exit_ok: Option<bool>,
}

impl Process {
    /// Gets the lines the test has written so far.
    #[must_use]
    pub fn output(&self) -> &[String] {
        &self.transcript
    }

    /// Moves pending output lines from the channel into the transcript.
    /// Blocks for at most [POLL_WAIT] on the first line.
    fn drain(&mut self) {
        let mut lines = Vec::new();
        if let Some(rx) = &self.output {
            if let Ok(line) = rx.recv_timeout(POLL_WAIT) {
                lines.push(line);
            }
            while let Ok(line) = rx.try_recv() {
                lines.push(line);
            }
        }
        for line in lines {
            tracing::debug!("{}: {}", self.props.name, line);
            self.transcript.push(line);
        }
    }

    /// Records the test's exit and collects whatever output remains.
    fn conclude(&mut self, ok: bool) {
        for reader in self.readers.drain(..) {
            let _ = reader.join();
        }
        if let Some(rx) = self.output.take() {
            for line in rx.try_iter() {
                tracing::debug!("{}: {}", self.props.name, line);
                self.transcript.push(line);
            }
        }
        self.execution_time = self
            .started_at
            .map_or(0.0, |at| at.elapsed().as_secs_f64());
        self.exit_ok = Some(ok);
        self.child = None;
    }
}

/// Streams lines from `source` into `tx` until EOF or the receiver hangs up.
fn pump<R: Read + Send + 'static>(source: R, tx: Sender<String>) -> thread::JoinHandle<()> {
    thread::spawn(move || {
        for line in BufReader::new(source).lines() {
            match line {
                Ok(line) => {
                    if tx.send(line).is_err() {
                        break;
                    }
                }
                Err(_) => break,
            }
        }
    })
}

impl abs::RunTest for Process {
    fn id(&self) -> TestId {
        self.id
    }

    fn properties(&self) -> &TestProperties {
        &self.props
    }

    fn start(&mut self, _total: usize) -> bool {
        let (program, args) = match self.props.command.split_first() {
            Some(pair) => pair,
            None => {
                tracing::error!("test {} has an empty command", self.props.name);
                return false;
            }
        };
        tracing::debug!(
            "Test #{}: running {:?} in {}",
            self.id,
            self.props.command,
            self.props.directory.display()
        );
        let spawned = Command::new(program)
            .args(args)
            .current_dir(&self.props.directory)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn();
        let mut child = match spawned {
            Ok(child) => child,
            Err(err) => {
                tracing::error!("couldn't start test {}: {}", self.props.name, err);
                return false;
            }
        };

        let (tx, rx) = channel::unbounded();
        if let Some(stdout) = child.stdout.take() {
            self.readers.push(pump(stdout, tx.clone()));
        }
        if let Some(stderr) = child.stderr.take() {
            self.readers.push(pump(stderr, tx));
        }
        self.output = Some(rx);
        self.started_at = Some(Instant::now());
        self.child = Some(child);
        true
    }

    fn check_output(&mut self) -> bool {
        self.drain();
        let exited_ok = match self.child.as_mut() {
            None => return false,
            Some(child) => match child.try_wait() {
                Ok(None) => return true,
                Ok(Some(status)) => status.success(),
                Err(err) => {
                    tracing::warn!("couldn't poll test {}: {}", self.props.name, err);
                    let _ = child.kill();
                    let _ = child.wait();
                    false
                }
            },
        };
        self.conclude(exited_ok);
        false
    }

    fn end_test(&mut self, completed: usize, total: usize, started: bool) -> Outcome {
        let outcome = Outcome::from_pass_bool(started && self.exit_ok == Some(true));
        let verdict = if outcome.is_pass() {
            "Passed".green()
        } else {
            "Failed".red()
        };
        let progress_width = total.to_string().len();
        tracing::info!(
            "{completed:>pw$}/{total} Test #{id:>iw$}: {name} ... {verdict} {time:.2} sec",
            completed = completed,
            pw = progress_width,
            total = total,
            id = self.id,
            iw = self.id_width,
            name = self.props.name,
            verdict = verdict,
            time = self.execution_time,
        );
        if !outcome.is_pass() && !self.transcript.is_empty() {
            tracing::info!("output of failed test {}:", self.props.name);
            for line in &self.transcript {
                tracing::info!("  {}", line);
            }
        }
        outcome
    }

    fn execution_time(&self) -> f64 {
        self.execution_time
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use crate::exec::abs::{RunTest, Spawn};
    use std::{collections::BTreeSet, path::PathBuf};

    fn props(command: &[&str]) -> TestProperties {
        TestProperties {
            name: "proc".to_owned(),
            directory: PathBuf::from("."),
            command: command.iter().map(|s| (*s).to_owned()).collect(),
            depends: BTreeSet::new(),
            processors: 1,
            run_serial: false,
            cost: 0.0,
        }
    }

    fn run_to_completion(handle: &mut Process) {
        while handle.check_output() {}
    }

    /// A successful child passes.
    #[test]
    fn test_true_passes() {
        let p = props(&["true"]);
        let mut handle = Spawner::new().spawn(TestId(1), &p);
        assert!(handle.start(1));
        run_to_completion(&mut handle);
        assert_eq!(handle.end_test(1, 1, true), Outcome::Passed);
    }

    /// A child exiting non-zero fails.
    #[test]
    fn test_false_fails() {
        let p = props(&["false"]);
        let mut handle = Spawner::new().spawn(TestId(1), &p);
        assert!(handle.start(1));
        run_to_completion(&mut handle);
        assert_eq!(handle.end_test(1, 1, true), Outcome::Failed);
    }

    /// A nonexistent program fails to start, and the failure is final.
    #[test]
    fn test_missing_program() {
        let p = props(&["testudo-no-such-binary"]);
        let mut handle = Spawner::new().spawn(TestId(1), &p);
        assert!(!handle.start(1));
        assert_eq!(handle.end_test(1, 1, false), Outcome::Failed);
        assert_eq!(handle.execution_time(), 0.0);
    }

    /// Output written by the child lands in the transcript.
    #[test]
    fn test_output_captured() {
        let p = props(&["echo", "hello from the test"]);
        let mut handle = Spawner::new().spawn(TestId(1), &p);
        assert!(handle.start(1));
        run_to_completion(&mut handle);
        assert!(handle
            .output()
            .iter()
            .any(|l| l.contains("hello from the test")));
    }
}
