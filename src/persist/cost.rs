//! The cost history file.
//!
//! One line per completed test, `"<id> <cost>\n"`, appended as completions
//! arrive.  The next run consumes the file to seed its priority order, then
//! deletes it so samples are never double counted.

use crate::model::TestId;
use std::{
    fs,
    io::{self, Write},
    path::{Path, PathBuf},
};

/// The cost data file name, fixed for compatibility with existing tooling.
const FILE: &str = "CTestCostData.txt";

/// Gets the cost data path under `binary_dir`.
#[must_use]
pub fn path(binary_dir: &Path) -> PathBuf {
    super::state_file(binary_dir, FILE)
}

/// Reads all well-formed `"<id> <cost>"` samples from the file at `path`.
/// Malformed lines are skipped.  A missing file yields no samples.
///
/// # Errors
///
/// Fails only on I/O errors other than the file not existing.
pub fn read(path: &Path) -> io::Result<Vec<(TestId, f64)>> {
    let contents = match fs::read_to_string(path) {
        Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
        other => other?,
    };
    let mut samples = Vec::new();
    for line in contents.lines() {
        let mut parts = line.split_whitespace();
        let id = parts.next().and_then(|s| s.parse::<TestId>().ok());
        let cost = parts.next().and_then(|s| s.parse::<f64>().ok());
        if let (Some(id), Some(cost)) = (id, cost) {
            samples.push((id, cost));
        }
    }
    Ok(samples)
}

/// Appends one cost sample to the file at `path`, creating it (and its
/// parent directories) if needed.
///
/// # Errors
///
/// Fails if the file can't be opened or written.
pub fn append(path: &Path, id: TestId, cost: f64) -> io::Result<()> {
    let mut file = super::open_append(path)?;
    writeln!(file, "{} {}", id, cost)
}

/// Deletes the file at `path`, if it exists.
///
/// # Errors
///
/// Fails on I/O errors other than the file not existing.
pub fn remove(path: &Path) -> io::Result<()> {
    super::remove(path)
}
