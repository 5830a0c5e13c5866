//! The checkpoint file.
//!
//! One line per completed test, `"<id>\n"`, appended as completions arrive.
//! If a run is interrupted the file survives; a failover run reads it to
//! skip work already done.  A clean end deletes it.

use crate::model::TestId;
use std::{
    fs,
    io::{self, Write},
    path::{Path, PathBuf},
};

/// The checkpoint file name, fixed for compatibility with existing tooling.
const FILE: &str = "CTestCheckpoint.txt";

/// Gets the checkpoint path under `binary_dir`.
#[must_use]
pub fn path(binary_dir: &Path) -> PathBuf {
    super::state_file(binary_dir, FILE)
}

/// Whether a checkpoint exists at `path`.
#[must_use]
pub fn exists(path: &Path) -> bool {
    path.is_file()
}

/// Reads the completed test ids recorded at `path`.  Malformed lines are
/// skipped.  A missing file yields no ids.
///
/// # Errors
///
/// Fails only on I/O errors other than the file not existing.
pub fn read(path: &Path) -> io::Result<Vec<TestId>> {
    let contents = match fs::read_to_string(path) {
        Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
        other => other?,
    };
    Ok(contents
        .lines()
        .filter_map(|line| line.trim().parse().ok())
        .collect())
}

/// Appends one completed test id to the file at `path`, creating it (and
/// its parent directories) if needed.
///
/// # Errors
///
/// Fails if the file can't be opened or written.
pub fn append(path: &Path, id: TestId) -> io::Result<()> {
    let mut file = super::open_append(path)?;
    writeln!(file, "{}", id)
}

/// Deletes the file at `path`, if it exists.
///
/// # Errors
///
/// Fails on I/O errors other than the file not existing.
pub fn remove(path: &Path) -> io::Result<()> {
    super::remove(path)
}
