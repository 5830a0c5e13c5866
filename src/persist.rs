//! On-disk state enabling cost-based priority and failover resume.
//!
//! Both files live under `Testing/Temporary/` inside the binary directory
//! and are line oriented, append only, and created lazily on first write.

pub mod checkpoint;
pub mod cost;

use std::path::{Path, PathBuf};

/// Builds the path of a state file named `file` under `binary_dir`.
fn state_file(binary_dir: &Path, file: &str) -> PathBuf {
    binary_dir.join("Testing").join("Temporary").join(file)
}

/// Removes the file at `path`, treating a missing file as success.
fn remove(path: &Path) -> std::io::Result<()> {
    match std::fs::remove_file(path) {
        Err(err) if err.kind() != std::io::ErrorKind::NotFound => Err(err),
        _ => Ok(()),
    }
}

/// Opens `path` for appending, creating parent directories on demand.
fn open_append(path: &Path) -> std::io::Result<std::fs::File> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::OpenOptions::new().create(true).append(true).open(path)
}
