use crate::model;
use thiserror::Error;

/// Enumeration of fatal errors that can happen while setting up or running a
/// test schedule.
///
/// Per-test failures are not errors at this level; they flow into the final
/// [crate::model::Report] instead.
#[derive(Debug, Error)]
pub enum Error {
    /// The dependency graph contains a cycle through the named test.
    #[error("a cycle exists in the test dependency graph for the test {0:?}")]
    DependencyCycle(String),

    /// An internal lookup used a test id the property store doesn't know.
    #[error("unknown test id: {0}")]
    UnknownTest(model::test::TestId),

    /// The test manifest couldn't be loaded or validated.
    #[error("couldn't load the test manifest")]
    Manifest(#[from] model::manifest::Error),

    /// Miscellaneous I/O error.
    #[error("I/O error")]
    Io(#[from] std::io::Error),
}

/// Results over [Error].
pub type Result<T> = std::result::Result<T, Error>;
