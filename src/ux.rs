//! User-facing rendering: the dry-run test listing and final-report
//! outputters.

pub mod list;
pub mod out;

pub use out::{Choice, Outputter};

/// Tries to copy as much of `e` as possible into a new error.
pub(crate) fn try_clone_error(e: &std::io::Error) -> std::io::Error {
    if let Some(os_err) = e.raw_os_error() {
        std::io::Error::from_raw_os_error(os_err)
    } else {
        std::io::Error::from(e.kind())
    }
}
