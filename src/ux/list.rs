//! The dry-run test listing.

use crate::model::Store;
use std::{io, io::Write};
use tabwriter::TabWriter;

/// Writes the test listing for `store` into `w`: one indexed line per test,
/// id column sized by the highest id, and a total at the end.
///
/// # Errors
///
/// Propagates I/O errors from `w`.
pub fn print<W: io::Write>(store: &Store, w: W) -> io::Result<()> {
    let width = store.max_id().width();
    let mut tw = TabWriter::new(w).padding(1);
    for (id, props) in store.iter() {
        writeln!(
            tw,
            "  Test #{id:>width$}:\t{name}",
            id = id.0,
            width = width,
            name = props.name
        )?;
    }
    let mut w = tw
        .into_inner()
        .map_err(|e| super::try_clone_error(e.error()))?;
    writeln!(w)?;
    writeln!(w, "Total Tests: {}", store.len())
}
