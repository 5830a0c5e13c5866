//! The human-readable summary outputter.

use super::{abs::Outputter, err};
use crate::model;
use colored::Colorize;
use std::io::Write;
use tabwriter::TabWriter;

/// An outputter that renders a per-test table and a pass/fail summary.
pub struct Summary<W: Write> {
    writer: W,
}

impl<W: Write> Summary<W> {
    /// Constructs a new summary outputter over `writer`.
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    fn sigil(outcome: model::Outcome) -> colored::ColoredString {
        if outcome.is_pass() {
            "*".green()
        } else {
            "!".red()
        }
    }
}

impl<W: Write> Outputter for Summary<W> {
    fn output(self: Box<Self>, report: model::Report) -> err::Result<()> {
        let mut tw = TabWriter::new(self.writer).padding(1);
        for result in &report.results {
            writeln!(
                tw,
                "{sigil}\t{name}\t{time:.2} sec",
                sigil = Self::sigil(result.outcome),
                name = result.name,
                time = result.execution_time,
            )?;
        }
        let mut w = tw
            .into_inner()
            .map_err(|e| crate::ux::try_clone_error(e.error()))?;

        let ran = report.passed.len() + report.failed.len();
        let percent = if ran == 0 {
            100
        } else {
            report.passed.len() * 100 / ran
        };
        writeln!(w)?;
        writeln!(
            w,
            "{percent}% tests passed, {failed} tests failed out of {ran}",
            percent = percent,
            failed = report.failed.len(),
            ran = ran,
        )?;
        if !report.failed.is_empty() {
            writeln!(w)?;
            writeln!(w, "The following tests FAILED:")?;
            for name in &report.failed {
                writeln!(w, "\t{}", name.red())?;
            }
        }
        w.flush().map_err(err::Error::Io)
    }
}
