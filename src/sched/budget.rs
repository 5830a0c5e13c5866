//! The processor budget: the parallel level and per-test weights.

use crate::model::TestProperties;

/// The width limit on concurrently running tests, in processor units.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Budget {
    level: usize,
}

impl Default for Budget {
    fn default() -> Self {
        Self::new(1)
    }
}

impl Budget {
    /// Constructs a budget with parallel level `level`, clamped to at
    /// least 1.
    #[must_use]
    pub fn new(level: usize) -> Self {
        Self {
            level: level.max(1),
        }
    }

    /// Gets the parallel level.
    #[must_use]
    pub fn level(self) -> usize {
        self.level
    }

    /// Gets the number of budget units `props` occupies while running.
    ///
    /// A serial test, or one declaring more processors than the level,
    /// reserves the entire budget and thus runs alone.
    #[must_use]
    pub fn weight(self, props: &TestProperties) -> usize {
        if props.run_serial || props.processors > self.level {
            self.level
        } else {
            props.processors
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::{collections::BTreeSet, path::PathBuf};

    fn props(processors: usize, run_serial: bool) -> TestProperties {
        TestProperties {
            name: "t".to_owned(),
            directory: PathBuf::from("."),
            command: vec!["x".to_owned()],
            depends: BTreeSet::new(),
            processors,
            run_serial,
            cost: 0.0,
        }
    }

    /// A zero level clamps to one.
    #[test]
    fn test_level_clamped() {
        assert_eq!(Budget::new(0).level(), 1);
    }

    /// Weights within the level pass through unchanged.
    #[test]
    fn test_weight_within_level() {
        assert_eq!(Budget::new(4).weight(&props(2, false)), 2);
    }

    /// A weight above the level is capped to the whole budget.
    #[test]
    fn test_weight_oversized() {
        assert_eq!(Budget::new(4).weight(&props(9, false)), 4);
    }

    /// A serial test reserves the whole budget regardless of its weight.
    #[test]
    fn test_weight_serial() {
        assert_eq!(Budget::new(4).weight(&props(1, true)), 4);
    }
}
