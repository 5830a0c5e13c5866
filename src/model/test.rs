//! Test identities and per-test properties.

use serde::{Deserialize, Serialize};
use std::{collections::BTreeSet, fmt, num::ParseIntError, path::PathBuf, str::FromStr};

/// A dense, non-negative test identifier, unique within one run.
///
/// Ids are assigned in manifest declaration order, starting at 1; the
/// maximum id of a run determines the column width of listings.
///
/// # Examples
///
/// ```
/// use testudo::model::TestId;
/// assert_eq!(TestId(42).to_string(), "42");
/// assert_eq!(str::parse::<TestId>("42"), Ok(TestId(42)));
/// ```
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TestId(pub usize);

/// Formats like the underlying integer, honouring width and alignment.
impl fmt::Display for TestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl FromStr for TestId {
    type Err = ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.parse()?))
    }
}

impl TestId {
    /// Gets the number of decimal digits needed to print this id.
    ///
    /// # Examples
    ///
    /// ```
    /// use testudo::model::TestId;
    /// assert_eq!(TestId(7).width(), 1);
    /// assert_eq!(TestId(107).width(), 3);
    /// ```
    #[must_use]
    pub fn width(self) -> usize {
        self.to_string().len()
    }
}

/// Immutable facts about a single test.
///
/// Properties never change during a run, with one exception: a zero `cost`
/// may be hydrated from the persisted cost history before scheduling starts.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TestProperties {
    /// The test's display name, unique within the manifest.
    pub name: String,

    /// The directory the test's command runs in.
    pub directory: PathBuf,

    /// The command and its arguments.
    pub command: Vec<String>,

    /// Ids of tests that must finish before this one may start.
    pub depends: BTreeSet<TestId>,

    /// The test's processor weight; reserved units of the budget while the
    /// test runs.  Always at least 1.
    pub processors: usize,

    /// Whether the test requires exclusive access to the entire budget.
    pub run_serial: bool,

    /// Prior estimate of the test's execution time, in seconds.  Used only
    /// for dispatch priority.
    pub cost: f64,
}

#[cfg(test)]
mod tests {
    use super::TestId;

    /// Ids order by their numeric value.
    #[test]
    fn test_id_ordering() {
        assert!(TestId(2) < TestId(10));
    }

    /// Parsing rejects non-numeric input.
    #[test]
    fn test_id_parse_garbage() {
        assert!("one".parse::<TestId>().is_err());
    }
}
