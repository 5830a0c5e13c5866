//! Outcomes of individual test runs.

use serde::{Deserialize, Serialize};
use std::{fmt::Display, str::FromStr};

/// The verdict of a single finished test.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Outcome {
    /// The test ran and exited successfully.
    Passed,
    /// The test failed to start, or ran and exited unsuccessfully.
    Failed,
}

/// String representations for outcomes.
pub mod string {
    /// String representation for passed outcomes.
    pub const PASSED: &str = "passed";
    /// String representation for failed outcomes.
    pub const FAILED: &str = "failed";
}

/// We can produce a string representation of the outcome.
///
/// # Examples
///
/// ```
/// use testudo::model::Outcome;
/// assert_eq!(Outcome::Passed.to_string(), "passed");
/// assert_eq!(Outcome::Failed.to_string(), "failed");
/// ```
impl Display for Outcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                Self::Passed => string::PASSED,
                Self::Failed => string::FAILED,
            }
        )
    }
}

/// We can parse a string representation of an outcome, case-insensitively.
///
/// # Examples
///
/// ```
/// use testudo::model::Outcome;
/// assert_eq!(str::parse::<Outcome>("passed"), Ok(Outcome::Passed));
/// assert_eq!(str::parse::<Outcome>("FAILED"), Ok(Outcome::Failed));
/// ```
impl FromStr for Outcome {
    /// Errors just take ownership of the invalid string.
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lc = s.to_lowercase();
        match &*lc {
            string::PASSED => Ok(Self::Passed),
            string::FAILED => Ok(Self::Failed),
            _ => Err(lc),
        }
    }
}

impl Outcome {
    /// Converts a pass/fail Boolean to an [Outcome].
    ///
    /// # Examples
    ///
    /// ```
    /// use testudo::model::Outcome;
    /// assert_eq!(Outcome::from_pass_bool(true), Outcome::Passed);
    /// assert_eq!(Outcome::from_pass_bool(false), Outcome::Failed);
    /// ```
    #[must_use]
    pub fn from_pass_bool(is_pass: bool) -> Self {
        if is_pass {
            Self::Passed
        } else {
            Self::Failed
        }
    }

    /// Whether this outcome is a pass.
    #[must_use]
    pub fn is_pass(self) -> bool {
        matches!(self, Self::Passed)
    }
}
