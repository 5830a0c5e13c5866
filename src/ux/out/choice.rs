//! Enumerated selection of outputs, for use in command-line selection.

use super::{abs, err, json, summary};
use std::{io::Write, str::FromStr};

/// Enumeration of outputter choices.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum Choice {
    /// Selects the summary outputter.
    Summary,
    /// Selects the JSON outputter.
    Json,
}

impl Choice {
    /// Constructs the appropriate outputter for the choice, using the given
    /// writer.
    pub fn to_outputter<'a, W: Write + 'a>(self, writer: W) -> Box<dyn abs::Outputter + 'a> {
        match self {
            Self::Summary => Box::new(summary::Summary::new(writer)),
            Self::Json => Box::new(json::Json::new(writer)),
        }
    }
}

/// Strings used when mapping outputter choices to command-line arguments.
pub mod string {
    /// The string representation for the summary outputter.
    pub const SUMMARY: &str = "summary";
    /// The string representation for the JSON outputter.
    pub const JSON: &str = "json";

    /// List of all possible string representations of outputter choices.
    pub const ALL: &[&str] = &[SUMMARY, JSON];
}

/// The default outputter is the summary.
impl Default for Choice {
    fn default() -> Self {
        Self::Summary
    }
}

impl FromStr for Choice {
    type Err = err::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let su = s.to_lowercase();
        match &*su {
            string::SUMMARY => Ok(Self::Summary),
            string::JSON => Ok(Self::Json),
            _ => Err(Self::Err::BadOutputter(su)),
        }
    }
}
