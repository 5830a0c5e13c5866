//! Support for configuring the dispatch-order strategy.

use super::err;
use serde::{de::Visitor, Deserialize, Serialize};

/// String representations of schedule strategies.
pub mod string {
    /// String representation of the cost strategy.
    pub const COST: &str = "cost";
    /// String representation of the random strategy.
    pub const RANDOM: &str = "random";

    /// String representations of all schedule strategies.
    pub const ALL: &[&str] = &[COST, RANDOM];
}

/// Enumeration of dispatch-order strategies.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum Strategy {
    /// Dispatch in descending order of prior cost, preferring long-pole
    /// tests.
    Cost,
    /// Dispatch in a random order.  Dependencies and the processor budget
    /// are still honoured; cost precedence is not.
    Random,
}

/// The default strategy is cost ordering.
impl Default for Strategy {
    fn default() -> Self {
        Self::Cost
    }
}

/// Tries to parse a [Strategy] from a string.
///
/// # Examples
///
/// ```
/// use testudo::config::schedule::Strategy;
/// assert_eq!(str::parse::<Strategy>("cost").unwrap(), Strategy::Cost);
/// assert_eq!(str::parse::<Strategy>("Random").unwrap(), Strategy::Random);
/// ```
impl std::str::FromStr for Strategy {
    type Err = err::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.to_lowercase();
        match &*s {
            string::COST => Ok(Self::Cost),
            string::RANDOM => Ok(Self::Random),
            _ => Err(Self::Err::BadScheduleStrategy(s)),
        }
    }
}

/// Formats a [Strategy] by applying the inverse of [std::str::FromStr].
impl std::fmt::Display for Strategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Cost => write!(f, "{}", string::COST),
            Self::Random => write!(f, "{}", string::RANDOM),
        }
    }
}

/// Serialize by stringification.
impl Serialize for Strategy {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

/// Deserialize by parsing.
impl<'de> Deserialize<'de> for Strategy {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_str(StrategyVisitor)
    }
}

struct StrategyVisitor;

impl<'de> Visitor<'de> for StrategyVisitor {
    type Value = Strategy;

    fn expecting(&self, formatter: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(formatter, "one of: {}", string::ALL.join(", "))
    }

    fn visit_str<E: serde::de::Error>(self, v: &str) -> std::result::Result<Self::Value, E> {
        v.parse().map_err(E::custom)
    }
}

impl Strategy {
    /// Gets an iterator of all available strategies.
    pub fn all() -> impl Iterator<Item = Self> {
        vec![Self::Cost, Self::Random].into_iter()
    }

    /// Whether this strategy randomises dispatch order.
    #[must_use]
    pub fn is_random(self) -> bool {
        matches!(self, Self::Random)
    }
}
