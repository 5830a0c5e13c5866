//! `clap` integration for config.

use super::{schedule, top, Error, Result};
use std::{path::PathBuf, str::FromStr};

pub mod arg {
    /// Name of the manifest file argument.
    pub const INPUT: &str = "INPUT";
    /// Name of the `parallel` argument.
    pub const PARALLEL: &str = "parallel";
    /// Name of the `failover` argument.
    pub const FAILOVER: &str = "failover";
    /// Name of the `schedule` argument.
    pub const SCHEDULE: &str = "schedule";
    /// Name of the `binary-dir` argument.
    pub const BINARY_DIR: &str = "binary-dir";
}

/// Trait for things that can be updated from command line arguments taken
/// from `clap`.
pub trait Clappable<'a>: Sized {
    /// Merges configuration from a clap match dictionary into this,
    /// potentially replacing it entirely.
    fn parse_clap(self, matches: &'a clap::ArgMatches) -> Result<Self>;
}

/// We can fill a top-level config using clap.
impl<'a> Clappable<'a> for top::Config {
    fn parse_clap(self, matches: &'a clap::ArgMatches) -> Result<Self> {
        Ok(Self {
            parallel: parse_or(matches.value_of(arg::PARALLEL), self.parallel)
                .map_err(Error::BadParallelLevel)?,
            failover: self.failover || matches.is_present(arg::FAILOVER),
            schedule: self.schedule.parse_clap(matches)?,
            binary_dir: matches
                .value_of(arg::BINARY_DIR)
                .map_or(self.binary_dir, PathBuf::from),
        })
    }
}

/// We can fill a schedule strategy using clap.
impl<'a> Clappable<'a> for schedule::Strategy {
    fn parse_clap(self, matches: &'a clap::ArgMatches) -> Result<Self> {
        parse_or(matches.value_of(arg::SCHEDULE), self)
    }
}

fn parse_or<T: FromStr>(s: Option<&str>, default: T) -> std::result::Result<T, T::Err> {
    s.map_or(Ok(default), str::parse)
}
