use super::{err, schedule};
use serde::{Deserialize, Serialize};
use std::{fs, path::Path, path::PathBuf};

/// The top-level config structure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// The parallel level: the maximum sum of processor weights of
    /// concurrently running tests.
    #[serde(default = "default_parallel")]
    pub parallel: usize,

    /// Whether to resume from an existing checkpoint.
    #[serde(default)]
    pub failover: bool,

    /// The dispatch-order strategy.
    #[serde(default)]
    pub schedule: schedule::Strategy,

    /// The binary directory; persisted scheduler state lives beneath it.
    #[serde(default = "default_binary_dir")]
    pub binary_dir: PathBuf,
}

fn default_parallel() -> usize {
    1
}

fn default_binary_dir() -> PathBuf {
    PathBuf::from(".")
}

impl Default for Config {
    fn default() -> Self {
        Self {
            parallel: default_parallel(),
            failover: false,
            schedule: schedule::Strategy::default(),
            binary_dir: default_binary_dir(),
        }
    }
}

impl Config {
    /// Tries to dump the config to a TOML string.
    ///
    /// # Errors
    ///
    /// Fails if the config can't be serialised.
    pub fn to_string(&self) -> err::Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Tries to load a config from a TOML string.
    ///
    /// # Errors
    ///
    /// Fails if the string isn't valid config TOML.
    pub fn from_str(s: &str) -> err::Result<Self> {
        Ok(toml::from_str(s)?)
    }

    /// Tries to load a config from the file at `path`.
    ///
    /// # Errors
    ///
    /// Fails if the file can't be read or parsed.
    pub fn load<P: AsRef<Path>>(path: P) -> err::Result<Self> {
        Self::from_str(&fs::read_to_string(path)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// A config survives a TOML round trip.
    #[test]
    fn test_toml_round_trip() {
        let config = Config {
            parallel: 8,
            failover: true,
            schedule: schedule::Strategy::Random,
            binary_dir: PathBuf::from("/tmp/build"),
        };
        let dumped = config.to_string().unwrap();
        assert_eq!(Config::from_str(&dumped).unwrap(), config);
    }

    /// An empty document yields the defaults.
    #[test]
    fn test_defaults() {
        let config = Config::from_str("").unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.parallel, 1);
    }
}
