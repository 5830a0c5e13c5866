//! The test manifest: the declarative input model.
//!
//! A manifest is a TOML document with one `[[test]]` table per test.  Tests
//! name their dependencies; compilation resolves names to dense ids in
//! declaration order, starting at 1.

use super::{
    store::Store,
    test::{TestId, TestProperties},
};
use serde::{Deserialize, Serialize};
use std::{
    collections::{BTreeMap, BTreeSet, HashMap},
    fs, io,
    path::{Path, PathBuf},
};
use thiserror::Error;

/// A parsed, not yet validated, test manifest.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct Manifest {
    /// The declared tests, in file order.
    #[serde(default, rename = "test")]
    pub tests: Vec<Entry>,
}

/// One declared test.
#[derive(Debug, Serialize, Deserialize)]
pub struct Entry {
    /// The test's name; must be unique within the manifest.
    pub name: String,

    /// The directory the command runs in.
    #[serde(default = "default_directory")]
    pub directory: PathBuf,

    /// The command and its arguments.
    pub command: Vec<String>,

    /// Names of tests that must finish first.
    #[serde(default)]
    pub depends: Vec<String>,

    /// The test's processor weight.
    #[serde(default = "default_processors")]
    pub processors: usize,

    /// Whether the test must run alone.
    #[serde(default)]
    pub serial: bool,

    /// Prior execution-time estimate, in seconds.
    #[serde(default)]
    pub cost: f64,
}

fn default_directory() -> PathBuf {
    PathBuf::from(".")
}

fn default_processors() -> usize {
    1
}

/// A manifest loading or validation error.
#[derive(Debug, Error)]
pub enum Error {
    /// The manifest file couldn't be read.
    #[error("couldn't read manifest file: {0}")]
    Io(#[from] io::Error),

    /// The manifest wasn't valid TOML.
    #[error("couldn't parse manifest: {0}")]
    Parse(#[from] toml::de::Error),

    /// Two tests share the given name.
    #[error("duplicate test name: {0:?}")]
    DuplicateName(String),

    /// A test names a dependency that doesn't exist.
    #[error("test {test:?} depends on unknown test {dep:?}")]
    UnknownDependency {
        /// The depending test's name.
        test: String,
        /// The missing dependency name.
        dep: String,
    },

    /// A test has an empty command.
    #[error("test {0:?} has an empty command")]
    EmptyCommand(String),

    /// A test has a negative cost estimate.
    #[error("test {0:?} has a negative cost")]
    NegativeCost(String),
}

/// Results over manifest [Error]s.
pub type Result<T> = std::result::Result<T, Error>;

impl Manifest {
    /// Tries to parse a manifest from a TOML string.
    ///
    /// # Errors
    ///
    /// Fails if the string isn't valid TOML for a manifest.
    pub fn from_str(s: &str) -> Result<Self> {
        Ok(toml::from_str(s)?)
    }

    /// Tries to load a manifest from the file at `path`.
    ///
    /// # Errors
    ///
    /// Fails if the file can't be read or parsed.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::from_str(&fs::read_to_string(path)?)
    }

    /// Validates the manifest and compiles it into a property store and a
    /// dependency map, assigning ids in declaration order from 1.
    ///
    /// # Errors
    ///
    /// Fails on duplicate names, unknown dependency names, empty commands,
    /// and negative costs.  Processor weights below 1 are clamped to 1.
    pub fn compile(self) -> Result<(Store, BTreeMap<TestId, BTreeSet<TestId>>)> {
        let mut ids: HashMap<String, TestId> = HashMap::new();
        for (i, entry) in self.tests.iter().enumerate() {
            if ids.insert(entry.name.clone(), TestId(i + 1)).is_some() {
                return Err(Error::DuplicateName(entry.name.clone()));
            }
        }

        let mut props = BTreeMap::new();
        let mut deps = BTreeMap::new();
        for (i, entry) in self.tests.into_iter().enumerate() {
            let id = TestId(i + 1);
            if entry.command.is_empty() {
                return Err(Error::EmptyCommand(entry.name));
            }
            if entry.cost < 0.0 {
                return Err(Error::NegativeCost(entry.name));
            }
            let mut depends = BTreeSet::new();
            for dep in &entry.depends {
                match ids.get(dep) {
                    Some(did) => {
                        depends.insert(*did);
                    }
                    None => {
                        return Err(Error::UnknownDependency {
                            test: entry.name.clone(),
                            dep: dep.clone(),
                        })
                    }
                }
            }
            deps.insert(id, depends.clone());
            props.insert(
                id,
                TestProperties {
                    name: entry.name,
                    directory: entry.directory,
                    command: entry.command,
                    depends,
                    processors: entry.processors.max(1),
                    run_serial: entry.serial,
                    cost: entry.cost,
                },
            );
        }
        Ok((Store::new(props), deps))
    }
}
