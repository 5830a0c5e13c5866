//! Top-level configuration for the scheduler.
//!
//! Individual parts of testudo can be used without pulling in this
//! configuration layer, but it provides a convenient substrate for handling
//! file- and command-line-supplied settings together.

pub mod clap;
pub mod err;
pub mod io;
pub mod schedule;
pub mod top;

pub use err::{Error, Result};
pub use top::Config;
