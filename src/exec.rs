//! Test execution: the abstract run-handle API and its child-process
//! implementation.

pub mod abs;
pub mod process;

pub use abs::{RunTest, Spawn};
