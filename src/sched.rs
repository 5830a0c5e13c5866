//! Scheduling primitives: the cost-priority index and the processor budget.

pub mod budget;
pub mod cost;

pub use budget::Budget;
pub use cost::{Cost, Index};
