//! Cooperative interruption of a scheduling run.

use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

/// A flag asking the scheduler to stop dispatching new tests.
///
/// Raising the flag never kills running tests: the scheduler drains the
/// in-flight set, keeps the checkpoint on disk, and returns early.  A later
/// failover run picks up from the checkpoint.
#[derive(Clone, Debug, Default)]
pub struct Flag(Arc<AtomicBool>);

impl Flag {
    /// Constructs an unraised flag.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Raises the flag.  There is no way back down.
    pub fn raise(&self) {
        self.0.store(true, Ordering::Release);
    }

    /// Whether the flag has been raised.
    #[must_use]
    pub fn is_raised(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }

    /// Constructs a flag together with a callback that raises it, for
    /// wiring to signal handlers.
    pub fn on_callback() -> (Self, impl FnMut()) {
        let flag = Self::new();
        let raiser = flag.clone();
        (flag, move || raiser.raise())
    }
}
