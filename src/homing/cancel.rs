//! Cooperative cancellation for long-running homing.

use core::sync::atomic::{AtomicBool, Ordering};

/// Flag a caller sets to abort an in-progress homing request.
///
/// The controller polls it after every position read. Share it across
/// threads by reference or behind an `Arc`.
#[derive(Debug, Default)]
pub struct CancelFlag {
    cancelled: AtomicBool,
}

impl CancelFlag {
    /// Create a flag in the not-cancelled state.
    pub const fn new() -> Self {
        Self {
            cancelled: AtomicBool::new(false),
        }
    }

    /// Request cancellation.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }

    /// Check whether cancellation was requested.
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }

    /// Clear a previous request so the flag can be reused.
    pub fn reset(&self) {
        self.cancelled.store(false, Ordering::Release);
    }
}
