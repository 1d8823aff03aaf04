//! Progress reporting and cooperative cancellation.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Channel to whatever displays progress to the user.
///
/// All methods have default no-op implementations so implementors only need
/// to override what they care about.  `Send` is required so the parallel
/// engine can report from worker threads.
pub trait ProgressSink: Send {
    /// Overall completion, 0–100.
    fn set_progress(&mut self, _percent: u8) {}

    /// Free-text description of the current stage.
    fn set_status(&mut self, _status: &str) {}

    /// A non-fatal problem worth showing to the user.
    fn report_error(&mut self, _message: &str) {}
}

/// A [`ProgressSink`] that discards everything.
pub struct NoopProgress;

impl ProgressSink for NoopProgress {}

/// `completed / total` as a whole percentage, clamped to 100.
pub(crate) fn percent(completed: usize, total: usize) -> u8 {
    if total == 0 {
        return 100;
    }
    (completed.min(total) * 100 / total) as u8
}

// ── CancelToken ───────────────────────────────────────────────────────────────

/// Shared cancellation flag.
///
/// Cloning is cheap; every clone observes the same flag.  Cancellation is
/// advisory: work in flight finishes and the engine stops at its next check.
#[derive(Clone, Debug, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Relaxed);
    }

    #[inline]
    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Relaxed)
    }
}
