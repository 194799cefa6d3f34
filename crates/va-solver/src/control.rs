//! Cooperative cancellation shared between the sweep thread and its callers.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Cloneable handle; every clone sees the same flags.
#[derive(Debug, Clone, Default)]
pub struct SolverControl {
    kill: Arc<AtomicBool>,
    running: Arc<AtomicBool>,
}

impl SolverControl {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ask the running process to stop. Observed at the next poll.
    pub fn kill(&self) {
        self.kill.store(true, Ordering::SeqCst);
    }

    pub fn is_kill_requested(&self) -> bool {
        self.kill.load(Ordering::SeqCst)
    }

    /// Clear a kill request once it has been acted on.
    pub fn reset(&self) {
        self.kill.store(false, Ordering::SeqCst);
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Claim the running flag. Returns false if it was already held.
    pub fn try_begin(&self) -> bool {
        self.running
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_ok()
    }

    pub fn finish(&self) {
        self.running.store(false, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clones_share_flags() {
        let a = SolverControl::new();
        let b = a.clone();
        b.kill();
        assert!(a.is_kill_requested());
        a.reset();
        assert!(!b.is_kill_requested());
    }

    #[test]
    fn running_flag_is_exclusive() {
        let c = SolverControl::new();
        assert!(c.try_begin());
        assert!(c.is_running());
        assert!(!c.clone().try_begin());
        c.finish();
        assert!(c.try_begin());
    }
}
