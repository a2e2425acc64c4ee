//! Single-slot guard for one category of in-flight requests.

use std::sync::atomic::{AtomicBool, Ordering};

#[derive(Debug, Default)]
pub struct InFlight {
    running: AtomicBool,
}

impl InFlight {
    /// Claims the slot, or returns `None` if a request already holds it.
    pub fn try_begin(&self) -> Option<InFlightGuard<'_>> {
        if self.running.swap(true, Ordering::SeqCst) {
            return None;
        }
        Some(InFlightGuard {
            running: &self.running,
        })
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }
}

/// Releases the slot when dropped.
#[derive(Debug)]
pub struct InFlightGuard<'a> {
    running: &'a AtomicBool,
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.running.store(false, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_second_claim_fails_until_release() {
        let slot = InFlight::default();

        let guard = slot.try_begin().unwrap();
        assert!(slot.is_running());
        assert!(slot.try_begin().is_none());

        drop(guard);
        assert!(!slot.is_running());
        assert!(slot.try_begin().is_some());
    }
}
