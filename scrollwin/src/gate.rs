//! Load-more latch.

use std::time::{Duration, Instant};

/// Prevents duplicate load-more requests.
///
/// Acquiring sets the latch; it lapses on its own once `cooldown` has passed
/// and can be released early when new data arrives or a load fails.
#[derive(Debug, Clone)]
pub struct LoadMoreGate {
    cooldown: Duration,
    latched_at: Option<Instant>,
}

impl LoadMoreGate {
    pub fn new(cooldown: Duration) -> Self {
        Self {
            cooldown,
            latched_at: None,
        }
    }

    /// Whether the latch is held at `now`.
    pub fn is_latched(&self, now: Instant) -> bool {
        self.latched_at
            .is_some_and(|at| now.saturating_duration_since(at) < self.cooldown)
    }

    /// Sets the latch if it is free. Returns whether the caller may trigger.
    pub fn try_acquire(&mut self, now: Instant) -> bool {
        if self.is_latched(now) {
            return false;
        }
        self.latched_at = Some(now);
        true
    }

    /// Frees the latch immediately.
    pub fn release(&mut self) {
        self.latched_at = None;
    }

    pub fn cooldown(&self) -> Duration {
        self.cooldown
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_acquire_blocks_until_cooldown() {
        let start = Instant::now();
        let mut gate = LoadMoreGate::new(Duration::from_millis(1000));

        assert!(gate.try_acquire(start));
        assert!(!gate.try_acquire(start + Duration::from_millis(10)));
        assert!(!gate.try_acquire(start + Duration::from_millis(999)));
        assert!(gate.try_acquire(start + Duration::from_millis(1000)));
    }

    #[test]
    fn test_release_frees_early() {
        let start = Instant::now();
        let mut gate = LoadMoreGate::new(Duration::from_secs(1));

        assert!(gate.try_acquire(start));
        gate.release();
        assert!(!gate.is_latched(start));
        assert!(gate.try_acquire(start));
    }
}
