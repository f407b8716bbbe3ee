//! Debounce timer
//!
//! A single-slot deferred task. The session owns one of these for the prompt
//! redraw; the host polls it, so there is never more than one live deadline.

use std::time::{Duration, Instant};

/// Source of the current time
pub trait Clock {
    fn now(&self) -> Instant;
}

/// Wall clock
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Cancelable, rearmable single deadline
#[derive(Clone, Debug)]
pub struct DebounceTimer {
    window: Duration,
    deadline: Option<Instant>,
}

impl DebounceTimer {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            deadline: None,
        }
    }

    /// Arm the timer, replacing any pending deadline
    pub fn arm(&mut self, now: Instant) {
        self.deadline = Some(now + self.window);
    }

    pub fn cancel(&mut self) {
        self.deadline = None;
    }

    pub fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Returns true exactly once when the deadline has passed
    pub fn take_due(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fires_once() {
        let start = Instant::now();
        let mut timer = DebounceTimer::new(Duration::from_millis(100));
        timer.arm(start);
        assert!(!timer.take_due(start + Duration::from_millis(99)));
        assert!(timer.take_due(start + Duration::from_millis(100)));
        assert!(!timer.take_due(start + Duration::from_millis(500)));
        assert!(!timer.is_pending());
    }

    #[test]
    fn test_rearm_replaces_deadline() {
        let start = Instant::now();
        let mut timer = DebounceTimer::new(Duration::from_millis(100));
        timer.arm(start);
        timer.arm(start + Duration::from_millis(60));
        assert_eq!(timer.deadline(), Some(start + Duration::from_millis(160)));
        assert!(!timer.take_due(start + Duration::from_millis(100)));
        assert!(timer.take_due(start + Duration::from_millis(160)));
    }

    #[test]
    fn test_cancel() {
        let start = Instant::now();
        let mut timer = DebounceTimer::new(Duration::from_millis(10));
        timer.arm(start);
        timer.cancel();
        assert!(!timer.take_due(start + Duration::from_secs(1)));
    }
}
