//! Trigger debouncing.

use std::time::{Duration, Instant};

/// Suppresses triggers that arrive within `window` of the last accepted one.
///
/// A zero window never suppresses anything.
#[derive(Debug, Clone, Copy, Default)]
pub struct Debouncer {
    window: Duration,
    last_trigger: Option<Instant>,
}

impl Debouncer {
    #[must_use]
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            last_trigger: None,
        }
    }

    /// Whether a trigger at `now` would be accepted.
    ///
    /// Accepted iff the time since the last trigger is strictly greater than
    /// the window.
    fn is_ready(&self, now: Instant) -> bool {
        if self.window.is_zero() {
            return true;
        }
        match self.last_trigger {
            Some(last) => now.saturating_duration_since(last) > self.window,
            None => true,
        }
    }

    fn record(&mut self, now: Instant) {
        self.last_trigger = Some(now);
    }

    /// Accept a trigger at `now` and remember it, or reject it without
    /// touching the last accepted time.
    pub fn accept(&mut self, now: Instant) -> bool {
        if self.is_ready(now) {
            self.record(now);
            true
        } else {
            false
        }
    }
}
