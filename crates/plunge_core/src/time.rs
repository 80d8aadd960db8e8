//! Monotonic clocks.
//!
//! Every timestamp in the engine is a [`Duration`] measured from the epoch of
//! the [`Clock`] that produced it. Falling objects, the spawn gate and the
//! ticker all compare timestamps from the same clock.

use std::cell::Cell;
use std::rc::Rc;
#[cfg(not(target_arch = "wasm32"))]
use std::time::Instant;
use std::time::Duration;

#[cfg(target_arch = "wasm32")]
use web_time::Instant;

/// A monotonic time source.
pub trait Clock {
    /// Time elapsed since this clock's epoch. Never decreases.
    fn now(&self) -> Duration;
}

/// Wall clock backed by [`Instant`]; the epoch is the moment of creation.
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    epoch: Instant,
}

impl SystemClock {
    #[must_use]
    pub fn new() -> Self {
        Self {
            epoch: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now(&self) -> Duration {
        self.epoch.elapsed()
    }
}

/// A clock that only moves when told to. Clones share the same time, so a
/// test can keep one handle and give another to the engine.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now: Rc<Cell<Duration>>,
}

impl ManualClock {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the absolute time. Moving backwards is ignored.
    pub fn set(&self, now: Duration) {
        if now >= self.now.get() {
            self.now.set(now);
        } else {
            log::warn!("ManualClock ignored a backwards step to {now:?}");
        }
    }

    pub fn set_millis(&self, millis: u64) {
        self.set(Duration::from_millis(millis));
    }

    pub fn advance(&self, delta: Duration) {
        self.now.set(self.now.get() + delta);
    }

    pub fn advance_millis(&self, millis: u64) {
        self.advance(Duration::from_millis(millis));
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Duration {
        self.now.get()
    }
}

impl<C: Clock + ?Sized> Clock for Box<C> {
    fn now(&self) -> Duration {
        (**self).now()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manual_clock_is_shared_and_monotonic() {
        let clock = ManualClock::new();
        let handle = clock.clone();

        handle.set_millis(500);
        assert_eq!(clock.now(), Duration::from_millis(500));

        handle.set_millis(100);
        assert_eq!(clock.now(), Duration::from_millis(500));

        clock.advance_millis(250);
        assert_eq!(handle.now(), Duration::from_millis(750));
    }
}
