//! Fixed-Cadence Ticker
//!
//! Paces [`crate::Engine::run`] at the configured tick interval.

#[cfg(not(target_arch = "wasm32"))]
use std::time::{Duration, Instant};

#[cfg(target_arch = "wasm32")]
use web_time::{Duration, Instant};

/// Fixed-cadence pulse generator.
///
/// Each [`wait`](Self::wait) sleeps until the next deadline on a fixed grid.
/// A caller that falls more than one interval behind skips the missed pulses
/// instead of bursting to catch up.
#[derive(Debug, Clone)]
pub struct Ticker {
    interval: Duration,
    next: Instant,
    /// Total number of pulses delivered.
    pub pulses: u64,
    /// Total number of pulses skipped because the caller was late.
    pub skipped: u64,
}

impl Ticker {
    /// A ticker whose first pulse is due one `interval` from now.
    #[must_use]
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            next: Instant::now() + interval,
            pulses: 0,
            skipped: 0,
        }
    }

    #[inline]
    #[must_use]
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Blocks until the next pulse is due.
    pub fn wait(&mut self) {
        let now = Instant::now();
        if self.next > now {
            std::thread::sleep(self.next - now);
            self.next += self.interval;
        } else {
            let late = now - self.next;
            if !self.interval.is_zero() && late >= self.interval {
                let missed = (late.as_nanos() / self.interval.as_nanos()) as u64;
                self.skipped += missed;
                log::trace!("Ticker fell behind by {late:?}, skipping {missed} pulse(s)");
                self.next = now + self.interval;
            } else {
                self.next += self.interval;
            }
        }
        self.pulses += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ticker_keeps_cadence() {
        let mut ticker = Ticker::new(Duration::from_millis(5));
        let start = Instant::now();
        for _ in 0..4 {
            ticker.wait();
        }
        assert!(start.elapsed() >= Duration::from_millis(15));
        assert_eq!(ticker.pulses, 4);
    }
}
