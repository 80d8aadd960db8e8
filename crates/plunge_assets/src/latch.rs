//! Ready Latch
//!
//! Counts outstanding image loads down to zero for [`crate::ImageLoader`].

/// Count-down latch that opens exactly once.
///
/// Created with the number of outstanding loads; each completion counts it
/// down by one. The call that reaches zero is the only one that reports the
/// opening, however many extra completions arrive afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReadyLatch {
    remaining: usize,
    opened: bool,
}

impl ReadyLatch {
    /// A latch over `count` events. A zero count is open from the start but
    /// still reports its opening once, from [`open_if_empty`](Self::open_if_empty).
    #[must_use]
    pub fn new(count: usize) -> Self {
        Self {
            remaining: count,
            opened: false,
        }
    }

    /// Records one completion. Returns `true` only for the call that opens the latch.
    pub fn count_down(&mut self) -> bool {
        if self.opened {
            return false;
        }
        self.remaining = self.remaining.saturating_sub(1);
        self.open_if_empty()
    }

    /// Opens the latch if nothing is outstanding. Returns `true` if this call opened it.
    pub fn open_if_empty(&mut self) -> bool {
        if !self.opened && self.remaining == 0 {
            self.opened = true;
            return true;
        }
        false
    }

    #[inline]
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.remaining
    }

    #[inline]
    #[must_use]
    pub fn is_open(&self) -> bool {
        self.opened
    }
}
