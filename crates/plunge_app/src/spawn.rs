//! Spawn Policy
//!
//! Decides which image the next object shows and where it lands. Images are
//! picked either uniformly at random or round-robin; the round-robin cursor
//! is an explicit field that starts at index 0, so three images spawn as
//! `A, B, C, A, B, C, …`.

use std::f32::consts::FRAC_PI_4;

use rand::rngs::StdRng;
use rand::{RngExt, SeedableRng};

/// Image selection and random placement for spawned objects.
#[derive(Debug)]
pub struct SpawnPolicy {
    randomize: bool,
    cursor: usize,
    rng: StdRng,
}

impl SpawnPolicy {
    /// A policy seeded from `seed`, or from the thread RNG when `None`.
    #[must_use]
    pub fn new(randomize: bool, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::seed_from_u64(rand::random()),
        };
        Self {
            randomize,
            cursor: 0,
            rng,
        }
    }

    #[inline]
    #[must_use]
    pub fn is_randomized(&self) -> bool {
        self.randomize
    }

    /// Index the next round-robin pick will return.
    #[inline]
    #[must_use]
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Picks the next image index out of `count`, or `None` when there are no
    /// images.
    pub fn next_index(&mut self, count: usize) -> Option<usize> {
        if count == 0 {
            return None;
        }
        if self.randomize {
            return Some(self.rng.random_range(0..count));
        }
        let index = self.cursor % count;
        self.cursor = (index + 1) % count;
        Some(index)
    }

    /// End rotation, uniform in `[-π/4, π/4]` radians.
    pub fn end_rotation(&mut self) -> f32 {
        self.rng.random_range(-FRAC_PI_4..=FRAC_PI_4)
    }

    /// A spawn center on a `width × height` surface.
    ///
    /// When `constrain` is set the center stays `margin` pixels inside every
    /// edge; an axis shorter than `2 · margin` collapses to its midpoint.
    /// Otherwise the center is uniform over the whole surface.
    pub fn position(&mut self, width: f32, height: f32, margin: f32, constrain: bool) -> (f32, f32) {
        let margin = if constrain { margin } else { 0.0 };
        (
            self.along_axis(width, margin),
            self.along_axis(height, margin),
        )
    }

    fn along_axis(&mut self, extent: f32, margin: f32) -> f32 {
        let (lo, hi) = (margin, extent - margin);
        if hi <= lo {
            return extent / 2.0;
        }
        self.rng.random_range(lo..hi)
    }
}
