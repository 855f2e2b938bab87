//! Spawn interval sources.
//!
//! After each spawn the carousel draws how long to wait before the next
//! attempt. Production draws uniformly from a configured range with a
//! seeded RNG, so a seed reproduces the same arrival pattern. Tests inject
//! a [`FixedDelay`].

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// A source of spawn delays in milliseconds.
pub trait SpawnDelay: Send + core::fmt::Debug {
    /// Draw the delay before the next spawn attempt.
    fn next_delay_ms(&mut self) -> f64;
}

/// Uniform delays in `[min_ms, max_ms]` from a seeded RNG.
#[derive(Debug, Clone)]
pub struct UniformDelay {
    rng: StdRng,
    min_ms: f64,
    max_ms: f64,
}

impl UniformDelay {
    /// Create a seeded uniform source. Inverted bounds are swapped.
    pub fn new(seed: u64, min_ms: u32, max_ms: u32) -> Self {
        let (lo, hi) = if min_ms <= max_ms {
            (min_ms, max_ms)
        } else {
            (max_ms, min_ms)
        };
        Self {
            rng: StdRng::seed_from_u64(seed),
            min_ms: f64::from(lo),
            max_ms: f64::from(hi),
        }
    }

    /// Lower bound in milliseconds.
    pub const fn min_ms(&self) -> f64 {
        self.min_ms
    }

    /// Upper bound in milliseconds.
    pub const fn max_ms(&self) -> f64 {
        self.max_ms
    }
}

impl SpawnDelay for UniformDelay {
    fn next_delay_ms(&mut self) -> f64 {
        if self.max_ms > self.min_ms {
            self.rng.random_range(self.min_ms..=self.max_ms)
        } else {
            self.min_ms
        }
    }
}

/// The same delay every time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FixedDelay(pub f64);

impl SpawnDelay for FixedDelay {
    fn next_delay_ms(&mut self) -> f64 {
        self.0
    }
}
