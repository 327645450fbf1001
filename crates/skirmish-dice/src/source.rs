//! Randomness sources.
//!
//! Every roll in the engine draws from a [`RandomSource`] passed in by the
//! caller, so tests can pin outcomes with [`FixedSource`] or
//! [`SequenceSource`] while production code uses [`RngSource`].

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// A source of uniformly distributed integers.
pub trait RandomSource: Send {
    /// Return an integer in `[0, n)`.
    ///
    /// Callers must pass `n > 0`; a zero bound returns 0.
    fn int_in_range(&mut self, n: u32) -> u32;

    /// Roll one die with `sides` faces, returning a value in `[1, sides]`.
    fn roll_die(&mut self, sides: u32) -> i32 {
        let face = self.int_in_range(sides);
        i32::try_from(face).unwrap_or(i32::MAX).saturating_add(1)
    }
}

// ---------------------------------------------------------------------------
// RngSource
// ---------------------------------------------------------------------------

/// Adapter over any [`rand::Rng`].
#[derive(Debug, Clone)]
pub struct RngSource<R> {
    rng: R,
}

impl<R: Rng + Send> RngSource<R> {
    /// Wrap an existing generator.
    pub const fn new(rng: R) -> Self {
        Self { rng }
    }
}

impl RngSource<StdRng> {
    /// A deterministic source seeded from `seed`.
    pub fn seeded(seed: u64) -> Self {
        Self::new(StdRng::seed_from_u64(seed))
    }

    /// A source seeded from the operating system.
    pub fn from_os_rng() -> Self {
        Self::new(StdRng::from_os_rng())
    }
}

impl<R: Rng + Send> RandomSource for RngSource<R> {
    fn int_in_range(&mut self, n: u32) -> u32 {
        if n == 0 {
            return 0;
        }
        self.rng.random_range(0..n)
    }
}

// ---------------------------------------------------------------------------
// Test sources
// ---------------------------------------------------------------------------

/// Always returns the same value, clamped to the bound.
///
/// `FixedSource::new(19)` rolls a natural 20 on a d20 and a 6 on a d6.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedSource {
    value: u32,
}

impl FixedSource {
    /// A source that always yields `min(value, n - 1)`.
    pub const fn new(value: u32) -> Self {
        Self { value }
    }
}

impl RandomSource for FixedSource {
    fn int_in_range(&mut self, n: u32) -> u32 {
        self.value.min(n.saturating_sub(1))
    }
}

/// Cycles through a fixed list of values, each clamped to the bound.
///
/// An empty list behaves like `FixedSource::new(0)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SequenceSource {
    values: Vec<u32>,
    next: usize,
}

impl SequenceSource {
    /// A source that replays `values` in order, wrapping at the end.
    pub fn new(values: impl Into<Vec<u32>>) -> Self {
        Self {
            values: values.into(),
            next: 0,
        }
    }
}

impl RandomSource for SequenceSource {
    fn int_in_range(&mut self, n: u32) -> u32 {
        let Some(&value) = self.values.get(self.next) else {
            return 0;
        };
        self.next = self.next.saturating_add(1);
        if self.next >= self.values.len() {
            self.next = 0;
        }
        value.min(n.saturating_sub(1))
    }
}
