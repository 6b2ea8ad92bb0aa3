//! Deterministic randomization for stimulus selection.
//!
//! The selector only needs two primitives from a random source: a uniform
//! integer in an inclusive range and a draw from a weighted discrete
//! distribution. [`Xorshift64`] is the built-in implementation; any other
//! [`RandomSource`] can be injected per model.

use sha2::{Digest, Sha256};
use std::fmt;

/// Deterministic seed for reproducible selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Seed(u64);

impl Seed {
    /// Use a raw 64-bit value as the seed
    #[must_use]
    pub const fn from_u64(value: u64) -> Self {
        Self(value)
    }

    /// Derive a seed from an integer (splitmix64 finalizer)
    #[must_use]
    pub const fn from_int(value: i64) -> Self {
        let mut z = (value as u64).wrapping_add(0x9E37_79B9_7F4A_7C15);
        z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
        Self(z ^ (z >> 31))
    }

    /// Derive a seed from a name, typically the model or instance path
    #[must_use]
    pub fn from_name(name: &str) -> Self {
        let digest = Sha256::digest(name.as_bytes());
        let mut bytes = [0u8; 8];
        bytes.copy_from_slice(&digest[..8]);
        Self(u64::from_le_bytes(bytes))
    }

    /// Get the raw seed value
    #[must_use]
    pub const fn value(self) -> u64 {
        self.0
    }
}

/// Random service consumed by the selector
pub trait RandomSource: fmt::Debug {
    /// Restart the sequence from `seed`
    fn reseed(&mut self, seed: Seed);

    /// Current internal state; reseeding with it resumes the sequence
    fn state(&self) -> u64;

    /// Uniform integer in `[lo, hi]` (returns `lo` when `lo >= hi`)
    fn uniform_int(&mut self, lo: i64, hi: i64) -> i64;

    /// Index drawn with probability proportional to its weight.
    ///
    /// Negative weights count as zero. Returns `None` when no weight is
    /// positive.
    fn weighted_discrete(&mut self, weights: &[i64]) -> Option<usize>;
}

/// xorshift64 generator
#[derive(Debug, Clone)]
pub struct Xorshift64 {
    state: u64,
}

impl Xorshift64 {
    /// Create a generator from a seed
    #[must_use]
    pub const fn new(seed: Seed) -> Self {
        // Ensure non-zero state
        let state = if seed.0 == 0 { 1 } else { seed.0 };
        Self { state }
    }

    /// Next raw 64-bit value
    pub fn next_u64(&mut self) -> u64 {
        let mut x = self.state;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.state = x;
        x
    }
}

impl Default for Xorshift64 {
    fn default() -> Self {
        Self::new(Seed::from_u64(1))
    }
}

impl RandomSource for Xorshift64 {
    fn reseed(&mut self, seed: Seed) {
        *self = Self::new(seed);
    }

    fn state(&self) -> u64 {
        self.state
    }

    fn uniform_int(&mut self, lo: i64, hi: i64) -> i64 {
        if lo >= hi {
            return lo;
        }
        let span = (i128::from(hi) - i128::from(lo) + 1) as u128;
        let offset = u128::from(self.next_u64()) % span;
        (i128::from(lo) + offset as i128) as i64
    }

    fn weighted_discrete(&mut self, weights: &[i64]) -> Option<usize> {
        let total: u128 = weights.iter().map(|&w| w.max(0) as u128).sum();
        if total == 0 {
            return None;
        }
        let mut pick = u128::from(self.next_u64()) % total;
        for (index, &weight) in weights.iter().enumerate() {
            let weight = weight.max(0) as u128;
            if pick < weight {
                return Some(index);
            }
            pick -= weight;
        }
        // pick < total, so the loop always returns
        None
    }
}
