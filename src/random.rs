//! Deterministic random number generation.
//!
//! Every stochastic decision in a pass (padding, operator dispatch,
//! selection, crossover, mutation, test shuffling) draws from one
//! [`SeededRng`] stream, so a pass is reproducible from its [`Seed`].
//!
//! Operators are written against the small [`RandomSource`] trait rather
//! than [`rand::Rng`] so that tests can script exact draw sequences.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, RngCore, SeedableRng};

/// Seed for a [`SeededRng`].
///
/// Either a number or an arbitrary text string. Text seeds are hashed
/// with FNV-1a so the same string always yields the same stream.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(untagged))]
pub enum Seed {
    /// Numeric seed.
    Number(u64),
    /// Text seed, hashed to 64 bits.
    Text(String),
}

impl Seed {
    /// Reduces the seed to the 64-bit value used to initialise the stream.
    pub fn to_u64(&self) -> u64 {
        match self {
            Seed::Number(n) => *n,
            Seed::Text(s) => fnv1a(s.as_bytes()),
        }
    }
}

impl From<u64> for Seed {
    fn from(n: u64) -> Self {
        Seed::Number(n)
    }
}

impl From<&str> for Seed {
    fn from(s: &str) -> Self {
        Seed::Text(s.to_owned())
    }
}

impl From<String> for Seed {
    fn from(s: String) -> Self {
        Seed::Text(s)
    }
}

fn fnv1a(bytes: &[u8]) -> u64 {
    const OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
    const PRIME: u64 = 0x0000_0100_0000_01b3;
    bytes
        .iter()
        .fold(OFFSET, |hash, &b| (hash ^ b as u64).wrapping_mul(PRIME))
}

/// Minimal source of randomness used by the genetic operators.
pub trait RandomSource {
    /// Uniform value in `[0, 1)`.
    fn next_f64(&mut self) -> f64;

    /// Uniform signed 32-bit integer.
    fn next_i32(&mut self) -> i32;

    /// Non-negative identity seed, as handed to the oracle.
    fn next_unique_seed(&mut self) -> u32 {
        self.next_i32().unsigned_abs()
    }
}

/// Reproducible pseudo-random stream.
///
/// Implements both [`RandomSource`] and [`RngCore`], so it can be used
/// with the operators in this crate and with any `rand` API.
#[derive(Debug, Clone)]
pub struct SeededRng {
    inner: StdRng,
}

impl SeededRng {
    /// Creates a stream from a seed.
    pub fn new(seed: &Seed) -> Self {
        Self {
            inner: StdRng::seed_from_u64(seed.to_u64()),
        }
    }

    /// Creates a non-deterministic stream.
    pub fn from_entropy() -> Self {
        create_rng(rand::random())
    }

    /// Restarts the stream from a new seed.
    pub fn reseed(&mut self, seed: &Seed) {
        self.inner = StdRng::seed_from_u64(seed.to_u64());
    }

    /// Draws the seed that continues this stream in a later pass.
    pub fn next_seed(&mut self) -> Seed {
        Seed::Number(self.inner.next_u64())
    }
}

impl RandomSource for SeededRng {
    fn next_f64(&mut self) -> f64 {
        self.inner.random::<f64>()
    }

    fn next_i32(&mut self) -> i32 {
        self.inner.random::<i32>()
    }
}

impl RngCore for SeededRng {
    fn next_u32(&mut self) -> u32 {
        self.inner.next_u32()
    }

    fn next_u64(&mut self) -> u64 {
        self.inner.next_u64()
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        self.inner.fill_bytes(dest)
    }
}

/// Creates a [`SeededRng`] from a numeric seed.
pub fn create_rng(seed: u64) -> SeededRng {
    SeededRng::new(&Seed::Number(seed))
}

/// Shuffles a slice in place (Fisher-Yates).
pub fn shuffle<T, R: RngCore + ?Sized>(items: &mut [T], rng: &mut R) {
    items.shuffle(rng);
}
