//! Rank-based parent selection.
//!
//! The population is sorted fitness-ascending before selection, so the
//! fittest candidate sits at the highest index. A uniform draw `u` is
//! mapped to rank `floor((1 - u^(1 + elitism)) * n)`, which is uniform
//! for `elitism = 0` and increasingly skewed toward high ranks as
//! `elitism` grows. Every rank keeps a non-zero probability.
//!
//! Because only ranks are used, fitness does not need to be numeric.

use crate::random::RandomSource;

/// Power-law rank selector over a fitness-ascending array.
///
/// # Examples
///
/// ```
/// use u_genecode::ga::RankSelector;
/// use u_genecode::random::create_rng;
///
/// let selector = RankSelector::new(0.35);
/// let mut rng = create_rng(42);
/// let idx = selector.select(10, &mut rng);
/// assert!(idx < 10);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RankSelector {
    elitism: f64,
}

impl RankSelector {
    /// Creates a selector. Negative elitism is treated as `0`.
    pub fn new(elitism: f64) -> Self {
        Self {
            elitism: elitism.max(0.0),
        }
    }

    /// The selection pressure exponent in use.
    pub fn elitism(&self) -> f64 {
        self.elitism
    }

    /// Picks an index in `0..len` from a fitness-ascending array.
    ///
    /// Consumes exactly one draw.
    ///
    /// # Panics
    /// Panics if `len` is zero.
    pub fn select<R: RandomSource + ?Sized>(&self, len: usize, rng: &mut R) -> usize {
        assert!(len > 0, "cannot select from empty population");
        let u = rng.next_f64();
        rank_index(u, self.elitism, len)
    }
}

/// Maps a uniform draw to a rank, clamped to `0..len`.
fn rank_index(u: f64, elitism: f64, len: usize) -> usize {
    let scaled = (1.0 - u.powf(1.0 + elitism)) * len as f64;
    // u = 0 maps to exactly `len`
    (scaled.floor().max(0.0) as usize).min(len - 1)
}
