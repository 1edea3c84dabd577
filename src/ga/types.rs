//! Core trait definitions for the generation driver.
//!
//! [`EvolutionProblem`] is the contract between the generic driver and a
//! domain: how to create, measure, rank, breed, and mutate candidates.
//! [`MeasuredCandidate`] is the only place a fitness value lives.

use crate::error::Result;
use crate::random::SeededRng;
use std::cmp::Ordering;

/// A candidate paired with the fitness measured for it.
///
/// Produced only by [`EvolutionProblem::measure`]; operators work on bare
/// candidates.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MeasuredCandidate<C, F> {
    /// The measured candidate.
    pub candidate: C,
    /// Its fitness.
    pub fitness: F,
}

impl<C, F> MeasuredCandidate<C, F> {
    /// Pairs a candidate with its fitness.
    pub fn new(candidate: C, fitness: F) -> Self {
        Self { candidate, fitness }
    }
}

/// Defines an evolutionary search problem.
///
/// Fitness does not have to be numeric: the driver only needs the total
/// preorder from [`compare_fitness`](EvolutionProblem::compare_fitness),
/// because selection is rank based.
///
/// # Ordering convention
///
/// `compare_fitness(a, b)` returns [`Ordering::Less`] when `a` is *worse*
/// than `b`. Sorting ascending therefore places the fittest candidate
/// last.
///
/// # Failures
///
/// Any error returned from these methods aborts the current pass. The
/// driver does not retry.
///
/// # Implementing
///
/// ```ignore
/// struct SumProblem { target: i64 }
///
/// impl EvolutionProblem for SumProblem {
///     type Candidate = Vec<i64>;
///     type Fitness = i64;
///
///     fn random_candidate(&self, rng: &mut SeededRng) -> Result<Vec<i64>> {
///         Ok((0..15).map(|_| (rng.next_i32() % 100) as i64).collect())
///     }
///
///     fn measure(&self, c: &Vec<i64>, _rng: &mut SeededRng)
///         -> Result<MeasuredCandidate<Vec<i64>, i64>> {
///         let fitness = -(c.iter().sum::<i64>() - self.target).abs();
///         Ok(MeasuredCandidate::new(c.clone(), fitness))
///     }
///
///     fn compare_fitness(&self, a: &i64, b: &i64) -> Ordering { a.cmp(b) }
///
///     fn crossover(&self, a: &Vec<i64>, b: &Vec<i64>, rng: &mut SeededRng)
///         -> Result<Vec<i64>> {
///         Ok(a.iter().zip(b).map(|(x, y)| if rng.next_f64() < 0.5 { *x } else { *y }).collect())
///     }
/// }
/// ```
pub trait EvolutionProblem {
    /// The candidate (solution) type.
    type Candidate: Clone;

    /// The fitness type.
    type Fitness: Clone + std::fmt::Debug;

    /// Creates a fresh random candidate.
    ///
    /// Used to pad the population and for diversity injection.
    fn random_candidate(&self, rng: &mut SeededRng) -> Result<Self::Candidate>;

    /// Measures a candidate.
    ///
    /// The returned candidate may differ from the input (for example, a
    /// repaired version of it).
    fn measure(
        &self,
        candidate: &Self::Candidate,
        rng: &mut SeededRng,
    ) -> Result<MeasuredCandidate<Self::Candidate, Self::Fitness>>;

    /// Compares two fitness values. `Greater` means `a` is fitter.
    fn compare_fitness(&self, a: &Self::Fitness, b: &Self::Fitness) -> Ordering;

    /// Breeds a new candidate from two parents.
    fn crossover(
        &self,
        a: &Self::Candidate,
        b: &Self::Candidate,
        rng: &mut SeededRng,
    ) -> Result<Self::Candidate>;

    /// Perturbs a candidate at the given per-gene rate.
    ///
    /// The default implementation returns the candidate unchanged, which
    /// is the same as running without a mutation operator.
    fn mutate(
        &self,
        candidate: Self::Candidate,
        _rate: f64,
        _rng: &mut SeededRng,
    ) -> Result<Self::Candidate> {
        Ok(candidate)
    }

    /// Called after each pass of [`GeneticRunner::run`](super::GeneticRunner::run)
    /// with the fitness-ascending snapshot of the generation just consumed.
    fn on_generation(
        &self,
        _generation: usize,
        _ranked: &[MeasuredCandidate<Self::Candidate, Self::Fitness>],
    ) {
    }
}
