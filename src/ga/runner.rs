//! Generation driver.
//!
//! [`GeneticRunner::evolve_once`] performs one pass:
//! pad → measure → rank → rebuild (inject | breed | graduate) → reseed.
//! [`GeneticRunner::run`] repeats passes and keeps track of the best
//! measured candidate.

use super::config::GeneticConfig;
use super::selection::RankSelector;
use super::types::{EvolutionProblem, MeasuredCandidate};
use crate::error::{Error, Result};
use crate::random::{RandomSource, SeededRng};
use log::{debug, info};
use std::cmp::Ordering;
use std::sync::atomic::{AtomicBool, Ordering as AtomicOrdering};
use std::sync::Arc;

/// Measured candidate of a problem.
pub type Measured<P> =
    MeasuredCandidate<<P as EvolutionProblem>::Candidate, <P as EvolutionProblem>::Fitness>;

/// Result of a multi-generation run.
#[derive(Debug, Clone)]
pub struct EvolutionResult<C, F> {
    /// The fittest measured candidate seen in any generation.
    ///
    /// `None` only when the run was cancelled before the first pass.
    pub best: Option<MeasuredCandidate<C, F>>,

    /// Number of passes executed.
    pub generations: usize,

    /// Whether the run was cancelled externally.
    pub cancelled: bool,

    /// Fitness of the fittest candidate of each generation.
    pub fitness_history: Vec<F>,
}

/// Executes evolution passes.
///
/// # Usage
///
/// ```ignore
/// let mut config = GeneticConfig::default().with_seed(42u64);
/// let mut population = Vec::new();
/// let ranked = GeneticRunner::evolve_once(&problem, &mut config, &mut population)?;
/// println!("best: {:?}", ranked.last().map(|m| &m.fitness));
/// ```
pub struct GeneticRunner;

impl GeneticRunner {
    /// Runs one generation.
    ///
    /// On return `population` holds the next generation (exactly
    /// `config.population_size` candidates) and `config.seed` holds the
    /// seed for the following pass. The returned vector is the
    /// fitness-ascending snapshot of the generation that was consumed, so
    /// its last element is the fittest.
    ///
    /// Errors from the problem abort the pass and are returned as is; the
    /// population is left in an unspecified state.
    pub fn evolve_once<P: EvolutionProblem>(
        problem: &P,
        config: &mut GeneticConfig,
        population: &mut Vec<P::Candidate>,
    ) -> Result<Vec<Measured<P>>> {
        config.validate()?;

        let mut rng = match &config.seed {
            Some(seed) => SeededRng::new(seed),
            None => SeededRng::from_entropy(),
        };
        let target = config.population_size;

        // 1. Pad. An oversized population is trimmed by the rebuild below.
        while population.len() < target {
            let candidate = problem.random_candidate(&mut rng)?;
            population.push(candidate);
        }

        // 2. Measure
        let mut measured: Vec<Measured<P>> = Vec::with_capacity(population.len());
        for candidate in population.iter() {
            measured.push(problem.measure(candidate, &mut rng)?);
        }

        // 3. Rank, fittest last
        measured.sort_by(|a, b| problem.compare_fitness(&a.fitness, &b.fitness));

        // 4. Rebuild
        population.clear();
        let selector = RankSelector::new(config.effective_elitism());
        let n = measured.len();

        for slot in 0..target {
            if rng.next_f64() < config.diversity_injection_rate {
                debug!("slot {slot}: diversity injection");
                population.push(problem.random_candidate(&mut rng)?);
                continue;
            }

            if rng.next_f64() < config.crossover_rate {
                let a = selector.select(n, &mut rng);
                let b = second_parent(&selector, a, n, &mut rng);
                debug!("slot {slot}: crossover of ranks {a} and {b}");
                let child =
                    problem.crossover(&measured[a].candidate, &measured[b].candidate, &mut rng)?;
                population.push(problem.mutate(child, config.mutation_rate, &mut rng)?);
                continue;
            }

            let g = selector.select(n, &mut rng);
            debug!("slot {slot}: graduating rank {g}");
            let graduate = measured[g].candidate.clone();
            population.push(problem.mutate(graduate, config.mutation_rate, &mut rng)?);
        }

        // 5. Continue the stream next pass
        config.seed = Some(rng.next_seed());

        Ok(measured)
    }

    /// Runs `generations` passes.
    pub fn run<P: EvolutionProblem>(
        problem: &P,
        config: &mut GeneticConfig,
        population: &mut Vec<P::Candidate>,
        generations: usize,
    ) -> Result<EvolutionResult<P::Candidate, P::Fitness>> {
        Self::run_with_cancel(problem, config, population, generations, None)
    }

    /// Runs `generations` passes with an optional cancellation token.
    ///
    /// The flag is checked between passes; a pass in flight is never
    /// interrupted.
    pub fn run_with_cancel<P: EvolutionProblem>(
        problem: &P,
        config: &mut GeneticConfig,
        population: &mut Vec<P::Candidate>,
        generations: usize,
        cancel: Option<Arc<AtomicBool>>,
    ) -> Result<EvolutionResult<P::Candidate, P::Fitness>> {
        if generations == 0 {
            return Err(Error::InvalidConfig(
                "generations must be at least 1".into(),
            ));
        }

        let mut best: Option<Measured<P>> = None;
        let mut fitness_history = Vec::with_capacity(generations);
        let mut cancelled = false;
        let mut executed = 0usize;

        for gen in 0..generations {
            if let Some(ref flag) = cancel {
                if flag.load(AtomicOrdering::Relaxed) {
                    cancelled = true;
                    break;
                }
            }

            let ranked = Self::evolve_once(problem, config, population)?;
            executed = gen + 1;

            if let Some(gen_best) = ranked.last() {
                info!(
                    "generation {}: best fitness {:?} of {}",
                    executed,
                    gen_best.fitness,
                    ranked.len()
                );
                fitness_history.push(gen_best.fitness.clone());

                let improved = match &best {
                    Some(current) => {
                        problem.compare_fitness(&gen_best.fitness, &current.fitness)
                            == Ordering::Greater
                    }
                    None => true,
                };
                if improved {
                    best = Some(gen_best.clone());
                }
            }

            problem.on_generation(executed, &ranked);
        }

        Ok(EvolutionResult {
            best,
            generations: executed,
            cancelled,
            fitness_history,
        })
    }
}

/// Redraws attempted before the second parent is picked uniformly.
const MAX_PARENT_REDRAWS: usize = 64;

/// Selects a parent other than rank `a` when there is more than one rank.
///
/// A very large elitism concentrates selection on the top rank, so after
/// [`MAX_PARENT_REDRAWS`] equal draws the parent is taken uniformly from the
/// other ranks.
fn second_parent<R: RandomSource + ?Sized>(
    selector: &RankSelector,
    a: usize,
    n: usize,
    rng: &mut R,
) -> usize {
    let mut b = selector.select(n, rng);
    if n < 2 {
        return b;
    }
    let mut redraws = 0;
    while b == a {
        if redraws == MAX_PARENT_REDRAWS {
            let offset = rng.next_i32().unsigned_abs() as usize % (n - 1);
            return (a + 1 + offset) % n;
        }
        b = selector.select(n, rng);
        redraws += 1;
    }
    b
}

// ============================================================================
// Tests
// ============================================================================
