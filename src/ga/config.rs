//! Generation driver configuration.
//!
//! [`GeneticConfig`] holds the tunables of one pass. Its `seed` is
//! rewritten at the end of every pass, so the same config object drives a
//! deterministic but non-repeating sequence of passes.

use crate::error::{Error, Result};
use crate::random::Seed;

/// Configuration for [`GeneticRunner`](super::GeneticRunner).
///
/// # Defaults
///
/// ```
/// use u_genecode::ga::GeneticConfig;
///
/// let config = GeneticConfig::default();
/// assert_eq!(config.population_size, 100);
/// assert!(config.seed.is_none());
/// ```
///
/// # Builder Pattern
///
/// ```
/// use u_genecode::ga::GeneticConfig;
///
/// let config = GeneticConfig::default()
///     .with_population_size(20)
///     .with_elitism(0.5)
///     .with_crossover_rate(0.8)
///     .with_seed(42u64);
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GeneticConfig {
    /// Number of candidates in each generation.
    ///
    /// The population is padded up to this size at the start of a pass and
    /// the next generation always has exactly this many members. Zero is
    /// allowed: the pass measures what it is given and returns an empty
    /// next generation.
    pub population_size: usize,

    /// Seed of the pass. `None` draws a non-deterministic seed.
    ///
    /// Overwritten with the stream's next draw after each pass.
    pub seed: Option<Seed>,

    /// Selection pressure exponent (>= 0).
    ///
    /// `0` picks ranks uniformly; larger values bias selection toward the
    /// fittest end without excluding low ranks.
    pub elitism: f64,

    /// Probability that a slot is filled by a fresh random candidate.
    pub diversity_injection_rate: f64,

    /// Probability that a (non-injected) slot is filled by crossover.
    ///
    /// Otherwise an existing candidate graduates.
    pub crossover_rate: f64,

    /// Per-gene mutation probability handed to the mutation operator.
    pub mutation_rate: f64,
}

impl Default for GeneticConfig {
    fn default() -> Self {
        Self {
            population_size: 100,
            seed: None,
            elitism: 0.35,
            diversity_injection_rate: 0.01,
            crossover_rate: 0.7,
            mutation_rate: 0.001,
        }
    }
}

impl GeneticConfig {
    /// Sets the population size.
    pub fn with_population_size(mut self, n: usize) -> Self {
        self.population_size = n;
        self
    }

    /// Sets the seed.
    pub fn with_seed(mut self, seed: impl Into<Seed>) -> Self {
        self.seed = Some(seed.into());
        self
    }

    /// Sets the elitism exponent (clamped to >= 0).
    pub fn with_elitism(mut self, elitism: f64) -> Self {
        self.elitism = elitism.max(0.0);
        self
    }

    /// Sets the diversity injection rate.
    pub fn with_diversity_injection_rate(mut self, rate: f64) -> Self {
        self.diversity_injection_rate = rate.clamp(0.0, 1.0);
        self
    }

    /// Sets the crossover rate.
    pub fn with_crossover_rate(mut self, rate: f64) -> Self {
        self.crossover_rate = rate.clamp(0.0, 1.0);
        self
    }

    /// Sets the mutation rate.
    pub fn with_mutation_rate(mut self, rate: f64) -> Self {
        self.mutation_rate = rate.clamp(0.0, 1.0);
        self
    }

    /// Elitism as used by selection: negative values act as `0`.
    pub fn effective_elitism(&self) -> f64 {
        self.elitism.max(0.0)
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<()> {
        if !self.elitism.is_finite() {
            return Err(Error::InvalidConfig("elitism must be finite".into()));
        }
        for (name, rate) in [
            ("diversity_injection_rate", self.diversity_injection_rate),
            ("crossover_rate", self.crossover_rate),
            ("mutation_rate", self.mutation_rate),
        ] {
            if !(0.0..=1.0).contains(&rate) {
                return Err(Error::InvalidConfig(format!(
                    "{name} must be within [0, 1], got {rate}"
                )));
            }
        }
        Ok(())
    }
}
