//! Generational evolutionary search.
//!
//! A generic, domain-agnostic driver built on one trait. Users define their
//! problem by implementing [`EvolutionProblem`], which specifies how to
//! create, measure, rank, breed, and mutate candidates. Fitness can be any
//! type with a total preorder: selection only looks at ranks.
//!
//! # One pass
//!
//! 1. Pad the population with random candidates up to `population_size`
//! 2. Measure every candidate and sort fitness-ascending (fittest last)
//! 3. Rebuild the population slot by slot, choosing on separate draws:
//!    diversity injection, else crossover + mutation, else graduation
//!    (mutation of a selected parent)
//! 4. Store the stream's next draw in `config.seed`
//!
//! # Key Types
//!
//! - [`GeneticConfig`]: Tunables (population size, elitism, rates, seed)
//! - [`GeneticRunner`]: Executes single passes and multi-generation runs
//! - [`RankSelector`]: Power-law rank selection
//! - [`MeasuredCandidate`]: A candidate paired with its fitness
//!
//! # Submodules
//!
//! - [`operators`]: Line-interleaving crossover and character mutation for text

mod config;
pub mod operators;
mod runner;
mod selection;
mod types;

pub use config::GeneticConfig;
pub use runner::{EvolutionResult, GeneticRunner, Measured};
pub use selection::RankSelector;
pub use types::{EvolutionProblem, MeasuredCandidate};
