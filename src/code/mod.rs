//! Source translation by oracle-repaired evolutionary search.
//!
//! Specialises the [`ga`](crate::ga) driver for translating a program into
//! another language. Candidates are source texts produced and repaired by
//! a seeded text-generation oracle; fitness is measured by compiling and
//! running each candidate against the reference program's outputs.
//!
//! # Fitness
//!
//! [`CodeFitness`] is ranked lexicographically by [`compare_fitness`]:
//! fewer compile errors, then higher output diversity, then more passed
//! tests (with partial credit for near misses), then lower run time.
//!
//! # Key Types
//!
//! - [`CodeTranslationProblem`]: the [`EvolutionProblem`](crate::ga::EvolutionProblem)
//!   implementation, built from collaborators
//! - [`CodeProblemConfig`]: task configuration
//! - [`RefinementLoop`]: measure-and-repair loop that keeps the best attempt
//! - [`ExclusiveOracle`]: one prompt in flight at a time
//! - [`Sandbox`] / [`CommandToolchain`]: process execution under time and
//!   output limits
//!
//! # Collaborators
//!
//! [`Compiler`], [`Executor`], [`ReferenceProgram`], [`PerformanceMeter`],
//! [`Oracle`], [`SimilarityModel`] and [`Embedder`] are implemented for
//! matching closures.

mod collaborators;
mod config;
mod evaluator;
mod fitness;
mod problem;
mod prompts;
mod rating;
mod sandbox;
mod types;

pub use collaborators::{
    cosine_similarity, Compiler, Embedder, EmbeddingSimilarity, ExclusiveOracle, Executor,
    Oracle, PerformanceMeter, PromptOptions, ReferenceProgram, SimilarityModel,
};
pub use config::CodeProblemConfig;
pub use evaluator::{MeasuredCode, ReferenceSuite, RefinementLoop};
pub use fitness::{
    compare_fitness, count_compile_errors, length_ratio, partial_credit, saturate,
    unique_output_score, MAX_PARTIAL_CREDIT,
};
pub use problem::{CodeTranslationProblem, CodeTranslationProblemBuilder};
pub use prompts::PromptTemplates;
pub use rating::{parse_rating, rate, Rating, RATING_GRAMMAR};
pub use sandbox::{
    CommandTemplate, CommandToolchain, ExecStatus, Execution, ExecutorConfig, Sandbox,
};
pub use types::{CodeCandidate, CodeFitness, Mismatch, TestSample};
