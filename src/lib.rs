//! Evolutionary search over oracle-repaired source translations.
//!
//! - **Generation driver** ([`ga`]): a generic, seeded, rank-selection
//!   genetic loop over any [`ga::EvolutionProblem`]: pad, measure, rank,
//!   then rebuild by diversity injection, crossover with mutation, or
//!   graduation.
//! - **Code translation** ([`code`]): candidates are source texts written
//!   and repaired by a text-generation oracle, scored by compiling and
//!   running them against a reference program.
//!
//! # Architecture
//!
//! The driver knows nothing about code. Compilers, executors, the oracle
//! and the similarity model are collaborator traits supplied by the
//! caller; [`code::Sandbox`] and [`code::CommandToolchain`] cover the
//! common case of external commands. Every random decision flows from one
//! [`random::SeededRng`] stream per pass, so a pass is reproducible given
//! its seed and deterministic collaborators.

pub mod code;
pub mod error;
pub mod ga;
pub mod random;

pub use error::{Error, Result};
