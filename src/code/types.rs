//! Candidate and fitness types for source translation.

/// A translation attempt.
///
/// `unique_seed` is drawn once when the candidate is created (randomly or
/// by crossover) and handed to every oracle call made on its behalf.
/// Mutation and repair keep it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CodeCandidate {
    /// Translated source text.
    pub source: String,
    /// Oracle seed identifying this candidate.
    pub unique_seed: u32,
}

impl CodeCandidate {
    /// Creates a candidate.
    pub fn new(source: impl Into<String>, unique_seed: u32) -> Self {
        Self {
            source: source.into(),
            unique_seed,
        }
    }

    /// Returns a copy with different source and the same identity.
    pub fn with_source(&self, source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            unique_seed: self.unique_seed,
        }
    }
}

/// Multi-criteria fitness of a translation attempt.
///
/// `unique_output_score` and `passed_test_score` stay `0` unless the
/// candidate compiled; `total_run_seconds` stays `0` unless every test
/// passed. Ordering is given by
/// [`compare_fitness`](super::compare_fitness).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CodeFitness {
    /// Number of compile errors. Fewer is better.
    pub compile_error_count: usize,
    /// Output diversity relative to the reference, in `[0, 1]`.
    pub unique_output_score: f64,
    /// Passed tests, with partial credit for near misses.
    pub passed_test_score: f64,
    /// Performance measurement in seconds. Lower is better.
    pub total_run_seconds: f64,
}

/// One test input with the reference program's output for it.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TestSample {
    /// Input fed to both programs.
    pub input: String,
    /// Reference output.
    pub expected: String,
}

/// A failed test, as reported back to the oracle.
#[derive(Debug, Clone, PartialEq)]
pub struct Mismatch {
    /// What the candidate produced.
    pub output: String,
    /// What the reference produced.
    pub expected: String,
    /// The oracle's explanation of the difference.
    pub explanation: String,
}
