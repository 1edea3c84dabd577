//! Fitness comparator and scoring helpers.
//!
//! [`compare_fitness`] is the lexicographic order used both to rank the
//! population and to pick the best repair attempt:
//!
//! 1. fewer compile errors
//! 2. higher unique output score
//! 3. higher passed test score
//! 4. lower run time

use super::types::CodeFitness;
use std::cmp::Ordering;

/// Upper bound on partial credit, so that a near miss never counts as a
/// pass.
pub const MAX_PARTIAL_CREDIT: f64 = 0.999_999;

/// Compares two fitness values. `Greater` means `a` is fitter.
///
/// Sorting ascending with this comparator puts the fittest last.
///
/// # Examples
///
/// ```
/// use std::cmp::Ordering;
/// use u_genecode::code::{compare_fitness, CodeFitness};
///
/// let broken = CodeFitness { compile_error_count: 2, passed_test_score: 9.0, ..Default::default() };
/// let clean = CodeFitness::default();
/// assert_eq!(compare_fitness(&broken, &clean), Ordering::Less);
/// ```
pub fn compare_fitness(a: &CodeFitness, b: &CodeFitness) -> Ordering {
    b.compile_error_count
        .cmp(&a.compile_error_count)
        .then_with(|| a.unique_output_score.total_cmp(&b.unique_output_score))
        .then_with(|| a.passed_test_score.total_cmp(&b.passed_test_score))
        .then_with(|| b.total_run_seconds.total_cmp(&a.total_run_seconds))
}

/// Clamps to `[0, 1]`; NaN becomes `0`.
pub fn saturate(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}

/// Output diversity of a candidate relative to the reference.
///
/// `(candidate_distinct / tests) / (reference_distinct / tests)`,
/// saturated. A candidate that prints the same thing for every input
/// scores low even if that output happens to be right once.
pub fn unique_output_score(candidate_distinct: usize, reference_distinct: usize, tests: usize) -> f64 {
    if tests == 0 || reference_distinct == 0 {
        return 0.0;
    }
    let candidate_fraction = candidate_distinct as f64 / tests as f64;
    let reference_fraction = reference_distinct as f64 / tests as f64;
    saturate(candidate_fraction / reference_fraction)
}

/// Shorter length over longer length, in characters. `0` if either is
/// empty.
pub fn length_ratio(a: &str, b: &str) -> f64 {
    let (la, lb) = (a.chars().count(), b.chars().count());
    if la == 0 || lb == 0 {
        return 0.0;
    }
    la.min(lb) as f64 / la.max(lb) as f64
}

/// Credit for a failed test: the mean of the oracle rating, the semantic
/// similarity and the length ratio, capped below a full pass.
pub fn partial_credit(rating: f64, similarity: f64, length: f64) -> f64 {
    let mean = (saturate(rating) + saturate(similarity) + saturate(length)) / 3.0;
    mean.min(MAX_PARTIAL_CREDIT)
}

/// Number of errors in compiler diagnostics.
///
/// Counts lines mentioning "error" (any case). Non-empty diagnostics
/// always count as at least one error; blank diagnostics mean success.
pub fn count_compile_errors(diagnostics: &str) -> usize {
    if diagnostics.trim().is_empty() {
        return 0;
    }
    diagnostics
        .lines()
        .filter(|line| line.to_ascii_lowercase().contains("error"))
        .count()
        .max(1)
}
