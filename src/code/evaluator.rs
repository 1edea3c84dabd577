//! Refinement loop: measure, repair, repeat, keep the best attempt.
//!
//! Each attempt is a full measurement of the current text:
//!
//! 1. compile; on errors, count them and ask the oracle for a fix
//! 2. otherwise run every test input (shuffled) and score exact passes and
//!    partial credit for near misses; ask for a fix if anything failed
//! 3. if every test passed, measure performance
//!
//! The repaired text becomes the next attempt. Repairs are not monotonic,
//! so the result is the best attempt, not the last one.

use super::collaborators::{
    Compiler, Executor, Oracle, PerformanceMeter, ReferenceProgram, SimilarityModel,
};
use super::config::CodeProblemConfig;
use super::fitness::{
    compare_fitness, count_compile_errors, length_ratio, partial_credit, saturate,
    unique_output_score,
};
use super::prompts::PromptTemplates;
use super::rating::rate;
use super::types::{CodeCandidate, CodeFitness, Mismatch, TestSample};
use crate::error::{Error, Result};
use crate::ga::MeasuredCandidate;
use crate::random::{shuffle, SeededRng};
use log::{debug, info};
use std::collections::HashSet;
use std::time::Instant;

/// Measured code candidate.
pub type MeasuredCode = MeasuredCandidate<CodeCandidate, CodeFitness>;

/// Reference outputs for the test inputs, computed once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferenceSuite {
    samples: Vec<TestSample>,
    distinct_outputs: usize,
}

impl ReferenceSuite {
    /// Runs the reference program once per input.
    pub fn record<R: ReferenceProgram + ?Sized>(reference: &R, inputs: &[String]) -> Result<Self> {
        let mut samples = Vec::with_capacity(inputs.len());
        for input in inputs {
            let expected = reference.run_sample(input)?;
            samples.push(TestSample {
                input: input.clone(),
                expected,
            });
        }
        Ok(Self::from_samples(samples))
    }

    /// Builds a suite from known samples.
    pub fn from_samples(samples: Vec<TestSample>) -> Self {
        let distinct_outputs = samples
            .iter()
            .map(|s| s.expected.as_str())
            .collect::<HashSet<_>>()
            .len();
        Self {
            samples,
            distinct_outputs,
        }
    }

    /// The samples, in input order.
    pub fn samples(&self) -> &[TestSample] {
        &self.samples
    }

    /// Number of distinct reference outputs.
    pub fn distinct_outputs(&self) -> usize {
        self.distinct_outputs
    }

    /// Number of samples.
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Whether the suite has no samples.
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

/// One attempt's score and the oracle's repair of it, if one was asked for.
struct Attempt {
    fitness: CodeFitness,
    repaired: Option<String>,
}

/// Everything one evaluation needs, borrowed.
pub struct RefinementLoop<'a> {
    /// Compiler collaborator.
    pub compiler: &'a dyn Compiler,
    /// Executor collaborator.
    pub executor: &'a dyn Executor,
    /// Optional performance meter. Without one, a passing candidate is
    /// timed running the whole suite.
    pub performance: Option<&'a dyn PerformanceMeter>,
    /// Oracle for repairs and ratings.
    pub oracle: &'a dyn Oracle,
    /// Semantic similarity of outputs.
    pub similarity: &'a dyn SimilarityModel,
    /// Reference outputs.
    pub suite: &'a ReferenceSuite,
    /// Prompt texts.
    pub prompts: &'a PromptTemplates,
    /// Task configuration.
    pub config: &'a CodeProblemConfig,
}

impl RefinementLoop<'_> {
    /// Evaluates a candidate and returns its best attempt.
    ///
    /// Among equally fit attempts the latest wins.
    pub fn evaluate(&self, candidate: &CodeCandidate, rng: &mut SeededRng) -> Result<MeasuredCode> {
        let best = self
            .attempts(candidate, rng)?
            .into_iter()
            .max_by(|a, b| compare_fitness(&a.fitness, &b.fitness))
            .ok_or_else(|| Error::InvalidConfig("no attempts were made".into()))?;
        info!(
            "candidate {}: best attempt {:?}",
            candidate.unique_seed, best.fitness
        );
        Ok(best)
    }

    /// Runs every attempt and returns them in order.
    ///
    /// Each entry pairs the text that was measured with its fitness.
    pub fn attempts(&self, candidate: &CodeCandidate, rng: &mut SeededRng) -> Result<Vec<MeasuredCode>> {
        let iterations = self.config.effective_llm_iterations();
        let mut attempts = Vec::with_capacity(iterations);
        let mut current = candidate.clone();

        for index in 0..iterations {
            // a repair on the last attempt would never be measured
            let repair = index + 1 < iterations;
            let Attempt { fitness, repaired } = self.attempt(&current, repair, rng)?;
            debug!(
                "candidate {} attempt {}: {:?}",
                current.unique_seed, index, fitness
            );

            let next = match repaired {
                Some(source) => current.with_source(source),
                None => current.clone(),
            };
            attempts.push(MeasuredCandidate::new(current, fitness));
            current = next;
        }
        Ok(attempts)
    }

    fn attempt(&self, candidate: &CodeCandidate, repair: bool, rng: &mut SeededRng) -> Result<Attempt> {
        let seed = candidate.unique_seed;
        let mut fitness = CodeFitness::default();

        let diagnostics = self.compiler.compile(candidate)?;
        let errors = count_compile_errors(&diagnostics);
        if errors > 0 {
            fitness.compile_error_count = errors;
            let repaired = if repair {
                let prompt = self.prompts.fix_compile(&candidate.source, &diagnostics);
                Some(self.oracle.prompt(seed, &prompt, &self.config.repair_options())?)
            } else {
                None
            };
            return Ok(Attempt { fitness, repaired });
        }

        let mut order: Vec<&TestSample> = self.suite.samples().iter().collect();
        shuffle(&mut order, rng);

        let rating_options = self.config.rating_options();
        let mut outputs = HashSet::new();
        let mut mismatches = Vec::new();
        for sample in order {
            let output = self.executor.run_compiled(candidate, &sample.input)?;
            if output == sample.expected {
                fitness.passed_test_score += 1.0;
            } else {
                let rating = rate(
                    self.oracle,
                    seed,
                    self.prompts,
                    &sample.expected,
                    &output,
                    &rating_options,
                )?;
                let similarity = saturate(self.similarity.similarity(&sample.expected, &output)?);
                let length = length_ratio(&sample.expected, &output);
                let credit = partial_credit(rating.rating, similarity, length);
                debug!(
                    "mismatch: rating {:.2} similarity {:.2} length {:.2} credit {:.3}",
                    rating.rating, similarity, length, credit
                );
                fitness.passed_test_score += credit;
                mismatches.push(Mismatch {
                    output: output.clone(),
                    expected: sample.expected.clone(),
                    explanation: rating.explanation,
                });
            }
            outputs.insert(output);
        }

        fitness.unique_output_score =
            unique_output_score(outputs.len(), self.suite.distinct_outputs(), self.suite.len());

        let mut repaired = None;
        if !mismatches.is_empty() {
            if repair {
                let prompt = self.prompts.fix_tests(&candidate.source, &mismatches);
                repaired = Some(self.oracle.prompt(seed, &prompt, &self.config.repair_options())?);
            }
        } else {
            fitness.total_run_seconds = self.measure_performance(candidate)?;
        }

        Ok(Attempt { fitness, repaired })
    }

    fn measure_performance(&self, candidate: &CodeCandidate) -> Result<f64> {
        let started = Instant::now();
        match self.performance {
            Some(meter) => {
                let reported = meter.test_performance(candidate)?;
                Ok(reported.unwrap_or_else(|| started.elapsed().as_secs_f64()))
            }
            None => {
                for sample in self.suite.samples() {
                    self.executor.run_compiled(candidate, &sample.input)?;
                }
                Ok(started.elapsed().as_secs_f64())
            }
        }
    }
}
