//! Source translation as an [`EvolutionProblem`].

use super::collaborators::{
    Compiler, ExclusiveOracle, Executor, Oracle, PerformanceMeter, ReferenceProgram,
    SimilarityModel,
};
use super::config::CodeProblemConfig;
use super::evaluator::{MeasuredCode, ReferenceSuite, RefinementLoop};
use super::fitness;
use super::prompts::PromptTemplates;
use super::types::{CodeCandidate, CodeFitness};
use crate::error::{Error, Result};
use crate::ga::operators::{crossover_lines, mutate_chars};
use crate::ga::EvolutionProblem;
use crate::random::{RandomSource, SeededRng};
use log::{debug, info};
use std::cmp::Ordering;

/// Evolves translations of one program into a target language.
///
/// Built with [`CodeTranslationProblem::builder`]. Building runs the
/// reference program once per test input; the outputs are reused for
/// every evaluation. All oracle traffic goes through an
/// [`ExclusiveOracle`].
///
/// # Examples
///
/// ```
/// use u_genecode::code::{CodeCandidate, CodeProblemConfig, CodeTranslationProblem, PromptOptions};
/// use u_genecode::error::Result;
/// use u_genecode::ga::{GeneticConfig, GeneticRunner};
///
/// let config = CodeProblemConfig::new("print(input)", "shell").with_test_inputs(["a", "b"]);
/// let problem = CodeTranslationProblem::builder(config)
///     .reference(|input: &str| -> Result<String> { Ok(input.to_owned()) })
///     .compiler(|_: &CodeCandidate| -> Result<String> { Ok(String::new()) })
///     .executor(|_: &CodeCandidate, input: &str| -> Result<String> { Ok(input.to_owned()) })
///     .oracle(|_: u32, _: &str, _: &PromptOptions| -> Result<String> { Ok("cat".into()) })
///     .similarity(|_: &str, _: &str| -> Result<f64> { Ok(0.0) })
///     .build()
///     .unwrap();
///
/// let mut ga = GeneticConfig::default().with_population_size(4).with_seed(1u64);
/// let mut population = Vec::new();
/// let ranked = GeneticRunner::evolve_once(&problem, &mut ga, &mut population).unwrap();
/// assert_eq!(ranked.last().unwrap().fitness.passed_test_score, 2.0);
/// ```
pub struct CodeTranslationProblem {
    config: CodeProblemConfig,
    prompts: PromptTemplates,
    suite: ReferenceSuite,
    compiler: Box<dyn Compiler>,
    executor: Box<dyn Executor>,
    performance: Option<Box<dyn PerformanceMeter>>,
    oracle: ExclusiveOracle,
    similarity: Box<dyn SimilarityModel>,
}

impl CodeTranslationProblem {
    /// Starts a builder.
    pub fn builder(config: CodeProblemConfig) -> CodeTranslationProblemBuilder {
        CodeTranslationProblemBuilder {
            config,
            reference: None,
            compiler: None,
            executor: None,
            performance: None,
            oracle: None,
            similarity: None,
        }
    }

    /// The task configuration.
    pub fn config(&self) -> &CodeProblemConfig {
        &self.config
    }

    /// The recorded reference outputs.
    pub fn suite(&self) -> &ReferenceSuite {
        &self.suite
    }

    /// The guarded oracle.
    pub fn oracle(&self) -> &ExclusiveOracle {
        &self.oracle
    }

    fn refinement(&self) -> RefinementLoop<'_> {
        RefinementLoop {
            compiler: self.compiler.as_ref(),
            executor: self.executor.as_ref(),
            performance: self.performance.as_deref(),
            oracle: &self.oracle,
            similarity: self.similarity.as_ref(),
            suite: &self.suite,
            prompts: &self.prompts,
            config: &self.config,
        }
    }

    fn repair(&self, seed: u32, prompt: &str) -> Result<String> {
        self.oracle
            .prompt(seed, prompt, &self.config.repair_options())
    }
}

impl EvolutionProblem for CodeTranslationProblem {
    type Candidate = CodeCandidate;
    type Fitness = CodeFitness;

    fn random_candidate(&self, rng: &mut SeededRng) -> Result<CodeCandidate> {
        let seed = rng.next_unique_seed();
        debug!("translating with seed {seed}");
        let source = self.repair(seed, &self.prompts.translate())?;
        Ok(CodeCandidate::new(source, seed))
    }

    fn measure(&self, candidate: &CodeCandidate, rng: &mut SeededRng) -> Result<MeasuredCode> {
        self.refinement().evaluate(candidate, rng)
    }

    fn compare_fitness(&self, a: &CodeFitness, b: &CodeFitness) -> Ordering {
        fitness::compare_fitness(a, b)
    }

    fn crossover(
        &self,
        a: &CodeCandidate,
        b: &CodeCandidate,
        rng: &mut SeededRng,
    ) -> Result<CodeCandidate> {
        let seed = rng.next_unique_seed();
        let combined = crossover_lines(&a.source, &b.source, rng);
        debug!(
            "crossover {} x {} -> {seed}",
            a.unique_seed, b.unique_seed
        );
        let source = if self.config.repair_offspring {
            self.repair(seed, &self.prompts.combined(&combined))?
        } else {
            combined
        };
        Ok(CodeCandidate::new(source, seed))
    }

    fn mutate(
        &self,
        candidate: CodeCandidate,
        rate: f64,
        rng: &mut SeededRng,
    ) -> Result<CodeCandidate> {
        let mutated = mutate_chars(&candidate.source, rate, rng);
        if mutated == candidate.source {
            return Ok(candidate);
        }
        debug!("mutated candidate {}", candidate.unique_seed);
        if !self.config.repair_offspring {
            return Ok(candidate.with_source(mutated));
        }
        let source = self.repair(candidate.unique_seed, &self.prompts.mutated(&mutated))?;
        Ok(candidate.with_source(source))
    }

    fn on_generation(&self, generation: usize, ranked: &[MeasuredCode]) {
        let passing = ranked
            .iter()
            .filter(|m| {
                m.fitness.compile_error_count == 0
                    && m.fitness.passed_test_score >= self.suite.len() as f64
            })
            .count();
        info!(
            "generation {generation}: {passing}/{} candidates pass every test",
            ranked.len()
        );
    }
}

/// Builder for [`CodeTranslationProblem`].
pub struct CodeTranslationProblemBuilder {
    config: CodeProblemConfig,
    reference: Option<Box<dyn ReferenceProgram>>,
    compiler: Option<Box<dyn Compiler>>,
    executor: Option<Box<dyn Executor>>,
    performance: Option<Box<dyn PerformanceMeter>>,
    oracle: Option<Box<dyn Oracle>>,
    similarity: Option<Box<dyn SimilarityModel>>,
}

impl CodeTranslationProblemBuilder {
    /// Sets the program being translated.
    pub fn reference(mut self, reference: impl ReferenceProgram + 'static) -> Self {
        self.reference = Some(Box::new(reference));
        self
    }

    /// Sets the compiler.
    pub fn compiler(mut self, compiler: impl Compiler + 'static) -> Self {
        self.compiler = Some(Box::new(compiler));
        self
    }

    /// Sets the executor.
    pub fn executor(mut self, executor: impl Executor + 'static) -> Self {
        self.executor = Some(Box::new(executor));
        self
    }

    /// Sets the performance meter.
    pub fn performance(mut self, meter: impl PerformanceMeter + 'static) -> Self {
        self.performance = Some(Box::new(meter));
        self
    }

    /// Sets the oracle.
    pub fn oracle(mut self, oracle: impl Oracle + 'static) -> Self {
        self.oracle = Some(Box::new(oracle));
        self
    }

    /// Sets the output similarity model.
    pub fn similarity(mut self, similarity: impl SimilarityModel + 'static) -> Self {
        self.similarity = Some(Box::new(similarity));
        self
    }

    /// Validates the configuration and records the reference outputs.
    pub fn build(self) -> Result<CodeTranslationProblem> {
        self.config.validate()?;
        let reference = require(self.reference, "reference")?;
        let compiler = require(self.compiler, "compiler")?;
        let executor = require(self.executor, "executor")?;
        let oracle = require(self.oracle, "oracle")?;
        let similarity = require(self.similarity, "similarity")?;

        let suite = ReferenceSuite::record(reference.as_ref(), &self.config.test_inputs)?;
        info!(
            "recorded {} reference outputs ({} distinct)",
            suite.len(),
            suite.distinct_outputs()
        );

        Ok(CodeTranslationProblem {
            prompts: PromptTemplates::new(&self.config),
            config: self.config,
            suite,
            compiler,
            executor,
            performance: self.performance,
            oracle: ExclusiveOracle::from_boxed(oracle),
            similarity,
        })
    }
}

fn require<T>(value: Option<T>, name: &str) -> Result<T> {
    value.ok_or_else(|| Error::InvalidConfig(format!("missing {name}")))
}
