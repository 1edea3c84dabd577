//! Translation task configuration.

use super::collaborators::PromptOptions;
use super::rating::RATING_GRAMMAR;
use crate::error::{Error, Result};

/// Configuration of a translation task.
///
/// # Examples
///
/// ```
/// use u_genecode::code::CodeProblemConfig;
///
/// let config = CodeProblemConfig::new("console.log(1)", "standard C")
///     .with_test_inputs(["1", "2,3"])
///     .with_llm_iterations(5);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CodeProblemConfig {
    /// Repair attempts per evaluation (>= 1).
    pub llm_iterations: usize,

    /// Target language, as described to the oracle.
    pub language_description: String,

    /// Grammar constraining generated source, if any.
    pub language_grammar: Option<String>,

    /// The program (or instructions) to translate.
    pub source_or_instructions: String,

    /// Inputs run through both the reference and each candidate.
    pub test_inputs: Vec<String>,

    /// Sampling temperature for translation and repair prompts.
    pub temperature: f64,

    /// Sampling temperature for rating prompts.
    pub rating_temperature: f64,

    /// Token cap for rating prompts.
    pub rating_max_tokens: usize,

    /// Whether crossover and mutation offspring are sent back to the
    /// oracle for repair.
    pub repair_offspring: bool,
}

impl CodeProblemConfig {
    /// Creates a configuration with default tunables.
    pub fn new(source_or_instructions: impl Into<String>, language: impl Into<String>) -> Self {
        Self {
            llm_iterations: 3,
            language_description: language.into(),
            language_grammar: None,
            source_or_instructions: source_or_instructions.into(),
            test_inputs: Vec::new(),
            temperature: 0.7,
            rating_temperature: 0.1,
            rating_max_tokens: 1024,
            repair_offspring: true,
        }
    }

    /// Sets the number of repair attempts (clamped to >= 1).
    pub fn with_llm_iterations(mut self, n: usize) -> Self {
        self.llm_iterations = n.max(1);
        self
    }

    /// Sets the output grammar for generated source.
    pub fn with_language_grammar(mut self, grammar: impl Into<String>) -> Self {
        self.language_grammar = Some(grammar.into());
        self
    }

    /// Sets the test inputs.
    pub fn with_test_inputs<I, S>(mut self, inputs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.test_inputs = inputs.into_iter().map(Into::into).collect();
        self
    }

    /// Sets the translation temperature.
    pub fn with_temperature(mut self, temperature: f64) -> Self {
        self.temperature = temperature.max(0.0);
        self
    }

    /// Enables or disables oracle repair of offspring.
    pub fn with_repair_offspring(mut self, repair: bool) -> Self {
        self.repair_offspring = repair;
        self
    }

    /// Repair attempts actually performed.
    pub fn effective_llm_iterations(&self) -> usize {
        self.llm_iterations.max(1)
    }

    /// Options for translation and repair prompts.
    pub fn repair_options(&self) -> PromptOptions {
        PromptOptions {
            grammar: self.language_grammar.clone(),
            temperature: self.temperature,
            max_tokens: None,
        }
    }

    /// Options for rating prompts.
    pub fn rating_options(&self) -> PromptOptions {
        PromptOptions {
            grammar: Some(RATING_GRAMMAR.to_owned()),
            temperature: self.rating_temperature,
            max_tokens: Some(self.rating_max_tokens),
        }
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<()> {
        if self.test_inputs.is_empty() {
            return Err(Error::InvalidConfig(
                "at least one test input is required".into(),
            ));
        }
        if self.language_description.trim().is_empty() {
            return Err(Error::InvalidConfig(
                "language_description must not be empty".into(),
            ));
        }
        if !self.temperature.is_finite() || !self.rating_temperature.is_finite() {
            return Err(Error::InvalidConfig("temperatures must be finite".into()));
        }
        if self.rating_max_tokens == 0 {
            return Err(Error::InvalidConfig(
                "rating_max_tokens must be at least 1".into(),
            ));
        }
        Ok(())
    }
}
