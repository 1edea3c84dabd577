//! External collaborators consumed by the evaluator.
//!
//! Each collaborator is a narrow trait. All of them are implemented for
//! matching closures, so tests and small drivers can plug in plain
//! functions:
//!
//! ```
//! use u_genecode::code::{CodeCandidate, Compiler};
//! use u_genecode::error::Result;
//!
//! let compiler = |c: &CodeCandidate| -> Result<String> {
//!     Ok(if c.source.contains("main") { String::new() } else { "error: no main".into() })
//! };
//! assert!(compiler.compile(&CodeCandidate::new("int main() {}", 1)).unwrap().is_empty());
//! ```
//!
//! Execution failures inside a collaborator (timeouts, crashes, output
//! overflow) must be reported as text, not as `Err`: an `Err` aborts the
//! whole pass.

use super::types::CodeCandidate;
use crate::error::{Error, Result};
use std::sync::{Mutex, MutexGuard, TryLockError};

/// Builds candidate source into something runnable.
pub trait Compiler {
    /// Returns compiler diagnostics. Blank text means success.
    fn compile(&self, candidate: &CodeCandidate) -> Result<String>;
}

/// Runs a compiled candidate.
pub trait Executor {
    /// Runs the candidate on one input and returns its output, or a
    /// descriptive failure text.
    fn run_compiled(&self, candidate: &CodeCandidate, input: &str) -> Result<String>;
}

/// Runs the program being translated.
pub trait ReferenceProgram {
    /// Returns the reference output for an input.
    fn run_sample(&self, input: &str) -> Result<String>;
}

/// Measures the performance of a candidate that passes every test.
pub trait PerformanceMeter {
    /// Returns the measured seconds, or `None` to have the caller time
    /// this call instead.
    fn test_performance(&self, candidate: &CodeCandidate) -> Result<Option<f64>>;
}

/// Sampling options for one oracle prompt.
#[derive(Debug, Clone, PartialEq)]
pub struct PromptOptions {
    /// Grammar the output must follow, if any.
    pub grammar: Option<String>,
    /// Sampling temperature.
    pub temperature: f64,
    /// Cap on generated tokens.
    pub max_tokens: Option<usize>,
}

impl Default for PromptOptions {
    fn default() -> Self {
        Self {
            grammar: None,
            temperature: 0.7,
            max_tokens: None,
        }
    }
}

/// Seeded text-generation service used to translate and repair.
pub trait Oracle {
    /// Generates text for a prompt. The same seed, prompt and options
    /// must give the same text.
    fn prompt(&self, seed: u32, prompt: &str, options: &PromptOptions) -> Result<String>;
}

/// Semantic similarity between two texts.
pub trait SimilarityModel {
    /// Returns a similarity in `[0, 1]`.
    fn similarity(&self, a: &str, b: &str) -> Result<f64>;
}

/// Sentence embedding model.
pub trait Embedder {
    /// Embeds a text.
    fn embed(&self, text: &str) -> Result<Vec<f32>>;
}

impl<F> Compiler for F
where
    F: Fn(&CodeCandidate) -> Result<String>,
{
    fn compile(&self, candidate: &CodeCandidate) -> Result<String> {
        self(candidate)
    }
}

impl<F> Executor for F
where
    F: Fn(&CodeCandidate, &str) -> Result<String>,
{
    fn run_compiled(&self, candidate: &CodeCandidate, input: &str) -> Result<String> {
        self(candidate, input)
    }
}

impl<F> ReferenceProgram for F
where
    F: Fn(&str) -> Result<String>,
{
    fn run_sample(&self, input: &str) -> Result<String> {
        self(input)
    }
}

impl<F> PerformanceMeter for F
where
    F: Fn(&CodeCandidate) -> Result<Option<f64>>,
{
    fn test_performance(&self, candidate: &CodeCandidate) -> Result<Option<f64>> {
        self(candidate)
    }
}

impl<F> Oracle for F
where
    F: Fn(u32, &str, &PromptOptions) -> Result<String>,
{
    fn prompt(&self, seed: u32, prompt: &str, options: &PromptOptions) -> Result<String> {
        self(seed, prompt, options)
    }
}

impl<F> SimilarityModel for F
where
    F: Fn(&str, &str) -> Result<f64>,
{
    fn similarity(&self, a: &str, b: &str) -> Result<f64> {
        self(a, b)
    }
}

impl<F> Embedder for F
where
    F: Fn(&str) -> Result<Vec<f32>>,
{
    fn embed(&self, text: &str) -> Result<Vec<f32>> {
        self(text)
    }
}

// ============================================================================
// Embedding similarity
// ============================================================================

/// Similarity model backed by an embedder and cosine similarity.
///
/// The two texts are embedded one after the other.
pub struct EmbeddingSimilarity<E> {
    embedder: E,
}

impl<E: Embedder> EmbeddingSimilarity<E> {
    /// Wraps an embedder.
    pub fn new(embedder: E) -> Self {
        Self { embedder }
    }
}

impl<E: Embedder> SimilarityModel for EmbeddingSimilarity<E> {
    fn similarity(&self, a: &str, b: &str) -> Result<f64> {
        let ea = self.embedder.embed(a)?;
        let eb = self.embedder.embed(b)?;
        if ea.len() != eb.len() {
            return Err(Error::Embedding(format!(
                "dimension mismatch: {} vs {}",
                ea.len(),
                eb.len()
            )));
        }
        Ok(cosine_similarity(&ea, &eb))
    }
}

/// Cosine similarity clamped to `[0, 1]`. Zero vectors give `0`.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f64 {
    let mut dot = 0.0f64;
    let mut na = 0.0f64;
    let mut nb = 0.0f64;
    for (&x, &y) in a.iter().zip(b) {
        let (x, y) = (x as f64, y as f64);
        dot += x * y;
        na += x * x;
        nb += y * y;
    }
    let denom = na.sqrt() * nb.sqrt();
    if denom == 0.0 {
        return 0.0;
    }
    super::fitness::saturate(dot / denom)
}

// ============================================================================
// Exclusive oracle
// ============================================================================

/// Oracle wrapper that allows one prompt in flight at a time.
///
/// A prompt issued while another is running fails immediately with
/// [`Error::OracleBusy`] instead of queuing. The lock is held for the
/// duration of one prompt and released on every exit path.
pub struct ExclusiveOracle {
    inner: Box<dyn Oracle>,
    in_flight: Mutex<()>,
}

impl ExclusiveOracle {
    /// Wraps an oracle.
    pub fn new(oracle: impl Oracle + 'static) -> Self {
        Self::from_boxed(Box::new(oracle))
    }

    /// Wraps an already boxed oracle.
    pub fn from_boxed(inner: Box<dyn Oracle>) -> Self {
        Self {
            inner,
            in_flight: Mutex::new(()),
        }
    }

    /// Whether a prompt is currently in flight.
    pub fn is_busy(&self) -> bool {
        matches!(self.in_flight.try_lock(), Err(TryLockError::WouldBlock))
    }

    fn enter(&self) -> Result<MutexGuard<'_, ()>> {
        match self.in_flight.try_lock() {
            Ok(guard) => Ok(guard),
            // a panicking prompt leaves nothing to protect
            Err(TryLockError::Poisoned(poisoned)) => Ok(poisoned.into_inner()),
            Err(TryLockError::WouldBlock) => Err(Error::OracleBusy),
        }
    }
}

impl Oracle for ExclusiveOracle {
    fn prompt(&self, seed: u32, prompt: &str, options: &PromptOptions) -> Result<String> {
        let _guard = self.enter()?;
        log::debug!("prompt seed={seed} ({} chars)", prompt.len());
        self.inner.prompt(seed, prompt, options)
    }
}
