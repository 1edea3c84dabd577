//! Error types shared by the generation driver and the code-translation
//! evaluator.
//!
//! Compile failures and sandbox failures are *not* errors: they are scored
//! as fitness and fed back to the oracle. What remains here are the
//! conditions that abort a pass.

use thiserror::Error;

/// Errors that abort an evolution pass.
#[derive(Debug, Error)]
pub enum Error {
    /// A configuration value is out of range or missing.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// A prompt was issued while another one was still in flight.
    #[error("oracle is already processing a prompt")]
    OracleBusy,

    /// The generative oracle failed to produce text.
    #[error("oracle failure: {0}")]
    Oracle(String),

    /// The compiler collaborator could not be invoked at all.
    #[error("compiler failure: {0}")]
    Compiler(String),

    /// The executor collaborator could not be invoked at all.
    #[error("executor failure: {0}")]
    Executor(String),

    /// The embedding model failed.
    #[error("embedding failure: {0}")]
    Embedding(String),

    /// Underlying I/O error.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, Error>;
