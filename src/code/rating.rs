//! Similarity rating of a wrong output, asked of the oracle.
//!
//! The oracle answers in a constrained format: a number from 1 to 100 on
//! the first line, then `Reason: ...`. Anything unparsable degrades to the
//! worst rating rather than failing the pass.

use super::collaborators::{Oracle, PromptOptions};
use super::prompts::PromptTemplates;
use crate::error::Result;
use log::warn;

/// Grammar constraining the oracle's rating answer.
pub const RATING_GRAMMAR: &str = r#"root ::= ([1-9] [1-9]? | "100") "\nReason: " [^\n]+"#;

/// An oracle's judgement of how close an output is to the expected one.
#[derive(Debug, Clone, PartialEq)]
pub struct Rating {
    /// Closeness in `[0, 1]`.
    pub rating: f64,
    /// Why the outputs differ.
    pub explanation: String,
}

/// Asks the oracle to rate `output` against `expected`.
pub fn rate<O: Oracle + ?Sized>(
    oracle: &O,
    seed: u32,
    prompts: &PromptTemplates,
    expected: &str,
    output: &str,
    options: &PromptOptions,
) -> Result<Rating> {
    let answer = oracle.prompt(seed, &prompts.rating(expected, output), options)?;
    Ok(parse_rating(&answer))
}

/// Parses `"<1-100>\nReason: <text>"`.
///
/// A missing or malformed number yields a rating of `0`.
pub fn parse_rating(answer: &str) -> Rating {
    let mut lines = answer.splitn(2, '\n');
    let score_line = lines.next().unwrap_or("").trim();
    let rest = lines.next().unwrap_or("").trim();

    let rating = match score_line.parse::<u32>() {
        Ok(score) => (score as f64 / 100.0).clamp(0.0, 1.0),
        Err(_) => {
            warn!("unparsable rating {score_line:?}, using 0");
            0.0
        }
    };

    let first = rest.lines().next().unwrap_or("");
    let explanation = first
        .strip_prefix("Reason:")
        .unwrap_or(first)
        .trim()
        .to_owned();

    Rating {
        rating,
        explanation,
    }
}
