//! Prompt texts sent to the oracle.
//!
//! Every prompt starts with the original program and ends with a footer
//! that pins the target language and forbids anything but code.

use super::config::CodeProblemConfig;
use super::types::Mismatch;
use serde_json::json;
use std::fmt::Write as _;

/// Renders oracle prompts for one translation task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptTemplates {
    header: String,
    footer: String,
}

impl PromptTemplates {
    /// Builds the templates from the task configuration.
    pub fn new(config: &CodeProblemConfig) -> Self {
        Self {
            header: format!(
                "Original Source:\n===\n{}\n---\n",
                config.source_or_instructions
            ),
            footer: format!(
                "Strictly output ONLY safe {}, no surrounding explanations, no examples, \
                 no hard-coded test-inputs, nothing else:",
                config.language_description
            ),
        }
    }

    /// First translation of the original.
    pub fn translate(&self) -> String {
        format!("{}Translate this. {}", self.header, self.footer)
    }

    /// Repair of a translation that failed to compile.
    pub fn fix_compile(&self, source: &str, diagnostics: &str) -> String {
        format!(
            "{}Last Translation:\n===\n{}\n---\nFix Issues:\n===\n{}\n---\n{}",
            self.header, source, diagnostics, self.footer
        )
    }

    /// Repair of a translation that produced wrong outputs.
    pub fn fix_tests(&self, source: &str, mismatches: &[Mismatch]) -> String {
        let mut text = format!("{}Last Translation:\n===\n{}\n---\n", self.header, source);
        for m in mismatches {
            let _ = write!(
                text,
                "Erroneous Stdout:\n===\n{}\n---\nExpected Stdout:\n===\n{}\n---\nReason: {}\n###\n",
                m.output, m.expected, m.explanation
            );
        }
        let _ = write!(text, "Fix Issues. {}", self.footer);
        text
    }

    /// Repair of two translations spliced by crossover.
    pub fn combined(&self, combined: &str) -> String {
        format!(
            "{}Combined Translation:\n===\n{}\n---\nFix Issues. {}",
            self.header, combined, self.footer
        )
    }

    /// Repair of a translation damaged by mutation.
    pub fn mutated(&self, mutated: &str) -> String {
        format!(
            "{}Mutated Translation:\n===\n{}\n---\nFix Issues. {}",
            self.header, mutated, self.footer
        )
    }

    /// Request to rate how close `output` is to `expected`.
    pub fn rating(&self, expected: &str, output: &str) -> String {
        let compare = json!({ "expected": expected, "output": output });
        let rendered = serde_json::to_string_pretty(&compare).unwrap_or_default();
        format!(
            "{rendered}\nStrictly do NOT mention the values. Rate similarity of expected and \
             output, 1 = no similarity, 100 = exact match, (1-100): "
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn templates() -> PromptTemplates {
        PromptTemplates::new(&CodeProblemConfig::new(
            "console.log(1)",
            "commented standard C with no libraries",
        ))
    }

    #[test]
    fn test_translate_prompt() {
        let p = templates().translate();
        assert!(p.starts_with("Original Source:\n===\nconsole.log(1)\n---\n"));
        assert!(p.contains("Translate this."));
        assert!(p.ends_with("commented standard C with no libraries, no surrounding explanations, no examples, no hard-coded test-inputs, nothing else:"));
    }

    #[test]
    fn test_fix_compile_prompt() {
        let p = templates().fix_compile("int main(", "src.c:1: error: expected ')'");
        assert!(p.contains("Last Translation:\n===\nint main(\n---\n"));
        assert!(p.contains("Fix Issues:\n===\nsrc.c:1: error: expected ')'\n---\n"));
    }

    #[test]
    fn test_fix_tests_lists_every_mismatch() {
        let mismatches = vec![
            Mismatch {
                output: "1".into(),
                expected: "2".into(),
                explanation: "off by one".into(),
            },
            Mismatch {
                output: "a".into(),
                expected: "b".into(),
                explanation: "wrong letter".into(),
            },
        ];
        let p = templates().fix_tests("src", &mismatches);
        assert_eq!(p.matches("Erroneous Stdout:").count(), 2);
        assert!(p.contains("Expected Stdout:\n===\n2\n---\nReason: off by one\n###\n"));
        assert!(p.contains("Fix Issues. Strictly output ONLY"));
    }

    #[test]
    fn test_offspring_prompts() {
        let t = templates();
        assert!(t.combined("x\ny").contains("Combined Translation:\n===\nx\ny\n---\nFix Issues."));
        assert!(t.mutated("x#y").contains("Mutated Translation:\n===\nx#y\n---\nFix Issues."));
    }

    #[test]
    fn test_rating_prompt_escapes_json() {
        let p = templates().rating("line1\nline2", "say \"hi\"");
        assert!(p.contains(r#""expected": "line1\nline2""#));
        assert!(p.contains(r#""output": "say \"hi\"""#));
        assert!(p.ends_with("(1-100): "));
    }
}
