//! Translation into POSIX shell, compiled with `sh -n` and run in the
//! sandbox.

#![cfg(unix)]

use std::time::Duration;
use u_genecode::code::{
    CodeProblemConfig, CodeTranslationProblem, CommandTemplate, CommandToolchain, EmbeddingSimilarity,
    ExecutorConfig, PromptOptions, Sandbox,
};
use u_genecode::ga::{EvolutionProblem, GeneticConfig, GeneticRunner};
use u_genecode::random::create_rng;
use u_genecode::Result;

const DOUBLER: &str = "read x\necho $((x * 2))";
const LOOPER: &str = "while :; do :; done";

fn toolchain(dir: &std::path::Path) -> CommandToolchain {
    let sandbox = Sandbox::new(
        ExecutorConfig::default()
            .with_timeout(Duration::from_millis(500))
            .with_max_output_bytes(256),
    );
    CommandToolchain::new(
        sandbox,
        dir,
        "sh",
        CommandTemplate::new("sh", ["-c", "sh -n {source} && cp {source} {artifact}"]),
        CommandTemplate::new("sh", ["{artifact}"]),
    )
}

/// Bag-of-characters embedding.
fn embed(text: &str) -> Result<Vec<f32>> {
    let mut v = vec![0.0f32; 16];
    for b in text.bytes() {
        v[(b % 16) as usize] += 1.0;
    }
    Ok(v)
}

fn build(dir: &std::path::Path, translation: &'static str) -> CodeTranslationProblem {
    let config = CodeProblemConfig::new("print(int(input()) * 2)", "POSIX shell")
        .with_test_inputs(["1", "5", "21"])
        .with_llm_iterations(1);
    let tc = toolchain(dir);
    CodeTranslationProblem::builder(config)
        .reference(|input: &str| -> Result<String> {
            let n: i64 = input.trim().parse().unwrap_or(0);
            Ok(format!("{}\n", n * 2))
        })
        .compiler(tc.clone())
        .executor(tc)
        .oracle(move |_: u32, _: &str, options: &PromptOptions| -> Result<String> {
            Ok(if options.grammar.is_some() {
                "1\nReason: the program produced no output".into()
            } else {
                translation.into()
            })
        })
        .similarity(EmbeddingSimilarity::new(embed))
        .build()
        .expect("problem builds")
}

#[test]
fn test_shell_translation_passes() {
    let dir = tempfile::tempdir().unwrap();
    let problem = build(dir.path(), DOUBLER);
    let mut config = GeneticConfig::default()
        .with_population_size(2)
        .with_mutation_rate(0.0)
        .with_seed(1u64);
    let mut population = Vec::new();

    let ranked = GeneticRunner::evolve_once(&problem, &mut config, &mut population).unwrap();
    let best = ranked.last().unwrap();
    assert_eq!(best.fitness.compile_error_count, 0);
    assert_eq!(best.fitness.passed_test_score, 3.0);
    assert_eq!(best.fitness.unique_output_score, 1.0);
}

#[test]
fn test_hanging_translation_is_scored_not_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let problem = build(dir.path(), LOOPER);
    let candidate = problem.random_candidate(&mut create_rng(4)).unwrap();

    let measured = problem.measure(&candidate, &mut create_rng(5)).unwrap();
    assert_eq!(measured.fitness.compile_error_count, 0);
    assert!(measured.fitness.passed_test_score < 3.0);
    // every run times out with the same text
    assert!((measured.fitness.unique_output_score - 1.0 / 3.0).abs() < 1e-9);
}

#[test]
fn test_syntax_error_is_counted() {
    let dir = tempfile::tempdir().unwrap();
    let problem = build(dir.path(), "if then (");
    let candidate = problem.random_candidate(&mut create_rng(4)).unwrap();

    let measured = problem.measure(&candidate, &mut create_rng(5)).unwrap();
    assert!(measured.fitness.compile_error_count >= 1);
    assert_eq!(measured.fitness.passed_test_score, 0.0);
}
