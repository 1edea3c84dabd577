//! End-to-end passes over a translation problem with in-memory
//! collaborators.

use std::cell::Cell;
use std::rc::Rc;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use u_genecode::code::{
    CodeCandidate, CodeFitness, CodeProblemConfig, CodeTranslationProblem, PromptOptions,
};
use u_genecode::ga::{GeneticConfig, GeneticRunner};
use u_genecode::random::Seed;
use u_genecode::Result;

/// Toy target language. `upper` uppercases stdin, `echo` copies it, `#`
/// is a syntax error, anything else prints a constant.
fn interpret(program: &str, input: &str) -> String {
    if program.contains("upper") {
        input.to_uppercase()
    } else if program.contains("echo") {
        input.to_owned()
    } else {
        "?".to_owned()
    }
}

fn translation_oracle(seed: u32, prompt: &str, options: &PromptOptions) -> Result<String> {
    if options.grammar.is_some() {
        return Ok("40\nReason: letter case differs".into());
    }
    if prompt.contains("Fix Issues") {
        return Ok("upper".into());
    }
    Ok(match seed % 4 {
        0 => "upper".into(),
        1 => "echo".into(),
        2 => "#syntax".into(),
        _ => "noop".into(),
    })
}

fn problem(prompts: Rc<Cell<usize>>) -> CodeTranslationProblem {
    let config = CodeProblemConfig::new("print(input().upper())", "toy language")
        .with_test_inputs(["abc", "Hello", "x y z", "42"])
        .with_llm_iterations(2);
    CodeTranslationProblem::builder(config)
        .reference(|input: &str| -> Result<String> { Ok(input.to_uppercase()) })
        .compiler(|c: &CodeCandidate| -> Result<String> {
            Ok(if c.source.contains('#') {
                "toy.src:1: error: unexpected '#'".into()
            } else {
                String::new()
            })
        })
        .executor(|c: &CodeCandidate, input: &str| -> Result<String> {
            Ok(interpret(&c.source, input))
        })
        .performance(|_: &CodeCandidate| -> Result<Option<f64>> { Ok(Some(0.01)) })
        .oracle(move |seed: u32, prompt: &str, options: &PromptOptions| -> Result<String> {
            prompts.set(prompts.get() + 1);
            translation_oracle(seed, prompt, options)
        })
        .similarity(|a: &str, b: &str| -> Result<f64> {
            Ok(if a.eq_ignore_ascii_case(b) { 0.95 } else { 0.2 })
        })
        .build()
        .expect("problem builds")
}

fn passes_everything(f: &CodeFitness, tests: usize) -> bool {
    f.compile_error_count == 0 && f.passed_test_score == tests as f64
}

#[test]
fn test_pass_keeps_population_size() {
    let problem = problem(Rc::default());
    let mut config = GeneticConfig::default()
        .with_population_size(12)
        .with_seed(7u64);
    let mut population = vec![CodeCandidate::new("noop", 1); 30];

    let ranked = GeneticRunner::evolve_once(&problem, &mut config, &mut population).unwrap();
    // oversized input is measured in full, the next generation is trimmed
    assert_eq!(ranked.len(), 30);
    assert_eq!(population.len(), 12);

    GeneticRunner::evolve_once(&problem, &mut config, &mut population).unwrap();
    assert_eq!(population.len(), 12);
}

#[test]
fn test_ranked_snapshot_is_ascending() {
    let problem = problem(Rc::default());
    let mut config = GeneticConfig::default()
        .with_population_size(16)
        .with_seed(3u64);
    let mut population = Vec::new();

    let ranked = GeneticRunner::evolve_once(&problem, &mut config, &mut population).unwrap();
    for pair in ranked.windows(2) {
        assert_ne!(
            u_genecode::code::compare_fitness(&pair[0].fitness, &pair[1].fitness),
            std::cmp::Ordering::Greater
        );
    }
    // repairs always produce "upper", so the second attempt of anything
    // broken passes every test
    assert!(passes_everything(&ranked.last().unwrap().fitness, 4));
}

#[test]
fn test_same_seed_reproduces_pass() {
    let run = |seed: u64| {
        let problem = problem(Rc::default());
        let mut config = GeneticConfig::default()
            .with_population_size(10)
            .with_seed(seed);
        let mut population = Vec::new();
        let ranked = GeneticRunner::evolve_once(&problem, &mut config, &mut population).unwrap();
        let ranked: Vec<(String, u32)> = ranked
            .into_iter()
            .map(|m| (m.candidate.source, m.candidate.unique_seed))
            .collect();
        (ranked, population, config.seed)
    };

    let (ranked_a, next_a, seed_a) = run(99);
    let (ranked_b, next_b, seed_b) = run(99);
    assert_eq!(ranked_a, ranked_b);
    assert_eq!(next_a, next_b);
    assert_eq!(seed_a, seed_b);
    assert_ne!(seed_a, Some(Seed::Number(99)));
}

#[test]
fn test_text_seed_is_accepted() {
    let problem = problem(Rc::default());
    let mut config = GeneticConfig::default()
        .with_population_size(4)
        .with_seed("translation run");
    let mut population = Vec::new();
    GeneticRunner::evolve_once(&problem, &mut config, &mut population).unwrap();
    assert!(matches!(config.seed, Some(Seed::Number(_))));
}

#[test]
fn test_run_finds_passing_translation() {
    let prompts = Rc::new(Cell::new(0));
    let problem = problem(Rc::clone(&prompts));
    let mut config = GeneticConfig::default()
        .with_population_size(8)
        .with_seed(2024u64);
    let mut population = Vec::new();

    let result = GeneticRunner::run(&problem, &mut config, &mut population, 3).unwrap();
    assert_eq!(result.generations, 3);
    assert!(!result.cancelled);
    assert_eq!(result.fitness_history.len(), 3);

    let best = result.best.expect("best candidate");
    assert!(passes_everything(&best.fitness, 4));
    assert_eq!(best.fitness.unique_output_score, 1.0);
    assert_eq!(best.fitness.total_run_seconds, 0.01);
    assert!(prompts.get() > 0);
    assert!(!problem.oracle().is_busy());
}

#[test]
fn test_cancelled_before_first_pass() {
    let problem = problem(Rc::default());
    let mut config = GeneticConfig::default().with_population_size(4);
    let mut population = Vec::new();
    let cancel = Arc::new(AtomicBool::new(true));

    let result =
        GeneticRunner::run_with_cancel(&problem, &mut config, &mut population, 5, Some(cancel))
            .unwrap();
    assert!(result.cancelled);
    assert_eq!(result.generations, 0);
    assert!(result.best.is_none());
    assert!(population.is_empty());
}
