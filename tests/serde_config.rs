//! Configuration and results serialize for reporting.

#![cfg(feature = "serde")]

use u_genecode::code::{CodeCandidate, CodeFitness, CodeProblemConfig};
use u_genecode::ga::{GeneticConfig, MeasuredCandidate};
use u_genecode::random::Seed;

#[test]
fn test_seed_accepts_number_or_text() {
    let n: Seed = serde_json::from_str("42").unwrap();
    assert_eq!(n, Seed::Number(42));
    let t: Seed = serde_json::from_str("\"abc\"").unwrap();
    assert_eq!(t, Seed::Text("abc".into()));
}

#[test]
fn test_genetic_config_from_json() {
    let json = r#"{
        "population_size": 20,
        "seed": "nightly",
        "elitism": 0.5,
        "diversity_injection_rate": 0.02,
        "crossover_rate": 0.6,
        "mutation_rate": 0.01
    }"#;
    let config: GeneticConfig = serde_json::from_str(json).unwrap();
    assert_eq!(config.population_size, 20);
    assert_eq!(config.seed, Some(Seed::Text("nightly".into())));
    assert!(config.validate().is_ok());
}

#[test]
fn test_measured_candidate_report() {
    let measured = MeasuredCandidate::new(
        CodeCandidate::new("echo", 3),
        CodeFitness {
            passed_test_score: 2.5,
            ..Default::default()
        },
    );
    let value = serde_json::to_value(&measured).unwrap();
    assert_eq!(value["candidate"]["unique_seed"], 3);
    assert_eq!(value["fitness"]["passed_test_score"], 2.5);

    let config = CodeProblemConfig::new("src", "C");
    let value = serde_json::to_value(&config).unwrap();
    assert_eq!(value["llm_iterations"], 3);
}
