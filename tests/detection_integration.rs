//! Detection over the curated fixtures in `testdata/`.

use trucode::config::Config;
use trucode::{analyze, NoopScorer, Rule};

const CLEAN: &str = include_str!("../testdata/clean.py");
const MESSY: &str = include_str!("../testdata/messy.py");

fn rules_of(analysis: &trucode::Analysis) -> Vec<Rule> {
    analysis.findings.iter().map(|f| f.rule).collect()
}

#[test]
fn test_clean_fixture_has_no_findings() {
    let analysis = analyze(CLEAN, &Config::default(), Box::new(NoopScorer));
    assert!(
        analysis.findings.is_empty(),
        "unexpected findings: {:?}",
        rules_of(&analysis)
    );
}

#[test]
fn test_messy_fixture_trips_every_seeded_detector() {
    let analysis = analyze(MESSY, &Config::default(), Box::new(NoopScorer));
    let rules = rules_of(&analysis);

    assert!(rules.contains(&Rule::UnusedImport));
    assert!(rules.contains(&Rule::UnusedVariable));
    assert!(rules.contains(&Rule::BareExcept));
    assert!(rules.contains(&Rule::RepeatedLiteral));
    assert!(rules.contains(&Rule::MissingDocstring));
    assert!(rules.contains(&Rule::MissingMainGuard));
    assert!(!rules.contains(&Rule::UndefinedName));
    assert!(!rules.contains(&Rule::SyntaxError));
}

#[test]
fn test_messy_fixture_positions() {
    let analysis = analyze(MESSY, &Config::default(), Box::new(NoopScorer));

    let unused_import = analysis
        .findings
        .iter()
        .find(|f| f.rule == Rule::UnusedImport)
        .unwrap();
    assert_eq!(unused_import.span.start_line, 2);
    assert_eq!(unused_import.context.get("name").unwrap(), "os");

    let bare_except = analysis
        .findings
        .iter()
        .find(|f| f.rule == Rule::BareExcept)
        .unwrap();
    assert_eq!(bare_except.span.start_line, 12);

    let unused_var = analysis
        .findings
        .iter()
        .find(|f| f.rule == Rule::UnusedVariable)
        .unwrap();
    assert_eq!(unused_var.context.get("name").unwrap(), "API_KEY");
}

#[test]
fn test_disabling_rules_removes_their_findings() {
    let mut config = Config::default();
    config.disabled_rules = vec![
        "missing_docstring".to_string(),
        "missing_main_guard".to_string(),
        "repeated_literal".to_string(),
    ];
    let analysis = analyze(MESSY, &config, Box::new(NoopScorer));
    let rules = rules_of(&analysis);

    assert!(!rules.contains(&Rule::MissingDocstring));
    assert!(!rules.contains(&Rule::MissingMainGuard));
    assert!(!rules.contains(&Rule::RepeatedLiteral));
    // Unaffected rules still fire.
    assert!(rules.contains(&Rule::UnusedImport));
    assert!(rules.contains(&Rule::BareExcept));
}

#[test]
fn test_thresholds_are_configurable() {
    let mut config = Config::default();
    config.thresholds.max_function_args = 2;
    let source = "def f(a, b, c):\n    return a + b + c\n\nf(1, 2, 3)\n";
    let analysis = analyze(source, &config, Box::new(NoopScorer));
    assert!(rules_of(&analysis).contains(&Rule::TooManyArguments));

    // The stock threshold allows three parameters.
    let relaxed = analyze(source, &Config::default(), Box::new(NoopScorer));
    assert!(!rules_of(&relaxed).contains(&Rule::TooManyArguments));
}

#[test]
fn test_description_summarizes_fixture() {
    let analysis = analyze(MESSY, &Config::default(), Box::new(NoopScorer));
    let description = analysis.description.unwrap();
    assert!(description.contains("2 module(s)"));
    assert!(description.contains("process"));
    assert!(description.contains("endpoints"));
}
