//! Serialization shape of findings, suggestions and the JSON report.

use trucode::config::Config;
use trucode::report::{JsonRecord, JsonReport};
use trucode::{analyze, NoopScorer};

#[test]
fn test_finding_serializes_with_stable_ids() {
    let analysis = analyze("import os\n", &Config::default(), Box::new(NoopScorer));
    let value = serde_json::to_value(&analysis.findings).unwrap();

    assert_eq!(value[0]["rule"], "unused_import");
    assert_eq!(value[0]["severity"], "warning");
    assert_eq!(value[0]["span"]["start_line"], 1);
    assert_eq!(value[0]["context"]["name"], "os");
}

#[test]
fn test_suggestion_omits_absent_confidence() {
    let analysis = analyze("import os\n", &Config::default(), Box::new(NoopScorer));
    let value = serde_json::to_value(&analysis.suggestions).unwrap();

    assert!(value[0]["text"].as_str().unwrap().contains("'os'"));
    assert!(value[0].get("confidence").is_none());
}

#[test]
fn test_json_report_shape() {
    let analysis = analyze(
        "import os\nimport sys\n",
        &Config::default(),
        Box::new(NoopScorer),
    );

    let report = JsonReport {
        version: env!("CARGO_PKG_VERSION").to_string(),
        path: "example.py".to_string(),
        description: analysis.description.clone(),
        records: analysis
            .findings
            .iter()
            .zip(&analysis.suggestions)
            .map(|(finding, suggestion)| JsonRecord {
                rule: finding.rule.as_str().to_string(),
                severity: finding.severity.to_string(),
                line: finding.span.start_line,
                column: finding.span.start_col,
                message: finding.message.clone(),
                suggestion: suggestion.text.clone(),
                confidence: suggestion.confidence,
            })
            .collect(),
    };

    let value = serde_json::to_value(&report).unwrap();
    assert_eq!(value["path"], "example.py");
    assert_eq!(value["records"].as_array().unwrap().len(), 2);
    assert_eq!(value["records"][0]["line"], 1);
    assert_eq!(value["records"][1]["line"], 2);
    assert!(value["description"]
        .as_str()
        .unwrap()
        .contains("2 module(s)"));
}

#[test]
fn test_severity_rendering_matches_rule_defaults() {
    let source = "def f(:\n";
    let analysis = analyze(source, &Config::default(), Box::new(NoopScorer));
    let value = serde_json::to_value(&analysis.findings).unwrap();
    assert_eq!(value[0]["rule"], "syntax_error");
    assert_eq!(value[0]["severity"], "error");
}
