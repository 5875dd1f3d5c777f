//! Output rendering for analysis results.
//!
//! Two formats:
//! - Pretty: colored terminal output for human readability
//! - JSON: one record per finding for programmatic consumption

use colored::*;
use serde::Serialize;

use crate::detect::{Finding, Severity};
use crate::suggest::Suggestion;
use crate::Analysis;

/// Top-level JSON report.
#[derive(Serialize)]
pub struct JsonReport {
    pub version: String,
    pub path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub records: Vec<JsonRecord>,
}

/// One finding joined with its suggestion.
#[derive(Serialize)]
pub struct JsonRecord {
    pub rule: String,
    pub severity: String,
    pub line: usize,
    pub column: usize,
    pub message: String,
    pub suggestion: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
}

fn to_records(findings: &[Finding], suggestions: &[Suggestion]) -> Vec<JsonRecord> {
    findings
        .iter()
        .zip(suggestions.iter())
        .map(|(finding, suggestion)| JsonRecord {
            rule: finding.rule.as_str().to_string(),
            severity: finding.severity.to_string(),
            line: finding.span.start_line,
            column: finding.span.start_col,
            message: finding.message.clone(),
            suggestion: suggestion.text.clone(),
            confidence: suggestion.confidence,
        })
        .collect()
}

/// Write results as pretty-printed JSON to stdout.
pub fn write_json(path: &str, analysis: &Analysis) -> anyhow::Result<()> {
    let report = JsonReport {
        version: env!("CARGO_PKG_VERSION").to_string(),
        path: path.to_string(),
        description: analysis.description.clone(),
        records: to_records(&analysis.findings, &analysis.suggestions),
    };
    let json = serde_json::to_string_pretty(&report)?;
    println!("{}", json);
    Ok(())
}

/// Write results in human-readable form to stdout.
pub fn write_pretty(path: &str, analysis: &Analysis) {
    println!();
    print!("  ");
    print!("{}", "trucode".cyan().bold());
    println!(" v{}", env!("CARGO_PKG_VERSION"));
    println!();

    print!("  {}", "Analyzing: ".dimmed());
    println!("{}", path);

    if let Some(description) = &analysis.description {
        println!("  {}", description.dimmed());
    }
    println!();

    if analysis.findings.is_empty() {
        println!("  {}", "✓ No issues detected".green());
        println!();
        return;
    }

    println!(
        "  {} ({}):",
        "Issues".bold(),
        analysis.findings.len()
    );
    println!();

    for (finding, suggestion) in analysis.findings.iter().zip(&analysis.suggestions) {
        write_severity_tag(&finding.severity);
        print!("   ");
        print!("{:<20}", finding.rule.as_str().dimmed());
        print!("{}", path.blue());
        print!(
            "{}",
            format!(":{}:{}", finding.span.start_line, finding.span.start_col).dimmed()
        );
        println!();
        println!("            {}", finding.message);
        match suggestion.confidence {
            Some(confidence) => println!(
                "            {} {}",
                suggestion.text.italic(),
                format!("(confidence {:.2})", confidence).dimmed()
            ),
            None => println!("            {}", suggestion.text.italic()),
        }
        println!();
    }

    let plural = if analysis.findings.len() != 1 { "s" } else { "" };
    println!("  {} issue{} found", analysis.findings.len(), plural);
    println!();
}

fn write_severity_tag(severity: &Severity) {
    match severity {
        Severity::Error => print!("    {} ", "ERROR".red()),
        Severity::Warning => print!("    {} ", "WARN ".yellow()),
        Severity::Info => print!("    {} ", "INFO ".blue()),
    }
}
