//! Suggestion generation from findings.
//!
//! Each finding renders a baseline recommendation from a static template
//! keyed by its rule. When an AI scorer is configured, the baseline is
//! offered to it together with a window of surrounding source lines; an
//! enriched text and confidence replace the baseline on success, and any
//! scoring failure keeps the baseline unchanged.

mod scorer;

pub use scorer::{NoopScorer, RemoteScorer, Scored, Scorer, ScoringError};

use serde::Serialize;
use tracing::{debug, warn};

use crate::detect::{Finding, Rule};
use crate::tree::Span;

/// A human-readable remediation derived from one finding. The rule and
/// span identify the originating finding without holding a reference, so
/// suggestions survive serialization of either sequence.
#[derive(Debug, Clone, Serialize)]
pub struct Suggestion {
    pub rule: Rule,
    pub span: Span,
    pub text: String,
    /// Present only when the scoring collaborator produced the text.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
}

/// Render the static template for a finding.
pub fn baseline_text(finding: &Finding) -> String {
    let name = finding.context.get("name").map(String::as_str);
    match finding.rule {
        Rule::SyntaxError => "Fix the syntax error to make the code valid.".to_string(),
        Rule::UnusedImport => format!(
            "Remove the unused import '{}' to make the code cleaner.",
            name.unwrap_or("?")
        ),
        Rule::UnusedVariable => format!(
            "Remove the unused variable '{}' or prefix it with an underscore if intentional.",
            name.unwrap_or("?")
        ),
        Rule::UndefinedName => format!(
            "Make sure '{}' is defined before use, or check for typos.",
            name.unwrap_or("?")
        ),
        Rule::ComplexFunction => {
            "Consider breaking this function into smaller, more focused functions.".to_string()
        }
        Rule::TooManyArguments => {
            "Consider grouping related parameters into a class or dictionary.".to_string()
        }
        Rule::MissingDocstring => {
            "Add a descriptive docstring to document the purpose and usage.".to_string()
        }
        Rule::BareExcept => {
            "Catch specific exceptions instead, like 'except ValueError:', \
             or use 'except Exception:' if necessary."
                .to_string()
        }
        Rule::RepeatedLiteral => {
            "Consider defining a constant for this value to improve maintainability.".to_string()
        }
        Rule::MissingMainGuard => {
            "Add an 'if __name__ == \"__main__\":' guard to make the script \
             importable without executing the main code."
                .to_string()
        }
    }
}

/// Maps findings to suggestions, optionally enriched by the injected
/// scorer.
pub struct SuggestionEngine {
    scorer: Box<dyn Scorer>,
    context_lines: usize,
}

impl SuggestionEngine {
    pub fn new(scorer: Box<dyn Scorer>, context_lines: usize) -> Self {
        Self {
            scorer,
            context_lines,
        }
    }

    /// One suggestion per finding, preserving input order.
    pub fn suggest(&self, findings: &[Finding], source: &str) -> Vec<Suggestion> {
        let lines: Vec<&str> = source.lines().collect();
        findings
            .iter()
            .map(|finding| self.suggest_one(finding, &lines))
            .collect()
    }

    fn suggest_one(&self, finding: &Finding, lines: &[&str]) -> Suggestion {
        let baseline = baseline_text(finding);
        let summary = format!(
            "{} at line {}: {}",
            finding.rule,
            finding.span.start_line,
            finding.message
        );
        let context = context_window(lines, finding.span.start_line, self.context_lines);

        match self.scorer.score(&summary, &context) {
            Ok(scored) => Suggestion {
                rule: finding.rule,
                span: finding.span,
                text: scored.text,
                confidence: Some(scored.confidence),
            },
            Err(ScoringError::Disabled) => {
                debug!(rule = finding.rule.as_str(), "scoring disabled, keeping baseline");
                self.baseline_suggestion(finding, baseline)
            }
            Err(e) => {
                warn!(
                    rule = finding.rule.as_str(),
                    error = %e,
                    "scoring failed, keeping baseline"
                );
                self.baseline_suggestion(finding, baseline)
            }
        }
    }

    fn baseline_suggestion(&self, finding: &Finding, text: String) -> Suggestion {
        Suggestion {
            rule: finding.rule,
            span: finding.span,
            text,
            confidence: None,
        }
    }
}

/// The source lines around `line` (1-indexed), clamped to the file.
fn context_window(lines: &[&str], line: usize, radius: usize) -> Vec<String> {
    if lines.is_empty() || line == 0 {
        return Vec::new();
    }
    let center = line.min(lines.len());
    let start = center.saturating_sub(radius + 1);
    let end = (center + radius).min(lines.len());
    lines[start..end].iter().map(|l| l.to_string()).collect()
}
