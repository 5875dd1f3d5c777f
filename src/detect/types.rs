//! Core types for detection results.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::tree::Span;

/// Severity levels for findings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
    Info,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
            Severity::Info => write!(f, "info"),
        }
    }
}

impl std::str::FromStr for Severity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "error" => Ok(Severity::Error),
            "warning" => Ok(Severity::Warning),
            "info" => Ok(Severity::Info),
            _ => Err(format!("unknown severity: {}", s)),
        }
    }
}

/// The closed set of rules the engine knows about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Rule {
    #[serde(rename = "syntax_error")]
    SyntaxError,
    #[serde(rename = "unused_import")]
    UnusedImport,
    #[serde(rename = "unused_variable")]
    UnusedVariable,
    #[serde(rename = "undefined_name")]
    UndefinedName,
    #[serde(rename = "complex_function")]
    ComplexFunction,
    #[serde(rename = "too_many_arguments")]
    TooManyArguments,
    #[serde(rename = "missing_docstring")]
    MissingDocstring,
    #[serde(rename = "bare_except")]
    BareExcept,
    #[serde(rename = "repeated_literal")]
    RepeatedLiteral,
    #[serde(rename = "missing_main_guard")]
    MissingMainGuard,
}

impl Rule {
    pub fn as_str(&self) -> &'static str {
        match self {
            Rule::SyntaxError => "syntax_error",
            Rule::UnusedImport => "unused_import",
            Rule::UnusedVariable => "unused_variable",
            Rule::UndefinedName => "undefined_name",
            Rule::ComplexFunction => "complex_function",
            Rule::TooManyArguments => "too_many_arguments",
            Rule::MissingDocstring => "missing_docstring",
            Rule::BareExcept => "bare_except",
            Rule::RepeatedLiteral => "repeated_literal",
            Rule::MissingMainGuard => "missing_main_guard",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "syntax_error" => Some(Rule::SyntaxError),
            "unused_import" => Some(Rule::UnusedImport),
            "unused_variable" => Some(Rule::UnusedVariable),
            "undefined_name" => Some(Rule::UndefinedName),
            "complex_function" => Some(Rule::ComplexFunction),
            "too_many_arguments" => Some(Rule::TooManyArguments),
            "missing_docstring" => Some(Rule::MissingDocstring),
            "bare_except" => Some(Rule::BareExcept),
            "repeated_literal" => Some(Rule::RepeatedLiteral),
            "missing_main_guard" => Some(Rule::MissingMainGuard),
            _ => None,
        }
    }

    /// The severity a finding of this rule carries.
    pub fn default_severity(&self) -> Severity {
        match self {
            Rule::SyntaxError => Severity::Error,
            Rule::UnusedImport
            | Rule::UnusedVariable
            | Rule::UndefinedName
            | Rule::ComplexFunction
            | Rule::TooManyArguments
            | Rule::BareExcept => Severity::Warning,
            Rule::MissingDocstring | Rule::RepeatedLiteral | Rule::MissingMainGuard => {
                Severity::Info
            }
        }
    }
}

impl std::fmt::Display for Rule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A single detected defect. Immutable once produced; the span is a copy,
/// so findings outlive the tree they were derived from.
#[derive(Debug, Clone, Serialize)]
pub struct Finding {
    pub rule: Rule,
    pub severity: Severity,
    pub span: Span,
    pub message: String,
    /// Rule-specific data (e.g. the unused import's name).
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub context: BTreeMap<String, String>,
}

impl Finding {
    pub fn new(rule: Rule, span: Span, message: impl Into<String>) -> Self {
        Self {
            rule,
            severity: rule.default_severity(),
            span,
            message: message.into(),
            context: BTreeMap::new(),
        }
    }

    pub fn with_context(mut self, key: &str, value: impl Into<String>) -> Self {
        self.context.insert(key.to_string(), value.into());
        self
    }

    pub fn line(&self) -> usize {
        self.span.start_line
    }

    pub fn column(&self) -> usize {
        self.span.start_col
    }
}

/// Order findings by (line, column, rule id) for deterministic output.
pub fn sort_findings(findings: &mut [Finding]) {
    findings.sort_by(|a, b| {
        (a.line(), a.column(), a.rule.as_str()).cmp(&(b.line(), b.column(), b.rule.as_str()))
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    fn span_at(line: usize, col: usize) -> Span {
        Span {
            start_byte: 0,
            end_byte: 0,
            start_line: line,
            start_col: col,
            end_line: line,
            end_col: col + 1,
        }
    }

    #[test]
    fn test_rule_string_round_trip() {
        for rule in [
            Rule::SyntaxError,
            Rule::UnusedImport,
            Rule::UnusedVariable,
            Rule::UndefinedName,
            Rule::ComplexFunction,
            Rule::TooManyArguments,
            Rule::MissingDocstring,
            Rule::BareExcept,
            Rule::RepeatedLiteral,
            Rule::MissingMainGuard,
        ] {
            assert_eq!(Rule::parse(rule.as_str()), Some(rule));
        }
        assert_eq!(Rule::parse("no_such_rule"), None);
    }

    #[test]
    fn test_sort_is_line_column_rule() {
        let mut findings = vec![
            Finding::new(Rule::UnusedVariable, span_at(2, 1), "b"),
            Finding::new(Rule::UnusedImport, span_at(2, 1), "a"),
            Finding::new(Rule::BareExcept, span_at(1, 5), "c"),
            Finding::new(Rule::BareExcept, span_at(1, 2), "d"),
        ];
        sort_findings(&mut findings);
        let order: Vec<_> = findings.iter().map(|f| f.message.as_str()).collect();
        assert_eq!(order, vec!["d", "c", "a", "b"]);
    }

    #[test]
    fn test_severity_parse() {
        assert_eq!("error".parse::<Severity>().unwrap(), Severity::Error);
        assert_eq!("WARNING".parse::<Severity>().unwrap(), Severity::Warning);
        assert!("bogus".parse::<Severity>().is_err());
    }
}
