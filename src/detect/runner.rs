//! Detector engine orchestrating the registered checks.
//!
//! The registry is fixed at construction. Checks are mutually independent
//! and run across rayon worker threads; each is isolated so a panicking
//! check degrades to a single diagnostic finding instead of taking the
//! others down. Output order is fixed by the final (line, column, rule)
//! sort, never by execution or registration order.

use std::panic::{self, AssertUnwindSafe};

use rayon::prelude::*;
use tracing::{debug, warn};

use crate::config::Config;
use crate::symbols::SymbolTable;
use crate::tree::Tree;

use super::{
    detect_bare_excepts, detect_complex_functions, detect_missing_docstrings,
    detect_missing_main_guard, detect_repeated_literals, detect_too_many_arguments,
    detect_undefined_names, detect_unused_imports, detect_unused_variables, sort_findings,
    Finding, Rule, Severity,
};

/// Everything a check is allowed to look at.
pub struct AnalysisContext<'a> {
    pub tree: &'a Tree,
    pub symbols: &'a SymbolTable,
    pub config: &'a Config,
}

/// A check consumes the tree and symbol table and yields zero or more
/// findings. Plain function pointers keep the registry statically known.
pub type CheckFn = fn(&AnalysisContext) -> Vec<Finding>;

pub struct Check {
    pub rule: Rule,
    pub run: CheckFn,
}

/// The full built-in rule set, in registration order.
pub fn default_checks() -> Vec<Check> {
    vec![
        Check {
            rule: Rule::UnusedImport,
            run: detect_unused_imports,
        },
        Check {
            rule: Rule::UnusedVariable,
            run: detect_unused_variables,
        },
        Check {
            rule: Rule::UndefinedName,
            run: detect_undefined_names,
        },
        Check {
            rule: Rule::ComplexFunction,
            run: detect_complex_functions,
        },
        Check {
            rule: Rule::TooManyArguments,
            run: detect_too_many_arguments,
        },
        Check {
            rule: Rule::MissingDocstring,
            run: detect_missing_docstrings,
        },
        Check {
            rule: Rule::BareExcept,
            run: detect_bare_excepts,
        },
        Check {
            rule: Rule::RepeatedLiteral,
            run: detect_repeated_literals,
        },
        Check {
            rule: Rule::MissingMainGuard,
            run: detect_missing_main_guard,
        },
    ]
}

/// Executes the registered checks against one analyzed source unit.
pub struct Engine {
    checks: Vec<Check>,
}

impl Engine {
    /// Build the engine with the built-in rules enabled by `config`.
    pub fn new(config: &Config) -> Self {
        let checks = default_checks()
            .into_iter()
            .filter(|c| config.rule_enabled(c.rule.as_str()))
            .collect();
        Self { checks }
    }

    /// Build the engine from an explicit check list (tests, embedding).
    pub fn with_checks(checks: Vec<Check>) -> Self {
        Self { checks }
    }

    /// Run every check and return findings sorted by (line, column, rule).
    pub fn detect(&self, tree: &Tree, symbols: &SymbolTable, config: &Config) -> Vec<Finding> {
        let ctx = AnalysisContext {
            tree,
            symbols,
            config,
        };

        debug!(checks = self.checks.len(), "running detector checks");
        let mut findings: Vec<Finding> = self
            .checks
            .par_iter()
            .map(|check| run_isolated(check, &ctx))
            .reduce(Vec::new, |mut acc, mut batch| {
                acc.append(&mut batch);
                acc
            });

        sort_findings(&mut findings);
        debug!(findings = findings.len(), "detection complete");
        findings
    }
}

/// Run one check, converting a panic into a diagnostic finding tagged with
/// the check's own rule.
fn run_isolated(check: &Check, ctx: &AnalysisContext) -> Vec<Finding> {
    match panic::catch_unwind(AssertUnwindSafe(|| (check.run)(ctx))) {
        Ok(findings) => findings,
        Err(payload) => {
            let detail = panic_message(payload.as_ref());
            warn!(rule = check.rule.as_str(), detail = %detail, "check failed internally");
            let mut finding = Finding::new(
                check.rule,
                ctx.tree.get(ctx.tree.root()).span,
                format!(
                    "Internal error while running the '{}' check: {}",
                    check.rule, detail
                ),
            );
            finding.severity = Severity::Error;
            vec![finding.with_context("internal_error", detail)]
        }
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser;

    fn analyze(src: &str, engine: &Engine) -> Vec<Finding> {
        let tree = parser::parse(src).unwrap();
        let symbols = SymbolTable::build(&tree);
        let config = Config::default();
        engine.detect(&tree, &symbols, &config)
    }

    #[test]
    fn test_clean_module_has_no_findings() {
        let src = "\
\"Utility module.\"
import os


def cwd_name():
    \"Return the basename of the working directory.\"
    return os.path.basename(os.getcwd())


if __name__ == \"__main__\":
    print(cwd_name())
";
        let engine = Engine::new(&Config::default());
        assert!(analyze(src, &engine).is_empty());
    }

    #[test]
    fn test_findings_are_sorted() {
        let src = "import sys\nimport os\nprint(unknown_thing)\n";
        let engine = Engine::new(&Config::default());
        let findings = analyze(src, &engine);
        let lines: Vec<_> = findings.iter().map(|f| f.span.start_line).collect();
        let mut sorted = lines.clone();
        sorted.sort();
        assert_eq!(lines, sorted);
    }

    #[test]
    fn test_registration_order_does_not_change_output() {
        let src = "import os\nimport sys\nx = 1\n";
        let forward = Engine::with_checks(default_checks());
        let mut reversed_checks = default_checks();
        reversed_checks.reverse();
        let reversed = Engine::with_checks(reversed_checks);

        let a = analyze(src, &forward);
        let b = analyze(src, &reversed);
        assert_eq!(a.len(), b.len());
        for (fa, fb) in a.iter().zip(b.iter()) {
            assert_eq!(fa.rule, fb.rule);
            assert_eq!(fa.span, fb.span);
            assert_eq!(fa.message, fb.message);
        }
    }

    #[test]
    fn test_panicking_check_is_isolated() {
        fn exploding(_ctx: &AnalysisContext) -> Vec<Finding> {
            panic!("boom");
        }

        let mut checks = default_checks();
        checks.push(Check {
            rule: Rule::RepeatedLiteral,
            run: exploding,
        });
        let engine = Engine::with_checks(checks);

        let findings = analyze("import os\n", &engine);
        // The unused import is still reported...
        assert!(findings.iter().any(|f| f.rule == Rule::UnusedImport));
        // ...and the panic surfaces as a single Error diagnostic.
        let diagnostics: Vec<_> = findings
            .iter()
            .filter(|f| f.context.contains_key("internal_error"))
            .collect();
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].severity, Severity::Error);
        assert!(diagnostics[0].message.contains("boom"));
    }

    #[test]
    fn test_disabled_rule_is_skipped() {
        let mut config = Config::default();
        config.disabled_rules.push("unused_import".to_string());
        let engine = Engine::new(&config);

        let tree = parser::parse("import os\n").unwrap();
        let symbols = SymbolTable::build(&tree);
        let findings = engine.detect(&tree, &symbols, &config);
        assert!(findings.iter().all(|f| f.rule != Rule::UnusedImport));
    }
}
