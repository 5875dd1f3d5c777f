//! Detection of names used without a visible definition.

use std::collections::BTreeSet;

use super::builtins;
use super::{AnalysisContext, Finding, Rule};

/// Report name uses that resolve to no binding in the lexical scope chain
/// and are not Python builtins. Each name is reported once, at its first
/// occurrence.
pub fn detect_undefined_names(ctx: &AnalysisContext) -> Vec<Finding> {
    let mut findings = Vec::new();
    let mut reported: BTreeSet<&str> = BTreeSet::new();

    for use_ in ctx.symbols.uses() {
        if ctx.symbols.resolve_scope(use_).is_some() {
            continue;
        }
        if builtins::is_builtin(&use_.name) {
            continue;
        }
        if !reported.insert(&use_.name) {
            continue;
        }

        let span = ctx.tree.get(use_.node).span;
        findings.push(
            Finding::new(
                Rule::UndefinedName,
                span,
                format!("Name '{}' is used but might not be defined.", use_.name),
            )
            .with_context("name", use_.name.clone()),
        );
    }

    findings
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detect::testutil::run_check;

    #[test]
    fn test_undefined_name_flagged() {
        let findings = run_check("print(mystery)\n", detect_undefined_names);
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].context.get("name").unwrap(), "mystery");
    }

    #[test]
    fn test_builtins_not_flagged() {
        let findings = run_check(
            "print(len([1]))\nraise ValueError('x')\n",
            detect_undefined_names,
        );
        assert!(findings.is_empty());
    }

    #[test]
    fn test_defined_names_not_flagged() {
        let src = "import os\n\ndef f(x):\n    return os.path.join(x)\n\nprint(f('a'))\n";
        let findings = run_check(src, detect_undefined_names);
        assert!(findings.is_empty());
    }

    #[test]
    fn test_each_name_reported_once() {
        let findings = run_check("print(ghost)\nprint(ghost)\n", detect_undefined_names);
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].span.start_line, 1);
    }

    #[test]
    fn test_class_attribute_not_visible_in_method() {
        let src = "\
class C:
    limit = 10

    def over(self, n):
        return n > limit
";
        let findings = run_check(src, detect_undefined_names);
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].context.get("name").unwrap(), "limit");
    }
}
