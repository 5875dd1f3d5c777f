//! Detection of overly long functions and oversized parameter lists.

use crate::tree::NodeKind;

use super::{AnalysisContext, Finding, Rule};

/// Report functions whose body spans more lines than the configured limit.
pub fn detect_complex_functions(ctx: &AnalysisContext) -> Vec<Finding> {
    let max_lines = ctx.config.thresholds.max_function_lines;
    let mut findings = Vec::new();

    for id in ctx.tree.nodes_of_kind(NodeKind::FunctionDef) {
        let node = ctx.tree.get(id);
        let length = node.span.end_line.saturating_sub(node.span.start_line);
        if length <= max_lines {
            continue;
        }
        let name = node.name().unwrap_or("<anonymous>");
        findings.push(
            Finding::new(
                Rule::ComplexFunction,
                node.span,
                format!("Function '{}' is very long ({} lines).", name, length),
            )
            .with_context("name", name)
            .with_context("lines", length.to_string()),
        );
    }

    findings
}

/// Report functions with more parameters than the configured limit.
pub fn detect_too_many_arguments(ctx: &AnalysisContext) -> Vec<Finding> {
    let max_args = ctx.config.thresholds.max_function_args;
    let mut findings = Vec::new();

    for id in ctx.tree.nodes_of_kind(NodeKind::FunctionDef) {
        let node = ctx.tree.get(id);
        let params = ctx
            .tree
            .children(id)
            .filter(|c| ctx.tree.get(*c).kind == NodeKind::Param)
            .count();
        if params <= max_args {
            continue;
        }
        let name = node.name().unwrap_or("<anonymous>");
        findings.push(
            Finding::new(
                Rule::TooManyArguments,
                node.span,
                format!(
                    "Function '{}' has {} parameters, which might be too many.",
                    name, params
                ),
            )
            .with_context("name", name)
            .with_context("params", params.to_string()),
        );
    }

    findings
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detect::testutil::run_check;

    #[test]
    fn test_short_function_not_flagged() {
        let findings = run_check("def f():\n    return 1\n", detect_complex_functions);
        assert!(findings.is_empty());
    }

    #[test]
    fn test_long_function_flagged() {
        let mut src = String::from("def busy():\n");
        for i in 0..60 {
            src.push_str(&format!("    x{} = {}\n", i, i));
        }
        let findings = run_check(&src, detect_complex_functions);
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].rule, Rule::ComplexFunction);
        assert_eq!(findings[0].span.start_line, 1);
    }

    #[test]
    fn test_many_arguments_flagged() {
        let findings = run_check(
            "def wide(a, b, c, d, e, f):\n    return a\n",
            detect_too_many_arguments,
        );
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].context.get("params").unwrap(), "6");
    }

    #[test]
    fn test_five_arguments_allowed() {
        let findings = run_check(
            "def ok(a, b, c, d, e):\n    return a\n",
            detect_too_many_arguments,
        );
        assert!(findings.is_empty());
    }
}
