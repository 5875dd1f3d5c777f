//! Detection of imports that are never used.

use crate::symbols::BindingKind;

use super::{AnalysisContext, Finding, Rule};

/// Report every import binding with no resolving use anywhere in the
/// program. Names re-exported through a module-level `__all__` are kept.
pub fn detect_unused_imports(ctx: &AnalysisContext) -> Vec<Finding> {
    let mut findings = Vec::new();

    for binding in ctx.symbols.bindings() {
        if binding.kind != BindingKind::Import {
            continue;
        }
        if ctx.symbols.binding_is_used(binding) {
            continue;
        }
        if ctx.symbols.is_exported(&binding.name) {
            continue;
        }

        let span = ctx.tree.get(binding.node).span;
        findings.push(
            Finding::new(
                Rule::UnusedImport,
                span,
                format!("Import '{}' is not used in the code.", binding.name),
            )
            .with_context("name", binding.name.clone()),
        );
    }

    findings
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detect::testutil::run_check;

    #[test]
    fn test_unused_import_flagged() {
        let findings = run_check("import os\n", detect_unused_imports);
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].rule, Rule::UnusedImport);
        assert_eq!(findings[0].span.start_line, 1);
        assert_eq!(findings[0].context.get("name").unwrap(), "os");
    }

    #[test]
    fn test_used_import_not_flagged() {
        let findings = run_check("import os\nprint(os.getcwd())\n", detect_unused_imports);
        assert!(findings.is_empty());
    }

    #[test]
    fn test_aliased_import() {
        let findings = run_check("import numpy as np\n", detect_unused_imports);
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].context.get("name").unwrap(), "np");
    }

    #[test]
    fn test_from_import_partial_use() {
        let src = "from json import dumps, loads\nprint(dumps({}))\n";
        let findings = run_check(src, detect_unused_imports);
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].context.get("name").unwrap(), "loads");
    }

    #[test]
    fn test_dunder_all_export_counts_as_used() {
        let src = "__all__ = [\"os\"]\nimport os\n";
        let findings = run_check(src, detect_unused_imports);
        assert!(findings.is_empty());
    }

    #[test]
    fn test_shadowed_module_import_flagged_per_scope() {
        let src = "\
import json

def load(text):
    import json
    return json.loads(text)
";
        let findings = run_check(src, detect_unused_imports);
        // The module-level import is shadowed inside `load`; only it is
        // unused.
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].span.start_line, 1);
    }

    #[test]
    fn test_use_in_decorator_counts() {
        let src = "import functools\n\n@functools.cache\ndef f():\n    return 1\n";
        let findings = run_check(src, detect_unused_imports);
        assert!(findings.is_empty());
    }
}
