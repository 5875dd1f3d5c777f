//! Detection of bare `except:` handlers.

use crate::tree::{AttrValue, NodeKind};

use super::{AnalysisContext, Finding, Rule};

pub fn detect_bare_excepts(ctx: &AnalysisContext) -> Vec<Finding> {
    let mut findings = Vec::new();

    for id in ctx.tree.nodes_of_kind(NodeKind::ExceptHandler) {
        let node = ctx.tree.get(id);
        if node.attr("bare") != Some(&AttrValue::Bool(true)) {
            continue;
        }
        findings.push(Finding::new(
            Rule::BareExcept,
            node.span,
            "Using a bare 'except:' clause catches all exceptions, \
             including KeyboardInterrupt and SystemExit.",
        ));
    }

    findings
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detect::testutil::run_check;

    #[test]
    fn test_bare_except_flagged() {
        let src = "try:\n    pass\nexcept:\n    pass\n";
        let findings = run_check(src, detect_bare_excepts);
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].span.start_line, 3);
    }

    #[test]
    fn test_typed_except_ok() {
        let src = "try:\n    pass\nexcept ValueError:\n    pass\n";
        let findings = run_check(src, detect_bare_excepts);
        assert!(findings.is_empty());
    }

    #[test]
    fn test_aliased_except_ok() {
        let src = "try:\n    pass\nexcept OSError as e:\n    print(e)\n";
        let findings = run_check(src, detect_bare_excepts);
        assert!(findings.is_empty());
    }

    #[test]
    fn test_multiple_handlers() {
        let src = "\
try:
    pass
except ValueError:
    pass
except:
    pass
";
        let findings = run_check(src, detect_bare_excepts);
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].span.start_line, 5);
    }
}
