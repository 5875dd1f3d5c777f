//! Detection of scripts missing the `if __name__ == "__main__"` guard.

use crate::tree::{AttrValue, NodeKind, Span, Tree};

use super::{AnalysisContext, Finding, Rule};

/// Report modules that define functions but have no main guard. Pure
/// library-less scripts (no functions at all) are left alone.
pub fn detect_missing_main_guard(ctx: &AnalysisContext) -> Vec<Finding> {
    let has_functions = ctx
        .tree
        .nodes_of_kind(NodeKind::FunctionDef)
        .next()
        .is_some();
    if !has_functions {
        return Vec::new();
    }

    if ctx
        .tree
        .nodes_of_kind(NodeKind::If)
        .any(|id| is_main_guard(ctx.tree, id))
    {
        return Vec::new();
    }

    // Anchor the finding at the end of the module, where the guard belongs.
    let root_span = ctx.tree.get(ctx.tree.root()).span;
    let span = Span {
        start_byte: root_span.end_byte,
        end_byte: root_span.end_byte,
        start_line: root_span.end_line,
        start_col: 1,
        end_line: root_span.end_line,
        end_col: 1,
    };

    vec![Finding::new(
        Rule::MissingMainGuard,
        span,
        "Missing 'if __name__ == \"__main__\":' guard for script code.",
    )]
}

/// Whether an `if` condition compares `__name__` against `"__main__"`.
fn is_main_guard(tree: &Tree, if_id: crate::tree::NodeId) -> bool {
    for child in tree.children(if_id) {
        let node = tree.get(child);
        if node.kind != NodeKind::Compare {
            continue;
        }
        let mut saw_dunder_name = false;
        let mut saw_main_literal = false;
        for operand in tree.children(child) {
            let op = tree.get(operand);
            match op.kind {
                NodeKind::Name if op.name() == Some("__name__") => saw_dunder_name = true,
                NodeKind::Constant => {
                    if op.attr("value") == Some(&AttrValue::Str("__main__".to_string())) {
                        saw_main_literal = true;
                    }
                }
                _ => {}
            }
        }
        if saw_dunder_name && saw_main_literal {
            return true;
        }
    }
    false
}
