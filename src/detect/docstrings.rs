//! Detection of missing docstrings on public functions and classes.

use crate::tree::NodeKind;

use super::{AnalysisContext, Finding, Rule};

pub fn detect_missing_docstrings(ctx: &AnalysisContext) -> Vec<Finding> {
    let mut findings = Vec::new();

    for id in ctx.tree.nodes_of_kind(NodeKind::FunctionDef) {
        let node = ctx.tree.get(id);
        let Some(name) = node.name() else { continue };
        // Private helpers are exempt, matching the underscore convention.
        if name.starts_with('_') {
            continue;
        }
        if ctx.tree.docstring(id).is_none() {
            findings.push(
                Finding::new(
                    Rule::MissingDocstring,
                    node.span,
                    format!("Function '{}' lacks a docstring.", name),
                )
                .with_context("name", name)
                .with_context("kind", "function"),
            );
        }
    }

    for id in ctx.tree.nodes_of_kind(NodeKind::ClassDef) {
        let node = ctx.tree.get(id);
        let Some(name) = node.name() else { continue };
        if ctx.tree.docstring(id).is_none() {
            findings.push(
                Finding::new(
                    Rule::MissingDocstring,
                    node.span,
                    format!("Class '{}' lacks a docstring.", name),
                )
                .with_context("name", name)
                .with_context("kind", "class"),
            );
        }
    }

    findings
}
