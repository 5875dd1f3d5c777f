//! Detection of variables that are assigned but never used.

use crate::symbols::BindingKind;
use crate::tree::{NodeId, NodeKind, Tree};

use super::{AnalysisContext, Finding, Rule};

/// Report plain-assignment bindings with no resolving use. Names starting
/// with an underscore are exempt, as are loop targets, context-manager
/// aliases and exception aliases.
pub fn detect_unused_variables(ctx: &AnalysisContext) -> Vec<Finding> {
    let mut findings = Vec::new();
    let mut seen: Vec<(crate::symbols::ScopeId, &str)> = Vec::new();

    for binding in ctx.symbols.bindings() {
        if binding.kind != BindingKind::Assignment {
            continue;
        }
        if binding.name.starts_with('_') {
            continue;
        }
        if !is_plain_assign_target(ctx.tree, binding.node) {
            continue;
        }
        if ctx.symbols.binding_is_used(binding) {
            continue;
        }
        // Report a re-assigned name once per scope, at its first site.
        if seen.contains(&(binding.scope, binding.name.as_str())) {
            continue;
        }
        seen.push((binding.scope, binding.name.as_str()));

        let span = ctx.tree.get(binding.node).span;
        findings.push(
            Finding::new(
                Rule::UnusedVariable,
                span,
                format!("Variable '{}' is assigned but never used.", binding.name),
            )
            .with_context("name", binding.name.clone()),
        );
    }

    findings
}

/// Whether a store target descends from an `Assign` statement rather than
/// a loop, `with`/`except` alias or comprehension clause.
fn is_plain_assign_target(tree: &Tree, mut id: NodeId) -> bool {
    while let Some(parent) = tree.get(id).parent {
        let node = tree.get(parent);
        match node.kind {
            NodeKind::Assign => return true,
            NodeKind::For
            | NodeKind::With
            | NodeKind::ExceptHandler
            | NodeKind::FunctionDef
            | NodeKind::ClassDef
            | NodeKind::Lambda
            | NodeKind::Module => return false,
            NodeKind::Other if node.attr_str("syntax").is_some() => return false,
            _ => id = parent,
        }
    }
    false
}
