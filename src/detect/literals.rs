//! Detection of repeated hardcoded literal values.

use std::collections::BTreeMap;

use crate::tree::{AttrValue, NodeKind, Span};

use super::{AnalysisContext, Finding, Rule};

struct LiteralSites {
    count: usize,
    first_span: Span,
}

/// Report non-trivial constants that appear more often than the configured
/// limit. Small numbers and one-character strings are ignored, as are
/// `True`/`False`/`None`.
pub fn detect_repeated_literals(ctx: &AnalysisContext) -> Vec<Finding> {
    let max_repeats = ctx.config.thresholds.max_literal_repeats;
    let mut seen: BTreeMap<String, LiteralSites> = BTreeMap::new();

    for id in ctx.tree.nodes_of_kind(NodeKind::Constant) {
        let node = ctx.tree.get(id);
        let Some(value) = node.attr("value") else {
            continue;
        };
        if is_trivial(value) {
            continue;
        }
        let key = value.repr();
        seen.entry(key)
            .and_modify(|sites| sites.count += 1)
            .or_insert(LiteralSites {
                count: 1,
                first_span: node.span,
            });
    }

    let mut findings = Vec::new();
    for (repr, sites) in seen {
        if sites.count <= max_repeats {
            continue;
        }
        findings.push(
            Finding::new(
                Rule::RepeatedLiteral,
                sites.first_span,
                format!("Value {} appears {} times in the code.", repr, sites.count),
            )
            .with_context("value", repr)
            .with_context("count", sites.count.to_string()),
        );
    }
    findings
}

fn is_trivial(value: &AttrValue) -> bool {
    match value {
        AttrValue::Int(i) => i.abs() <= 1,
        AttrValue::Float(x) => x.abs() <= 1.0,
        AttrValue::Str(s) => s.chars().count() <= 1,
        AttrValue::Bool(_) | AttrValue::None => true,
    }
}
