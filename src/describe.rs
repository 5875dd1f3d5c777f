//! Human-readable digest of an analyzed module.

use lazy_static::lazy_static;
use regex::Regex;

use crate::tree::{NodeKind, Tree};

/// Produce a short prose description of the module: what it imports and
/// which classes and functions it defines.
pub fn describe(tree: &Tree) -> String {
    let imports = import_names(tree);
    let classes = def_names(tree, NodeKind::ClassDef);
    let functions = def_names(tree, NodeKind::FunctionDef);

    let mut sentences = vec!["This is a Python module.".to_string()];

    if !imports.is_empty() {
        let shown = imports.iter().take(5).cloned().collect::<Vec<_>>().join(", ");
        let tail = if imports.len() > 5 {
            ", and others"
        } else {
            ""
        };
        sentences.push(format!(
            "It imports {} module(s): {}{}.",
            imports.len(),
            shown,
            tail
        ));
    }

    if !classes.is_empty() {
        sentences.push(format!(
            "It defines {} class(es): {}.",
            classes.len(),
            classes.join(", ")
        ));
    }

    if !functions.is_empty() {
        sentences.push(format!(
            "It contains {} function(s): {}.",
            functions.len(),
            functions.join(", ")
        ));
    }

    if classes.is_empty() && functions.is_empty() {
        sentences.push(
            "It appears to be a script with no function or class definitions.".to_string(),
        );
    }

    sentences.join(" ")
}

/// Digest for a file the parser rejected: imports are salvaged from the
/// raw text, since no tree exists to walk.
pub fn describe_unparsed(source: &str) -> String {
    let imports = imports_from_text(source);
    let mut text =
        "This is a Python module containing syntax errors; analysis is limited.".to_string();
    if !imports.is_empty() {
        let shown = imports.iter().take(5).cloned().collect::<Vec<_>>().join(", ");
        let tail = if imports.len() > 5 { ", and others" } else { "" };
        text.push_str(&format!(
            " It appears to import {} module(s): {}{}.",
            imports.len(),
            shown,
            tail
        ));
    }
    text
}

/// Line-based import scan, used only when structural parsing failed.
fn imports_from_text(source: &str) -> Vec<String> {
    lazy_static! {
        static ref IMPORT_RE: Regex =
            Regex::new(r"^\s*import\s+([A-Za-z_][A-Za-z0-9_.]*)").unwrap();
        static ref FROM_IMPORT_RE: Regex =
            Regex::new(r"^\s*from\s+([A-Za-z_][A-Za-z0-9_.]*)\s+import\s+([A-Za-z0-9_., ]+)")
                .unwrap();
    }

    let mut imports = Vec::new();
    for line in source.lines() {
        if let Some(caps) = IMPORT_RE.captures(line) {
            imports.push(caps[1].to_string());
            continue;
        }
        if let Some(caps) = FROM_IMPORT_RE.captures(line) {
            let module = &caps[1];
            for name in caps[2].split(',') {
                let name = name.trim();
                if !name.is_empty() && name != "*" {
                    imports.push(format!("{}.{}", module, name));
                }
            }
        }
    }
    imports
}

/// Display names of every imported name, `module.name` for from-imports.
fn import_names(tree: &Tree) -> Vec<String> {
    let mut names = Vec::new();
    for id in tree.iter() {
        let node = tree.get(id);
        match node.kind {
            NodeKind::Import => {
                for child in tree.children(id) {
                    if let Some(name) = tree.get(child).name() {
                        names.push(name.to_string());
                    }
                }
            }
            NodeKind::ImportFrom => {
                let module = node.attr_str("module").unwrap_or("");
                for child in tree.children(id) {
                    if let Some(name) = tree.get(child).name() {
                        names.push(format!("{}.{}", module, name));
                    }
                }
            }
            _ => {}
        }
    }
    names
}

fn def_names(tree: &Tree, kind: NodeKind) -> Vec<String> {
    tree.nodes_of_kind(kind)
        .filter_map(|id| tree.get(id).name().map(str::to_string))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;

    #[test]
    fn test_describe_counts_definitions() {
        let src = "\
import os
from json import dumps

class Store:
    pass

def save(data):
    return dumps(data)
";
        let tree = parse(src).unwrap();
        let text = describe(&tree);
        assert!(text.contains("imports 2 module(s): os, json.dumps"));
        assert!(text.contains("1 class(es): Store"));
        assert!(text.contains("1 function(s): save"));
    }

    #[test]
    fn test_describe_plain_script() {
        let tree = parse("print('hello')\n").unwrap();
        let text = describe(&tree);
        assert!(text.contains("script with no function or class definitions"));
    }

    #[test]
    fn test_describe_unparsed_salvages_imports() {
        let source = "import os\nfrom json import dumps, loads\ndef broken(:\n";
        let text = describe_unparsed(source);
        assert!(text.contains("syntax errors"));
        assert!(text.contains("os"));
        assert!(text.contains("json.dumps"));
        assert!(text.contains("json.loads"));
    }

    #[test]
    fn test_imports_from_text_skips_wildcard() {
        let imports = imports_from_text("from os import *\n");
        assert!(imports.is_empty());
    }
}
