//! Arena-backed structural tree produced by the parser.
//!
//! All nodes of one analysis run live in a single `Tree`; relationships are
//! expressed through `NodeId` indices rather than references, so downstream
//! consumers (symbol table, detectors) can hold cheap back-references
//! without borrowing the tree.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

/// Index of a node inside its `Tree`. Stable for the lifetime of the run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct NodeId(pub u32);

impl NodeId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Source location span with byte offsets and line/column positions.
///
/// Lines and columns are 1-indexed; end positions are exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Span {
    pub start_byte: usize,
    pub end_byte: usize,
    pub start_line: usize,
    pub start_col: usize,
    pub end_line: usize,
    pub end_col: usize,
}

impl Span {
    /// Whether `other` lies entirely within this span.
    pub fn contains(&self, other: &Span) -> bool {
        self.start_byte <= other.start_byte && other.end_byte <= self.end_byte
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.start_line, self.start_col)
    }
}

/// Syntactic category of a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    Module,
    Import,
    ImportFrom,
    Alias,
    FunctionDef,
    ClassDef,
    Param,
    Assign,
    AugAssign,
    Call,
    Name,
    Attribute,
    BinOp,
    Compare,
    Constant,
    If,
    For,
    While,
    With,
    Try,
    ExceptHandler,
    Lambda,
    Return,
    Expr,
    Other,
}

impl NodeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            NodeKind::Module => "module",
            NodeKind::Import => "import",
            NodeKind::ImportFrom => "import_from",
            NodeKind::Alias => "alias",
            NodeKind::FunctionDef => "function_def",
            NodeKind::ClassDef => "class_def",
            NodeKind::Param => "param",
            NodeKind::Assign => "assign",
            NodeKind::AugAssign => "aug_assign",
            NodeKind::Call => "call",
            NodeKind::Name => "name",
            NodeKind::Attribute => "attribute",
            NodeKind::BinOp => "bin_op",
            NodeKind::Compare => "compare",
            NodeKind::Constant => "constant",
            NodeKind::If => "if",
            NodeKind::For => "for",
            NodeKind::While => "while",
            NodeKind::With => "with",
            NodeKind::Try => "try",
            NodeKind::ExceptHandler => "except_handler",
            NodeKind::Lambda => "lambda",
            NodeKind::Return => "return",
            NodeKind::Expr => "expr",
            NodeKind::Other => "other",
        }
    }

    /// Kinds that open a new lexical scope.
    pub fn opens_scope(&self) -> bool {
        matches!(
            self,
            NodeKind::Module | NodeKind::FunctionDef | NodeKind::ClassDef | NodeKind::Lambda
        )
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Semantic attribute attached to a node (identifier names, literal values).
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum AttrValue {
    Str(String),
    Int(i64),
    Float(f64),
    Bool(bool),
    None,
}

impl AttrValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            AttrValue::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Canonical display form, used when grouping identical literals.
    pub fn repr(&self) -> String {
        match self {
            AttrValue::Str(s) => format!("{:?}", s),
            AttrValue::Int(i) => i.to_string(),
            AttrValue::Float(x) => x.to_string(),
            AttrValue::Bool(b) => {
                if *b {
                    "True".to_string()
                } else {
                    "False".to_string()
                }
            }
            AttrValue::None => "None".to_string(),
        }
    }
}

/// One element of the structural tree.
#[derive(Debug, Clone)]
pub struct Node {
    pub kind: NodeKind,
    pub span: Span,
    pub parent: Option<NodeId>,
    /// Ordered children, owned exclusively by this node.
    pub children: Vec<NodeId>,
    /// Attribute map, ordered for deterministic serialization.
    pub attrs: BTreeMap<String, AttrValue>,
}

impl Node {
    pub fn attr(&self, key: &str) -> Option<&AttrValue> {
        self.attrs.get(key)
    }

    pub fn attr_str(&self, key: &str) -> Option<&str> {
        self.attrs.get(key).and_then(|v| v.as_str())
    }

    /// The `name` attribute, present on defs, params, names and aliases.
    pub fn name(&self) -> Option<&str> {
        self.attr_str("name")
    }
}

/// The immutable structural representation of one source unit.
///
/// Nodes are stored in preorder: a parent always precedes its children, so
/// iterating ids in index order is a depth-first walk.
#[derive(Debug, Clone, Default)]
pub struct Tree {
    nodes: Vec<Node>,
}

impl Tree {
    pub fn new() -> Self {
        Self { nodes: Vec::new() }
    }

    /// Append a node, wiring it into its parent's child list.
    pub fn push(&mut self, mut node: Node) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        if let Some(parent) = node.parent {
            self.nodes[parent.index()].children.push(id);
        }
        node.children = Vec::new();
        self.nodes.push(node);
        id
    }

    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    pub fn get(&self, id: NodeId) -> &Node {
        &self.nodes[id.index()]
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Depth-first preorder walk over all node ids.
    pub fn iter(&self) -> impl Iterator<Item = NodeId> + '_ {
        (0..self.nodes.len() as u32).map(NodeId)
    }

    /// All nodes of the given kind, in source order.
    pub fn nodes_of_kind(&self, kind: NodeKind) -> impl Iterator<Item = NodeId> + '_ {
        self.iter().filter(move |id| self.get(*id).kind == kind)
    }

    pub fn children(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.get(id).children.iter().copied()
    }

    /// Docstring of a Module, FunctionDef or ClassDef node, recorded by
    /// the parser when the first body statement is a string literal.
    pub fn docstring(&self, id: NodeId) -> Option<&str> {
        self.get(id).attr_str("docstring")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn span(start: usize, end: usize) -> Span {
        Span {
            start_byte: start,
            end_byte: end,
            start_line: 1,
            start_col: start + 1,
            end_line: 1,
            end_col: end + 1,
        }
    }

    #[test]
    fn test_push_wires_parent() {
        let mut tree = Tree::new();
        let root = tree.push(Node {
            kind: NodeKind::Module,
            span: span(0, 10),
            parent: None,
            children: vec![],
            attrs: BTreeMap::new(),
        });
        let child = tree.push(Node {
            kind: NodeKind::Expr,
            span: span(0, 5),
            parent: Some(root),
            children: vec![],
            attrs: BTreeMap::new(),
        });

        assert_eq!(tree.get(root).children, vec![child]);
        assert_eq!(tree.get(child).parent, Some(root));
        assert!(tree.get(root).span.contains(&tree.get(child).span));
    }

    #[test]
    fn test_attr_value_repr() {
        assert_eq!(AttrValue::Str("x".to_string()).repr(), "\"x\"");
        assert_eq!(AttrValue::Int(42).repr(), "42");
        assert_eq!(AttrValue::Bool(true).repr(), "True");
        assert_eq!(AttrValue::None.repr(), "None");
    }

    #[test]
    fn test_kind_round_trip_strings() {
        assert_eq!(NodeKind::FunctionDef.as_str(), "function_def");
        assert_eq!(NodeKind::ImportFrom.as_str(), "import_from");
        assert!(NodeKind::Lambda.opens_scope());
        assert!(!NodeKind::Call.opens_scope());
    }
}
