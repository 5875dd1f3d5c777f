//! Lowering of the tree-sitter CST into the arena tree.
//!
//! The lowering assigns load/store contexts to names from their grammar
//! position (assignment targets, loop targets, `as` aliases, parameters),
//! hoists statements out of wrapper nodes (blocks, expression statements
//! holding assignments), and records identifier names and literal values
//! as node attributes. Identifiers that are not references in Python's
//! sense (attribute names, keyword-argument names, def names) become
//! attributes of their owning node, never `Name` nodes.

use std::collections::BTreeMap;

use tree_sitter::Node as TsNode;

use crate::tree::{AttrValue, Node, NodeId, NodeKind, Span, Tree};

/// Expression context: whether a name read or written at this position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Ctx {
    Load,
    Store,
}

impl Ctx {
    fn as_str(self) -> &'static str {
        match self {
            Ctx::Load => "load",
            Ctx::Store => "store",
        }
    }
}

/// Lower a fully parsed (error-free) CST into an arena tree.
pub(super) fn lower(root: TsNode, source: &[u8]) -> Tree {
    let mut lowering = Lowering {
        tree: Tree::new(),
        source,
    };
    lowering.lower_node(root, None, Ctx::Load);
    lowering.tree
}

struct Lowering<'a> {
    tree: Tree,
    source: &'a [u8],
}

impl<'a> Lowering<'a> {
    fn text(&self, node: TsNode) -> &str {
        node.utf8_text(self.source).unwrap_or("")
    }

    fn span_of(node: TsNode) -> Span {
        let start = node.start_position();
        let end = node.end_position();
        Span {
            start_byte: node.start_byte(),
            end_byte: node.end_byte(),
            start_line: start.row + 1,
            start_col: start.column + 1,
            end_line: end.row + 1,
            end_col: end.column + 1,
        }
    }

    fn add(
        &mut self,
        kind: NodeKind,
        ts: TsNode,
        parent: Option<NodeId>,
        attrs: BTreeMap<String, AttrValue>,
    ) -> NodeId {
        self.tree.push(Node {
            kind,
            span: Self::span_of(ts),
            parent,
            children: Vec::new(),
            attrs,
        })
    }

    fn named_children_of(ts: TsNode) -> Vec<TsNode> {
        let mut cursor = ts.walk();
        ts.named_children(&mut cursor).collect()
    }

    /// Lower every named child of `ts` directly under `parent`.
    fn lower_children(&mut self, ts: TsNode, parent: NodeId, ctx: Ctx) {
        for child in Self::named_children_of(ts) {
            self.lower_node(child, Some(parent), ctx);
        }
    }

    /// Flatten a `block` node: its statements become children of `parent`.
    fn lower_block(&mut self, block: TsNode, parent: NodeId) {
        self.lower_children(block, parent, Ctx::Load);
    }

    fn lower_field(&mut self, ts: TsNode, field: &str, parent: NodeId, ctx: Ctx) {
        if let Some(child) = ts.child_by_field_name(field) {
            self.lower_node(child, Some(parent), ctx);
        }
    }

    fn lower_node(&mut self, ts: TsNode, parent: Option<NodeId>, ctx: Ctx) -> Option<NodeId> {
        match ts.kind() {
            "module" => {
                let mut attrs = BTreeMap::new();
                if let Some(doc) = self.block_docstring(ts) {
                    attrs.insert("docstring".to_string(), AttrValue::Str(doc));
                }
                let id = self.add(NodeKind::Module, ts, parent, attrs);
                self.lower_children(ts, id, Ctx::Load);
                Some(id)
            }

            "comment" | "line_continuation" => None,

            "import_statement" => Some(self.lower_import(ts, parent)),
            "import_from_statement" | "future_import_statement" => {
                Some(self.lower_import_from(ts, parent))
            }

            "function_definition" => Some(self.lower_function(ts, parent)),
            "class_definition" => Some(self.lower_class(ts, parent)),
            "decorated_definition" => {
                for child in Self::named_children_of(ts) {
                    if child.kind() == "decorator" {
                        // The decorator's payload is an ordinary expression.
                        for expr in Self::named_children_of(child) {
                            self.lower_node(expr, parent, Ctx::Load);
                        }
                    }
                }
                let def = ts.child_by_field_name("definition")?;
                self.lower_node(def, parent, Ctx::Load)
            }

            "expression_statement" => {
                let children = Self::named_children_of(ts);
                // Assignments are statements of their own, not expressions.
                if children.len() == 1
                    && matches!(
                        children[0].kind(),
                        "assignment" | "augmented_assignment"
                    )
                {
                    return self.lower_node(children[0], parent, Ctx::Load);
                }
                let id = self.add(NodeKind::Expr, ts, parent, BTreeMap::new());
                self.lower_children(ts, id, Ctx::Load);
                Some(id)
            }

            "assignment" => {
                let id = self.add(NodeKind::Assign, ts, parent, BTreeMap::new());
                self.lower_field(ts, "left", id, Ctx::Store);
                self.lower_field(ts, "type", id, Ctx::Load);
                self.lower_field(ts, "right", id, Ctx::Load);
                Some(id)
            }
            "augmented_assignment" => {
                // The target of `x += 1` reads the previous value, so it is
                // lowered as a load and introduces no binding.
                let id = self.add(NodeKind::AugAssign, ts, parent, BTreeMap::new());
                self.lower_field(ts, "left", id, Ctx::Load);
                self.lower_field(ts, "right", id, Ctx::Load);
                Some(id)
            }

            "call" => {
                let id = self.add(NodeKind::Call, ts, parent, BTreeMap::new());
                self.lower_field(ts, "function", id, Ctx::Load);
                if let Some(args) = ts.child_by_field_name("arguments") {
                    self.lower_children(args, id, Ctx::Load);
                }
                Some(id)
            }
            "argument_list" => {
                // Transparent: arguments attach to the enclosing node.
                let parent = parent?;
                self.lower_children(ts, parent, Ctx::Load);
                None
            }
            "keyword_argument" => {
                // The keyword itself is not a name reference.
                let parent = parent?;
                self.lower_field(ts, "value", parent, Ctx::Load);
                None
            }

            "attribute" => {
                let mut attrs = BTreeMap::new();
                if let Some(attr) = ts.child_by_field_name("attribute") {
                    attrs.insert(
                        "attr".to_string(),
                        AttrValue::Str(self.text(attr).to_string()),
                    );
                }
                let id = self.add(NodeKind::Attribute, ts, parent, attrs);
                // The object is always read, even when the attribute is a
                // store target (`a.b = 1` reads `a`).
                self.lower_field(ts, "object", id, Ctx::Load);
                Some(id)
            }

            "identifier" => {
                let mut attrs = BTreeMap::new();
                attrs.insert(
                    "name".to_string(),
                    AttrValue::Str(self.text(ts).to_string()),
                );
                attrs.insert("ctx".to_string(), AttrValue::Str(ctx.as_str().to_string()));
                Some(self.add(NodeKind::Name, ts, parent, attrs))
            }

            "binary_operator" | "boolean_operator" => {
                let id = self.add(NodeKind::BinOp, ts, parent, BTreeMap::new());
                self.lower_children(ts, id, Ctx::Load);
                Some(id)
            }
            "comparison_operator" => {
                let id = self.add(NodeKind::Compare, ts, parent, BTreeMap::new());
                self.lower_children(ts, id, Ctx::Load);
                Some(id)
            }

            "string" => Some(self.lower_string(ts, parent)),
            "integer" => {
                let text = self.text(ts).to_string();
                let value = parse_int(&text)
                    .map(AttrValue::Int)
                    .unwrap_or(AttrValue::Str(text));
                Some(self.add_constant(ts, parent, value))
            }
            "float" => {
                let text = self.text(ts).to_string();
                let value = text
                    .replace('_', "")
                    .parse::<f64>()
                    .map(AttrValue::Float)
                    .unwrap_or(AttrValue::Str(text));
                Some(self.add_constant(ts, parent, value))
            }
            "true" => Some(self.add_constant(ts, parent, AttrValue::Bool(true))),
            "false" => Some(self.add_constant(ts, parent, AttrValue::Bool(false))),
            "none" => Some(self.add_constant(ts, parent, AttrValue::None)),

            "if_statement" | "elif_clause" => {
                let id = self.add(NodeKind::If, ts, parent, BTreeMap::new());
                self.lower_field(ts, "condition", id, Ctx::Load);
                if let Some(consequence) = ts.child_by_field_name("consequence") {
                    self.lower_block(consequence, id);
                }
                for child in Self::named_children_of(ts) {
                    match child.kind() {
                        "elif_clause" => {
                            self.lower_node(child, Some(id), Ctx::Load);
                        }
                        "else_clause" => {
                            if let Some(body) = child.child_by_field_name("body") {
                                self.lower_block(body, id);
                            }
                        }
                        _ => {}
                    }
                }
                Some(id)
            }

            "for_statement" => {
                let id = self.add(NodeKind::For, ts, parent, BTreeMap::new());
                self.lower_field(ts, "left", id, Ctx::Store);
                self.lower_field(ts, "right", id, Ctx::Load);
                if let Some(body) = ts.child_by_field_name("body") {
                    self.lower_block(body, id);
                }
                if let Some(alt) = ts.child_by_field_name("alternative") {
                    if let Some(body) = alt.child_by_field_name("body") {
                        self.lower_block(body, id);
                    }
                }
                Some(id)
            }
            "while_statement" => {
                let id = self.add(NodeKind::While, ts, parent, BTreeMap::new());
                self.lower_field(ts, "condition", id, Ctx::Load);
                if let Some(body) = ts.child_by_field_name("body") {
                    self.lower_block(body, id);
                }
                Some(id)
            }

            "with_statement" => {
                let id = self.add(NodeKind::With, ts, parent, BTreeMap::new());
                for child in Self::named_children_of(ts) {
                    if child.kind() == "with_clause" {
                        for item in Self::named_children_of(child) {
                            self.lower_field(item, "value", id, Ctx::Load);
                        }
                    }
                }
                if let Some(body) = ts.child_by_field_name("body") {
                    self.lower_block(body, id);
                }
                Some(id)
            }
            "as_pattern" => {
                // `expr as target`: the expression is read, the alias bound.
                let mut attrs = BTreeMap::new();
                attrs.insert(
                    "syntax".to_string(),
                    AttrValue::Str("as_pattern".to_string()),
                );
                let id = self.add(NodeKind::Other, ts, parent, attrs);
                let children = Self::named_children_of(ts);
                if let Some(expr) = children.first() {
                    self.lower_node(*expr, Some(id), Ctx::Load);
                }
                if let Some(alias) = ts.child_by_field_name("alias") {
                    self.lower_children(alias, id, Ctx::Store);
                } else if children.len() > 1 {
                    self.lower_node(children[1], Some(id), Ctx::Store);
                }
                Some(id)
            }

            "try_statement" => {
                let id = self.add(NodeKind::Try, ts, parent, BTreeMap::new());
                if let Some(body) = ts.child_by_field_name("body") {
                    self.lower_block(body, id);
                }
                for child in Self::named_children_of(ts) {
                    match child.kind() {
                        "except_clause" | "except_group_clause" => {
                            self.lower_node(child, Some(id), Ctx::Load);
                        }
                        "else_clause" | "finally_clause" => {
                            if let Some(body) = child.child_by_field_name("body") {
                                self.lower_block(body, id);
                            } else {
                                // finally_clause exposes its block as a
                                // plain child in some grammar versions.
                                for sub in Self::named_children_of(child) {
                                    if sub.kind() == "block" {
                                        self.lower_block(sub, id);
                                    }
                                }
                            }
                        }
                        _ => {}
                    }
                }
                Some(id)
            }
            "except_clause" | "except_group_clause" => {
                let mut attrs = BTreeMap::new();
                let children = Self::named_children_of(ts);
                let has_type = children.iter().any(|c| c.kind() != "block");
                attrs.insert("bare".to_string(), AttrValue::Bool(!has_type));
                let id = self.add(NodeKind::ExceptHandler, ts, parent, attrs);
                let mut saw_type = false;
                for child in children {
                    if child.kind() == "block" {
                        self.lower_block(child, id);
                    } else if !saw_type {
                        // Exception type (possibly an as_pattern binding the
                        // alias internally).
                        self.lower_node(child, Some(id), Ctx::Load);
                        saw_type = true;
                    } else {
                        // Legacy `except E, name` alias position.
                        self.lower_node(child, Some(id), Ctx::Store);
                    }
                }
                Some(id)
            }

            "lambda" => {
                let id = self.add(NodeKind::Lambda, ts, parent, BTreeMap::new());
                if let Some(params) = ts.child_by_field_name("parameters") {
                    self.lower_parameters(params, id);
                }
                self.lower_field(ts, "body", id, Ctx::Load);
                Some(id)
            }

            "return_statement" => {
                let id = self.add(NodeKind::Return, ts, parent, BTreeMap::new());
                self.lower_children(ts, id, Ctx::Load);
                Some(id)
            }

            // Comprehension clauses: the loop target binds, the iterable is
            // read. Comprehension scopes are folded into the enclosing one.
            "for_in_clause" => {
                let mut attrs = BTreeMap::new();
                attrs.insert(
                    "syntax".to_string(),
                    AttrValue::Str("for_in_clause".to_string()),
                );
                let id = self.add(NodeKind::Other, ts, parent, attrs);
                self.lower_field(ts, "left", id, Ctx::Store);
                self.lower_field(ts, "right", id, Ctx::Load);
                Some(id)
            }

            // Walrus operator: `(n := value)` binds its target.
            "named_expression" => {
                let id = self.add(NodeKind::Assign, ts, parent, BTreeMap::new());
                self.lower_field(ts, "name", id, Ctx::Store);
                self.lower_field(ts, "value", id, Ctx::Load);
                Some(id)
            }

            // Subscripted stores still read the container: `a[0] = 1`.
            "subscript" => {
                let id = self.add(NodeKind::Other, ts, parent, BTreeMap::new());
                self.lower_children(ts, id, Ctx::Load);
                Some(id)
            }

            // Declarations without name references of their own.
            "global_statement" | "nonlocal_statement" | "pass_statement"
            | "break_statement" | "continue_statement" | "import_prefix"
            | "dotted_name" | "relative_import" | "wildcard_import" => {
                Some(self.add(NodeKind::Other, ts, parent, BTreeMap::new()))
            }

            _ => {
                let id = self.add(NodeKind::Other, ts, parent, BTreeMap::new());
                self.lower_children(ts, id, ctx);
                Some(id)
            }
        }
    }

    fn lower_import(&mut self, ts: TsNode, parent: Option<NodeId>) -> NodeId {
        let id = self.add(NodeKind::Import, ts, parent, BTreeMap::new());
        for child in Self::named_children_of(ts) {
            match child.kind() {
                "dotted_name" => {
                    let name = self.text(child).to_string();
                    self.add_alias(child, id, name, None);
                }
                "aliased_import" => {
                    let name = child
                        .child_by_field_name("name")
                        .map(|n| self.text(n).to_string())
                        .unwrap_or_default();
                    let asname = child
                        .child_by_field_name("alias")
                        .map(|n| self.text(n).to_string());
                    self.add_alias(child, id, name, asname);
                }
                _ => {}
            }
        }
        id
    }

    fn lower_import_from(&mut self, ts: TsNode, parent: Option<NodeId>) -> NodeId {
        let mut attrs = BTreeMap::new();
        let module = ts.child_by_field_name("module_name");
        if let Some(m) = module {
            attrs.insert(
                "module".to_string(),
                AttrValue::Str(self.text(m).to_string()),
            );
        } else if ts.kind() == "future_import_statement" {
            attrs.insert(
                "module".to_string(),
                AttrValue::Str("__future__".to_string()),
            );
        }
        let id = self.add(NodeKind::ImportFrom, ts, parent, attrs);

        for child in Self::named_children_of(ts) {
            if Some(child) == module {
                continue;
            }
            match child.kind() {
                "dotted_name" | "identifier" => {
                    let name = self.text(child).to_string();
                    self.add_alias(child, id, name, None);
                }
                "aliased_import" => {
                    let name = child
                        .child_by_field_name("name")
                        .map(|n| self.text(n).to_string())
                        .unwrap_or_default();
                    let asname = child
                        .child_by_field_name("alias")
                        .map(|n| self.text(n).to_string());
                    self.add_alias(child, id, name, asname);
                }
                "wildcard_import" => {
                    self.add_alias(child, id, "*".to_string(), None);
                }
                _ => {}
            }
        }
        id
    }

    fn add_alias(&mut self, ts: TsNode, parent: NodeId, name: String, asname: Option<String>) {
        let mut attrs = BTreeMap::new();
        attrs.insert("name".to_string(), AttrValue::Str(name));
        if let Some(asname) = asname {
            attrs.insert("asname".to_string(), AttrValue::Str(asname));
        }
        self.add(NodeKind::Alias, ts, Some(parent), attrs);
    }

    fn lower_function(&mut self, ts: TsNode, parent: Option<NodeId>) -> NodeId {
        let mut attrs = BTreeMap::new();
        if let Some(name) = ts.child_by_field_name("name") {
            attrs.insert(
                "name".to_string(),
                AttrValue::Str(self.text(name).to_string()),
            );
        }
        if let Some(doc) = ts
            .child_by_field_name("body")
            .and_then(|body| self.block_docstring(body))
        {
            attrs.insert("docstring".to_string(), AttrValue::Str(doc));
        }
        let id = self.add(NodeKind::FunctionDef, ts, parent, attrs);
        if let Some(params) = ts.child_by_field_name("parameters") {
            self.lower_parameters(params, id);
        }
        self.lower_field(ts, "return_type", id, Ctx::Load);
        if let Some(body) = ts.child_by_field_name("body") {
            self.lower_block(body, id);
        }
        id
    }

    fn lower_class(&mut self, ts: TsNode, parent: Option<NodeId>) -> NodeId {
        let mut attrs = BTreeMap::new();
        if let Some(name) = ts.child_by_field_name("name") {
            attrs.insert(
                "name".to_string(),
                AttrValue::Str(self.text(name).to_string()),
            );
        }
        if let Some(doc) = ts
            .child_by_field_name("body")
            .and_then(|body| self.block_docstring(body))
        {
            attrs.insert("docstring".to_string(), AttrValue::Str(doc));
        }
        let id = self.add(NodeKind::ClassDef, ts, parent, attrs);
        if let Some(superclasses) = ts.child_by_field_name("superclasses") {
            self.lower_children(superclasses, id, Ctx::Load);
        }
        if let Some(body) = ts.child_by_field_name("body") {
            self.lower_block(body, id);
        }
        id
    }

    fn lower_parameters(&mut self, params: TsNode, parent: NodeId) {
        for child in Self::named_children_of(params) {
            match child.kind() {
                "identifier" => {
                    let name = self.text(child).to_string();
                    self.add_param(child, parent, name);
                }
                "typed_parameter" => {
                    if let Some(name) = Self::named_children_of(child)
                        .first()
                        .and_then(|n| self.param_name(*n))
                    {
                        let id = self.add_param(child, parent, name);
                        self.lower_field(child, "type", id, Ctx::Load);
                    }
                }
                "default_parameter" | "typed_default_parameter" => {
                    if let Some(name) = child
                        .child_by_field_name("name")
                        .and_then(|n| self.param_name(n))
                    {
                        let id = self.add_param(child, parent, name);
                        self.lower_field(child, "type", id, Ctx::Load);
                        self.lower_field(child, "value", id, Ctx::Load);
                    }
                }
                "list_splat_pattern" | "dictionary_splat_pattern" => {
                    if let Some(name) = self.param_name(child) {
                        self.add_param(child, parent, name);
                    }
                }
                _ => {}
            }
        }
    }

    fn param_name(&self, node: TsNode) -> Option<String> {
        match node.kind() {
            "identifier" => Some(self.text(node).to_string()),
            "list_splat_pattern" | "dictionary_splat_pattern" => Self::named_children_of(node)
                .first()
                .filter(|n| n.kind() == "identifier")
                .map(|n| self.text(*n).to_string()),
            _ => None,
        }
    }

    fn add_param(&mut self, ts: TsNode, parent: NodeId, name: String) -> NodeId {
        let mut attrs = BTreeMap::new();
        attrs.insert("name".to_string(), AttrValue::Str(name));
        self.add(NodeKind::Param, ts, Some(parent), attrs)
    }

    /// The docstring of a body block: its first statement, when that is a
    /// plain (non-interpolated) string expression.
    fn block_docstring(&self, body: TsNode) -> Option<String> {
        let first = Self::named_children_of(body)
            .into_iter()
            .find(|c| c.kind() != "comment")?;
        if first.kind() != "expression_statement" {
            return None;
        }
        let inner = Self::named_children_of(first);
        if inner.len() != 1 || inner[0].kind() != "string" {
            return None;
        }
        let parts = Self::named_children_of(inner[0]);
        if parts.iter().any(|c| c.kind() == "interpolation") {
            return None;
        }
        let mut content = String::new();
        for part in parts {
            if matches!(part.kind(), "string_content" | "escape_sequence") {
                content.push_str(self.text(part));
            }
        }
        Some(content)
    }

    fn lower_string(&mut self, ts: TsNode, parent: Option<NodeId>) -> NodeId {
        let children = Self::named_children_of(ts);
        let has_interpolation = children.iter().any(|c| c.kind() == "interpolation");
        if has_interpolation {
            // f-string: not a constant; interpolated expressions still
            // contribute name uses.
            let id = self.add(NodeKind::Other, ts, parent, BTreeMap::new());
            for child in children {
                if child.kind() == "interpolation" {
                    self.lower_children(child, id, Ctx::Load);
                }
            }
            return id;
        }

        let mut content = String::new();
        for child in children {
            if matches!(child.kind(), "string_content" | "escape_sequence") {
                content.push_str(self.text(child));
            }
        }
        self.add_constant(ts, parent, AttrValue::Str(content))
    }

    fn add_constant(&mut self, ts: TsNode, parent: Option<NodeId>, value: AttrValue) -> NodeId {
        let mut attrs = BTreeMap::new();
        attrs.insert("value".to_string(), value);
        self.add(NodeKind::Constant, ts, parent, attrs)
    }
}

fn parse_int(text: &str) -> Option<i64> {
    let cleaned = text.replace('_', "");
    let lower = cleaned.to_ascii_lowercase();
    if let Some(hex) = lower.strip_prefix("0x") {
        i64::from_str_radix(hex, 16).ok()
    } else if let Some(oct) = lower.strip_prefix("0o") {
        i64::from_str_radix(oct, 8).ok()
    } else if let Some(bin) = lower.strip_prefix("0b") {
        i64::from_str_radix(bin, 2).ok()
    } else {
        cleaned.parse().ok()
    }
}
