//! Symbol table construction: bindings, uses and lexical scopes.
//!
//! A single depth-first pass over the tree records every binding (imports,
//! assignments, defs, parameters) and every name use, each tagged with its
//! enclosing scope. Building never fails: a tree without semantic content
//! yields an empty table.
//!
//! Name resolution follows Python's lexical rules: innermost to outermost,
//! with class scopes invisible to code nested beneath them.

use serde::Serialize;

use crate::tree::{AttrValue, NodeId, NodeKind, Tree};

/// Index of a scope inside its `SymbolTable`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct ScopeId(pub u32);

impl ScopeId {
    fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ScopeKind {
    Module,
    Function,
    Class,
    Lambda,
}

/// A lexical region governing name resolution.
#[derive(Debug, Clone)]
pub struct Scope {
    pub id: ScopeId,
    pub kind: ScopeKind,
    pub parent: Option<ScopeId>,
    /// The node that opened this scope.
    pub node: NodeId,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BindingKind {
    Import,
    Assignment,
    FunctionParam,
    FunctionDef,
    ClassDef,
}

/// A named definition introduced at some scope. Immutable once recorded.
#[derive(Debug, Clone)]
pub struct Binding {
    pub name: String,
    pub kind: BindingKind,
    /// The node that introduced the binding, for position lookup only.
    pub node: NodeId,
    pub scope: ScopeId,
}

/// A reference to a name that may resolve to a binding.
#[derive(Debug, Clone)]
pub struct Use {
    pub name: String,
    pub node: NodeId,
    pub scope: ScopeId,
}

/// All bindings and uses of one source unit.
#[derive(Debug, Clone, Default)]
pub struct SymbolTable {
    scopes: Vec<Scope>,
    bindings: Vec<Binding>,
    uses: Vec<Use>,
    /// Names listed in a module-level `__all__` literal.
    exports: Vec<String>,
}

impl SymbolTable {
    /// Build the table with a single top-down pass over the tree.
    pub fn build(tree: &Tree) -> Self {
        let mut builder = Builder {
            tree,
            table: SymbolTable::default(),
        };
        if !tree.is_empty() {
            let root = tree.root();
            let module = builder.push_scope(ScopeKind::Module, None, root);
            builder.visit_children(root, module);
            builder.collect_exports(root);
        }
        builder.table
    }

    pub fn scopes(&self) -> &[Scope] {
        &self.scopes
    }

    pub fn scope(&self, id: ScopeId) -> &Scope {
        &self.scopes[id.index()]
    }

    pub fn bindings(&self) -> &[Binding] {
        &self.bindings
    }

    pub fn uses(&self) -> &[Use] {
        &self.uses
    }

    pub fn exports(&self) -> &[String] {
        &self.exports
    }

    /// Whether `name` is re-exported via `__all__`.
    pub fn is_exported(&self, name: &str) -> bool {
        self.exports.iter().any(|e| e == name)
    }

    /// The scope a use resolves into, walking the lexical chain outward.
    ///
    /// Class scopes other than the use's own are skipped, matching Python:
    /// names in a class body are not visible from nested function bodies.
    pub fn resolve_scope(&self, use_: &Use) -> Option<ScopeId> {
        let mut current = Some(use_.scope);
        let mut innermost = true;
        while let Some(sid) = current {
            let scope = self.scope(sid);
            let skip = scope.kind == ScopeKind::Class && !innermost;
            if !skip && self.scope_binds(sid, &use_.name) {
                return Some(sid);
            }
            innermost = false;
            current = scope.parent;
        }
        None
    }

    /// Whether any binding with this name exists directly in `scope`.
    pub fn scope_binds(&self, scope: ScopeId, name: &str) -> bool {
        self.bindings
            .iter()
            .any(|b| b.scope == scope && b.name == name)
    }

    /// Whether some use in the program resolves to this binding's scope and
    /// name. Shadowing is respected: a use that resolves to an inner scope
    /// does not mark an outer same-named binding as used.
    pub fn binding_is_used(&self, binding: &Binding) -> bool {
        self.uses.iter().any(|u| {
            u.name == binding.name && self.resolve_scope(u) == Some(binding.scope)
        })
    }
}

struct Builder<'a> {
    tree: &'a Tree,
    table: SymbolTable,
}

impl<'a> Builder<'a> {
    fn push_scope(&mut self, kind: ScopeKind, parent: Option<ScopeId>, node: NodeId) -> ScopeId {
        let id = ScopeId(self.table.scopes.len() as u32);
        self.table.scopes.push(Scope {
            id,
            kind,
            parent,
            node,
        });
        id
    }

    fn bind(&mut self, name: &str, kind: BindingKind, node: NodeId, scope: ScopeId) {
        self.table.bindings.push(Binding {
            name: name.to_string(),
            kind,
            node,
            scope,
        });
    }

    fn visit_children(&mut self, id: NodeId, scope: ScopeId) {
        let tree = self.tree;
        for child in tree.children(id) {
            self.visit(child, scope);
        }
    }

    fn visit(&mut self, id: NodeId, scope: ScopeId) {
        let tree = self.tree;
        let node = tree.get(id);
        match node.kind {
            NodeKind::FunctionDef => {
                if let Some(name) = node.name() {
                    self.bind(name, BindingKind::FunctionDef, id, scope);
                }
                let inner = self.push_scope(ScopeKind::Function, Some(scope), id);
                self.visit_children(id, inner);
            }
            NodeKind::ClassDef => {
                if let Some(name) = node.name() {
                    self.bind(name, BindingKind::ClassDef, id, scope);
                }
                let inner = self.push_scope(ScopeKind::Class, Some(scope), id);
                self.visit_children(id, inner);
            }
            NodeKind::Lambda => {
                let inner = self.push_scope(ScopeKind::Lambda, Some(scope), id);
                self.visit_children(id, inner);
            }
            NodeKind::Param => {
                if let Some(name) = node.name() {
                    self.bind(name, BindingKind::FunctionParam, id, scope);
                }
                // Annotations and default values still carry name uses.
                self.visit_children(id, scope);
            }
            NodeKind::Import | NodeKind::ImportFrom => {
                self.visit_import(id, scope);
            }
            NodeKind::Name => {
                let Some(name) = node.name() else { return };
                match node.attr_str("ctx") {
                    Some("store") => {
                        self.bind(name, BindingKind::Assignment, id, scope);
                    }
                    _ => {
                        self.table.uses.push(Use {
                            name: name.to_string(),
                            node: id,
                            scope,
                        });
                    }
                }
            }
            _ => self.visit_children(id, scope),
        }
    }

    fn visit_import(&mut self, id: NodeId, scope: ScopeId) {
        let tree = self.tree;
        let stmt = tree.get(id);
        let is_from = stmt.kind == NodeKind::ImportFrom;

        // `from __future__ import ...` activates compiler behavior and
        // introduces no real runtime bindings worth tracking.
        if is_from && stmt.attr_str("module") == Some("__future__") {
            return;
        }

        for child in tree.children(id) {
            let alias = tree.get(child);
            if alias.kind != NodeKind::Alias {
                continue;
            }
            let Some(name) = alias.name() else { continue };
            if name == "*" {
                continue;
            }
            let bound = match alias.attr_str("asname") {
                Some(asname) => asname,
                // `import a.b.c` binds the first segment only.
                None if !is_from => name.split('.').next().unwrap_or(name),
                None => name,
            };
            self.bind(bound, BindingKind::Import, id, scope);
        }
    }

    /// Collect module-level `__all__` string entries.
    fn collect_exports(&mut self, root: NodeId) {
        let tree = self.tree;
        for stmt in tree.children(root) {
            if tree.get(stmt).kind != NodeKind::Assign {
                continue;
            }
            let is_all = tree.children(stmt).any(|c| {
                let n = tree.get(c);
                n.kind == NodeKind::Name
                    && n.name() == Some("__all__")
                    && n.attr_str("ctx") == Some("store")
            });
            if !is_all {
                continue;
            }
            // Every string constant below the assignment is an export name.
            let mut stack: Vec<NodeId> = tree.children(stmt).collect();
            while let Some(id) = stack.pop() {
                let node = tree.get(id);
                if node.kind == NodeKind::Constant {
                    if let Some(AttrValue::Str(s)) = node.attr("value") {
                        self.table.exports.push(s.clone());
                    }
                }
                stack.extend(tree.children(id));
            }
        }
    }
}
