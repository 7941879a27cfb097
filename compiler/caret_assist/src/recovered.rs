//! The recovered element tree.
//!
//! Recovery folds whatever the engine reduced before a stall into a tree
//! of placeholders. Containers stay open (`end == None`) until a closing
//! brace or a sibling declaration closes them; the innermost open
//! container is the *current* element and receives the next node.
//!
//! Nodes live in an arena and refer to each other by [`NodeId`].

use std::fmt::Write as _;

use caret_ir::ast::{
    self, EnumConstant, FieldDecl, ImportDecl, Initializer, LocalDecl, MethodDecl, ModuleDecl,
    PackageDecl, Stmt, TypeDecl,
};

#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct NodeId(u32);

impl NodeId {
    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Clone, Eq, PartialEq, Debug)]
pub enum RecoveredElement {
    Unit,
    Type(TypeDecl),
    Method(MethodDecl),
    Initializer(Initializer),
    Field(FieldDecl),
    /// A block inside a body; `fake` blocks scope a `for` header.
    Block { fake: bool },
    EnumConstant(EnumConstant),
    Local(LocalDecl),
    Statement(Stmt),
    Import(ImportDecl),
    Package(PackageDecl),
    Module(ModuleDecl),
}

impl RecoveredElement {
    /// Elements that can become the current element.
    pub fn is_container(&self) -> bool {
        matches!(
            self,
            RecoveredElement::Unit
                | RecoveredElement::Type(_)
                | RecoveredElement::Method(_)
                | RecoveredElement::Initializer(_)
                | RecoveredElement::Field(_)
                | RecoveredElement::Block { .. }
        )
    }

    /// Elements whose children are statements.
    pub fn holds_statements(&self) -> bool {
        matches!(
            self,
            RecoveredElement::Method(_)
                | RecoveredElement::Initializer(_)
                | RecoveredElement::Block { .. }
        )
    }

    /// One-line description used by [`RecoveredTree::outline`].
    pub fn label(&self) -> String {
        match self {
            RecoveredElement::Unit => "unit".to_owned(),
            RecoveredElement::Type(t) => format!("{} {}", t.kind.keyword(), t.name.as_str()),
            RecoveredElement::Method(m) => {
                let params: Vec<String> = m
                    .params
                    .iter()
                    .map(|p| format!("{} {}", p.ty.render(), p.name.as_str()))
                    .collect();
                let kind = if m.is_constructor() { "constructor" } else { "method" };
                format!("{kind} {}({})", m.name.as_str(), params.join(", "))
            }
            RecoveredElement::Initializer(i) if i.is_static => "static initializer".to_owned(),
            RecoveredElement::Initializer(_) => "initializer".to_owned(),
            RecoveredElement::Field(f) => format!("field {} {}", f.ty.render(), f.name.as_str()),
            RecoveredElement::Block { fake: false } => "block".to_owned(),
            RecoveredElement::Block { fake: true } => "scope".to_owned(),
            RecoveredElement::EnumConstant(c) => format!("constant {}", c.name.as_str()),
            RecoveredElement::Local(l) => format!("local {} {}", l.ty.render(), l.name.as_str()),
            RecoveredElement::Statement(_) => "statement".to_owned(),
            RecoveredElement::Import(i) => {
                let star = if i.on_demand { ".*" } else { "" };
                format!("import {}{star}", ast::dotted(&i.name))
            }
            RecoveredElement::Package(p) => format!("package {}", ast::dotted(&p.name)),
            RecoveredElement::Module(m) => format!("module {}", ast::dotted(&m.name)),
        }
    }
}

#[derive(Clone, Eq, PartialEq, Debug)]
pub struct RecoveredNode {
    pub element: RecoveredElement,
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
    pub start: u32,
    /// `None` while the element is open.
    pub end: Option<u32>,
}

impl RecoveredNode {
    #[inline]
    pub fn is_open(&self) -> bool {
        self.end.is_none()
    }
}

#[derive(Clone, Eq, PartialEq, Debug)]
pub struct RecoveredTree {
    nodes: Vec<RecoveredNode>,
    current: NodeId,
}

impl RecoveredTree {
    pub fn new(root: RecoveredElement, start: u32) -> Self {
        RecoveredTree {
            nodes: vec![RecoveredNode {
                element: root,
                parent: None,
                children: Vec::new(),
                start,
                end: None,
            }],
            current: NodeId(0),
        }
    }

    #[inline]
    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    /// The innermost open element.
    #[inline]
    pub fn current(&self) -> NodeId {
        self.current
    }

    pub fn get(&self, id: NodeId) -> Option<&RecoveredNode> {
        self.nodes.get(id.index())
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn children(&self, id: NodeId) -> impl Iterator<Item = (NodeId, &RecoveredNode)> + '_ {
        self.get(id)
            .map(|node| node.children.as_slice())
            .unwrap_or_default()
            .iter()
            .filter_map(|child| self.get(*child).map(|node| (*child, node)))
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).and_then(|node| node.parent)
    }

    /// Elements from the root down to the current element.
    pub fn open_path(&self) -> Vec<NodeId> {
        let mut path = Vec::new();
        let mut at = Some(self.current);
        while let Some(id) = at {
            path.push(id);
            at = self.parent(id);
        }
        path.reverse();
        path
    }

    /// Depth-first search from the root.
    pub fn find(&self, mut pred: impl FnMut(&RecoveredElement) -> bool) -> Option<NodeId> {
        let mut pending = vec![self.root()];
        while let Some(id) = pending.pop() {
            let node = self.get(id)?;
            if pred(&node.element) {
                return Some(id);
            }
            pending.extend(node.children.iter().rev().copied());
        }
        None
    }

    /// Indented outline, one element per line; open containers are marked.
    pub fn outline(&self) -> String {
        let mut out = String::new();
        let mut pending = vec![(self.root(), 0usize)];
        while let Some((id, depth)) = pending.pop() {
            let Some(node) = self.get(id) else {
                continue;
            };
            let open = if node.is_open() && node.element.is_container() {
                " (open)"
            } else {
                ""
            };
            let _ = writeln!(out, "{:indent$}{}{open}", "", node.element.label(), indent = depth * 2);
            pending.extend(node.children.iter().rev().map(|c| (*c, depth + 1)));
        }
        out
    }

    // --- Mutation, driven by recovery ---

    pub(crate) fn add(&mut self, parent: NodeId, element: RecoveredElement, start: u32, end: Option<u32>) -> NodeId {
        let id = NodeId(u32::try_from(self.nodes.len()).unwrap_or(u32::MAX));
        self.nodes.push(RecoveredNode {
            element,
            parent: Some(parent),
            children: Vec::new(),
            start,
            end,
        });
        if let Some(node) = self.nodes.get_mut(parent.index()) {
            node.children.push(id);
        }
        id
    }

    pub(crate) fn get_mut(&mut self, id: NodeId) -> Option<&mut RecoveredNode> {
        self.nodes.get_mut(id.index())
    }

    pub(crate) fn set_current(&mut self, id: NodeId) {
        self.current = id;
    }

    /// Close `id` at `end` unless it is already closed.
    pub(crate) fn close(&mut self, id: NodeId, end: u32) {
        if let Some(node) = self.get_mut(id) {
            if node.end.is_none() {
                node.end = Some(end);
            }
        }
    }
}

#[cfg(test)]
mod tests;
