//! Rebuilding a recovered tree from the node stacks, and choosing how to
//! resume after a stall.
//!
//! After every stall the reduced nodes left on the engine's stacks are
//! folded into the [`RecoveredTree`], interleaved with the blocks that
//! were open at the time. Each folded node moves the checkpoint: the
//! offset from which parsing resumes with a relaxed goal.

use caret_ir::ast::{FieldDecl, LocalDecl, Modifiers};
use caret_ir::{AstNode, Span};
use caret_parse::{BlockStart, Goal};
use smallvec::SmallVec;

use crate::element::{ElementInfo, ElementKind, ElementStack};
use crate::recovered::{NodeId, RecoveredElement, RecoveredTree};

pub(crate) struct Reconstruction {
    pub(crate) tree: RecoveredTree,
    /// Offset just past the last node known to be good.
    pub(crate) checkpoint: u32,
    last_block_start: Option<u32>,
    /// `}` offsets whose type delimiter was already popped by the token
    /// observer during this round.
    popped_types: SmallVec<[u32; 4]>,
}

impl Reconstruction {
    pub(crate) fn new(root: RecoveredElement, start: u32) -> Self {
        Reconstruction {
            tree: RecoveredTree::new(root, start),
            checkpoint: start,
            last_block_start: None,
            popped_types: SmallVec::new(),
        }
    }

    pub(crate) fn begin_round(&mut self) {
        self.popped_types.clear();
    }

    pub(crate) fn note_type_popped(&mut self, brace: u32) {
        self.popped_types.push(brace);
    }

    /// Fold `nodes` and the still-open `blocks` into the tree.
    ///
    /// Blocks starting before a node open around it. Blocks left over
    /// after the last node open only if they start before `assist_start`
    /// (or the checkpoint, without a completion node).
    pub(crate) fn absorb(
        &mut self,
        nodes: impl IntoIterator<Item = AstNode>,
        blocks: &[BlockStart],
        assist_start: Option<u32>,
        elements: &mut ElementStack,
    ) {
        let mut blocks = blocks.iter().copied().peekable();
        for node in nodes {
            let start = node.span().start;
            while let Some(block) = blocks.next_if(|b| b.offset < start) {
                self.open_block(block);
            }
            self.add_node(node, elements);
        }
        let limit = assist_start.unwrap_or(self.checkpoint);
        for block in blocks.filter(|b| b.offset < limit) {
            self.open_block(block);
        }
    }

    fn open_block(&mut self, block: BlockStart) {
        if !block.fake && self.last_block_start == Some(block.offset) {
            return;
        }
        self.last_block_start = Some(block.offset);
        let current = self.tree.current();
        let id = self.tree.add(
            current,
            RecoveredElement::Block { fake: block.fake },
            block.offset,
            None,
        );
        self.tree.set_current(id);
    }

    pub(crate) fn current_element(&self) -> Option<&RecoveredElement> {
        self.tree.get(self.tree.current()).map(|n| &n.element)
    }

    /// Climb from the current element to the nearest one accepting
    /// `accepts`, closing what is passed at `at`. Stops at the root.
    fn climb(&mut self, at: u32, accepts: impl Fn(&RecoveredElement) -> bool) -> NodeId {
        let mut id = self.tree.current();
        loop {
            let Some(node) = self.tree.get(id) else {
                return id;
            };
            if accepts(&node.element) {
                return id;
            }
            let Some(parent) = node.parent else {
                return id;
            };
            self.tree.close(id, at);
            id = parent;
        }
    }

    fn attach(&mut self, parent: NodeId, element: RecoveredElement, span: Span, open: bool) {
        let end = (!open).then_some(span.end);
        let id = self.tree.add(parent, element, span.start, end);
        self.tree.set_current(if open { id } else { parent });
    }

    fn add_node(&mut self, node: AstNode, elements: &mut ElementStack) {
        let span = node.span();
        let open = node.declaration_end().is_none();
        let checkpoint = checkpoint_after(&node);
        match node {
            AstNode::CloseBrace(brace) => self.close_brace(brace, elements),
            AstNode::Parameter(param) => {
                let current = self.tree.current();
                if let Some(node) = self.tree.get_mut(current) {
                    if let RecoveredElement::Method(method) = &mut node.element {
                        method.params.push(param);
                    }
                }
            }
            AstNode::Package(_) | AstNode::Import(_) | AstNode::Module(_) => {
                let parent = self.climb(span.start, |_| false);
                let element = match node {
                    AstNode::Package(p) => RecoveredElement::Package(p),
                    AstNode::Import(i) => RecoveredElement::Import(i),
                    AstNode::Module(m) => RecoveredElement::Module(m),
                    _ => return,
                };
                let open = matches!(element, RecoveredElement::Module(_)) && open;
                self.attach(parent, element, span, open);
            }
            AstNode::Type(decl) => {
                let current = self.tree.current();
                self.attach(current, RecoveredElement::Type(decl), span, open);
            }
            AstNode::Field(field) => {
                if self
                    .current_element()
                    .is_some_and(RecoveredElement::holds_statements)
                    && could_be_local(&field)
                {
                    let local = as_local(field);
                    let current = self.tree.current();
                    self.attach(current, RecoveredElement::Local(local), span, false);
                } else {
                    let parent = self.climb(span.start, is_type_or_unit);
                    self.attach(parent, RecoveredElement::Field(field), span, open);
                }
            }
            AstNode::Method(method) => {
                let header_open = open && method.body_start.is_none();
                let parent = self.climb(span.start, is_type_or_unit);
                self.attach(parent, RecoveredElement::Method(method), span, open);
                if header_open {
                    elements.push(ElementKind::MethodDelimiter, ElementInfo::Empty, None);
                }
            }
            AstNode::Initializer(init) => {
                if open {
                    self.last_block_start = init.body_start.checked_sub(1);
                }
                let parent = self.climb(span.start, is_type_or_unit);
                self.attach(parent, RecoveredElement::Initializer(init), span, open);
            }
            AstNode::EnumConstant(constant) => {
                let parent = self.climb(span.start, is_type_or_unit);
                self.attach(parent, RecoveredElement::EnumConstant(constant), span, false);
            }
            AstNode::Local(local) => self.add_statement(RecoveredElement::Local(local), span),
            AstNode::Statement(stmt) => {
                self.add_statement(RecoveredElement::Statement(stmt), span);
            }
        }
        self.checkpoint = self.checkpoint.max(checkpoint);
    }

    fn add_statement(&mut self, element: RecoveredElement, span: Span) {
        if self
            .current_element()
            .is_some_and(RecoveredElement::holds_statements)
        {
            let current = self.tree.current();
            self.attach(current, element, span, false);
        } else {
            tracing::trace!(%span, "statement outside a body dropped");
        }
    }

    /// A `}` with nothing open on the stacks closes the current element.
    fn close_brace(&mut self, brace: Span, elements: &mut ElementStack) {
        let root = self.tree.root();
        let mut id = self.tree.current();
        // Fields and `for` scopes end without a brace of their own.
        loop {
            let Some(node) = self.tree.get(id) else {
                return;
            };
            let Some(parent) = node.parent else {
                self.tree.set_current(id);
                return;
            };
            match node.element {
                RecoveredElement::Field(_) => {
                    elements.pop_until(ElementKind::FieldInitDelimiter);
                    elements.pop(ElementKind::FieldInitDelimiter);
                }
                RecoveredElement::Block { fake: true } => {}
                _ => break,
            }
            self.tree.close(id, brace.start);
            id = parent;
        }
        let Some(node) = self.tree.get(id) else {
            return;
        };
        let parent = node.parent.unwrap_or(root);
        let closes_body = matches!(
            node.element,
            RecoveredElement::Method(_) | RecoveredElement::Initializer(_)
        );
        let closes_type = matches!(node.element, RecoveredElement::Type(_));
        self.tree.close(id, brace.end);
        self.tree.set_current(parent);
        self.checkpoint = self.checkpoint.max(brace.end);

        if elements.is_inside_attribute_value() {
            return;
        }
        if closes_body {
            elements.pop_until(ElementKind::MethodDelimiter);
            elements.pop(ElementKind::MethodDelimiter);
        } else if closes_type && !self.popped_types.contains(&brace.start) {
            elements.pop_until(ElementKind::TypeDelimiter);
            elements.pop(ElementKind::TypeDelimiter);
        }
    }
}

fn is_type_or_unit(element: &RecoveredElement) -> bool {
    matches!(element, RecoveredElement::Type(_) | RecoveredElement::Unit)
}

/// Inside a body, a field-shaped declaration is a local variable unless
/// it carries modifiers other than `final`.
fn could_be_local(field: &FieldDecl) -> bool {
    Modifiers::FINAL.contains(field.modifiers) && field.annotations.is_empty()
}

fn as_local(field: FieldDecl) -> LocalDecl {
    LocalDecl {
        modifiers: field.modifiers,
        ty: field.ty,
        name: field.name,
        init: field.init,
        span: field.span,
        declaration_end: field.declaration_end,
    }
}

/// Where parsing may resume once `node` is known to be good.
fn checkpoint_after(node: &AstNode) -> u32 {
    if let Some(end) = node.declaration_end() {
        return end;
    }
    match node {
        AstNode::Local(local) => local
            .init
            .as_ref()
            .map_or(local.name.span.end, |init| init.span.end),
        AstNode::Field(field) => field
            .init
            .as_ref()
            .map_or(field.name.span.end, |init| init.span.end),
        AstNode::Method(method) => method.body_start.unwrap_or(method.span.end),
        AstNode::Type(decl) => decl.body_start.unwrap_or(decl.span.end),
        AstNode::Initializer(init) => init.body_start,
        other => other.span().end,
    }
}

/// The grammar goal to resume with after a stall.
///
/// A whole compilation unit resumes with headers, unless the stall sits in
/// a method nested in a field initializer. Narrower contexts resume with
/// headers only when the current recovered element is a type.
pub(crate) fn resume_goal(
    whole_unit: bool,
    elements: &ElementStack,
    current: Option<&RecoveredElement>,
) -> Goal {
    if whole_unit {
        if elements.is_inside_method() && elements.is_indirectly_inside_field_initializer() {
            Goal::BlockStatementsOrCatchHeader
        } else {
            Goal::Headers
        }
    } else if matches!(current, Some(RecoveredElement::Type(_))) {
        Goal::Headers
    } else {
        Goal::BlockStatementsOrCatchHeader
    }
}

/// Trim the element stack to the nearest type delimiter, or empty it.
pub(crate) fn prepare_for_headers(elements: &mut ElementStack) {
    elements.pop_until(ElementKind::TypeDelimiter);
    if elements.top().map(|e| e.kind) != Some(ElementKind::TypeDelimiter) {
        elements.flush();
    }
}

/// Trim the element stack to the innermost method or field-initializer
/// delimiter, or empty it when there is neither.
pub(crate) fn prepare_for_block_statements(elements: &mut ElementStack) {
    let method = elements.last_index_of(ElementKind::MethodDelimiter);
    let field = elements.last_index_of(ElementKind::FieldInitDelimiter);
    match (method, field) {
        (None, None) => elements.flush(),
        (Some(m), Some(f)) if f > m => elements.pop_until(ElementKind::FieldInitDelimiter),
        (Some(_), _) => elements.pop_until(ElementKind::MethodDelimiter),
        (None, Some(_)) => elements.pop_until(ElementKind::FieldInitDelimiter),
    }
}

#[cfg(test)]
mod tests;
