//! Completion logic attached to the grammar engine.
//!
//! [`AssistHooks`] keeps the element context stack in step with the
//! engine's reductions and, at every name site, checks whether the
//! pending name group holds the assist identifier. When it does, the
//! group is consumed, a [`CompletionNode`] is built in its place and the
//! parse stops with a checkpoint just past the node.

use caret_ir::ast::{self, ConstructorTarget, Expr, ImportDecl, PackageDecl, TypeRef};
use caret_ir::{AssistId, AstNode, Ident, Token, TokenKind};
use caret_parse::{Flow, Goal, NameSite, NodeStacks, ReduceHooks, Rule};

use crate::element::{ElementInfo, ElementKind, ElementKinds, ElementStack};
use crate::node::{CompletionKind, CompletionNode, CompletionPayload, ModuleRole};
use crate::pending::{groups_fit, index_of_assist_identifier};
use crate::recovered::{RecoveredElement, RecoveredTree};
use crate::recovery::Reconstruction;
use crate::AssistError;

/// A completion node with the element context it was found in.
#[derive(Clone, Debug)]
pub(crate) struct Found {
    pub(crate) node: CompletionNode,
    pub(crate) elements: ElementStack,
}

pub(crate) struct AssistHooks {
    assist: AssistId,
    elements: ElementStack,
    found: Option<Found>,
    reconstruction: Reconstruction,
    /// Node-stack entries already folded into the tree this round.
    absorbed: usize,
    previous: Option<Token>,
    /// The first token after a goal starts is not observed.
    is_first: bool,
    fault: Option<AssistError>,
}

impl AssistHooks {
    /// Hooks for a parse whose assist identifier carries `assist`; the
    /// recovered tree starts from `root`.
    pub(crate) fn new(assist: AssistId, root: RecoveredElement, start: u32) -> Self {
        AssistHooks {
            assist,
            elements: ElementStack::new(),
            found: None,
            reconstruction: Reconstruction::new(root, start),
            absorbed: 0,
            previous: None,
            is_first: false,
            fault: None,
        }
    }

    pub(crate) fn elements(&self) -> &ElementStack {
        &self.elements
    }

    pub(crate) fn elements_mut(&mut self) -> &mut ElementStack {
        &mut self.elements
    }

    /// Offset just past the last node folded into the tree.
    pub(crate) fn checkpoint(&self) -> u32 {
        self.reconstruction.checkpoint
    }

    pub(crate) fn current_element(&self) -> Option<&RecoveredElement> {
        self.reconstruction.current_element()
    }

    pub(crate) fn into_tree(self) -> RecoveredTree {
        self.reconstruction.tree
    }

    pub(crate) fn take_found(&mut self) -> Option<Found> {
        self.found.take()
    }

    pub(crate) fn take_fault(&mut self) -> Option<AssistError> {
        self.fault.take()
    }

    /// Start a new parse round over freshly reset stacks.
    pub(crate) fn begin_round(&mut self) {
        self.absorbed = 0;
        self.previous = None;
        self.reconstruction.begin_round();
    }

    /// Fold everything left on `stacks` into the recovered tree and
    /// empty the stacks. Blocks opening after `assist_start` are left out.
    pub(crate) fn absorb_stacks(&mut self, stacks: &mut NodeStacks, assist_start: Option<u32>) {
        let nodes = stacks.drain_ast_from(self.absorbed);
        self.reconstruction.absorb(
            nodes,
            &stacks.block_starts,
            assist_start,
            &mut self.elements,
        );
        stacks.reset();
        self.absorbed = 0;
    }

    fn record_fault(&mut self, detail: String) -> Flow {
        tracing::warn!(%detail, "inconsistent node stacks");
        self.fault = Some(AssistError::CorruptStack { detail });
        Flow::Found { checkpoint: 0 }
    }

    /// Store `node`, wrapped when it is an argument of `this(...)` or
    /// `super(...)`, and stop at `checkpoint`.
    fn complete(&mut self, node: CompletionNode, checkpoint: u32) -> Flow {
        let target = match self.elements.top() {
            Some(entry) if entry.kind == ElementKind::Selector => match entry.info {
                ElementInfo::ThisConstructor => Some(ConstructorTarget::This),
                ElementInfo::SuperConstructor => Some(ConstructorTarget::Super),
                _ => None,
            },
            _ => None,
        };
        let node = match target {
            Some(target) => CompletionNode::explicit_constructor_call(node, target),
            None => node,
        };
        tracing::debug!(
            kind = ?node.kind,
            partial = node.partial_name(),
            span = %node.span,
            "completion node"
        );
        self.found = Some(Found {
            node,
            elements: self.elements.clone(),
        });
        Flow::Found { checkpoint }
    }

    /// Consume a plain name group holding the assist at `index`.
    fn name_node(
        &mut self,
        stacks: &mut NodeStacks,
        index: usize,
        single: CompletionKind,
        qualified: CompletionKind,
        payload: CompletionPayload,
    ) -> Flow {
        let names = stacks.pop_name();
        let kind = if index == 0 { single } else { qualified };
        self.build(kind, names.get(..=index), payload)
    }

    fn build(
        &mut self,
        kind: CompletionKind,
        segments: Option<&[Ident]>,
        payload: CompletionPayload,
    ) -> Flow {
        match segments.and_then(|segments| CompletionNode::new(kind, segments, payload)) {
            Some(node) => {
                let checkpoint = node.span.end;
                self.complete(node, checkpoint)
            }
            None => self.record_fault(format!("no segment for a {kind:?} completion")),
        }
    }

    fn type_node(&mut self, stacks: &mut NodeStacks, index: usize, dims: u32) -> Flow {
        let mut segments = stacks.pop_type_segments();
        segments.truncate(index + 1);
        let Some(args) = segments.last_mut().map(|last| last.args.take()) else {
            return self.record_fault("empty class type".to_owned());
        };
        let previous_arguments: Vec<_> = segments
            .iter()
            .take(index)
            .map(|segment| segment.args.clone())
            .collect();
        let kind = if args.is_some() || previous_arguments.iter().any(Option::is_some) {
            CompletionKind::ParameterizedType
        } else if index == 0 {
            CompletionKind::SingleType
        } else {
            CompletionKind::QualifiedType
        };
        let names: Vec<Ident> = segments.into_iter().map(|segment| segment.name).collect();
        self.build(
            kind,
            Some(&names),
            CompletionPayload::Type {
                dims,
                previous_arguments,
                arguments: args,
            },
        )
    }

    fn declaration_node(
        &mut self,
        stacks: &mut NodeStacks,
        kind: CompletionKind,
        ty: &TypeRef,
        varargs: bool,
    ) -> Flow {
        let names = stacks.pop_name();
        self.build(
            kind,
            Some(&names),
            CompletionPayload::Declaration {
                ty: ty.clone(),
                varargs,
            },
        )
    }
}

fn boxed(receiver: Option<&Expr>) -> Option<Box<Expr>> {
    receiver.map(|expr| Box::new(expr.clone()))
}

impl ReduceHooks for AssistHooks {
    fn on_goal(&mut self, goal: Goal) {
        tracing::trace!(?goal, depth = self.elements.len(), "goal");
        self.is_first = true;
    }

    fn on_token(&mut self, stacks: &NodeStacks, token: Token) {
        if std::mem::take(&mut self.is_first) {
            return;
        }
        let elements = &mut self.elements;
        if elements.is_inside_method()
            || elements.is_inside_field_initializer()
            || elements.is_inside_attribute_value()
        {
            if token.kind == TokenKind::LParen {
                if let Some(previous) = self.previous {
                    let selector = stacks
                        .idents
                        .last()
                        .filter(|ident| ident.span == previous.span)
                        .cloned();
                    let slot = stacks.idents.len().checked_sub(1);
                    let info = match previous.kind {
                        TokenKind::Ident | TokenKind::Gt => {
                            Some(slot.map_or(ElementInfo::Empty, ElementInfo::IdentSlot))
                        }
                        TokenKind::This => Some(ElementInfo::ThisConstructor),
                        TokenKind::Super => Some(ElementInfo::SuperConstructor),
                        _ => None,
                    };
                    if let Some(info) = info {
                        elements.push(ElementKind::Selector, info, selector);
                    }
                }
            }
        } else if token.kind == TokenKind::RBrace
            && elements.top_kind(ElementKinds::ANY, 1) == Some(ElementKind::TypeDelimiter)
        {
            elements.pop(ElementKind::TypeDelimiter);
            self.reconstruction.note_type_popped(token.span.start);
        }
        self.previous = Some(token);
    }

    fn on_reduce(&mut self, stacks: &NodeStacks, rule: Rule) {
        let elements = &mut self.elements;
        match rule {
            Rule::TypeHeader(_) => elements.push(ElementKind::TypeDelimiter, ElementInfo::Empty, None),
            Rule::MethodHeader | Rule::ConstructorHeader | Rule::StaticOnly => {
                elements.push(ElementKind::MethodDelimiter, ElementInfo::Empty, None);
            }
            Rule::MethodBody
            | Rule::ConstructorBody
            | Rule::AbstractMethod
            | Rule::StaticInitializer
            | Rule::ClassBodyDeclaration => {
                elements.pop(ElementKind::MethodDelimiter);
            }
            Rule::NestedMethod => {
                if !elements.is_inside_method() {
                    elements.push(ElementKind::MethodDelimiter, ElementInfo::Empty, None);
                }
            }
            Rule::ForceNoDiet => {
                if !elements.is_inside_method() {
                    let push = match elements.top() {
                        Some(top) if top.kind == ElementKind::EnumConstantDelimiter => {
                            top.info != ElementInfo::EnumConstantBody { has_body: false }
                        }
                        _ => {
                            elements.top_kind(ElementKinds::ANY, 3)
                                != Some(ElementKind::EnumConstantDelimiter)
                        }
                    };
                    if push {
                        elements.push(ElementKind::FieldInitDelimiter, ElementInfo::Empty, None);
                    }
                }
            }
            Rule::RestoreDiet => {
                if !elements.is_inside_method() {
                    elements.pop(ElementKind::FieldInitDelimiter);
                }
            }
            Rule::EnumConstantHeaderName => elements.push(
                ElementKind::EnumConstantDelimiter,
                ElementInfo::EnumConstantBody { has_body: false },
                None,
            ),
            Rule::EnumConstantHeader { has_body: true } => {
                elements.pop(ElementKind::EnumConstantDelimiter);
                elements.push(
                    ElementKind::EnumConstantDelimiter,
                    ElementInfo::EnumConstantBody { has_body: true },
                    None,
                );
                elements.push(ElementKind::FieldInitDelimiter, ElementInfo::Empty, None);
                elements.push(ElementKind::TypeDelimiter, ElementInfo::Empty, None);
            }
            Rule::EnumConstantWithBody => {
                elements.pop(ElementKind::TypeDelimiter);
                elements.pop(ElementKind::FieldInitDelimiter);
                elements.pop(ElementKind::EnumConstantDelimiter);
            }
            Rule::EnumConstantNoBody => {
                elements.pop(ElementKind::EnumConstantDelimiter);
            }
            Rule::EnterMemberValue => {
                let slot = stacks.idents.len().checked_sub(1);
                elements.push(
                    ElementKind::AttributeValueDelimiter,
                    slot.map_or(ElementInfo::Empty, ElementInfo::IdentSlot),
                    stacks.idents.last().cloned(),
                );
            }
            Rule::ExitMemberValue => {
                elements.pop(ElementKind::AttributeValueDelimiter);
            }
            Rule::EnterAnonymousClassBody => {
                elements.pop(ElementKind::Selector);
                elements.push(ElementKind::TypeDelimiter, ElementInfo::Empty, None);
            }
            Rule::ClassBodyOpt
            | Rule::MethodInvocation
            | Rule::ExplicitConstructorInvocation
            | Rule::NormalAnnotation => {
                elements.pop(ElementKind::Selector);
            }
            Rule::UnmatchedCloseBrace => {
                let nodes = stacks.ast.get(self.absorbed..).unwrap_or_default().to_vec();
                self.absorbed = stacks.ast.len();
                self.reconstruction
                    .absorb(nodes, &[], None, &mut self.elements);
            }
            Rule::EnumConstantHeader { has_body: false }
            | Rule::TypeDeclaration
            | Rule::FormalParameter => {}
        }
    }

    fn on_name(&mut self, stacks: &mut NodeStacks, site: NameSite<'_>) -> Flow {
        if !groups_fit(stacks) {
            return self.record_fault(format!(
                "name group longer than the {} pending identifiers",
                stacks.idents.len()
            ));
        }
        let by_type = matches!(site, NameSite::TypeReference { .. });
        let Some(index) = index_of_assist_identifier(stacks, self.assist, by_type) else {
            return Flow::Continue;
        };
        match site {
            NameSite::NameReference => self.name_node(
                stacks,
                index,
                CompletionKind::SingleName,
                CompletionKind::QualifiedName,
                CompletionPayload::None,
            ),
            NameSite::TypeReference { dims, .. } => self.type_node(stacks, index, dims),
            NameSite::MessageSend {
                receiver,
                arg_count,
                end,
            } => {
                let names = stacks.pop_name();
                if index + 1 == names.len() {
                    let node = CompletionNode::new(
                        CompletionKind::MessageSend,
                        &names,
                        CompletionPayload::MessageSend {
                            receiver: boxed(receiver),
                            arg_count,
                        },
                    );
                    match node {
                        Some(node) => self.complete(node, end),
                        None => self.record_fault("empty call selector".to_owned()),
                    }
                } else {
                    let kind = if index == 0 {
                        CompletionKind::SingleName
                    } else {
                        CompletionKind::QualifiedName
                    };
                    self.build(kind, names.get(..=index), CompletionPayload::None)
                }
            }
            NameSite::FieldAccess { receiver } => {
                let names = stacks.pop_name();
                self.build(
                    CompletionKind::MemberAccess,
                    names.get(..=index),
                    CompletionPayload::MemberAccess {
                        receiver: boxed(receiver),
                    },
                )
            }
            NameSite::Package { end } => {
                let name = stacks.last_name().to_vec();
                stacks.ast.push(AstNode::Package(PackageDecl {
                    span: ast::names_span(&name).extend_to(end),
                    name,
                }));
                self.name_node(
                    stacks,
                    index,
                    CompletionKind::PackageRef,
                    CompletionKind::PackageRef,
                    CompletionPayload::None,
                )
            }
            NameSite::Import {
                is_static,
                on_demand,
                end,
            } => {
                let name = stacks.last_name().to_vec();
                stacks.ast.push(AstNode::Import(ImportDecl {
                    span: ast::names_span(&name).extend_to(end),
                    name,
                    is_static,
                    on_demand,
                }));
                self.name_node(
                    stacks,
                    index,
                    CompletionKind::ImportRef,
                    CompletionKind::ImportRef,
                    CompletionPayload::Import {
                        is_static,
                        on_demand,
                    },
                )
            }
            NameSite::ModuleName | NameSite::RequiresModule | NameSite::TargetModule => {
                let role = match site {
                    NameSite::ModuleName => ModuleRole::Declaration,
                    NameSite::RequiresModule => ModuleRole::Requires,
                    _ => ModuleRole::Target,
                };
                self.name_node(
                    stacks,
                    index,
                    CompletionKind::ModuleRef,
                    CompletionKind::ModuleRef,
                    CompletionPayload::Module(role),
                )
            }
            NameSite::ExportsPackage => self.name_node(
                stacks,
                index,
                CompletionKind::PackageRef,
                CompletionKind::PackageRef,
                CompletionPayload::None,
            ),
            NameSite::ParameterName { ty, varargs } => {
                self.declaration_node(stacks, CompletionKind::ArgumentName, ty, varargs)
            }
            NameSite::FieldName { ty } => {
                self.declaration_node(stacks, CompletionKind::FieldName, ty, false)
            }
            NameSite::LocalName { ty } => {
                self.declaration_node(stacks, CompletionKind::LocalName, ty, false)
            }
            NameSite::MethodName { return_type } => {
                self.declaration_node(stacks, CompletionKind::MethodName, return_type, false)
            }
        }
    }
}

#[cfg(test)]
mod tests;
