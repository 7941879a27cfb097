//! Completion nodes.
//!
//! A [`CompletionNode`] replaces the syntax node that would have been
//! built around the assist identifier. Every node records the name
//! segments typed before the assist identifier, the partial name itself
//! and a span covering the source it would replace; kind-specific context
//! lives in [`CompletionPayload`].

use std::ops::ControlFlow;

use caret_ir::ast::{ConstructorTarget, Expr, TypeRef};
use caret_ir::{ast, Ident, Span};

/// Where a completion was requested.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum CompletionKind {
    /// An unqualified expression name.
    SingleName,
    /// A dotted expression name with the assist in a later segment.
    QualifiedName,
    SingleType,
    QualifiedType,
    /// A class type whose segments carry type arguments.
    ParameterizedType,
    /// The name of a method parameter being declared.
    ArgumentName,
    FieldName,
    MethodName,
    LocalName,
    PackageRef,
    ImportRef,
    ModuleRef,
    /// The selector of a call.
    MessageSend,
    /// `expr.name` or `super.name`.
    MemberAccess,
    /// An argument of `this(...)` or `super(...)`.
    ExplicitConstructorCall,
}

/// Which module name a [`CompletionKind::ModuleRef`] stands for.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum ModuleRole {
    Declaration,
    Requires,
    /// A `to` target of `exports` or `opens`.
    Target,
}

#[derive(Clone, Eq, PartialEq, Debug)]
pub enum CompletionPayload {
    None,
    Type {
        dims: u32,
        /// Type arguments of each previous segment.
        previous_arguments: Vec<Option<Vec<TypeRef>>>,
        /// Type arguments following the partial segment.
        arguments: Option<Vec<TypeRef>>,
    },
    /// Declared type of a parameter, field, local or method result.
    Declaration { ty: TypeRef, varargs: bool },
    Import { is_static: bool, on_demand: bool },
    Module(ModuleRole),
    /// `receiver` is `None` for an unqualified or name-qualified call.
    MessageSend {
        receiver: Option<Box<Expr>>,
        arg_count: usize,
    },
    /// `receiver` is `None` for `super.name`.
    MemberAccess { receiver: Option<Box<Expr>> },
    ExplicitConstructorCall {
        target: ConstructorTarget,
        argument: Box<CompletionNode>,
    },
}

#[derive(Clone, Eq, PartialEq, Debug)]
pub struct CompletionNode {
    pub kind: CompletionKind,
    pub span: Span,
    pub previous_segments: Vec<Ident>,
    pub partial: Ident,
    pub payload: CompletionPayload,
}

impl CompletionNode {
    /// Build a node from the matched segments, the last of which is the
    /// assist identifier.
    ///
    /// Returns `None` when `segments` is empty.
    pub fn new(kind: CompletionKind, segments: &[Ident], payload: CompletionPayload) -> Option<Self> {
        let (partial, previous) = segments.split_last()?;
        Some(CompletionNode {
            kind,
            span: ast::names_span(segments),
            previous_segments: previous.to_vec(),
            partial: partial.clone(),
            payload,
        })
    }

    /// Wrap `argument` as the argument of an explicit constructor call.
    #[must_use]
    pub fn explicit_constructor_call(argument: CompletionNode, target: ConstructorTarget) -> Self {
        CompletionNode {
            kind: CompletionKind::ExplicitConstructorCall,
            span: argument.span,
            previous_segments: argument.previous_segments.clone(),
            partial: argument.partial.clone(),
            payload: CompletionPayload::ExplicitConstructorCall {
                target,
                argument: Box::new(argument),
            },
        }
    }

    /// The text typed so far in the segment holding the caret.
    pub fn partial_name(&self) -> &str {
        self.partial.as_str()
    }

    /// Dotted rendering of the segments before the partial one.
    pub fn qualifier(&self) -> String {
        ast::dotted(&self.previous_segments)
    }

    /// The innermost node, looking through explicit constructor calls.
    pub fn innermost(&self) -> &CompletionNode {
        match &self.payload {
            CompletionPayload::ExplicitConstructorCall { argument, .. } => argument.innermost(),
            _ => self,
        }
    }

    /// Resolution of a completion node never proceeds to ordinary
    /// checking: it always stops with the node itself.
    pub fn resolve(&self) -> ControlFlow<&CompletionNode> {
        ControlFlow::Break(self)
    }
}

#[cfg(test)]
mod tests;
