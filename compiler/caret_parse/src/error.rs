//! Grammar stalls.
//!
//! The engine performs no recovery of its own: the first token it cannot
//! shift becomes a [`ParseError`] carried out by [`Interrupt::Stall`].
//!
//! [`Interrupt::Stall`]: crate::Interrupt::Stall

use caret_ir::{Span, TokenKind};

use crate::TokenSet;

/// What the engine was parsing when it stalled.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum ErrorContext {
    CompilationUnit,
    PackageDeclaration,
    ImportDeclaration,
    ModuleDeclaration,
    TypeDeclaration,
    ClassBody,
    EnumBody,
    MethodHeader,
    Block,
    Statement,
    Expression,
    TypeReference,
    Annotation,
    VariableInitializer,
}

impl ErrorContext {
    pub const fn description(self) -> &'static str {
        match self {
            ErrorContext::CompilationUnit => "a compilation unit",
            ErrorContext::PackageDeclaration => "a package declaration",
            ErrorContext::ImportDeclaration => "an import declaration",
            ErrorContext::ModuleDeclaration => "a module declaration",
            ErrorContext::TypeDeclaration => "a type declaration",
            ErrorContext::ClassBody => "a class body",
            ErrorContext::EnumBody => "an enum body",
            ErrorContext::MethodHeader => "a method header",
            ErrorContext::Block => "a block",
            ErrorContext::Statement => "a statement",
            ErrorContext::Expression => "an expression",
            ErrorContext::TypeReference => "a type",
            ErrorContext::Annotation => "an annotation",
            ErrorContext::VariableInitializer => "a variable initializer",
        }
    }
}

#[derive(Clone, Eq, PartialEq, Debug, thiserror::Error)]
#[error("expected {}, found `{found}` at {span} in {}", .expected.format_expected(), .context.description())]
pub struct ParseError {
    pub expected: TokenSet,
    pub found: TokenKind,
    pub span: Span,
    pub context: ErrorContext,
}

impl ParseError {
    pub fn new(expected: TokenSet, found: TokenKind, span: Span, context: ErrorContext) -> Self {
        ParseError {
            expected,
            found,
            span,
            context,
        }
    }
}
