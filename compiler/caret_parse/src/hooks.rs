//! The observation seam between the engine and completion logic.
//!
//! The engine reports three kinds of events to a [`ReduceHooks`]
//! implementation: every consumed token, every [`Rule`] it reduces, and
//! every pending name group it is about to consume ([`NameSite`]). Only
//! name sites can interrupt parsing.

use caret_ir::ast::{Expr, TypeKind, TypeRef};
use caret_ir::Token;

use crate::NodeStacks;

/// Entry points of the grammar.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum Goal {
    CompilationUnit,
    /// Declarations only, one header at a time, in any nesting.
    Headers,
    /// Statements of a block, plus `catch`/`finally` headers and stray `}`.
    BlockStatementsOrCatchHeader,
    BlockStatements,
    ClassBodyDeclarations,
    VariableInitializer,
    ModuleDeclaration,
}

/// Reductions a hook may observe.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum Rule {
    /// Header of a type declaration, up to and including `{`.
    TypeHeader(TypeKind),
    /// The `}` of a type body.
    TypeDeclaration,
    /// Method header, through the parameter list and `throws` clause.
    MethodHeader,
    ConstructorHeader,
    MethodBody,
    ConstructorBody,
    /// A method header terminated by `;`.
    AbstractMethod,
    /// `{` of an instance or static initializer.
    NestedMethod,
    /// `static` introducing a static initializer.
    StaticOnly,
    StaticInitializer,
    /// End of an instance initializer.
    ClassBodyDeclaration,
    /// `=` of a field declarator.
    ForceNoDiet,
    /// End of a field initializer.
    RestoreDiet,
    EnumConstantHeaderName,
    EnumConstantHeader { has_body: bool },
    EnumConstantWithBody,
    EnumConstantNoBody,
    EnterMemberValue,
    ExitMemberValue,
    EnterAnonymousClassBody,
    /// Allocation without a class body.
    ClassBodyOpt,
    MethodInvocation,
    ExplicitConstructorInvocation,
    NormalAnnotation,
    FormalParameter,
    /// A `}` in a relaxed goal with nothing open to close; its marker is
    /// already on the node stack.
    UnmatchedCloseBrace,
}

/// A pending name group about to be consumed.
///
/// The group is the topmost entry of `ident_lengths` (for class types, of
/// `generics_ident_lengths`). Offsets named `end` are exclusive.
#[derive(Copy, Clone, Debug)]
pub enum NameSite<'n> {
    /// An expression name (`a.b.c`).
    NameReference,
    /// A class type; `end` covers type arguments and dimensions.
    TypeReference { dims: u32, end: u32 },
    /// A call whose argument list has been reduced. The group holds the
    /// selector, preceded by its qualifier when `receiver` is `None`.
    MessageSend {
        receiver: Option<&'n Expr>,
        arg_count: usize,
        end: u32,
    },
    /// `primary.name`; `receiver` is `None` for `super.name`.
    FieldAccess { receiver: Option<&'n Expr> },
    Package { end: u32 },
    Import {
        is_static: bool,
        on_demand: bool,
        end: u32,
    },
    ModuleName,
    RequiresModule,
    ExportsPackage,
    TargetModule,
    ParameterName { ty: &'n TypeRef, varargs: bool },
    FieldName { ty: &'n TypeRef },
    LocalName { ty: &'n TypeRef },
    MethodName { return_type: &'n TypeRef },
}

/// What a hook wants the engine to do next.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum Flow {
    Continue,
    /// Stop: the hook consumed the group and built its own node.
    Found { checkpoint: u32 },
}

pub trait ReduceHooks {
    fn on_goal(&mut self, _goal: Goal) {}

    fn on_token(&mut self, _stacks: &NodeStacks, _token: Token) {}

    fn on_reduce(&mut self, _stacks: &NodeStacks, _rule: Rule) {}

    fn on_name(&mut self, _stacks: &mut NodeStacks, _site: NameSite<'_>) -> Flow {
        Flow::Continue
    }
}

/// Hooks that observe nothing.
#[derive(Copy, Clone, Default, Debug)]
pub struct NoHooks;

impl ReduceHooks for NoHooks {}
