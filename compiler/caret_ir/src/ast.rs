//! Syntax nodes produced by the base grammar engine.
//!
//! Declarations carry an optional `declaration_end`: `None` marks a node
//! whose closing token was never reduced (the parser stalled inside it).
//! Recovery relies on that distinction to pick checkpoints.

use bitflags::bitflags;

use crate::{AssistId, Span};

/// An identifier occurrence.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct Ident {
    pub name: Box<str>,
    pub span: Span,
    /// Set when this occurrence is the assist identifier.
    pub assist: Option<AssistId>,
}

impl Ident {
    pub fn new(name: impl Into<Box<str>>, span: Span) -> Self {
        Ident {
            name: name.into(),
            span,
            assist: None,
        }
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.name
    }
}

/// Span covering a non-empty run of identifiers.
pub fn names_span(names: &[Ident]) -> Span {
    match (names.first(), names.last()) {
        (Some(first), Some(last)) => first.span.merge(last.span),
        _ => Span::DUMMY,
    }
}

/// Dotted rendering of a name (`java.util.List`).
pub fn dotted(names: &[Ident]) -> String {
    let mut out = String::new();
    for (i, name) in names.iter().enumerate() {
        if i > 0 {
            out.push('.');
        }
        out.push_str(&name.name);
    }
    out
}

bitflags! {
    /// Declaration modifiers.
    #[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
    pub struct Modifiers: u16 {
        const PUBLIC = 1 << 0;
        const PROTECTED = 1 << 1;
        const PRIVATE = 1 << 2;
        const STATIC = 1 << 3;
        const ABSTRACT = 1 << 4;
        const FINAL = 1 << 5;
        const NATIVE = 1 << 6;
        const SYNCHRONIZED = 1 << 7;
        const TRANSIENT = 1 << 8;
        const VOLATILE = 1 << 9;
        const STRICTFP = 1 << 10;
        const DEFAULT = 1 << 11;
    }
}

// === Types ===

#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum PrimitiveType {
    Boolean,
    Byte,
    Char,
    Short,
    Int,
    Long,
    Float,
    Double,
    Void,
}

impl PrimitiveType {
    pub const fn name(self) -> &'static str {
        match self {
            PrimitiveType::Boolean => "boolean",
            PrimitiveType::Byte => "byte",
            PrimitiveType::Char => "char",
            PrimitiveType::Short => "short",
            PrimitiveType::Int => "int",
            PrimitiveType::Long => "long",
            PrimitiveType::Float => "float",
            PrimitiveType::Double => "double",
            PrimitiveType::Void => "void",
        }
    }
}

/// One dotted segment of a class type, with its type arguments.
///
/// `args` is `Some(vec![])` for the diamond `<>`.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct TypeSegment {
    pub name: Ident,
    pub args: Option<Vec<TypeRef>>,
}

#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum WildcardBound {
    Extends,
    Super,
}

#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub enum TypeRefKind {
    Primitive(PrimitiveType),
    Class(Vec<TypeSegment>),
    Wildcard(Option<(WildcardBound, Box<TypeRef>)>),
}

#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct TypeRef {
    pub kind: TypeRefKind,
    pub dims: u32,
    pub span: Span,
}

impl TypeRef {
    /// Source-like rendering used by diagnostics and the CLI.
    pub fn render(&self) -> String {
        let mut out = match &self.kind {
            TypeRefKind::Primitive(p) => p.name().to_owned(),
            TypeRefKind::Class(segments) => {
                let mut s = String::new();
                for (i, seg) in segments.iter().enumerate() {
                    if i > 0 {
                        s.push('.');
                    }
                    s.push_str(&seg.name.name);
                    if let Some(args) = &seg.args {
                        s.push('<');
                        for (j, arg) in args.iter().enumerate() {
                            if j > 0 {
                                s.push_str(", ");
                            }
                            s.push_str(&arg.render());
                        }
                        s.push('>');
                    }
                }
                s
            }
            TypeRefKind::Wildcard(None) => "?".to_owned(),
            TypeRefKind::Wildcard(Some((WildcardBound::Extends, b))) => {
                format!("? extends {}", b.render())
            }
            TypeRefKind::Wildcard(Some((WildcardBound::Super, b))) => {
                format!("? super {}", b.render())
            }
        };
        for _ in 0..self.dims {
            out.push_str("[]");
        }
        out
    }
}

#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct TypeParam {
    pub name: Ident,
    pub bounds: Vec<TypeRef>,
}

// === Expressions ===

#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum LiteralKind {
    Int,
    Long,
    Float,
    Double,
    Char,
    String,
    TextBlock,
    True,
    False,
    Null,
}

#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum UnaryOp {
    Plus,
    Minus,
    Not,
    BitNot,
    PreIncrement,
    PreDecrement,
}

#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum PostfixOp {
    Increment,
    Decrement,
}

#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum BinaryOp {
    OrOr,
    AndAnd,
    BitOr,
    BitXor,
    BitAnd,
    Eq,
    NotEq,
    Lt,
    Gt,
    LtEq,
    GtEq,
    Shl,
    Shr,
    UShr,
    Add,
    Sub,
    Mul,
    Div,
    Rem,
}

#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum AssignOp {
    Assign,
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    BitAnd,
    BitOr,
    BitXor,
    Shl,
    Shr,
    UShr,
}

/// Which constructor an explicit constructor invocation targets.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum ConstructorTarget {
    This,
    Super,
}

#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub enum ExprKind {
    Literal(LiteralKind, Box<str>),
    /// Unresolved dotted name (`a.b.c`).
    Name(Vec<Ident>),
    This,
    /// `Outer.this`.
    QualifiedThis(Vec<Ident>),
    FieldAccess {
        receiver: Box<Expr>,
        name: Ident,
    },
    /// `super.name`.
    SuperField(Ident),
    Call {
        receiver: Option<Box<Expr>>,
        type_args: Vec<TypeRef>,
        selector: Ident,
        args: Vec<Expr>,
    },
    /// `super.m(...)`.
    SuperCall {
        selector: Ident,
        args: Vec<Expr>,
    },
    New {
        outer: Option<Box<Expr>>,
        ty: TypeRef,
        args: Vec<Expr>,
        body: Option<Vec<Member>>,
    },
    NewArray {
        elem: TypeRef,
        dims: Vec<Expr>,
        extra_dims: u32,
        init: Option<Vec<Expr>>,
    },
    ArrayInit(Vec<Expr>),
    Index {
        target: Box<Expr>,
        index: Box<Expr>,
    },
    Unary {
        op: UnaryOp,
        operand: Box<Expr>,
    },
    Postfix {
        op: PostfixOp,
        operand: Box<Expr>,
    },
    Binary {
        op: BinaryOp,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
    Assign {
        op: AssignOp,
        target: Box<Expr>,
        value: Box<Expr>,
    },
    Conditional {
        cond: Box<Expr>,
        then: Box<Expr>,
        otherwise: Box<Expr>,
    },
    Cast {
        ty: TypeRef,
        expr: Box<Expr>,
    },
    InstanceOf {
        expr: Box<Expr>,
        ty: TypeRef,
    },
    ClassLiteral(TypeRef),
    Paren(Box<Expr>),
}

#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct Expr {
    pub kind: ExprKind,
    pub span: Span,
}

impl Expr {
    pub fn new(kind: ExprKind, span: Span) -> Self {
        Expr { kind, span }
    }
}

// === Annotations ===

#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub enum MemberValue {
    Expr(Expr),
    Annotation(Box<Annotation>),
    Array(Vec<MemberValue>),
}

#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct Annotation {
    pub name: Vec<Ident>,
    /// `(name, value)` pairs; a single unnamed value has `name == None`.
    pub args: Vec<(Option<Ident>, MemberValue)>,
    pub span: Span,
}

// === Statements ===

#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct LocalDecl {
    pub modifiers: Modifiers,
    pub ty: TypeRef,
    pub name: Ident,
    pub init: Option<Expr>,
    pub span: Span,
    pub declaration_end: Option<u32>,
}

#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct CatchClause {
    pub param: LocalDecl,
    pub body: Vec<Stmt>,
    pub span: Span,
}

#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct SwitchGroup {
    /// Empty labels with `is_default` set for `default:`.
    pub labels: Vec<Expr>,
    pub is_default: bool,
    pub body: Vec<Stmt>,
}

#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub enum StmtKind {
    Local(LocalDecl),
    LocalType(Box<TypeDecl>),
    Block(Vec<Stmt>),
    Expr(Expr),
    If {
        cond: Expr,
        then: Box<Stmt>,
        otherwise: Option<Box<Stmt>>,
    },
    While {
        cond: Expr,
        body: Box<Stmt>,
    },
    DoWhile {
        body: Box<Stmt>,
        cond: Expr,
    },
    For {
        init: Vec<Stmt>,
        cond: Option<Expr>,
        update: Vec<Expr>,
        body: Box<Stmt>,
    },
    ForEach {
        var: LocalDecl,
        iterable: Expr,
        body: Box<Stmt>,
    },
    Switch {
        selector: Expr,
        groups: Vec<SwitchGroup>,
    },
    Return(Option<Expr>),
    Break(Option<Ident>),
    Continue(Option<Ident>),
    Throw(Expr),
    Try {
        resources: Vec<LocalDecl>,
        body: Vec<Stmt>,
        catches: Vec<CatchClause>,
        finally: Option<Vec<Stmt>>,
    },
    Synchronized {
        lock: Expr,
        body: Vec<Stmt>,
    },
    Assert {
        cond: Expr,
        message: Option<Expr>,
    },
    Labeled {
        label: Ident,
        body: Box<Stmt>,
    },
    ExplicitConstructorCall {
        target: ConstructorTarget,
        qualifier: Option<Expr>,
        args: Vec<Expr>,
    },
    Empty,
}

#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct Stmt {
    pub kind: StmtKind,
    pub span: Span,
}

impl Stmt {
    pub fn new(kind: StmtKind, span: Span) -> Self {
        Stmt { kind, span }
    }
}

// === Declarations ===

#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum TypeKind {
    Class,
    Interface,
    Enum,
    Annotation,
}

impl TypeKind {
    pub const fn keyword(self) -> &'static str {
        match self {
            TypeKind::Class => "class",
            TypeKind::Interface => "interface",
            TypeKind::Enum => "enum",
            TypeKind::Annotation => "@interface",
        }
    }
}

#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct TypeDecl {
    pub kind: TypeKind,
    pub modifiers: Modifiers,
    pub annotations: Vec<Annotation>,
    pub name: Ident,
    pub type_params: Vec<TypeParam>,
    pub extends: Vec<TypeRef>,
    pub implements: Vec<TypeRef>,
    pub enum_constants: Vec<EnumConstant>,
    pub members: Vec<Member>,
    pub span: Span,
    /// Offset just past the opening `{`, once seen.
    pub body_start: Option<u32>,
    pub declaration_end: Option<u32>,
}

#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct EnumConstant {
    pub name: Ident,
    pub args: Vec<Expr>,
    pub body: Option<Vec<Member>>,
    pub span: Span,
}

#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct FieldDecl {
    pub modifiers: Modifiers,
    pub annotations: Vec<Annotation>,
    pub ty: TypeRef,
    pub name: Ident,
    pub init: Option<Expr>,
    pub span: Span,
    pub declaration_end: Option<u32>,
}

#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct Param {
    pub modifiers: Modifiers,
    pub ty: TypeRef,
    pub name: Ident,
    pub varargs: bool,
    pub span: Span,
}

#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct MethodDecl {
    pub modifiers: Modifiers,
    pub annotations: Vec<Annotation>,
    pub type_params: Vec<TypeParam>,
    /// `None` for constructors.
    pub return_type: Option<TypeRef>,
    pub name: Ident,
    pub params: Vec<Param>,
    pub throws: Vec<TypeRef>,
    /// `None` for abstract and native methods, and for annotation elements.
    pub body: Option<Vec<Stmt>>,
    pub default_value: Option<MemberValue>,
    pub span: Span,
    /// Offset just past the opening `{` of the body, once seen.
    pub body_start: Option<u32>,
    pub declaration_end: Option<u32>,
}

impl MethodDecl {
    pub fn is_constructor(&self) -> bool {
        self.return_type.is_none()
    }
}

#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct Initializer {
    pub is_static: bool,
    pub body: Vec<Stmt>,
    pub span: Span,
    pub body_start: u32,
    pub declaration_end: Option<u32>,
}

#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub enum Member {
    Field(FieldDecl),
    Method(MethodDecl),
    Initializer(Initializer),
    Type(TypeDecl),
}

impl Member {
    pub fn span(&self) -> Span {
        match self {
            Member::Field(f) => f.span,
            Member::Method(m) => m.span,
            Member::Initializer(i) => i.span,
            Member::Type(t) => t.span,
        }
    }
}

#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct PackageDecl {
    pub name: Vec<Ident>,
    pub span: Span,
}

#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct ImportDecl {
    pub name: Vec<Ident>,
    pub is_static: bool,
    pub on_demand: bool,
    pub span: Span,
}

#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub enum ModuleDirective {
    Requires {
        transitive: bool,
        is_static: bool,
        module: Vec<Ident>,
    },
    Exports {
        package: Vec<Ident>,
        to: Vec<Vec<Ident>>,
    },
    Opens {
        package: Vec<Ident>,
        to: Vec<Vec<Ident>>,
    },
    Uses(TypeRef),
    Provides {
        service: TypeRef,
        with: Vec<TypeRef>,
    },
}

#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct ModuleDecl {
    pub open: bool,
    pub name: Vec<Ident>,
    pub directives: Vec<ModuleDirective>,
    pub span: Span,
    pub declaration_end: Option<u32>,
}

/// Entries of the engine's reduced-node stack.
///
/// Besides finished declarations and statements the stack holds open
/// containers (types, methods and initializers whose closing brace has not
/// been reduced yet) and the parameters reduced so far for an open method
/// header.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub enum AstNode {
    Package(PackageDecl),
    Import(ImportDecl),
    Module(ModuleDecl),
    Type(TypeDecl),
    Field(FieldDecl),
    Method(MethodDecl),
    Initializer(Initializer),
    EnumConstant(EnumConstant),
    Parameter(Param),
    Local(LocalDecl),
    Statement(Stmt),
    /// A `}` met by a relaxed goal with no open container on the stack.
    CloseBrace(Span),
}

impl AstNode {
    pub fn span(&self) -> Span {
        match self {
            AstNode::Package(p) => p.span,
            AstNode::Import(i) => i.span,
            AstNode::Module(m) => m.span,
            AstNode::Type(t) => t.span,
            AstNode::Field(f) => f.span,
            AstNode::Method(m) => m.span,
            AstNode::Initializer(i) => i.span,
            AstNode::EnumConstant(c) => c.span,
            AstNode::Parameter(p) => p.span,
            AstNode::Local(l) => l.span,
            AstNode::Statement(s) => s.span,
            AstNode::CloseBrace(span) => *span,
        }
    }

    /// `Some(end)` once the node's final token has been reduced.
    pub fn declaration_end(&self) -> Option<u32> {
        match self {
            AstNode::Type(t) => t.declaration_end,
            AstNode::Field(f) => f.declaration_end,
            AstNode::Method(m) => m.declaration_end,
            AstNode::Initializer(i) => i.declaration_end,
            AstNode::Local(l) => l.declaration_end,
            AstNode::Module(m) => m.declaration_end,
            AstNode::Package(_)
            | AstNode::Import(_)
            | AstNode::EnumConstant(_)
            | AstNode::Parameter(_)
            | AstNode::Statement(_)
            | AstNode::CloseBrace(_) => Some(self.span().end),
        }
    }

    pub fn into_member(self) -> Option<Member> {
        match self {
            AstNode::Type(t) => Some(Member::Type(t)),
            AstNode::Field(f) => Some(Member::Field(f)),
            AstNode::Method(m) => Some(Member::Method(m)),
            AstNode::Initializer(i) => Some(Member::Initializer(i)),
            _ => None,
        }
    }

    pub fn into_stmt(self) -> Option<Stmt> {
        match self {
            AstNode::Statement(s) => Some(s),
            AstNode::Local(l) => {
                let span = l.span;
                Some(Stmt::new(StmtKind::Local(l), span))
            }
            AstNode::Type(t) => {
                let span = t.span;
                Some(Stmt::new(StmtKind::LocalType(Box::new(t)), span))
            }
            _ => None,
        }
    }
}
