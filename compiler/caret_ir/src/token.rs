//! Token types for the Java lexicon.
//!
//! Tokens are `Copy`: identifier and literal text is recovered from the
//! source through the span. The only payload a token carries is the
//! [`AssistId`] marking the single synthetic identifier issued at the caret.

use std::fmt;
use std::num::NonZeroU64;

use crate::Span;

/// Session-scoped identity of the assist identifier.
///
/// Two identifiers are the assist identifier only if their ids are equal;
/// spelling never participates in the comparison.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct AssistId(NonZeroU64);

impl AssistId {
    #[inline]
    pub const fn new(raw: NonZeroU64) -> Self {
        AssistId(raw)
    }

    #[inline]
    pub const fn get(self) -> u64 {
        self.0.get()
    }
}

/// A token with its span in the source.
#[derive(Copy, Clone, Eq, PartialEq, Hash)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
    /// Set only on the assist identifier.
    pub assist: Option<AssistId>,
}

impl Token {
    #[inline]
    pub const fn new(kind: TokenKind, span: Span) -> Self {
        Token {
            kind,
            span,
            assist: None,
        }
    }

    #[inline]
    pub const fn assist(span: Span, id: AssistId) -> Self {
        Token {
            kind: TokenKind::Ident,
            span,
            assist: Some(id),
        }
    }

    #[inline]
    pub const fn is_assist(&self) -> bool {
        self.assist.is_some()
    }
}

impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.assist {
            Some(id) => write!(f, "{:?}#{} @ {}", self.kind, id.get(), self.span),
            None => write!(f, "{:?} @ {}", self.kind, self.span),
        }
    }
}

/// Why the caret cannot host a completion.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum InvalidCursorReason {
    InsideNumber,
    InsideString,
    InsideComment,
    InsideUnicode,
}

impl InvalidCursorReason {
    /// Stable reason code.
    pub const fn code(self) -> &'static str {
        match self {
            InvalidCursorReason::InsideNumber => "NO_COMPLETION_INSIDE_NUMBER",
            InvalidCursorReason::InsideString => "NO_COMPLETION_INSIDE_STRING",
            InvalidCursorReason::InsideComment => "NO_COMPLETION_INSIDE_COMMENT",
            InvalidCursorReason::InsideUnicode => "NO_COMPLETION_INSIDE_UNICODE",
        }
    }
}

impl fmt::Display for InvalidCursorReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Token kinds.
///
/// `>` is always lexed alone; the parser joins adjacent `>` tokens into
/// shift and comparison operators so that nested type arguments close
/// without re-lexing.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, PartialOrd, Ord)]
#[repr(u8)]
pub enum TokenKind {
    Ident,
    IntLit,
    LongLit,
    FloatLit,
    DoubleLit,
    CharLit,
    StringLit,
    TextBlock,

    // Keywords
    Abstract,
    Assert,
    Boolean,
    Break,
    Byte,
    Case,
    Catch,
    Char,
    Class,
    Const,
    Continue,
    Default,
    Do,
    Double,
    Else,
    Enum,
    Extends,
    Final,
    Finally,
    Float,
    For,
    Goto,
    If,
    Implements,
    Import,
    Instanceof,
    Int,
    Interface,
    Long,
    Native,
    New,
    Package,
    Private,
    Protected,
    Public,
    Return,
    Short,
    Static,
    Strictfp,
    Super,
    Switch,
    Synchronized,
    This,
    Throw,
    Throws,
    Transient,
    Try,
    Void,
    Volatile,
    While,
    True,
    False,
    Null,

    // Separators
    LParen,
    RParen,
    LBrace,
    RBrace,
    LBracket,
    RBracket,
    Semicolon,
    Comma,
    Dot,
    Ellipsis,
    At,
    ColonColon,

    // Operators
    Eq,
    Gt,
    Lt,
    Bang,
    Tilde,
    Question,
    Colon,
    Arrow,
    EqEq,
    LtEq,
    NotEq,
    AndAnd,
    OrOr,
    PlusPlus,
    MinusMinus,
    Plus,
    Minus,
    Star,
    Slash,
    Amp,
    Pipe,
    Caret,
    Percent,
    Shl,
    PlusEq,
    MinusEq,
    StarEq,
    SlashEq,
    AmpEq,
    PipeEq,
    CaretEq,
    PercentEq,
    ShlEq,

    /// Lexically invalid input (stray byte, unterminated literal).
    Error,
    Eof,
}

/// Number of token kinds; must stay within the 128-bit `TokenSet`.
pub const TOKEN_KIND_COUNT: usize = TokenKind::Eof as usize + 1;

const _: () = assert!(TOKEN_KIND_COUNT <= 128);

impl TokenKind {
    /// Every kind, in discriminant order.
    pub const ALL: [TokenKind; TOKEN_KIND_COUNT] = {
        use TokenKind as K;
        [
            K::Ident, K::IntLit, K::LongLit, K::FloatLit, K::DoubleLit, K::CharLit, K::StringLit,
            K::TextBlock, K::Abstract, K::Assert, K::Boolean, K::Break, K::Byte, K::Case, K::Catch,
            K::Char, K::Class, K::Const, K::Continue, K::Default, K::Do, K::Double, K::Else,
            K::Enum, K::Extends, K::Final, K::Finally, K::Float, K::For, K::Goto, K::If,
            K::Implements, K::Import, K::Instanceof, K::Int, K::Interface, K::Long, K::Native,
            K::New, K::Package, K::Private, K::Protected, K::Public, K::Return, K::Short,
            K::Static, K::Strictfp, K::Super, K::Switch, K::Synchronized, K::This, K::Throw,
            K::Throws, K::Transient, K::Try, K::Void, K::Volatile, K::While, K::True, K::False,
            K::Null, K::LParen, K::RParen, K::LBrace, K::RBrace, K::LBracket, K::RBracket,
            K::Semicolon, K::Comma, K::Dot, K::Ellipsis, K::At, K::ColonColon, K::Eq, K::Gt,
            K::Lt, K::Bang, K::Tilde, K::Question, K::Colon, K::Arrow, K::EqEq, K::LtEq,
            K::NotEq, K::AndAnd, K::OrOr, K::PlusPlus, K::MinusMinus, K::Plus, K::Minus,
            K::Star, K::Slash, K::Amp, K::Pipe, K::Caret, K::Percent, K::Shl, K::PlusEq,
            K::MinusEq, K::StarEq, K::SlashEq, K::AmpEq, K::PipeEq, K::CaretEq, K::PercentEq,
            K::ShlEq, K::Error, K::Eof,
        ]
    };

    #[inline]
    pub const fn index(self) -> u8 {
        self as u8
    }

    #[inline]
    pub fn from_index(index: u8) -> Option<TokenKind> {
        Self::ALL.get(index as usize).copied()
    }

    /// Keywords and the literal words `true`, `false`, `null`.
    #[inline]
    pub const fn is_keyword(self) -> bool {
        (self as u8) >= (TokenKind::Abstract as u8) && (self as u8) <= (TokenKind::Null as u8)
    }

    /// Tokens spelled with identifier characters.
    #[inline]
    pub const fn is_word(self) -> bool {
        matches!(self, TokenKind::Ident) || self.is_keyword()
    }

    #[inline]
    pub const fn is_literal(self) -> bool {
        matches!(
            self,
            TokenKind::IntLit
                | TokenKind::LongLit
                | TokenKind::FloatLit
                | TokenKind::DoubleLit
                | TokenKind::CharLit
                | TokenKind::StringLit
                | TokenKind::TextBlock
                | TokenKind::True
                | TokenKind::False
                | TokenKind::Null
        )
    }

    /// Primitive type keywords (`void` excluded).
    #[inline]
    pub const fn is_primitive_type(self) -> bool {
        matches!(
            self,
            TokenKind::Boolean
                | TokenKind::Byte
                | TokenKind::Char
                | TokenKind::Short
                | TokenKind::Int
                | TokenKind::Long
                | TokenKind::Float
                | TokenKind::Double
        )
    }

    /// Modifier keywords that may open a declaration.
    #[inline]
    pub const fn is_modifier(self) -> bool {
        matches!(
            self,
            TokenKind::Public
                | TokenKind::Protected
                | TokenKind::Private
                | TokenKind::Static
                | TokenKind::Abstract
                | TokenKind::Final
                | TokenKind::Native
                | TokenKind::Synchronized
                | TokenKind::Transient
                | TokenKind::Volatile
                | TokenKind::Strictfp
                | TokenKind::Default
        )
    }

    /// Compound assignment operators other than `>>=` and `>>>=`, which
    /// the parser assembles from adjacent tokens.
    #[inline]
    pub const fn is_assignment_op(self) -> bool {
        matches!(
            self,
            TokenKind::Eq
                | TokenKind::PlusEq
                | TokenKind::MinusEq
                | TokenKind::StarEq
                | TokenKind::SlashEq
                | TokenKind::AmpEq
                | TokenKind::PipeEq
                | TokenKind::CaretEq
                | TokenKind::PercentEq
                | TokenKind::ShlEq
        )
    }

    /// Human-readable spelling for error messages.
    pub fn display_name(self) -> &'static str {
        match self {
            TokenKind::Ident => "identifier",
            TokenKind::IntLit => "integer literal",
            TokenKind::LongLit => "long literal",
            TokenKind::FloatLit => "float literal",
            TokenKind::DoubleLit => "double literal",
            TokenKind::CharLit => "character literal",
            TokenKind::StringLit => "string literal",
            TokenKind::TextBlock => "text block",
            TokenKind::Abstract => "abstract",
            TokenKind::Assert => "assert",
            TokenKind::Boolean => "boolean",
            TokenKind::Break => "break",
            TokenKind::Byte => "byte",
            TokenKind::Case => "case",
            TokenKind::Catch => "catch",
            TokenKind::Char => "char",
            TokenKind::Class => "class",
            TokenKind::Const => "const",
            TokenKind::Continue => "continue",
            TokenKind::Default => "default",
            TokenKind::Do => "do",
            TokenKind::Double => "double",
            TokenKind::Else => "else",
            TokenKind::Enum => "enum",
            TokenKind::Extends => "extends",
            TokenKind::Final => "final",
            TokenKind::Finally => "finally",
            TokenKind::Float => "float",
            TokenKind::For => "for",
            TokenKind::Goto => "goto",
            TokenKind::If => "if",
            TokenKind::Implements => "implements",
            TokenKind::Import => "import",
            TokenKind::Instanceof => "instanceof",
            TokenKind::Int => "int",
            TokenKind::Interface => "interface",
            TokenKind::Long => "long",
            TokenKind::Native => "native",
            TokenKind::New => "new",
            TokenKind::Package => "package",
            TokenKind::Private => "private",
            TokenKind::Protected => "protected",
            TokenKind::Public => "public",
            TokenKind::Return => "return",
            TokenKind::Short => "short",
            TokenKind::Static => "static",
            TokenKind::Strictfp => "strictfp",
            TokenKind::Super => "super",
            TokenKind::Switch => "switch",
            TokenKind::Synchronized => "synchronized",
            TokenKind::This => "this",
            TokenKind::Throw => "throw",
            TokenKind::Throws => "throws",
            TokenKind::Transient => "transient",
            TokenKind::Try => "try",
            TokenKind::Void => "void",
            TokenKind::Volatile => "volatile",
            TokenKind::While => "while",
            TokenKind::True => "true",
            TokenKind::False => "false",
            TokenKind::Null => "null",
            TokenKind::LParen => "(",
            TokenKind::RParen => ")",
            TokenKind::LBrace => "{",
            TokenKind::RBrace => "}",
            TokenKind::LBracket => "[",
            TokenKind::RBracket => "]",
            TokenKind::Semicolon => ";",
            TokenKind::Comma => ",",
            TokenKind::Dot => ".",
            TokenKind::Ellipsis => "...",
            TokenKind::At => "@",
            TokenKind::ColonColon => "::",
            TokenKind::Eq => "=",
            TokenKind::Gt => ">",
            TokenKind::Lt => "<",
            TokenKind::Bang => "!",
            TokenKind::Tilde => "~",
            TokenKind::Question => "?",
            TokenKind::Colon => ":",
            TokenKind::Arrow => "->",
            TokenKind::EqEq => "==",
            TokenKind::LtEq => "<=",
            TokenKind::NotEq => "!=",
            TokenKind::AndAnd => "&&",
            TokenKind::OrOr => "||",
            TokenKind::PlusPlus => "++",
            TokenKind::MinusMinus => "--",
            TokenKind::Plus => "+",
            TokenKind::Minus => "-",
            TokenKind::Star => "*",
            TokenKind::Slash => "/",
            TokenKind::Amp => "&",
            TokenKind::Pipe => "|",
            TokenKind::Caret => "^",
            TokenKind::Percent => "%",
            TokenKind::Shl => "<<",
            TokenKind::PlusEq => "+=",
            TokenKind::MinusEq => "-=",
            TokenKind::StarEq => "*=",
            TokenKind::SlashEq => "/=",
            TokenKind::AmpEq => "&=",
            TokenKind::PipeEq => "|=",
            TokenKind::CaretEq => "^=",
            TokenKind::PercentEq => "%=",
            TokenKind::ShlEq => "<<=",
            TokenKind::Error => "invalid token",
            TokenKind::Eof => "end of file",
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}
