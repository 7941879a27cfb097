//! Raw token tags.

/// Kind of a raw token. Errors are tags, not `Result::Err`.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum RawTag {
    /// Identifier or keyword; may contain `\uXXXX` escapes.
    Ident,
    IntLit,
    LongLit,
    FloatLit,
    DoubleLit,
    CharLit,
    StringLit,
    TextBlock,
    UnterminatedChar,
    UnterminatedString,
    UnterminatedTextBlock,

    Whitespace,
    LineComment,
    BlockComment,
    UnterminatedBlockComment,

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

    /// A byte that starts no token.
    InvalidByte,
    Eof,
}

impl RawTag {
    #[inline]
    pub const fn is_trivia(self) -> bool {
        matches!(
            self,
            RawTag::Whitespace
                | RawTag::LineComment
                | RawTag::BlockComment
                | RawTag::UnterminatedBlockComment
        )
    }

    #[inline]
    pub const fn is_comment(self) -> bool {
        matches!(
            self,
            RawTag::LineComment | RawTag::BlockComment | RawTag::UnterminatedBlockComment
        )
    }

    #[inline]
    pub const fn is_number(self) -> bool {
        matches!(
            self,
            RawTag::IntLit | RawTag::LongLit | RawTag::FloatLit | RawTag::DoubleLit
        )
    }

    /// Quoted literals, terminated or not.
    #[inline]
    pub const fn is_quoted(self) -> bool {
        matches!(
            self,
            RawTag::CharLit
                | RawTag::StringLit
                | RawTag::TextBlock
                | RawTag::UnterminatedChar
                | RawTag::UnterminatedString
                | RawTag::UnterminatedTextBlock
        )
    }

    /// Tokens whose text runs to a line end or EOF without a closing
    /// delimiter.
    #[inline]
    pub const fn is_open_ended(self) -> bool {
        matches!(
            self,
            RawTag::LineComment
                | RawTag::UnterminatedBlockComment
                | RawTag::UnterminatedChar
                | RawTag::UnterminatedString
                | RawTag::UnterminatedTextBlock
        )
    }
}

/// A raw token: tag plus byte length.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub struct RawToken {
    pub tag: RawTag,
    pub len: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trivia_and_comment_classes_agree() {
        for tag in [
            RawTag::LineComment,
            RawTag::BlockComment,
            RawTag::UnterminatedBlockComment,
        ] {
            assert!(tag.is_trivia());
            assert!(tag.is_comment());
        }
        assert!(RawTag::Whitespace.is_trivia());
        assert!(!RawTag::Whitespace.is_comment());
    }

    #[test]
    fn open_ended_literals_are_quoted() {
        for tag in [
            RawTag::UnterminatedChar,
            RawTag::UnterminatedString,
            RawTag::UnterminatedTextBlock,
        ] {
            assert!(tag.is_quoted());
            assert!(tag.is_open_ended());
        }
        assert!(!RawTag::StringLit.is_open_ended());
    }
}
