//! Cooked Java tokens over a resettable scanner.
//!
//! [`Lexer`] owns its [`SourceBuffer`] and a byte position; every call
//! scans one raw token from that position. Because the only state is the
//! position, the lexer can be rewound to any token boundary (recovery
//! resumes parsing from a checkpoint) and can jump over a brace-balanced
//! block without cooking its contents (diet mode).
//!
//! [`Lexer::next_lexeme`] reports trivia so cursor-aware wrappers can see
//! whitespace and comments; [`Lexer::next_token`] skips it.

mod keywords;

use caret_ir::{Span, Token, TokenKind};
use caret_lexer_core::{RawScanner, RawTag, RawToken, SourceBuffer};

/// One raw token with its cooked kind.
///
/// `kind` is `None` for trivia (whitespace and comments).
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub struct Lexeme {
    pub tag: RawTag,
    pub kind: Option<TokenKind>,
    pub span: Span,
}

impl Lexeme {
    #[inline]
    pub fn is_eof(&self) -> bool {
        self.tag == RawTag::Eof
    }
}

pub struct Lexer {
    buf: SourceBuffer,
    pos: u32,
    /// Scanning stops at this offset: no token starts at or after it.
    limit: u32,
    escapes: Vec<(u32, u32)>,
}

impl Lexer {
    pub fn new(source: &str) -> Self {
        let buf = SourceBuffer::new(source);
        let limit = buf.len();
        Self {
            buf,
            pos: 0,
            limit,
            escapes: Vec::new(),
        }
    }

    /// Replace the source, keeping allocations.
    pub fn reset_source(&mut self, source: &str) {
        self.buf.replace(source);
        self.pos = 0;
        self.limit = self.buf.len();
        self.escapes.clear();
    }

    /// Restrict scanning to `range`; the lexer is positioned at its start.
    pub fn restrict(&mut self, range: Span) {
        self.limit = range.end.min(self.buf.len());
        self.pos = range.start.min(self.limit);
    }

    #[inline]
    pub fn source_len(&self) -> u32 {
        self.buf.len()
    }

    /// Offset at which the lexer reports end of input.
    #[inline]
    pub fn limit(&self) -> u32 {
        self.limit
    }

    #[inline]
    pub fn pos(&self) -> u32 {
        self.pos
    }

    pub fn reset_to(&mut self, pos: u32) {
        self.pos = pos.min(self.limit);
    }

    /// Source text covered by `span`.
    pub fn text(&self, span: Span) -> &str {
        self.buf.cursor().slice(span.start, span.end)
    }

    /// Unicode escapes `(start, len)` inside the last identifier lexeme.
    pub fn unicode_escapes(&self) -> &[(u32, u32)] {
        &self.escapes
    }

    fn scan_raw(&mut self) -> (RawToken, u32) {
        let start = self.pos;
        if start >= self.limit {
            self.escapes.clear();
            return (
                RawToken {
                    tag: RawTag::Eof,
                    len: 0,
                },
                self.limit,
            );
        }
        let mut scanner = RawScanner::new(self.buf.cursor());
        scanner.set_pos(start);
        let raw = scanner.next_token();
        self.escapes.clear();
        self.escapes.extend_from_slice(scanner.unicode_escapes());
        self.pos = start + raw.len;
        (raw, start)
    }

    /// Next raw token, trivia included.
    pub fn next_lexeme(&mut self) -> Lexeme {
        let (raw, start) = self.scan_raw();
        let span = Span::new(start, start + raw.len);
        Lexeme {
            tag: raw.tag,
            kind: self.cook(raw.tag, span),
            span,
        }
    }

    /// Next non-trivia token.
    pub fn next_token(&mut self) -> Token {
        loop {
            let lexeme = self.next_lexeme();
            if let Some(kind) = lexeme.kind {
                return Token::new(kind, lexeme.span);
            }
        }
    }

    /// Skip a block body. The lexer must sit just past an opening `{`.
    ///
    /// Positions the lexer on the matching `}` (not consumed) and returns
    /// its offset, or returns `None` after running into end of input.
    pub fn jump_over_block(&mut self) -> Option<u32> {
        let mut depth = 1u32;
        loop {
            let (raw, start) = self.scan_raw();
            match raw.tag {
                RawTag::LBrace => depth += 1,
                RawTag::RBrace => {
                    depth -= 1;
                    if depth == 0 {
                        self.pos = start;
                        tracing::trace!(end = start, "jumped over block");
                        return Some(start);
                    }
                }
                RawTag::Eof => return None,
                _ => {}
            }
        }
    }

    fn cook(&self, tag: RawTag, span: Span) -> Option<TokenKind> {
        let kind = match tag {
            RawTag::Whitespace
            | RawTag::LineComment
            | RawTag::BlockComment
            | RawTag::UnterminatedBlockComment => return None,
            RawTag::Ident => keywords::lookup(self.text(span)).unwrap_or(TokenKind::Ident),
            RawTag::IntLit => TokenKind::IntLit,
            RawTag::LongLit => TokenKind::LongLit,
            RawTag::FloatLit => TokenKind::FloatLit,
            RawTag::DoubleLit => TokenKind::DoubleLit,
            RawTag::CharLit => TokenKind::CharLit,
            RawTag::StringLit => TokenKind::StringLit,
            RawTag::TextBlock => TokenKind::TextBlock,
            RawTag::UnterminatedChar
            | RawTag::UnterminatedString
            | RawTag::UnterminatedTextBlock
            | RawTag::InvalidByte => TokenKind::Error,
            RawTag::LParen => TokenKind::LParen,
            RawTag::RParen => TokenKind::RParen,
            RawTag::LBrace => TokenKind::LBrace,
            RawTag::RBrace => TokenKind::RBrace,
            RawTag::LBracket => TokenKind::LBracket,
            RawTag::RBracket => TokenKind::RBracket,
            RawTag::Semicolon => TokenKind::Semicolon,
            RawTag::Comma => TokenKind::Comma,
            RawTag::Dot => TokenKind::Dot,
            RawTag::Ellipsis => TokenKind::Ellipsis,
            RawTag::At => TokenKind::At,
            RawTag::ColonColon => TokenKind::ColonColon,
            RawTag::Eq => TokenKind::Eq,
            RawTag::Gt => TokenKind::Gt,
            RawTag::Lt => TokenKind::Lt,
            RawTag::Bang => TokenKind::Bang,
            RawTag::Tilde => TokenKind::Tilde,
            RawTag::Question => TokenKind::Question,
            RawTag::Colon => TokenKind::Colon,
            RawTag::Arrow => TokenKind::Arrow,
            RawTag::EqEq => TokenKind::EqEq,
            RawTag::LtEq => TokenKind::LtEq,
            RawTag::NotEq => TokenKind::NotEq,
            RawTag::AndAnd => TokenKind::AndAnd,
            RawTag::OrOr => TokenKind::OrOr,
            RawTag::PlusPlus => TokenKind::PlusPlus,
            RawTag::MinusMinus => TokenKind::MinusMinus,
            RawTag::Plus => TokenKind::Plus,
            RawTag::Minus => TokenKind::Minus,
            RawTag::Star => TokenKind::Star,
            RawTag::Slash => TokenKind::Slash,
            RawTag::Amp => TokenKind::Amp,
            RawTag::Pipe => TokenKind::Pipe,
            RawTag::Caret => TokenKind::Caret,
            RawTag::Percent => TokenKind::Percent,
            RawTag::Shl => TokenKind::Shl,
            RawTag::PlusEq => TokenKind::PlusEq,
            RawTag::MinusEq => TokenKind::MinusEq,
            RawTag::StarEq => TokenKind::StarEq,
            RawTag::SlashEq => TokenKind::SlashEq,
            RawTag::AmpEq => TokenKind::AmpEq,
            RawTag::PipeEq => TokenKind::PipeEq,
            RawTag::CaretEq => TokenKind::CaretEq,
            RawTag::PercentEq => TokenKind::PercentEq,
            RawTag::ShlEq => TokenKind::ShlEq,
            RawTag::Eof => TokenKind::Eof,
        };
        Some(kind)
    }
}

/// Lex a whole source into non-trivia tokens, ending with `Eof`.
pub fn lex(source: &str) -> Vec<Token> {
    let mut lexer = Lexer::new(source);
    let mut tokens = Vec::new();
    loop {
        let token = lexer.next_token();
        tokens.push(token);
        if token.kind == TokenKind::Eof {
            return tokens;
        }
    }
}

#[cfg(test)]
mod tests;
