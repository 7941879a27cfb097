//! Cursor-marking tokenizer.
//!
//! [`CursorScanner`] wraps a [`Lexer`] and replaces the identifier or
//! keyword touching the caret with the assist identifier: an `Ident`
//! token truncated to the text before the caret and tagged with the
//! session's [`AssistId`]. When no word touches the caret, an empty
//! assist identifier is issued at the caret instead (in whitespace, in
//! front of the token starting at the caret, or at end of input).
//!
//! A caret strictly inside a number, string, comment or unicode escape
//! makes every scan fail with the matching [`InvalidCursorReason`]. Doc
//! comments are the exception: they stay trivia and the caret inside one
//! gets no assist identifier.
//!
//! Detection depends only on positions, so rescanning after
//! [`TokenSource::reset_to`] reissues the same assist identifier. Once an
//! assist identifier has been issued, only that exact span is issued again.

use caret_ir::{AssistId, InvalidCursorReason, Span, Token, TokenKind};
use caret_lexer::{Lexeme, Lexer};
use caret_lexer_core::RawTag;
use caret_parse::TokenSource;

pub struct CursorScanner<'l> {
    lexer: &'l mut Lexer,
    caret: u32,
    assist: AssistId,
    issued: Option<Span>,
    /// The lexeme at the caret follows the empty assist identifier issued
    /// in front of it.
    replay: bool,
    at_eof: bool,
}

impl<'l> CursorScanner<'l> {
    /// `caret` is the offset just past the last character before the
    /// cursor.
    pub fn new(lexer: &'l mut Lexer, caret: u32, assist: AssistId) -> Self {
        CursorScanner {
            lexer,
            caret,
            assist,
            issued: None,
            replay: false,
            at_eof: false,
        }
    }

    #[inline]
    pub fn caret(&self) -> u32 {
        self.caret
    }

    #[inline]
    pub fn assist(&self) -> AssistId {
        self.assist
    }

    /// Span of the assist identifier, once issued.
    #[inline]
    pub fn issued(&self) -> Option<Span> {
        self.issued
    }

    /// End of the first token at or after `offset`, ignoring the caret.
    ///
    /// Returns `None` when only end of input remains.
    pub fn token_end_after(&mut self, offset: u32) -> Option<u32> {
        self.reset_to(offset);
        let token = self.lexer.next_token();
        (token.kind != TokenKind::Eof).then_some(token.span.end)
    }

    fn issue(&mut self, span: Span) -> Option<Token> {
        match self.issued {
            None => {
                tracing::debug!(%span, assist = self.assist.get(), "assist identifier issued");
                self.issued = Some(span);
            }
            Some(issued) if issued != span => return None,
            Some(_) => {}
        }
        Some(Token::assist(span, self.assist))
    }

    /// `/** ... */`, but not the empty `/**/`.
    fn is_doc_comment(&self, span: Span) -> bool {
        let text = self.lexer.text(span);
        text.len() > "/**/".len() && text.starts_with("/**")
    }

    /// Turn one lexeme into at most one token.
    fn mark(&mut self, lexeme: Lexeme) -> Result<Option<Token>, InvalidCursorReason> {
        let Span { start, end } = lexeme.span;
        let caret = self.caret;
        let replaying = std::mem::take(&mut self.replay);
        let strictly_inside = lexeme.span.surrounds(caret);
        let inside_or_end = lexeme.span.reaches(caret);

        match lexeme.tag {
            RawTag::Whitespace => {
                if start <= caret && caret < end {
                    return Ok(self.issue(Span::new(caret, caret)));
                }
                return Ok(None);
            }
            RawTag::LineComment | RawTag::UnterminatedBlockComment if inside_or_end => {
                return Err(InvalidCursorReason::InsideComment);
            }
            RawTag::BlockComment if strictly_inside && !self.is_doc_comment(lexeme.span) => {
                return Err(InvalidCursorReason::InsideComment);
            }
            RawTag::IntLit | RawTag::LongLit | RawTag::FloatLit | RawTag::DoubleLit
                if inside_or_end =>
            {
                return Err(InvalidCursorReason::InsideNumber);
            }
            RawTag::CharLit | RawTag::StringLit | RawTag::TextBlock if strictly_inside => {
                return Err(InvalidCursorReason::InsideString);
            }
            RawTag::UnterminatedChar | RawTag::UnterminatedString | RawTag::UnterminatedTextBlock
                if inside_or_end =>
            {
                return Err(InvalidCursorReason::InsideString);
            }
            RawTag::Ident => {
                let in_escape = self
                    .lexer
                    .unicode_escapes()
                    .iter()
                    .any(|&(at, len)| at < caret && caret < at + len);
                if in_escape {
                    return Err(InvalidCursorReason::InsideUnicode);
                }
                if start <= caret && caret <= end {
                    if let Some(token) = self.issue(Span::new(start, caret)) {
                        return Ok(Some(token));
                    }
                }
            }
            _ => {
                if lexeme.kind.is_some() && start == caret && !replaying {
                    if let Some(token) = self.issue(Span::new(caret, caret)) {
                        self.replay = true;
                        self.lexer.reset_to(start);
                        return Ok(Some(token));
                    }
                }
            }
        }
        Ok(lexeme.kind.map(|kind| Token::new(kind, lexeme.span)))
    }
}

impl TokenSource for CursorScanner<'_> {
    fn next_token(&mut self) -> Result<Token, InvalidCursorReason> {
        let limit = self.lexer.limit();
        if self.at_eof {
            return Ok(Token::new(TokenKind::Eof, Span::new(limit, limit)));
        }
        loop {
            let lexeme = self.lexer.next_lexeme();
            if let Some(token) = self.mark(lexeme)? {
                self.at_eof = token.kind == TokenKind::Eof;
                return Ok(token);
            }
        }
    }

    fn reset_to(&mut self, offset: u32) {
        self.lexer.reset_to(offset);
        self.replay = false;
        self.at_eof = false;
    }

    /// Refuses to skip a block the caret lies in.
    fn jump_over_block(&mut self) -> Option<u32> {
        let from = self.lexer.pos();
        let close = self.lexer.jump_over_block()?;
        if from <= self.caret && self.caret <= close {
            tracing::trace!(from, close, "block holds the caret; not skipped");
            return None;
        }
        Some(close)
    }

    fn eof_offset(&self) -> u32 {
        self.lexer.limit()
    }

    fn text(&self, span: Span) -> &str {
        self.lexer.text(span)
    }
}

#[cfg(test)]
mod tests;
