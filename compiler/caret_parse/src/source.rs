//! The engine's view of its token supply.

use std::collections::VecDeque;

use caret_ir::{InvalidCursorReason, Span, Token, TokenKind};
use caret_lexer::Lexer;

/// A resettable supply of non-trivia tokens.
///
/// Implementations may refuse to continue with an
/// [`InvalidCursorReason`]; the engine surfaces that unchanged.
pub trait TokenSource {
    fn next_token(&mut self) -> Result<Token, InvalidCursorReason>;

    /// Continue scanning from `offset`, which must be a token boundary.
    fn reset_to(&mut self, offset: u32);

    /// With the source positioned just past `{`, skip to the matching
    /// `}` (left unconsumed) and return its offset.
    fn jump_over_block(&mut self) -> Option<u32>;

    /// Offset at which the source reports `Eof`.
    fn eof_offset(&self) -> u32;

    fn text(&self, span: Span) -> &str;
}

impl TokenSource for Lexer {
    fn next_token(&mut self) -> Result<Token, InvalidCursorReason> {
        Ok(Lexer::next_token(self))
    }

    fn reset_to(&mut self, offset: u32) {
        Lexer::reset_to(self, offset);
    }

    fn jump_over_block(&mut self) -> Option<u32> {
        Lexer::jump_over_block(self)
    }

    fn eof_offset(&self) -> u32 {
        self.limit()
    }

    fn text(&self, span: Span) -> &str {
        Lexer::text(self, span)
    }
}

/// Buffered reader over a [`TokenSource`] with unbounded lookahead.
pub(crate) struct TokenStream<'s, S: TokenSource> {
    source: &'s mut S,
    lookahead: VecDeque<Token>,
    previous: Option<Token>,
}

impl<'s, S: TokenSource> TokenStream<'s, S> {
    pub(crate) fn new(source: &'s mut S) -> Self {
        TokenStream {
            source,
            lookahead: VecDeque::new(),
            previous: None,
        }
    }

    /// The `n`th token ahead of the current one (`0` is current).
    pub(crate) fn peek(&mut self, n: usize) -> Result<Token, InvalidCursorReason> {
        while self.lookahead.len() <= n {
            let token = self.source.next_token()?;
            self.lookahead.push_back(token);
        }
        Ok(self.lookahead[n])
    }

    pub(crate) fn current(&mut self) -> Result<Token, InvalidCursorReason> {
        self.peek(0)
    }

    pub(crate) fn bump(&mut self) -> Result<Token, InvalidCursorReason> {
        let token = self.peek(0)?;
        self.lookahead.pop_front();
        self.previous = Some(token);
        Ok(token)
    }

    /// End offset of the last consumed token.
    pub(crate) fn previous_end(&self) -> u32 {
        self.previous.map_or(0, |t| t.span.end)
    }

    /// Skip a block whose `{` was the last consumed token.
    ///
    /// Returns the offset of the matching `}`, which becomes current.
    /// When the source refuses, it is left just past the `{`.
    pub(crate) fn skip_block(&mut self) -> Option<u32> {
        let after = self.previous_end();
        self.lookahead.clear();
        self.source.reset_to(after);
        let close = self.source.jump_over_block();
        if close.is_none() {
            self.source.reset_to(after);
        }
        close
    }

    pub(crate) fn at_eof(&mut self) -> Result<bool, InvalidCursorReason> {
        Ok(self.current()?.kind == TokenKind::Eof)
    }

    pub(crate) fn text(&self, span: Span) -> &str {
        self.source.text(span)
    }
}
