//! Grammar productions.
//!
//! Each production is a method on [`Parser`] returning [`PResult`]. The
//! helpers here wrap the token stream so that every consumed token is
//! reported to the hooks and every stall carries the current
//! [`ErrorContext`].

mod annotation;
mod decl;
mod expr;
mod stmt;
mod types;
mod unit;

use caret_ir::{Ident, Span, Token, TokenKind};

use crate::source::TokenStream;
use crate::{
    ErrorContext, Flow, Goal, Interrupt, NameSite, NodeStacks, PResult, ParseError, ReduceHooks,
    Rule, TokenSet, TokenSource,
};

pub struct Parser<'a, S: TokenSource, H: ReduceHooks> {
    tokens: TokenStream<'a, S>,
    stacks: &'a mut NodeStacks,
    hooks: &'a mut H,
    /// Skip method and initializer bodies.
    diet: bool,
    /// Field initializers being parsed; bodies inside them are never skipped.
    no_diet: u32,
    context: ErrorContext,
}

impl<'a, S: TokenSource, H: ReduceHooks> Parser<'a, S, H> {
    pub fn new(source: &'a mut S, stacks: &'a mut NodeStacks, hooks: &'a mut H) -> Self {
        Parser {
            tokens: TokenStream::new(source),
            stacks,
            hooks,
            diet: false,
            no_diet: 0,
            context: ErrorContext::CompilationUnit,
        }
    }

    #[must_use]
    pub fn with_diet(mut self, diet: bool) -> Self {
        self.diet = diet;
        self
    }

    /// Parse `goal` to end of input.
    pub fn parse(&mut self, goal: Goal) -> PResult<()> {
        tracing::trace!(?goal, diet = self.diet, "enter goal");
        self.hooks.on_goal(goal);
        match goal {
            Goal::CompilationUnit => self.parse_compilation_unit(),
            Goal::ModuleDeclaration => self.parse_module_unit(),
            Goal::Headers => self.parse_headers(),
            Goal::BlockStatementsOrCatchHeader => self.parse_statements_or_catch_headers(),
            Goal::BlockStatements => self.parse_statements_to_eof(),
            Goal::ClassBodyDeclarations => self.parse_members_to_eof(),
            Goal::VariableInitializer => self.parse_initializer_to_eof(),
        }
    }

    // --- Token access ---

    fn cur(&mut self) -> PResult<Token> {
        Ok(self.tokens.current()?)
    }

    fn kind(&mut self) -> PResult<TokenKind> {
        Ok(self.tokens.current()?.kind)
    }

    fn nth(&mut self, n: usize) -> PResult<TokenKind> {
        Ok(self.tokens.peek(n)?.kind)
    }

    fn nth_token(&mut self, n: usize) -> PResult<Token> {
        Ok(self.tokens.peek(n)?)
    }

    fn at(&mut self, kind: TokenKind) -> PResult<bool> {
        Ok(self.kind()? == kind)
    }

    fn at_set(&mut self, set: TokenSet) -> PResult<bool> {
        Ok(set.contains(self.kind()?))
    }

    /// Whether the current token is the contextual word `word`.
    ///
    /// The assist identifier never counts as a contextual keyword.
    fn at_word(&mut self, word: &str) -> PResult<bool> {
        self.nth_is_word(0, word)
    }

    fn nth_is_word(&mut self, n: usize, word: &str) -> PResult<bool> {
        let token = self.nth_token(n)?;
        Ok(token.kind == TokenKind::Ident
            && !token.is_assist()
            && self.tokens.text(token.span) == word)
    }

    fn at_eof(&mut self) -> PResult<bool> {
        Ok(self.tokens.at_eof()?)
    }

    fn prev_end(&self) -> u32 {
        self.tokens.previous_end()
    }

    fn bump(&mut self) -> PResult<Token> {
        let token = self.tokens.bump()?;
        tracing::trace!(?token, "shift");
        self.hooks.on_token(self.stacks, token);
        Ok(token)
    }

    fn eat(&mut self, kind: TokenKind) -> PResult<bool> {
        if self.at(kind)? {
            self.bump()?;
            Ok(true)
        } else {
            Ok(false)
        }
    }

    fn expect(&mut self, kind: TokenKind) -> PResult<Token> {
        if self.at(kind)? {
            self.bump()
        } else {
            Err(self.unexpected(TokenSet::single(kind)))
        }
    }

    fn unexpected(&mut self, expected: TokenSet) -> Interrupt {
        match self.tokens.current() {
            Ok(token) => {
                tracing::trace!(found = ?token, expected = %expected.format_expected(), "stall");
                Interrupt::Stall(ParseError::new(
                    expected,
                    token.kind,
                    token.span,
                    self.context,
                ))
            }
            Err(reason) => Interrupt::InvalidCursor(reason),
        }
    }

    fn ident_from(&self, token: Token) -> Ident {
        Ident {
            name: self.tokens.text(token.span).into(),
            span: token.span,
            assist: token.assist,
        }
    }

    fn parse_ident(&mut self) -> PResult<Ident> {
        let token = self.expect(TokenKind::Ident)?;
        Ok(self.ident_from(token))
    }

    fn in_context<T>(
        &mut self,
        context: ErrorContext,
        f: impl FnOnce(&mut Self) -> PResult<T>,
    ) -> PResult<T> {
        let saved = std::mem::replace(&mut self.context, context);
        let result = f(self);
        self.context = saved;
        result
    }

    // --- Hook plumbing ---

    fn reduce(&mut self, rule: Rule) {
        tracing::trace!(?rule, "reduce");
        self.hooks.on_reduce(self.stacks, rule);
    }

    /// Offer the topmost name group to the hooks.
    fn offer(&mut self, site: NameSite<'_>) -> PResult<()> {
        match self.hooks.on_name(self.stacks, site) {
            Flow::Continue => Ok(()),
            Flow::Found { checkpoint } => {
                tracing::debug!(checkpoint, ?site, "pending name claimed");
                Err(Interrupt::Found { checkpoint })
            }
        }
    }

    /// Push `ident` as a one-element name group, offer it, and pop it.
    fn offer_single(&mut self, ident: &Ident, site: NameSite<'_>) -> PResult<()> {
        self.stacks.push_ident(ident.clone());
        self.stacks.push_name_length(1);
        self.offer(site)?;
        self.stacks.pop_name();
        Ok(())
    }

    /// Push a dotted name (`a.b.c`) as one group and return its length.
    ///
    /// Stops before `.` followed by anything but an identifier.
    fn push_qualified_name(&mut self) -> PResult<usize> {
        let first = self.parse_ident()?;
        self.stacks.push_ident(first);
        let mut len = 1;
        while self.at(TokenKind::Dot)? && self.nth(1)? == TokenKind::Ident {
            self.bump()?;
            let next = self.parse_ident()?;
            self.stacks.push_ident(next);
            len += 1;
        }
        self.stacks.push_name_length(len);
        Ok(len)
    }

    // --- Diet ---

    fn skipping_bodies(&self) -> bool {
        self.diet && self.no_diet == 0
    }

    fn span_from(&self, start: u32) -> Span {
        Span::new(start, self.prev_end().max(start))
    }
}

#[cfg(test)]
mod tests;
