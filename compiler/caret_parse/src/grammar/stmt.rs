//! Statements and blocks.
//!
//! Statements of an open block live on the `ast` stack until the block's
//! `}` is reduced, so a stall inside a block leaves every statement
//! before it observable.

use caret_ir::ast::{
    CatchClause, ConstructorTarget, Expr, LocalDecl, Stmt, StmtKind, SwitchGroup,
};
use caret_ir::{AstNode, Span, TokenKind};

use super::Parser;
use crate::token_set::{MODIFIERS, TYPE_DECL_START};
use crate::{
    ensure_sufficient_stack, BlockStart, ErrorContext, NameSite, PResult, ReduceHooks, Rule,
    TokenSet, TokenSource,
};

impl<S: TokenSource, H: ReduceHooks> Parser<'_, S, H> {
    pub(super) fn push_statement(&mut self, kind: StmtKind, span: Span) {
        self.stacks.ast.push(AstNode::Statement(Stmt::new(kind, span)));
    }

    /// Statements reduced at or above `from`, removed from the stack.
    pub(super) fn drain_statements(&mut self, from: usize) -> Vec<Stmt> {
        self.stacks
            .drain_ast_from(from)
            .into_iter()
            .filter_map(AstNode::into_stmt)
            .collect()
    }

    /// `{ ... }`, recording the block start while it is open.
    pub(super) fn parse_block(&mut self) -> PResult<Vec<Stmt>> {
        ensure_sufficient_stack(|| {
            self.in_context(ErrorContext::Block, |p| {
                let open = p.expect(TokenKind::LBrace)?;
                p.stacks.block_starts.push(BlockStart {
                    offset: open.span.start,
                    fake: false,
                });
                let index = p.stacks.ast.len();
                while !p.at(TokenKind::RBrace)? {
                    if p.at_eof()? {
                        return Err(p.unexpected(TokenSet::single(TokenKind::RBrace)));
                    }
                    p.parse_block_statement()?;
                }
                p.bump()?;
                p.stacks.block_starts.pop();
                Ok(p.drain_statements(index))
            })
        })
    }

    /// A statement, local declaration or local class, pushed on the stack.
    pub(super) fn parse_block_statement(&mut self) -> PResult<()> {
        ensure_sufficient_stack(|| {
            self.in_context(ErrorContext::Statement, |p| {
                let start = p.cur()?.span.start;
                if p.at_local_type_start()? {
                    let (modifiers, annotations) = p.parse_modifiers()?;
                    return p.parse_type_declaration(modifiers, annotations, start);
                }
                if p.at_local_declaration_start()? {
                    let base = p.stacks.ast.len();
                    p.parse_local_declaration()?;
                    p.expect(TokenKind::Semicolon)?;
                    p.seal_locals(base);
                    return Ok(());
                }
                let stmt = p.parse_statement()?;
                p.stacks.ast.push(AstNode::Statement(stmt));
                Ok(())
            })
        })
    }

    fn at_local_type_start(&mut self) -> PResult<bool> {
        let mut i = 0;
        loop {
            let kind = self.nth(i)?;
            if TYPE_DECL_START.contains(kind) {
                return Ok(true);
            }
            if !MODIFIERS.contains(kind) || kind == TokenKind::Default {
                return Ok(false);
            }
            i += 1;
        }
    }

    fn at_local_declaration_start(&mut self) -> PResult<bool> {
        match self.kind()? {
            TokenKind::Final | TokenKind::At => Ok(true),
            _ => match self.scan_type(0)? {
                Some(after) => Ok(self.nth(after)? == TokenKind::Ident),
                None => Ok(false),
            },
        }
    }

    /// `[final] Type name [= init] {, name [= init]}`, without the `;`.
    ///
    /// Every declarator is pushed as an open local.
    fn parse_local_declaration(&mut self) -> PResult<()> {
        let start = self.cur()?.span.start;
        let (modifiers, _) = self.parse_modifiers()?;
        let ty = self.parse_type()?;
        loop {
            let name = self.parse_ident()?;
            self.offer_single(&name, NameSite::LocalName { ty: &ty })?;
            let mut local_ty = ty.clone();
            local_ty.dims += self.parse_dims()?;
            let span = self.span_from(start);
            self.stacks.ast.push(AstNode::Local(LocalDecl {
                modifiers,
                ty: local_ty,
                name,
                init: None,
                span,
                declaration_end: None,
            }));
            if self.eat(TokenKind::Eq)? {
                let init = self.parse_variable_initializer()?;
                if let Some(AstNode::Local(local)) = self.stacks.ast.last_mut() {
                    local.init = Some(init);
                }
            }
            if !self.eat(TokenKind::Comma)? {
                return Ok(());
            }
        }
    }

    /// Mark the locals pushed at or above `base` as complete.
    fn seal_locals(&mut self, base: usize) {
        let end = self.prev_end();
        for node in &mut self.stacks.ast[base..] {
            if let AstNode::Local(local) = node {
                local.span = Span::new(local.span.start, end);
                local.declaration_end = Some(end);
            }
        }
    }

    fn take_locals(&mut self, base: usize) -> Vec<LocalDecl> {
        self.stacks
            .drain_ast_from(base)
            .into_iter()
            .filter_map(|node| match node {
                AstNode::Local(local) => Some(local),
                _ => None,
            })
            .collect()
    }

    pub(super) fn parse_statement(&mut self) -> PResult<Stmt> {
        ensure_sufficient_stack(|| {
            self.in_context(ErrorContext::Statement, |p| {
                let start = p.cur()?.span.start;
                let kind = p.parse_statement_kind()?;
                Ok(Stmt::new(kind, p.span_from(start)))
            })
        })
    }

    fn parse_statement_kind(&mut self) -> PResult<StmtKind> {
        let kind = match self.kind()? {
            TokenKind::LBrace => StmtKind::Block(self.parse_block()?),
            TokenKind::Semicolon => {
                self.bump()?;
                StmtKind::Empty
            }
            TokenKind::If => {
                self.bump()?;
                let cond = self.parse_paren_expr()?;
                let then = Box::new(self.parse_statement()?);
                let otherwise = if self.eat(TokenKind::Else)? {
                    Some(Box::new(self.parse_statement()?))
                } else {
                    None
                };
                StmtKind::If {
                    cond,
                    then,
                    otherwise,
                }
            }
            TokenKind::While => {
                self.bump()?;
                let cond = self.parse_paren_expr()?;
                let body = Box::new(self.parse_statement()?);
                StmtKind::While { cond, body }
            }
            TokenKind::Do => {
                self.bump()?;
                let body = Box::new(self.parse_statement()?);
                self.expect(TokenKind::While)?;
                let cond = self.parse_paren_expr()?;
                self.expect(TokenKind::Semicolon)?;
                StmtKind::DoWhile { body, cond }
            }
            TokenKind::For => self.parse_for()?,
            TokenKind::Switch => self.parse_switch()?,
            TokenKind::Return => {
                self.bump()?;
                let value = if self.at(TokenKind::Semicolon)? {
                    None
                } else {
                    Some(self.parse_expr()?)
                };
                self.expect(TokenKind::Semicolon)?;
                StmtKind::Return(value)
            }
            TokenKind::Break | TokenKind::Continue => {
                let is_break = self.bump()?.kind == TokenKind::Break;
                let label = if self.at(TokenKind::Ident)? {
                    Some(self.parse_ident()?)
                } else {
                    None
                };
                self.expect(TokenKind::Semicolon)?;
                if is_break {
                    StmtKind::Break(label)
                } else {
                    StmtKind::Continue(label)
                }
            }
            TokenKind::Throw => {
                self.bump()?;
                let value = self.parse_expr()?;
                self.expect(TokenKind::Semicolon)?;
                StmtKind::Throw(value)
            }
            TokenKind::Try => self.parse_try()?,
            TokenKind::Synchronized => {
                self.bump()?;
                let lock = self.parse_paren_expr()?;
                let body = self.parse_block()?;
                StmtKind::Synchronized { lock, body }
            }
            TokenKind::Assert => {
                self.bump()?;
                let cond = self.parse_expr()?;
                let message = if self.eat(TokenKind::Colon)? {
                    Some(self.parse_expr()?)
                } else {
                    None
                };
                self.expect(TokenKind::Semicolon)?;
                StmtKind::Assert { cond, message }
            }
            TokenKind::Ident if self.nth(1)? == TokenKind::Colon => {
                let label = self.parse_ident()?;
                self.bump()?;
                let body = Box::new(self.parse_statement()?);
                StmtKind::Labeled { label, body }
            }
            TokenKind::This | TokenKind::Super if self.nth(1)? == TokenKind::LParen => {
                let target = if self.bump()?.kind == TokenKind::This {
                    ConstructorTarget::This
                } else {
                    ConstructorTarget::Super
                };
                self.bump()?;
                let args = self.parse_arguments()?;
                self.expect(TokenKind::Semicolon)?;
                self.reduce(Rule::ExplicitConstructorInvocation);
                StmtKind::ExplicitConstructorCall {
                    target,
                    qualifier: None,
                    args,
                }
            }
            _ => {
                let expr = self.parse_expr()?;
                self.expect(TokenKind::Semicolon)?;
                StmtKind::Expr(expr)
            }
        };
        Ok(kind)
    }

    fn parse_paren_expr(&mut self) -> PResult<Expr> {
        self.expect(TokenKind::LParen)?;
        let expr = self.parse_expr()?;
        self.expect(TokenKind::RParen)?;
        Ok(expr)
    }

    fn parse_for(&mut self) -> PResult<StmtKind> {
        let keyword = self.expect(TokenKind::For)?;
        self.stacks.block_starts.push(BlockStart {
            offset: keyword.span.start,
            fake: true,
        });
        self.expect(TokenKind::LParen)?;
        let base = self.stacks.ast.len();
        if !self.at(TokenKind::Semicolon)? {
            if self.at_local_declaration_start()? {
                self.parse_local_declaration()?;
                if self.eat(TokenKind::Colon)? {
                    let iterable = self.parse_expr()?;
                    self.expect(TokenKind::RParen)?;
                    let body = Box::new(self.parse_statement()?);
                    let mut locals = self.take_locals(base);
                    self.stacks.block_starts.pop();
                    if locals.is_empty() {
                        return Err(self.unexpected(TokenSet::single(TokenKind::Ident)));
                    }
                    let var = locals.swap_remove(0);
                    return Ok(StmtKind::ForEach {
                        var,
                        iterable,
                        body,
                    });
                }
                self.seal_locals(base);
            } else {
                for expr in self.parse_expr_list()? {
                    let span = expr.span;
                    self.push_statement(StmtKind::Expr(expr), span);
                }
            }
        }
        self.expect(TokenKind::Semicolon)?;
        let cond = if self.at(TokenKind::Semicolon)? {
            None
        } else {
            Some(self.parse_expr()?)
        };
        self.expect(TokenKind::Semicolon)?;
        let update = if self.at(TokenKind::RParen)? {
            Vec::new()
        } else {
            self.parse_expr_list()?
        };
        self.expect(TokenKind::RParen)?;
        let body = Box::new(self.parse_statement()?);
        let init = self.drain_statements(base);
        self.stacks.block_starts.pop();
        Ok(StmtKind::For {
            init,
            cond,
            update,
            body,
        })
    }

    fn parse_expr_list(&mut self) -> PResult<Vec<Expr>> {
        let mut exprs = vec![self.parse_expr()?];
        while self.eat(TokenKind::Comma)? {
            exprs.push(self.parse_expr()?);
        }
        Ok(exprs)
    }

    fn parse_switch(&mut self) -> PResult<StmtKind> {
        self.expect(TokenKind::Switch)?;
        let selector = self.parse_paren_expr()?;
        let open = self.expect(TokenKind::LBrace)?;
        self.stacks.block_starts.push(BlockStart {
            offset: open.span.start,
            fake: false,
        });
        let mut groups = Vec::new();
        while !self.at(TokenKind::RBrace)? {
            if !matches!(self.kind()?, TokenKind::Case | TokenKind::Default) {
                return Err(self.unexpected(
                    TokenSet::single(TokenKind::Case)
                        .with(TokenKind::Default)
                        .with(TokenKind::RBrace),
                ));
            }
            let mut labels = Vec::new();
            let mut is_default = false;
            while matches!(self.kind()?, TokenKind::Case | TokenKind::Default) {
                let (more, default) = self.parse_switch_label()?;
                labels.extend(more);
                is_default |= default;
            }
            let base = self.stacks.ast.len();
            while !matches!(
                self.kind()?,
                TokenKind::Case | TokenKind::Default | TokenKind::RBrace
            ) {
                if self.at_eof()? {
                    return Err(self.unexpected(TokenSet::single(TokenKind::RBrace)));
                }
                self.parse_block_statement()?;
            }
            let body = self.drain_statements(base);
            groups.push(SwitchGroup {
                labels,
                is_default,
                body,
            });
        }
        self.bump()?;
        self.stacks.block_starts.pop();
        Ok(StmtKind::Switch { selector, groups })
    }

    /// `case a, b:` or `default:`.
    pub(super) fn parse_switch_label(&mut self) -> PResult<(Vec<Expr>, bool)> {
        if self.eat(TokenKind::Default)? {
            self.expect(TokenKind::Colon)?;
            return Ok((Vec::new(), true));
        }
        self.expect(TokenKind::Case)?;
        let labels = self.parse_expr_list()?;
        self.expect(TokenKind::Colon)?;
        Ok((labels, false))
    }

    fn parse_try(&mut self) -> PResult<StmtKind> {
        self.expect(TokenKind::Try)?;
        let mut resources = Vec::new();
        if self.eat(TokenKind::LParen)? {
            let base = self.stacks.ast.len();
            while !self.at(TokenKind::RParen)? {
                let before = self.stacks.ast.len();
                self.parse_local_declaration()?;
                self.seal_locals(before);
                if !self.eat(TokenKind::Semicolon)? {
                    break;
                }
            }
            self.expect(TokenKind::RParen)?;
            resources = self.take_locals(base);
        }
        let body = self.parse_block()?;
        let mut catches = Vec::new();
        while self.at(TokenKind::Catch)? {
            let start = self.cur()?.span.start;
            let param = self.parse_catch_parameter()?;
            let body = self.parse_block()?;
            catches.push(CatchClause {
                param,
                body,
                span: self.span_from(start),
            });
        }
        let finally = if self.eat(TokenKind::Finally)? {
            Some(self.parse_block()?)
        } else {
            None
        };
        if catches.is_empty() && finally.is_none() && resources.is_empty() {
            return Err(self.unexpected(
                TokenSet::single(TokenKind::Catch).with(TokenKind::Finally),
            ));
        }
        Ok(StmtKind::Try {
            resources,
            body,
            catches,
            finally,
        })
    }

    /// `catch (Type | Other name)`.
    fn parse_catch_parameter(&mut self) -> PResult<LocalDecl> {
        let start = self.expect(TokenKind::Catch)?.span.start;
        self.expect(TokenKind::LParen)?;
        let (modifiers, _) = self.parse_modifiers()?;
        let ty = self.parse_type()?;
        while self.eat(TokenKind::Pipe)? {
            self.parse_type()?;
        }
        let name = self.parse_ident()?;
        self.offer_single(&name, NameSite::LocalName { ty: &ty })?;
        self.expect(TokenKind::RParen)?;
        let span = self.span_from(start);
        Ok(LocalDecl {
            modifiers,
            ty,
            name,
            init: None,
            span,
            declaration_end: Some(span.end),
        })
    }

    /// A `catch` header met by the relaxed statement goal: the parameter
    /// is pushed as a local, followed by the handler block.
    pub(super) fn parse_catch_header(&mut self) -> PResult<()> {
        let param = self.parse_catch_parameter()?;
        self.stacks.ast.push(AstNode::Local(param));
        let start = self.cur()?.span.start;
        let body = self.parse_block()?;
        let span = self.span_from(start);
        self.push_statement(StmtKind::Block(body), span);
        Ok(())
    }
}
