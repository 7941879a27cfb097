//! Expressions, by precedence climbing.
//!
//! `>` is always a single token; shift and relational operators that
//! start with it are assembled here from adjacent `>` and `=` tokens.

use caret_ir::ast::{
    AssignOp, BinaryOp, Expr, ExprKind, LiteralKind, PostfixOp, TypeRef, TypeRefKind,
    TypeSegment, UnaryOp,
};
use caret_ir::{ast, Span, TokenKind};

use super::types::primitive;
use super::Parser;
use crate::token_set::{CAST_FOLLOW, PRIMITIVE_TYPES};
use crate::{ensure_sufficient_stack, ErrorContext, NameSite, PResult, ReduceHooks, Rule, TokenSource};

/// Operators that begin with `>`.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
enum GtOp {
    Gt,
    GtEq,
    Shr,
    UShr,
    ShrAssign,
    UShrAssign,
}

#[derive(Copy, Clone, Eq, PartialEq, Debug)]
enum Infix {
    Binary(BinaryOp),
    InstanceOf,
}

fn literal(kind: TokenKind) -> Option<LiteralKind> {
    let lit = match kind {
        TokenKind::IntLit => LiteralKind::Int,
        TokenKind::LongLit => LiteralKind::Long,
        TokenKind::FloatLit => LiteralKind::Float,
        TokenKind::DoubleLit => LiteralKind::Double,
        TokenKind::CharLit => LiteralKind::Char,
        TokenKind::StringLit => LiteralKind::String,
        TokenKind::TextBlock => LiteralKind::TextBlock,
        TokenKind::True => LiteralKind::True,
        TokenKind::False => LiteralKind::False,
        TokenKind::Null => LiteralKind::Null,
        _ => return None,
    };
    Some(lit)
}

fn assign_op(kind: TokenKind) -> Option<AssignOp> {
    let op = match kind {
        TokenKind::Eq => AssignOp::Assign,
        TokenKind::PlusEq => AssignOp::Add,
        TokenKind::MinusEq => AssignOp::Sub,
        TokenKind::StarEq => AssignOp::Mul,
        TokenKind::SlashEq => AssignOp::Div,
        TokenKind::PercentEq => AssignOp::Rem,
        TokenKind::AmpEq => AssignOp::BitAnd,
        TokenKind::PipeEq => AssignOp::BitOr,
        TokenKind::CaretEq => AssignOp::BitXor,
        TokenKind::ShlEq => AssignOp::Shl,
        _ => return None,
    };
    Some(op)
}

fn unary_op(kind: TokenKind) -> Option<UnaryOp> {
    let op = match kind {
        TokenKind::Plus => UnaryOp::Plus,
        TokenKind::Minus => UnaryOp::Minus,
        TokenKind::Bang => UnaryOp::Not,
        TokenKind::Tilde => UnaryOp::BitNot,
        TokenKind::PlusPlus => UnaryOp::PreIncrement,
        TokenKind::MinusMinus => UnaryOp::PreDecrement,
        _ => return None,
    };
    Some(op)
}

fn precedence(op: Infix) -> u8 {
    match op {
        Infix::Binary(BinaryOp::OrOr) => 1,
        Infix::Binary(BinaryOp::AndAnd) => 2,
        Infix::Binary(BinaryOp::BitOr) => 3,
        Infix::Binary(BinaryOp::BitXor) => 4,
        Infix::Binary(BinaryOp::BitAnd) => 5,
        Infix::Binary(BinaryOp::Eq | BinaryOp::NotEq) => 6,
        Infix::InstanceOf
        | Infix::Binary(BinaryOp::Lt | BinaryOp::Gt | BinaryOp::LtEq | BinaryOp::GtEq) => 7,
        Infix::Binary(BinaryOp::Shl | BinaryOp::Shr | BinaryOp::UShr) => 8,
        Infix::Binary(BinaryOp::Add | BinaryOp::Sub) => 9,
        Infix::Binary(BinaryOp::Mul | BinaryOp::Div | BinaryOp::Rem) => 10,
    }
}

fn class_type(names: Vec<ast::Ident>, dims: u32, end: u32) -> TypeRef {
    let start = names.first().map_or(end, |n| n.span.start);
    TypeRef {
        kind: TypeRefKind::Class(
            names
                .into_iter()
                .map(|name| TypeSegment { name, args: None })
                .collect(),
        ),
        dims,
        span: Span::new(start, end),
    }
}

impl<S: TokenSource, H: ReduceHooks> Parser<'_, S, H> {
    pub(super) fn parse_expr(&mut self) -> PResult<Expr> {
        ensure_sufficient_stack(|| self.in_context(ErrorContext::Expression, Self::parse_assignment))
    }

    /// An expression or an array initializer.
    pub(super) fn parse_variable_initializer(&mut self) -> PResult<Expr> {
        if !self.at(TokenKind::LBrace)? {
            return self.parse_expr();
        }
        let start = self.cur()?.span.start;
        let elems = self.parse_array_initializer()?;
        Ok(Expr::new(ExprKind::ArrayInit(elems), self.span_from(start)))
    }

    fn parse_array_initializer(&mut self) -> PResult<Vec<Expr>> {
        self.expect(TokenKind::LBrace)?;
        let mut elems = Vec::new();
        while !self.at(TokenKind::RBrace)? {
            elems.push(self.parse_variable_initializer()?);
            if !self.eat(TokenKind::Comma)? {
                break;
            }
        }
        self.expect(TokenKind::RBrace)?;
        Ok(elems)
    }

    /// Arguments after a consumed `(`, through the closing `)`.
    pub(super) fn parse_arguments(&mut self) -> PResult<Vec<Expr>> {
        let mut args = Vec::new();
        if self.eat(TokenKind::RParen)? {
            return Ok(args);
        }
        loop {
            args.push(self.parse_expr()?);
            if !self.eat(TokenKind::Comma)? {
                break;
            }
        }
        self.expect(TokenKind::RParen)?;
        Ok(args)
    }

    fn joined(&mut self, n: usize) -> PResult<bool> {
        let before = self.nth_token(n - 1)?;
        let after = self.nth_token(n)?;
        Ok(before.span.end == after.span.start)
    }

    /// The operator spelled by the `>` run at the current token, with the
    /// number of tokens it spans.
    fn gt_operator(&mut self) -> PResult<Option<(GtOp, usize)>> {
        if !self.at(TokenKind::Gt)? {
            return Ok(None);
        }
        let op = if self.nth(1)? == TokenKind::Gt && self.joined(1)? {
            if self.nth(2)? == TokenKind::Gt && self.joined(2)? {
                if self.nth(3)? == TokenKind::Eq && self.joined(3)? {
                    (GtOp::UShrAssign, 4)
                } else {
                    (GtOp::UShr, 3)
                }
            } else if self.nth(2)? == TokenKind::Eq && self.joined(2)? {
                (GtOp::ShrAssign, 3)
            } else {
                (GtOp::Shr, 2)
            }
        } else if self.nth(1)? == TokenKind::Eq && self.joined(1)? {
            (GtOp::GtEq, 2)
        } else {
            (GtOp::Gt, 1)
        };
        Ok(Some(op))
    }

    fn assignment_operator(&mut self) -> PResult<Option<(AssignOp, usize)>> {
        if let Some(op) = assign_op(self.kind()?) {
            return Ok(Some((op, 1)));
        }
        Ok(match self.gt_operator()? {
            Some((GtOp::ShrAssign, n)) => Some((AssignOp::Shr, n)),
            Some((GtOp::UShrAssign, n)) => Some((AssignOp::UShr, n)),
            _ => None,
        })
    }

    fn infix_operator(&mut self) -> PResult<Option<(Infix, usize)>> {
        let op = match self.kind()? {
            TokenKind::OrOr => BinaryOp::OrOr,
            TokenKind::AndAnd => BinaryOp::AndAnd,
            TokenKind::Pipe => BinaryOp::BitOr,
            TokenKind::Caret => BinaryOp::BitXor,
            TokenKind::Amp => BinaryOp::BitAnd,
            TokenKind::EqEq => BinaryOp::Eq,
            TokenKind::NotEq => BinaryOp::NotEq,
            TokenKind::Lt => BinaryOp::Lt,
            TokenKind::LtEq => BinaryOp::LtEq,
            TokenKind::Shl => BinaryOp::Shl,
            TokenKind::Plus => BinaryOp::Add,
            TokenKind::Minus => BinaryOp::Sub,
            TokenKind::Star => BinaryOp::Mul,
            TokenKind::Slash => BinaryOp::Div,
            TokenKind::Percent => BinaryOp::Rem,
            TokenKind::Instanceof => return Ok(Some((Infix::InstanceOf, 1))),
            TokenKind::Gt => {
                return Ok(match self.gt_operator()? {
                    Some((GtOp::Gt, n)) => Some((Infix::Binary(BinaryOp::Gt), n)),
                    Some((GtOp::GtEq, n)) => Some((Infix::Binary(BinaryOp::GtEq), n)),
                    Some((GtOp::Shr, n)) => Some((Infix::Binary(BinaryOp::Shr), n)),
                    Some((GtOp::UShr, n)) => Some((Infix::Binary(BinaryOp::UShr), n)),
                    _ => None,
                });
            }
            _ => return Ok(None),
        };
        Ok(Some((Infix::Binary(op), 1)))
    }

    fn parse_assignment(&mut self) -> PResult<Expr> {
        let target = self.parse_conditional()?;
        let Some((op, width)) = self.assignment_operator()? else {
            return Ok(target);
        };
        for _ in 0..width {
            self.bump()?;
        }
        let value = self.parse_expr()?;
        let span = target.span.merge(value.span);
        Ok(Expr::new(
            ExprKind::Assign {
                op,
                target: Box::new(target),
                value: Box::new(value),
            },
            span,
        ))
    }

    fn parse_conditional(&mut self) -> PResult<Expr> {
        let cond = self.parse_binary(1)?;
        if !self.eat(TokenKind::Question)? {
            return Ok(cond);
        }
        let then = self.parse_expr()?;
        self.expect(TokenKind::Colon)?;
        let otherwise = ensure_sufficient_stack(|| self.parse_conditional())?;
        let span = cond.span.merge(otherwise.span);
        Ok(Expr::new(
            ExprKind::Conditional {
                cond: Box::new(cond),
                then: Box::new(then),
                otherwise: Box::new(otherwise),
            },
            span,
        ))
    }

    fn parse_binary(&mut self, min_prec: u8) -> PResult<Expr> {
        let mut lhs = self.parse_unary()?;
        while let Some((op, width)) = self.infix_operator()? {
            let prec = precedence(op);
            if prec < min_prec {
                break;
            }
            for _ in 0..width {
                self.bump()?;
            }
            lhs = match op {
                Infix::InstanceOf => {
                    let ty = self.parse_type()?;
                    let span = lhs.span.merge(ty.span);
                    Expr::new(
                        ExprKind::InstanceOf {
                            expr: Box::new(lhs),
                            ty,
                        },
                        span,
                    )
                }
                Infix::Binary(op) => {
                    let rhs = ensure_sufficient_stack(|| self.parse_binary(prec + 1))?;
                    let span = lhs.span.merge(rhs.span);
                    Expr::new(
                        ExprKind::Binary {
                            op,
                            lhs: Box::new(lhs),
                            rhs: Box::new(rhs),
                        },
                        span,
                    )
                }
            };
        }
        Ok(lhs)
    }

    fn parse_unary(&mut self) -> PResult<Expr> {
        let start = self.cur()?.span.start;
        if let Some(op) = unary_op(self.kind()?) {
            self.bump()?;
            let operand = ensure_sufficient_stack(|| self.parse_unary())?;
            return Ok(Expr::new(
                ExprKind::Unary {
                    op,
                    operand: Box::new(operand),
                },
                self.span_from(start),
            ));
        }
        if self.at(TokenKind::LParen)? && self.at_cast()? {
            self.bump()?;
            let ty = self.parse_type()?;
            self.expect(TokenKind::RParen)?;
            let expr = ensure_sufficient_stack(|| self.parse_unary())?;
            return Ok(Expr::new(
                ExprKind::Cast {
                    ty,
                    expr: Box::new(expr),
                },
                self.span_from(start),
            ));
        }
        let mut expr = self.parse_primary()?;
        expr = self.parse_selectors(expr)?;
        loop {
            let op = match self.kind()? {
                TokenKind::PlusPlus => PostfixOp::Increment,
                TokenKind::MinusMinus => PostfixOp::Decrement,
                _ => return Ok(expr),
            };
            self.bump()?;
            expr = Expr::new(
                ExprKind::Postfix {
                    op,
                    operand: Box::new(expr),
                },
                self.span_from(start),
            );
        }
    }

    /// `(` starts a cast: a type, `)`, then something that cannot
    /// continue a parenthesized expression.
    fn at_cast(&mut self) -> PResult<bool> {
        let primitive = self.nth(1)?.is_primitive_type();
        let Some(after) = self.scan_type(1)? else {
            return Ok(false);
        };
        if self.nth(after)? != TokenKind::RParen {
            return Ok(false);
        }
        Ok(primitive || CAST_FOLLOW.contains(self.nth(after + 1)?))
    }

    fn parse_primary(&mut self) -> PResult<Expr> {
        let token = self.cur()?;
        if let Some(lit) = literal(token.kind) {
            self.bump()?;
            let text = self.tokens.text(token.span).into();
            return Ok(Expr::new(ExprKind::Literal(lit, text), token.span));
        }
        match token.kind {
            TokenKind::This => {
                self.bump()?;
                Ok(Expr::new(ExprKind::This, token.span))
            }
            TokenKind::Super => self.parse_super_access(),
            TokenKind::New => self.parse_allocation(None),
            TokenKind::LParen => {
                self.bump()?;
                let inner = self.parse_expr()?;
                self.expect(TokenKind::RParen)?;
                Ok(Expr::new(
                    ExprKind::Paren(Box::new(inner)),
                    self.span_from(token.span.start),
                ))
            }
            kind if kind.is_primitive_type() || kind == TokenKind::Void => {
                let ty = self.parse_primitive_type()?;
                self.expect(TokenKind::Dot)?;
                self.expect(TokenKind::Class)?;
                Ok(Expr::new(
                    ExprKind::ClassLiteral(ty),
                    self.span_from(token.span.start),
                ))
            }
            TokenKind::Ident => self.parse_name_primary(),
            _ => Err(self.unexpected(
                PRIMITIVE_TYPES
                    .with(TokenKind::Ident)
                    .with(TokenKind::IntLit)
                    .with(TokenKind::StringLit)
                    .with(TokenKind::This)
                    .with(TokenKind::Super)
                    .with(TokenKind::New)
                    .with(TokenKind::LParen),
            )),
        }
    }

    /// `super.name` or `super.name(args)`.
    fn parse_super_access(&mut self) -> PResult<Expr> {
        let start = self.expect(TokenKind::Super)?.span.start;
        self.expect(TokenKind::Dot)?;
        let name = self.parse_ident()?;
        self.stacks.push_ident(name.clone());
        self.stacks.push_name_length(1);
        self.offer(NameSite::FieldAccess { receiver: None })?;
        if !self.at(TokenKind::LParen)? {
            self.stacks.pop_name();
            return Ok(Expr::new(ExprKind::SuperField(name), self.span_from(start)));
        }
        self.bump()?;
        let args = self.parse_arguments()?;
        self.stacks.pop_name();
        self.reduce(Rule::MethodInvocation);
        Ok(Expr::new(
            ExprKind::SuperCall {
                selector: name,
                args,
            },
            self.span_from(start),
        ))
    }

    /// A primary starting with a dotted name.
    fn parse_name_primary(&mut self) -> PResult<Expr> {
        let start = self.cur()?.span.start;
        self.push_qualified_name()?;
        match (self.kind()?, self.nth(1)?) {
            (TokenKind::LParen, _) => {
                self.bump()?;
                let args = self.parse_arguments()?;
                let end = self.prev_end();
                self.offer(NameSite::MessageSend {
                    receiver: None,
                    arg_count: args.len(),
                    end,
                })?;
                let mut names = self.stacks.pop_name();
                self.reduce(Rule::MethodInvocation);
                let Some(selector) = names.pop() else {
                    return Err(self.unexpected(crate::TokenSet::single(TokenKind::Ident)));
                };
                let receiver = (!names.is_empty()).then(|| {
                    let span = ast::names_span(&names);
                    Box::new(Expr::new(ExprKind::Name(names), span))
                });
                Ok(Expr::new(
                    ExprKind::Call {
                        receiver,
                        type_args: Vec::new(),
                        selector,
                        args,
                    },
                    Span::new(start, end),
                ))
            }
            (TokenKind::LBracket, TokenKind::RBracket) => {
                let names = self.stacks.pop_name();
                let dims = self.parse_dims()?;
                let ty = class_type(names, dims, self.prev_end());
                self.expect(TokenKind::Dot)?;
                self.expect(TokenKind::Class)?;
                Ok(Expr::new(ExprKind::ClassLiteral(ty), self.span_from(start)))
            }
            (TokenKind::Dot, TokenKind::Class) => {
                let names = self.stacks.pop_name();
                let ty = class_type(names, 0, self.prev_end());
                self.bump()?;
                self.bump()?;
                Ok(Expr::new(ExprKind::ClassLiteral(ty), self.span_from(start)))
            }
            (TokenKind::Dot, TokenKind::This) => {
                let names = self.stacks.pop_name();
                self.bump()?;
                self.bump()?;
                Ok(Expr::new(ExprKind::QualifiedThis(names), self.span_from(start)))
            }
            _ => {
                self.offer(NameSite::NameReference)?;
                let names = self.stacks.pop_name();
                let span = ast::names_span(&names);
                Ok(Expr::new(ExprKind::Name(names), span))
            }
        }
    }

    /// Field accesses, calls, array accesses and inner allocations
    /// following a primary.
    fn parse_selectors(&mut self, mut expr: Expr) -> PResult<Expr> {
        loop {
            match (self.kind()?, self.nth(1)?) {
                (TokenKind::Dot, TokenKind::Ident | TokenKind::Lt) => {
                    self.bump()?;
                    expr = self.parse_member_selector(expr)?;
                }
                (TokenKind::Dot, TokenKind::New) => {
                    self.bump()?;
                    expr = self.parse_allocation(Some(expr))?;
                }
                (TokenKind::Dot, _) => {
                    self.bump()?;
                    return Err(self.unexpected(crate::TokenSet::single(TokenKind::Ident)));
                }
                (TokenKind::LBracket, _) => {
                    self.bump()?;
                    let index = self.parse_expr()?;
                    self.expect(TokenKind::RBracket)?;
                    let span = expr.span.extend_to(self.prev_end());
                    expr = Expr::new(
                        ExprKind::Index {
                            target: Box::new(expr),
                            index: Box::new(index),
                        },
                        span,
                    );
                }
                _ => return Ok(expr),
            }
        }
    }

    /// `.name`, `.name(args)` or `.<T>name(args)` after `receiver`; the
    /// `.` is already consumed.
    fn parse_member_selector(&mut self, receiver: Expr) -> PResult<Expr> {
        let type_args = if self.at(TokenKind::Lt)? {
            self.parse_type_arguments()?
        } else {
            Vec::new()
        };
        let name = self.parse_ident()?;
        self.stacks.push_ident(name.clone());
        self.stacks.push_name_length(1);
        if !self.at(TokenKind::LParen)? && type_args.is_empty() {
            self.offer(NameSite::FieldAccess {
                receiver: Some(&receiver),
            })?;
            self.stacks.pop_name();
            let span = receiver.span.merge(name.span);
            return Ok(Expr::new(
                ExprKind::FieldAccess {
                    receiver: Box::new(receiver),
                    name,
                },
                span,
            ));
        }
        self.expect(TokenKind::LParen)?;
        let args = self.parse_arguments()?;
        let end = self.prev_end();
        self.offer(NameSite::MessageSend {
            receiver: Some(&receiver),
            arg_count: args.len(),
            end,
        })?;
        self.stacks.pop_name();
        self.reduce(Rule::MethodInvocation);
        let span = receiver.span.extend_to(end);
        Ok(Expr::new(
            ExprKind::Call {
                receiver: Some(Box::new(receiver)),
                type_args,
                selector: name,
                args,
            },
            span,
        ))
    }

    /// `new T(args) [body]` or an array creation. `outer` is the
    /// qualifying instance of `outer.new Inner()`.
    fn parse_allocation(&mut self, outer: Option<Expr>) -> PResult<Expr> {
        let keyword = self.expect(TokenKind::New)?;
        let start = outer.as_ref().map_or(keyword.span.start, |o| o.span.start);
        if self.at(TokenKind::Lt)? {
            self.parse_type_arguments()?;
        }
        if self.kind()?.is_primitive_type() {
            let token = self.bump()?;
            let prim = primitive(token.kind).unwrap_or(ast::PrimitiveType::Int);
            let ty = TypeRef {
                kind: TypeRefKind::Primitive(prim),
                dims: 0,
                span: token.span,
            };
            return self.parse_array_creation(ty, start);
        }
        self.parse_class_type_onto_stack()?;
        let end = self.prev_end();
        self.offer(NameSite::TypeReference { dims: 0, end })?;
        let ty = self.stacks.pop_type_reference(0, end);
        if self.at(TokenKind::LBracket)? {
            return self.parse_array_creation(ty, start);
        }
        self.expect(TokenKind::LParen)?;
        let args = self.parse_arguments()?;
        let body = if self.at(TokenKind::LBrace)? {
            self.reduce(Rule::EnterAnonymousClassBody);
            Some(self.parse_anonymous_body()?)
        } else {
            self.reduce(Rule::ClassBodyOpt);
            None
        };
        Ok(Expr::new(
            ExprKind::New {
                outer: outer.map(Box::new),
                ty,
                args,
                body,
            },
            self.span_from(start),
        ))
    }

    fn parse_array_creation(&mut self, elem: TypeRef, start: u32) -> PResult<Expr> {
        let mut dims = Vec::new();
        while self.at(TokenKind::LBracket)? && self.nth(1)? != TokenKind::RBracket {
            self.bump()?;
            dims.push(self.parse_expr()?);
            self.expect(TokenKind::RBracket)?;
        }
        let extra_dims = self.parse_dims()?;
        let init = if self.at(TokenKind::LBrace)? {
            Some(self.parse_array_initializer()?)
        } else {
            None
        };
        if dims.is_empty() && init.is_none() {
            return Err(self.unexpected(
                crate::TokenSet::single(TokenKind::LBracket).with(TokenKind::LBrace),
            ));
        }
        Ok(Expr::new(
            ExprKind::NewArray {
                elem,
                dims,
                extra_dims,
                init,
            },
            self.span_from(start),
        ))
    }
}
