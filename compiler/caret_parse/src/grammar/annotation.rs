//! Annotations and element values.

use caret_ir::ast::{Annotation, MemberValue};
use caret_ir::TokenKind;

use super::Parser;
use crate::{ErrorContext, NameSite, PResult, ReduceHooks, Rule, TokenSource};

impl<S: TokenSource, H: ReduceHooks> Parser<'_, S, H> {
    /// `@Name`, `@Name(value)` or `@Name(a = x, b = y)`.
    pub(super) fn parse_annotation(&mut self) -> PResult<Annotation> {
        self.in_context(ErrorContext::Annotation, |p| {
            let start = p.expect(TokenKind::At)?.span.start;
            p.parse_class_type_onto_stack()?;
            let end = p.prev_end();
            p.offer(NameSite::TypeReference { dims: 0, end })?;
            let name = p
                .stacks
                .pop_type_segments()
                .into_iter()
                .map(|segment| segment.name)
                .collect();
            let mut args = Vec::new();
            if p.eat(TokenKind::LParen)? {
                if p.at(TokenKind::Ident)? && p.nth(1)? == TokenKind::Eq {
                    loop {
                        let key = p.parse_ident()?;
                        p.expect(TokenKind::Eq)?;
                        p.stacks.push_ident(key.clone());
                        p.stacks.push_name_length(1);
                        p.reduce(Rule::EnterMemberValue);
                        let value = p.parse_member_value()?;
                        p.reduce(Rule::ExitMemberValue);
                        p.stacks.pop_name();
                        args.push((Some(key), value));
                        if !p.eat(TokenKind::Comma)? {
                            break;
                        }
                    }
                } else if !p.at(TokenKind::RParen)? {
                    args.push((None, p.parse_member_value()?));
                }
                p.expect(TokenKind::RParen)?;
                p.reduce(Rule::NormalAnnotation);
            }
            Ok(Annotation {
                name,
                args,
                span: p.span_from(start),
            })
        })
    }

    pub(super) fn parse_member_value(&mut self) -> PResult<MemberValue> {
        match self.kind()? {
            TokenKind::At => Ok(MemberValue::Annotation(Box::new(self.parse_annotation()?))),
            TokenKind::LBrace => {
                self.bump()?;
                let mut values = Vec::new();
                while !self.at(TokenKind::RBrace)? {
                    values.push(self.parse_member_value()?);
                    if !self.eat(TokenKind::Comma)? {
                        break;
                    }
                }
                self.expect(TokenKind::RBrace)?;
                Ok(MemberValue::Array(values))
            }
            _ => Ok(MemberValue::Expr(self.parse_expr()?)),
        }
    }
}
