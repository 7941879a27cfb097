//! Type references, type declarations and class bodies.

use caret_ir::ast::{
    Annotation, Member, Modifiers, PrimitiveType, TypeDecl, TypeKind, TypeParam, TypeRef,
    TypeRefKind, WildcardBound,
};
use caret_ir::{AstNode, Ident, Span, TokenKind};

use super::Parser;
use crate::token_set::{PRIMITIVE_TYPES, TYPE_DECL_START};
use crate::{
    ensure_sufficient_stack, ErrorContext, NameSite, PResult, ReduceHooks, Rule, TokenSet,
    TokenSource,
};

pub(super) fn primitive(kind: TokenKind) -> Option<PrimitiveType> {
    let ty = match kind {
        TokenKind::Boolean => PrimitiveType::Boolean,
        TokenKind::Byte => PrimitiveType::Byte,
        TokenKind::Char => PrimitiveType::Char,
        TokenKind::Short => PrimitiveType::Short,
        TokenKind::Int => PrimitiveType::Int,
        TokenKind::Long => PrimitiveType::Long,
        TokenKind::Float => PrimitiveType::Float,
        TokenKind::Double => PrimitiveType::Double,
        TokenKind::Void => PrimitiveType::Void,
        _ => return None,
    };
    Some(ty)
}

fn modifier(kind: TokenKind) -> Option<Modifiers> {
    let flag = match kind {
        TokenKind::Public => Modifiers::PUBLIC,
        TokenKind::Protected => Modifiers::PROTECTED,
        TokenKind::Private => Modifiers::PRIVATE,
        TokenKind::Static => Modifiers::STATIC,
        TokenKind::Abstract => Modifiers::ABSTRACT,
        TokenKind::Final => Modifiers::FINAL,
        TokenKind::Native => Modifiers::NATIVE,
        TokenKind::Synchronized => Modifiers::SYNCHRONIZED,
        TokenKind::Transient => Modifiers::TRANSIENT,
        TokenKind::Volatile => Modifiers::VOLATILE,
        TokenKind::Strictfp => Modifiers::STRICTFP,
        TokenKind::Default => Modifiers::DEFAULT,
        _ => return None,
    };
    Some(flag)
}

impl<S: TokenSource, H: ReduceHooks> Parser<'_, S, H> {
    // --- Modifiers ---

    /// Modifiers and annotations in any order.
    pub(super) fn parse_modifiers(&mut self) -> PResult<(Modifiers, Vec<Annotation>)> {
        let mut annotations = Vec::new();
        loop {
            let token = self.cur()?;
            if token.kind == TokenKind::At && self.nth(1)? != TokenKind::Interface {
                annotations.push(self.parse_annotation()?);
                continue;
            }
            if token.kind == TokenKind::Default && !self.at_default_modifier()? {
                break;
            }
            let Some(flag) = modifier(token.kind) else {
                break;
            };
            self.bump()?;
            self.stacks.modifiers |= flag;
            self.stacks.modifiers_start.get_or_insert(token.span.start);
        }
        let modifiers = self.stacks.modifiers;
        self.stacks.reset_modifiers();
        Ok((modifiers, annotations))
    }

    // --- Type references ---

    /// A type with its dimensions. Class types are offered to the hooks
    /// before they are consumed.
    pub(super) fn parse_type(&mut self) -> PResult<TypeRef> {
        ensure_sufficient_stack(|| {
            self.in_context(ErrorContext::TypeReference, |p| {
                while p.at(TokenKind::At)? {
                    p.parse_annotation()?;
                }
                let token = p.cur()?;
                if let Some(prim) = primitive(token.kind).filter(|_| token.kind != TokenKind::Void)
                {
                    p.bump()?;
                    let dims = p.parse_dims()?;
                    return Ok(TypeRef {
                        kind: TypeRefKind::Primitive(prim),
                        dims,
                        span: p.span_from(token.span.start),
                    });
                }
                if token.kind != TokenKind::Ident {
                    return Err(p.unexpected(PRIMITIVE_TYPES.with(TokenKind::Ident)));
                }
                p.parse_class_type_onto_stack()?;
                let dims = p.parse_dims()?;
                let end = p.prev_end();
                p.offer(NameSite::TypeReference { dims, end })?;
                Ok(p.stacks.pop_type_reference(dims, end))
            })
        })
    }

    /// `void` or a type, for method return types.
    pub(super) fn parse_result_type(&mut self) -> PResult<TypeRef> {
        if self.at(TokenKind::Void)? {
            let token = self.bump()?;
            return Ok(TypeRef {
                kind: TypeRefKind::Primitive(PrimitiveType::Void),
                dims: 0,
                span: token.span,
            });
        }
        self.parse_type()
    }

    pub(super) fn parse_primitive_type(&mut self) -> PResult<TypeRef> {
        let token = self.bump()?;
        let Some(prim) = primitive(token.kind) else {
            return Err(self.unexpected(PRIMITIVE_TYPES));
        };
        let dims = self.parse_dims()?;
        Ok(TypeRef {
            kind: TypeRefKind::Primitive(prim),
            dims,
            span: self.span_from(token.span.start),
        })
    }

    /// Push a dotted class type with its type arguments on the name
    /// stacks, grouped as described on [`crate::NodeStacks`].
    pub(super) fn parse_class_type_onto_stack(&mut self) -> PResult<()> {
        let mut total = 0;
        let mut group = 0;
        loop {
            let ident = self.parse_ident()?;
            self.stacks.push_ident(ident);
            group += 1;
            total += 1;
            if self.at(TokenKind::Lt)? {
                let args = self.parse_type_arguments()?;
                let count = args.len();
                self.stacks.generics.extend(args);
                self.stacks.push_name_length(group);
                self.stacks.generics_lengths.push(Some(count));
                group = 0;
            }
            if self.at(TokenKind::Dot)? && self.nth(1)? == TokenKind::Ident {
                self.bump()?;
            } else {
                break;
            }
        }
        if group > 0 {
            self.stacks.push_name_length(group);
            self.stacks.generics_lengths.push(None);
        }
        self.stacks.generics_ident_lengths.push(total);
        Ok(())
    }

    /// `<...>`; empty for the diamond.
    pub(super) fn parse_type_arguments(&mut self) -> PResult<Vec<TypeRef>> {
        self.expect(TokenKind::Lt)?;
        let mut args = Vec::new();
        if self.eat(TokenKind::Gt)? {
            return Ok(args);
        }
        loop {
            args.push(self.parse_type_argument()?);
            if !self.eat(TokenKind::Comma)? {
                break;
            }
        }
        self.expect(TokenKind::Gt)?;
        Ok(args)
    }

    fn parse_type_argument(&mut self) -> PResult<TypeRef> {
        if !self.at(TokenKind::Question)? {
            return self.parse_type();
        }
        let start = self.bump()?.span.start;
        let bound = match self.kind()? {
            TokenKind::Extends => Some(WildcardBound::Extends),
            TokenKind::Super => Some(WildcardBound::Super),
            _ => None,
        };
        let kind = match bound {
            Some(bound) => {
                self.bump()?;
                TypeRefKind::Wildcard(Some((bound, Box::new(self.parse_type()?))))
            }
            None => TypeRefKind::Wildcard(None),
        };
        Ok(TypeRef {
            kind,
            dims: 0,
            span: self.span_from(start),
        })
    }

    pub(super) fn parse_dims(&mut self) -> PResult<u32> {
        let mut dims = 0;
        while self.at(TokenKind::LBracket)? && self.nth(1)? == TokenKind::RBracket {
            self.bump()?;
            self.bump()?;
            dims += 1;
        }
        Ok(dims)
    }

    pub(super) fn parse_type_list(&mut self) -> PResult<Vec<TypeRef>> {
        let mut types = vec![self.parse_type()?];
        while self.eat(TokenKind::Comma)? {
            types.push(self.parse_type()?);
        }
        Ok(types)
    }

    pub(super) fn parse_type_parameters(&mut self) -> PResult<Vec<TypeParam>> {
        self.expect(TokenKind::Lt)?;
        let mut params = Vec::new();
        loop {
            while self.at(TokenKind::At)? {
                self.parse_annotation()?;
            }
            let name = self.parse_ident()?;
            let mut bounds = Vec::new();
            if self.eat(TokenKind::Extends)? {
                bounds.push(self.parse_type()?);
                while self.eat(TokenKind::Amp)? {
                    bounds.push(self.parse_type()?);
                }
            }
            params.push(TypeParam { name, bounds });
            if !self.eat(TokenKind::Comma)? {
                break;
            }
        }
        self.expect(TokenKind::Gt)?;
        Ok(params)
    }

    // --- Speculative scanning ---

    /// Index just past a type starting `i` tokens ahead, without consuming.
    pub(super) fn scan_type(&mut self, i: usize) -> PResult<Option<usize>> {
        let first = self.nth(i)?;
        let mut j = if first.is_primitive_type() {
            i + 1
        } else if first == TokenKind::Ident {
            let mut j = i;
            loop {
                if self.nth(j)? != TokenKind::Ident {
                    return Ok(None);
                }
                j += 1;
                if self.nth(j)? == TokenKind::Lt {
                    let Some(next) = self.scan_type_arguments(j)? else {
                        return Ok(None);
                    };
                    j = next;
                }
                if self.nth(j)? == TokenKind::Dot && self.nth(j + 1)? == TokenKind::Ident {
                    j += 1;
                } else {
                    break j;
                }
            }
        } else {
            return Ok(None);
        };
        while self.nth(j)? == TokenKind::LBracket && self.nth(j + 1)? == TokenKind::RBracket {
            j += 2;
        }
        Ok(Some(j))
    }

    fn scan_type_arguments(&mut self, i: usize) -> PResult<Option<usize>> {
        let mut j = i + 1;
        if self.nth(j)? == TokenKind::Gt {
            return Ok(Some(j + 1));
        }
        loop {
            if self.nth(j)? == TokenKind::Question {
                j += 1;
                if matches!(self.nth(j)?, TokenKind::Extends | TokenKind::Super) {
                    let Some(next) = self.scan_type(j + 1)? else {
                        return Ok(None);
                    };
                    j = next;
                }
            } else {
                let Some(next) = self.scan_type(j)? else {
                    return Ok(None);
                };
                j = next;
            }
            match self.nth(j)? {
                TokenKind::Comma => j += 1,
                TokenKind::Gt => return Ok(Some(j + 1)),
                _ => return Ok(None),
            }
        }
    }

    /// Index just past the `)` matching the `(` found `i` tokens ahead.
    pub(super) fn scan_balanced_parens(&mut self, i: usize) -> PResult<Option<usize>> {
        let mut depth = 0u32;
        let mut j = i;
        loop {
            match self.nth(j)? {
                TokenKind::LParen => depth += 1,
                TokenKind::RParen => {
                    depth = depth.saturating_sub(1);
                    if depth == 0 {
                        return Ok(Some(j + 1));
                    }
                }
                TokenKind::Eof => return Ok(None),
                _ => {}
            }
            j += 1;
        }
    }

    // --- Type declarations ---

    pub(super) fn parse_type_declaration(
        &mut self,
        modifiers: Modifiers,
        annotations: Vec<Annotation>,
        start: u32,
    ) -> PResult<()> {
        ensure_sufficient_stack(|| {
            let index = self.stacks.ast.len();
            let kind = self.parse_type_header(modifiers, annotations, start)?;
            self.parse_type_body(kind, index)
        })
    }

    /// Everything up to and including the `{` of a type declaration.
    ///
    /// The declaration is pushed as an open container once its name is
    /// known; the rest of the header is filled in as it is parsed.
    pub(super) fn parse_type_header(
        &mut self,
        modifiers: Modifiers,
        annotations: Vec<Annotation>,
        start: u32,
    ) -> PResult<TypeKind> {
        self.in_context(ErrorContext::TypeDeclaration, |p| {
            let kind = match p.kind()? {
                TokenKind::Class => TypeKind::Class,
                TokenKind::Interface => TypeKind::Interface,
                TokenKind::Enum => TypeKind::Enum,
                TokenKind::At => {
                    p.bump()?;
                    TypeKind::Annotation
                }
                _ => return Err(p.unexpected(TYPE_DECL_START.with(TokenKind::At))),
            };
            p.bump()?;
            let name = p.parse_ident()?;
            let index = p.stacks.ast.len();
            p.stacks.ast.push(AstNode::Type(TypeDecl {
                kind,
                modifiers,
                annotations,
                name,
                type_params: Vec::new(),
                extends: Vec::new(),
                implements: Vec::new(),
                enum_constants: Vec::new(),
                members: Vec::new(),
                span: p.span_from(start),
                body_start: None,
                declaration_end: None,
            }));

            let type_params = if p.at(TokenKind::Lt)? {
                p.parse_type_parameters()?
            } else {
                Vec::new()
            };
            let extends = if p.eat(TokenKind::Extends)? {
                p.parse_type_list()?
            } else {
                Vec::new()
            };
            let implements = if p.eat(TokenKind::Implements)? {
                p.parse_type_list()?
            } else {
                Vec::new()
            };
            p.expect(TokenKind::LBrace)?;
            let body_start = p.prev_end();
            if let Some(AstNode::Type(decl)) = p.stacks.ast.get_mut(index) {
                decl.type_params = type_params;
                decl.extends = extends;
                decl.implements = implements;
                decl.body_start = Some(body_start);
            }
            p.reduce(Rule::TypeHeader(kind));
            Ok(kind)
        })
    }

    fn parse_type_body(&mut self, kind: TypeKind, index: usize) -> PResult<()> {
        let context = if kind == TypeKind::Enum {
            ErrorContext::EnumBody
        } else {
            ErrorContext::ClassBody
        };
        self.in_context(context, |p| {
            if kind == TypeKind::Enum {
                p.parse_enum_constants()?;
            }
            p.parse_members_until_rbrace()?;
            p.bump()?;
            p.reduce(Rule::TypeDeclaration);
            p.close_type_container(index);
            Ok(())
        })
    }

    /// Members up to (not including) the closing `}`.
    fn parse_members_until_rbrace(&mut self) -> PResult<()> {
        while !self.at(TokenKind::RBrace)? {
            if self.at_eof()? {
                return Err(self.unexpected(TokenSet::single(TokenKind::RBrace)));
            }
            self.parse_class_body_declaration()?;
        }
        Ok(())
    }

    /// Drain the members reduced above the open type at `index` into it
    /// and mark it complete.
    pub(super) fn close_type_container(&mut self, index: usize) {
        let end = self.prev_end();
        let children = self.stacks.drain_ast_from(index + 1);
        let mut members = Vec::new();
        let mut constants = Vec::new();
        for child in children {
            match child {
                AstNode::EnumConstant(constant) => constants.push(constant),
                other => members.extend(other.into_member()),
            }
        }
        if let Some(AstNode::Type(decl)) = self.stacks.ast.get_mut(index) {
            decl.members.extend(members);
            decl.enum_constants.extend(constants);
            decl.span = Span::new(decl.span.start, end);
            decl.declaration_end = Some(end);
        }
    }

    /// The body of an anonymous class or enum constant, `{` included.
    pub(super) fn parse_anonymous_body(&mut self) -> PResult<Vec<Member>> {
        let open = self.expect(TokenKind::LBrace)?;
        let index = self.stacks.ast.len();
        self.stacks.ast.push(AstNode::Type(TypeDecl {
            kind: TypeKind::Class,
            modifiers: Modifiers::empty(),
            annotations: Vec::new(),
            name: Ident::new("", Span::point(open.span.start)),
            type_params: Vec::new(),
            extends: Vec::new(),
            implements: Vec::new(),
            enum_constants: Vec::new(),
            members: Vec::new(),
            span: open.span,
            body_start: Some(open.span.end),
            declaration_end: None,
        }));
        self.in_context(ErrorContext::ClassBody, |p| p.parse_members_until_rbrace())?;
        self.bump()?;
        self.close_type_container(index);
        match self.stacks.ast.pop() {
            Some(AstNode::Type(decl)) => Ok(decl.members),
            Some(other) => {
                self.stacks.ast.push(other);
                Ok(Vec::new())
            }
            None => Ok(Vec::new()),
        }
    }

    pub(super) fn parse_class_body_declaration(&mut self) -> PResult<()> {
        self.in_context(ErrorContext::ClassBody, |p| match p.kind()? {
            TokenKind::Semicolon => {
                p.bump()?;
                Ok(())
            }
            TokenKind::LBrace => p.parse_initializer(false),
            TokenKind::Static if p.nth(1)? == TokenKind::LBrace => p.parse_initializer(true),
            _ => {
                let start = p.cur()?.span.start;
                let (modifiers, annotations) = p.parse_modifiers()?;
                if p.at_type_decl_start()? {
                    p.parse_type_declaration(modifiers, annotations, start)
                } else {
                    p.parse_member_after_modifiers(modifiers, annotations, start)
                }
            }
        })
    }
}
