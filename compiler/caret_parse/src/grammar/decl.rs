//! Members: methods, constructors, fields, initializers, enum constants.

use caret_ir::ast::{
    Annotation, EnumConstant, FieldDecl, Initializer, MethodDecl, Modifiers, Param, TypeParam,
    TypeRef,
};
use caret_ir::{AstNode, Ident, Span, TokenKind};

use super::Parser;
use crate::{BlockStart, ErrorContext, NameSite, PResult, ReduceHooks, Rule, TokenSet, TokenSource};

impl<S: TokenSource, H: ReduceHooks> Parser<'_, S, H> {
    /// A method, constructor or field, after its modifiers.
    pub(super) fn parse_member_after_modifiers(
        &mut self,
        modifiers: Modifiers,
        annotations: Vec<Annotation>,
        start: u32,
    ) -> PResult<()> {
        let type_params = if self.at(TokenKind::Lt)? {
            self.parse_type_parameters()?
        } else {
            Vec::new()
        };
        if self.at(TokenKind::Ident)? && self.nth(1)? == TokenKind::LParen {
            let name = self.parse_ident()?;
            let header = MethodHeader {
                modifiers,
                annotations,
                type_params,
                return_type: None,
                name,
                start,
            };
            return self.parse_method_rest(header);
        }

        let ty = self.parse_result_type()?;
        let name = self.parse_ident()?;
        let is_void = matches!(
            ty.kind,
            caret_ir::ast::TypeRefKind::Primitive(caret_ir::ast::PrimitiveType::Void)
        );
        if is_void || self.at(TokenKind::LParen)? || !type_params.is_empty() {
            self.offer_single(&name, NameSite::MethodName { return_type: &ty })?;
            let header = MethodHeader {
                modifiers,
                annotations,
                type_params,
                return_type: Some(ty),
                name,
                start,
            };
            return self.parse_method_rest(header);
        }
        self.parse_field_declarators(modifiers, annotations, ty, name, start)
    }

    fn parse_method_rest(&mut self, header: MethodHeader) -> PResult<()> {
        let is_constructor = header.return_type.is_none();
        let index = self.stacks.ast.len();
        let span = self.span_from(header.start);
        self.stacks.ast.push(AstNode::Method(MethodDecl {
            modifiers: header.modifiers,
            annotations: header.annotations,
            type_params: header.type_params,
            return_type: header.return_type,
            name: header.name,
            params: Vec::new(),
            throws: Vec::new(),
            body: None,
            default_value: None,
            span,
            body_start: None,
            declaration_end: None,
        }));

        let throws = self.in_context(ErrorContext::MethodHeader, |p| {
            p.expect(TokenKind::LParen)?;
            if !p.at(TokenKind::RParen)? {
                loop {
                    p.parse_formal_parameter()?;
                    if !p.eat(TokenKind::Comma)? {
                        break;
                    }
                }
            }
            p.expect(TokenKind::RParen)?;
            let extra_dims = p.parse_dims()?;
            if extra_dims > 0 {
                if let Some(AstNode::Method(method)) = p.stacks.ast.get_mut(index) {
                    if let Some(ty) = method.return_type.as_mut() {
                        ty.dims += extra_dims;
                    }
                }
            }
            if p.eat(TokenKind::Throws)? {
                p.parse_type_list()
            } else {
                Ok(Vec::new())
            }
        })?;

        let params = self
            .stacks
            .drain_ast_from(index + 1)
            .into_iter()
            .filter_map(|node| match node {
                AstNode::Parameter(param) => Some(param),
                _ => None,
            })
            .collect();
        let header_end = self.prev_end();
        if let Some(AstNode::Method(method)) = self.stacks.ast.get_mut(index) {
            method.params = params;
            method.throws = throws;
            method.span = Span::new(method.span.start, header_end);
        }
        self.reduce(if is_constructor {
            Rule::ConstructorHeader
        } else {
            Rule::MethodHeader
        });

        match self.kind()? {
            TokenKind::Semicolon => {
                self.bump()?;
                self.reduce(Rule::AbstractMethod);
                self.finish_method(index, None);
                Ok(())
            }
            TokenKind::Default => {
                self.bump()?;
                let value = self.parse_member_value()?;
                self.expect(TokenKind::Semicolon)?;
                if let Some(AstNode::Method(method)) = self.stacks.ast.get_mut(index) {
                    method.default_value = Some(value);
                }
                self.reduce(Rule::AbstractMethod);
                self.finish_method(index, None);
                Ok(())
            }
            TokenKind::LBrace => {
                self.bump()?;
                let body_start = self.prev_end();
                if let Some(AstNode::Method(method)) = self.stacks.ast.get_mut(index) {
                    method.body_start = Some(body_start);
                }
                self.parse_body_statements()?;
                self.bump()?;
                self.reduce(if is_constructor {
                    Rule::ConstructorBody
                } else {
                    Rule::MethodBody
                });
                let body = self.drain_statements(index + 1);
                self.finish_method(index, Some(body));
                Ok(())
            }
            _ => Err(self.unexpected(
                TokenSet::single(TokenKind::LBrace).with(TokenKind::Semicolon),
            )),
        }
    }

    fn finish_method(&mut self, index: usize, body: Option<Vec<caret_ir::ast::Stmt>>) {
        let end = self.prev_end();
        if let Some(AstNode::Method(method)) = self.stacks.ast.get_mut(index) {
            method.body = body;
            method.span = Span::new(method.span.start, end);
            method.declaration_end = Some(end);
        }
    }

    /// Statements of a body whose `{` was just consumed, up to the `}`.
    ///
    /// In diet mode the body is skipped instead, unless the source
    /// refuses to jump over it.
    fn parse_body_statements(&mut self) -> PResult<()> {
        if self.skipping_bodies() && self.tokens.skip_block().is_some() {
            return Ok(());
        }
        self.in_context(ErrorContext::Block, |p| {
            while !p.at(TokenKind::RBrace)? {
                if p.at_eof()? {
                    return Err(p.unexpected(TokenSet::single(TokenKind::RBrace)));
                }
                p.parse_block_statement()?;
            }
            Ok(())
        })
    }

    fn parse_formal_parameter(&mut self) -> PResult<()> {
        let start = self.cur()?.span.start;
        let (modifiers, _) = self.parse_modifiers()?;
        let mut ty = self.parse_type()?;
        let varargs = self.eat(TokenKind::Ellipsis)?;
        let name = self.parse_ident()?;
        self.offer_single(&name, NameSite::ParameterName { ty: &ty, varargs })?;
        ty.dims += self.parse_dims()?;
        let span = self.span_from(start);
        self.stacks.ast.push(AstNode::Parameter(Param {
            modifiers,
            ty,
            name,
            varargs,
            span,
        }));
        self.reduce(Rule::FormalParameter);
        Ok(())
    }

    fn parse_field_declarators(
        &mut self,
        modifiers: Modifiers,
        annotations: Vec<Annotation>,
        ty: TypeRef,
        first: Ident,
        start: u32,
    ) -> PResult<()> {
        let base = self.stacks.ast.len();
        let mut name = first;
        loop {
            self.offer_single(&name, NameSite::FieldName { ty: &ty })?;
            let mut field_ty = ty.clone();
            field_ty.dims += self.parse_dims()?;
            let span = self.span_from(start);
            self.stacks.ast.push(AstNode::Field(FieldDecl {
                modifiers,
                annotations: annotations.clone(),
                ty: field_ty,
                name,
                init: None,
                span,
                declaration_end: None,
            }));
            if self.eat(TokenKind::Eq)? {
                self.reduce(Rule::ForceNoDiet);
                self.no_diet += 1;
                let init = self.parse_variable_initializer();
                self.no_diet -= 1;
                let init = init?;
                if let Some(AstNode::Field(field)) = self.stacks.ast.last_mut() {
                    field.init = Some(init);
                }
                self.reduce(Rule::RestoreDiet);
            }
            if !self.eat(TokenKind::Comma)? {
                break;
            }
            name = self.parse_ident()?;
        }
        self.expect(TokenKind::Semicolon)?;
        let end = self.prev_end();
        for node in &mut self.stacks.ast[base..] {
            if let AstNode::Field(field) = node {
                field.span = Span::new(field.span.start, end);
                field.declaration_end = Some(end);
            }
        }
        Ok(())
    }

    /// An instance initializer, or a static one when `is_static`.
    pub(super) fn parse_initializer(&mut self, is_static: bool) -> PResult<()> {
        let start = self.cur()?.span.start;
        if is_static {
            self.expect(TokenKind::Static)?;
            self.reduce(Rule::StaticOnly);
        } else {
            self.reduce(Rule::NestedMethod);
        }
        let open = self.expect(TokenKind::LBrace)?;
        let index = self.stacks.ast.len();
        self.stacks.ast.push(AstNode::Initializer(Initializer {
            is_static,
            body: Vec::new(),
            span: self.span_from(start),
            body_start: open.span.end,
            declaration_end: None,
        }));
        self.stacks.block_starts.push(BlockStart {
            offset: open.span.start,
            fake: false,
        });
        self.parse_body_statements()?;
        self.bump()?;
        self.stacks.block_starts.pop();
        self.reduce(if is_static {
            Rule::StaticInitializer
        } else {
            Rule::ClassBodyDeclaration
        });
        let body = self.drain_statements(index + 1);
        let end = self.prev_end();
        if let Some(AstNode::Initializer(init)) = self.stacks.ast.get_mut(index) {
            init.body = body;
            init.span = Span::new(init.span.start, end);
            init.declaration_end = Some(end);
        }
        Ok(())
    }

    /// Enum constants at the start of an enum body, and the `;` ending them.
    pub(super) fn parse_enum_constants(&mut self) -> PResult<()> {
        while matches!(self.kind()?, TokenKind::Ident | TokenKind::At) {
            self.parse_enum_constant()?;
            if !self.eat(TokenKind::Comma)? {
                break;
            }
        }
        self.eat(TokenKind::Semicolon)?;
        Ok(())
    }

    pub(super) fn parse_enum_constant(&mut self) -> PResult<()> {
        let start = self.cur()?.span.start;
        while self.at(TokenKind::At)? {
            self.parse_annotation()?;
        }
        let name = self.parse_ident()?;
        let index = self.stacks.ast.len();
        self.stacks.ast.push(AstNode::EnumConstant(EnumConstant {
            name,
            args: Vec::new(),
            body: None,
            span: self.span_from(start),
        }));
        self.reduce(Rule::EnumConstantHeaderName);
        if self.at(TokenKind::LParen)? {
            self.bump()?;
            let args = self.parse_arguments()?;
            if let Some(AstNode::EnumConstant(constant)) = self.stacks.ast.get_mut(index) {
                constant.args = args;
            }
        }
        let has_body = self.at(TokenKind::LBrace)?;
        self.reduce(Rule::EnumConstantHeader { has_body });
        if has_body {
            let members = self.parse_anonymous_body()?;
            if let Some(AstNode::EnumConstant(constant)) = self.stacks.ast.get_mut(index) {
                constant.body = Some(members);
            }
            self.reduce(Rule::EnumConstantWithBody);
        } else {
            self.reduce(Rule::EnumConstantNoBody);
        }
        let span = self.span_from(start);
        if let Some(AstNode::EnumConstant(constant)) = self.stacks.ast.get_mut(index) {
            constant.span = span;
        }
        Ok(())
    }
}

struct MethodHeader {
    modifiers: Modifiers,
    annotations: Vec<Annotation>,
    type_params: Vec<TypeParam>,
    return_type: Option<TypeRef>,
    name: Ident,
    start: u32,
}
