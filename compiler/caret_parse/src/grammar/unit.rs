//! Compilation units, module declarations and the relaxed goals.

use caret_ir::ast::{ImportDecl, ModuleDecl, ModuleDirective, PackageDecl};
use caret_ir::{AstNode, Ident, TokenKind};

use super::Parser;
use crate::token_set::{MODIFIERS, TYPE_DECL_START};
use crate::{ErrorContext, NameSite, PResult, ReduceHooks, TokenSet, TokenSource};

impl<S: TokenSource, H: ReduceHooks> Parser<'_, S, H> {
    pub(super) fn parse_compilation_unit(&mut self) -> PResult<()> {
        self.in_context(ErrorContext::CompilationUnit, |p| {
            if p.at(TokenKind::Package)? {
                p.parse_package()?;
            }
            while p.at(TokenKind::Import)? {
                p.parse_import()?;
            }
            if p.at_module_start()? {
                return p.parse_module_declaration();
            }
            while !p.at_eof()? {
                if p.eat(TokenKind::Semicolon)? {
                    continue;
                }
                let start = p.cur()?.span.start;
                let (modifiers, annotations) = p.parse_modifiers()?;
                if !p.at_type_decl_start()? {
                    return Err(p.unexpected(TYPE_DECL_START.with(TokenKind::At)));
                }
                p.parse_type_declaration(modifiers, annotations, start)?;
            }
            Ok(())
        })
    }

    pub(super) fn parse_module_unit(&mut self) -> PResult<()> {
        while self.at(TokenKind::Import)? {
            self.parse_import()?;
        }
        self.parse_module_declaration()
    }

    pub(super) fn parse_package(&mut self) -> PResult<()> {
        self.in_context(ErrorContext::PackageDeclaration, |p| {
            let start = p.expect(TokenKind::Package)?.span.start;
            p.push_qualified_name()?;
            let end = p.prev_end();
            p.offer(NameSite::Package { end })?;
            let name = p.stacks.pop_name();
            p.expect(TokenKind::Semicolon)?;
            let span = p.span_from(start);
            p.stacks.ast.push(AstNode::Package(PackageDecl { name, span }));
            Ok(())
        })
    }

    pub(super) fn parse_import(&mut self) -> PResult<()> {
        self.in_context(ErrorContext::ImportDeclaration, |p| {
            let start = p.expect(TokenKind::Import)?.span.start;
            let is_static = p.eat(TokenKind::Static)?;
            let first = p.parse_ident()?;
            p.stacks.push_ident(first);
            let mut len = 1;
            let mut on_demand = false;
            while p.at(TokenKind::Dot)? {
                match p.nth(1)? {
                    TokenKind::Star => {
                        p.bump()?;
                        p.bump()?;
                        on_demand = true;
                        break;
                    }
                    TokenKind::Ident => {
                        p.bump()?;
                        let next = p.parse_ident()?;
                        p.stacks.push_ident(next);
                        len += 1;
                    }
                    _ => {
                        p.bump()?;
                        return Err(p.unexpected(
                            TokenSet::single(TokenKind::Ident).with(TokenKind::Star),
                        ));
                    }
                }
            }
            p.stacks.push_name_length(len);
            let end = p.prev_end();
            p.offer(NameSite::Import {
                is_static,
                on_demand,
                end,
            })?;
            let name = p.stacks.pop_name();
            p.expect(TokenKind::Semicolon)?;
            let span = p.span_from(start);
            p.stacks.ast.push(AstNode::Import(ImportDecl {
                name,
                is_static,
                on_demand,
                span,
            }));
            Ok(())
        })
    }

    fn at_module_start(&mut self) -> PResult<bool> {
        if self.at_word("module")? {
            return Ok(self.nth(1)? == TokenKind::Ident);
        }
        if self.at_word("open")? {
            return self.nth_is_word(1, "module");
        }
        Ok(false)
    }

    fn parse_module_declaration(&mut self) -> PResult<()> {
        self.in_context(ErrorContext::ModuleDeclaration, |p| {
            while p.at(TokenKind::At)? {
                p.parse_annotation()?;
            }
            let start = p.cur()?.span.start;
            let open = p.at_word("open")?;
            if open {
                p.bump()?;
            }
            if !p.at_word("module")? {
                return Err(p.unexpected(TokenSet::single(TokenKind::Ident)));
            }
            p.bump()?;
            p.push_qualified_name()?;
            p.offer(NameSite::ModuleName)?;
            let name = p.stacks.pop_name();
            p.expect(TokenKind::LBrace)?;
            let index = p.stacks.ast.len();
            p.stacks.ast.push(AstNode::Module(ModuleDecl {
                open,
                name,
                directives: Vec::new(),
                span: p.span_from(start),
                declaration_end: None,
            }));
            while !p.at(TokenKind::RBrace)? {
                let directive = p.parse_module_directive()?;
                if let Some(AstNode::Module(module)) = p.stacks.ast.get_mut(index) {
                    module.directives.push(directive);
                }
            }
            p.bump()?;
            let span = p.span_from(start);
            if let Some(AstNode::Module(module)) = p.stacks.ast.get_mut(index) {
                module.span = span;
                module.declaration_end = Some(span.end);
            }
            if !p.at_eof()? {
                return Err(p.unexpected(TokenSet::single(TokenKind::Eof)));
            }
            Ok(())
        })
    }

    fn parse_module_directive(&mut self) -> PResult<ModuleDirective> {
        let directive = if self.at_word("requires")? {
            self.bump()?;
            let mut transitive = false;
            let mut is_static = false;
            loop {
                // `requires transitive;` names a module called `transitive`.
                if self.at_word("transitive")? && self.nth(1)? != TokenKind::Semicolon {
                    self.bump()?;
                    transitive = true;
                } else if self.eat(TokenKind::Static)? {
                    is_static = true;
                } else {
                    break;
                }
            }
            self.push_qualified_name()?;
            self.offer(NameSite::RequiresModule)?;
            ModuleDirective::Requires {
                transitive,
                is_static,
                module: self.stacks.pop_name(),
            }
        } else if self.at_word("exports")? || self.at_word("opens")? {
            let exports = self.at_word("exports")?;
            self.bump()?;
            self.push_qualified_name()?;
            self.offer(NameSite::ExportsPackage)?;
            let package = self.stacks.pop_name();
            let to = self.parse_module_targets()?;
            if exports {
                ModuleDirective::Exports { package, to }
            } else {
                ModuleDirective::Opens { package, to }
            }
        } else if self.at_word("uses")? {
            self.bump()?;
            ModuleDirective::Uses(self.parse_type()?)
        } else if self.at_word("provides")? {
            self.bump()?;
            let service = self.parse_type()?;
            if !self.at_word("with")? {
                return Err(self.unexpected(TokenSet::single(TokenKind::Ident)));
            }
            self.bump()?;
            let mut with = vec![self.parse_type()?];
            while self.eat(TokenKind::Comma)? {
                with.push(self.parse_type()?);
            }
            ModuleDirective::Provides { service, with }
        } else {
            return Err(self.unexpected(TokenSet::single(TokenKind::Ident)));
        };
        self.expect(TokenKind::Semicolon)?;
        Ok(directive)
    }

    fn parse_module_targets(&mut self) -> PResult<Vec<Vec<Ident>>> {
        let mut targets = Vec::new();
        if self.at_word("to")? {
            self.bump()?;
            loop {
                self.push_qualified_name()?;
                self.offer(NameSite::TargetModule)?;
                targets.push(self.stacks.pop_name());
                if !self.eat(TokenKind::Comma)? {
                    break;
                }
            }
        }
        Ok(targets)
    }

    // --- Relaxed goals ---

    /// Declarations one header at a time, at any nesting depth.
    pub(super) fn parse_headers(&mut self) -> PResult<()> {
        self.in_context(ErrorContext::ClassBody, |p| {
            while !p.at_eof()? {
                p.parse_header()?;
            }
            Ok(())
        })
    }

    fn parse_header(&mut self) -> PResult<()> {
        match self.kind()? {
            TokenKind::Package => return self.parse_package(),
            TokenKind::Import => return self.parse_import(),
            TokenKind::Semicolon => {
                self.bump()?;
                return Ok(());
            }
            TokenKind::RBrace => return self.close_header_container(),
            TokenKind::LBrace => return self.parse_initializer(false),
            TokenKind::Static if self.nth(1)? == TokenKind::LBrace => {
                return self.parse_initializer(true);
            }
            TokenKind::Ident if self.at_header_enum_constant()? => {
                self.parse_enum_constant()?;
                self.eat(TokenKind::Comma)?;
                return Ok(());
            }
            _ => {}
        }
        if self.at_module_start()? {
            return self.parse_module_declaration();
        }
        let start = self.cur()?.span.start;
        let (modifiers, annotations) = self.parse_modifiers()?;
        if self.at_type_decl_start()? {
            let kind = self.parse_type_header(modifiers, annotations, start)?;
            if kind == caret_ir::ast::TypeKind::Enum {
                self.parse_enum_constants()?;
            }
            return Ok(());
        }
        self.parse_member_after_modifiers(modifiers, annotations, start)
    }

    /// An identifier that starts an enum constant rather than a member.
    fn at_header_enum_constant(&mut self) -> PResult<bool> {
        match self.nth(1)? {
            TokenKind::Comma | TokenKind::Semicolon | TokenKind::RBrace | TokenKind::LBrace => {
                Ok(true)
            }
            TokenKind::LParen => {
                // Constructors continue with a body or `throws` after `)`.
                let Some(after) = self.scan_balanced_parens(1)? else {
                    return Ok(false);
                };
                let next = self.nth(after)?;
                Ok(!matches!(next, TokenKind::LBrace | TokenKind::Throws))
            }
            _ => Ok(false),
        }
    }

    /// A `}` met between headers closes the nearest open type on the
    /// stack, or is recorded as a bare close-brace marker.
    fn close_header_container(&mut self) -> PResult<()> {
        let token = self.bump()?;
        let open_type = self.stacks.ast.iter().rposition(|node| {
            matches!(node, AstNode::Type(t) if t.declaration_end.is_none() && t.body_start.is_some())
        });
        match open_type {
            Some(index) => {
                self.reduce(crate::Rule::TypeDeclaration);
                self.close_type_container(index);
            }
            None => {
                self.stacks.ast.push(AstNode::CloseBrace(token.span));
                self.reduce(crate::Rule::UnmatchedCloseBrace);
            }
        }
        Ok(())
    }

    /// Statements, `catch`/`finally` headers, `else` and switch labels.
    pub(super) fn parse_statements_or_catch_headers(&mut self) -> PResult<()> {
        self.in_context(ErrorContext::Block, |p| {
            while !p.at_eof()? {
                match p.kind()? {
                    TokenKind::RBrace => {
                        let token = p.bump()?;
                        p.stacks.ast.push(AstNode::CloseBrace(token.span));
                        p.reduce(crate::Rule::UnmatchedCloseBrace);
                    }
                    TokenKind::Catch => p.parse_catch_header()?,
                    TokenKind::Finally => {
                        let start = p.bump()?.span.start;
                        let body = p.parse_block()?;
                        let span = p.span_from(start);
                        p.push_statement(caret_ir::ast::StmtKind::Block(body), span);
                    }
                    TokenKind::Else => {
                        p.bump()?;
                        let stmt = p.parse_statement()?;
                        p.stacks.ast.push(AstNode::Statement(stmt));
                    }
                    TokenKind::Case | TokenKind::Default if !p.at_default_modifier()? => {
                        p.parse_switch_label()?;
                    }
                    _ => p.parse_block_statement()?,
                }
            }
            Ok(())
        })
    }

    pub(super) fn parse_statements_to_eof(&mut self) -> PResult<()> {
        self.in_context(ErrorContext::Block, |p| {
            while !p.at_eof()? {
                p.parse_block_statement()?;
            }
            Ok(())
        })
    }

    pub(super) fn parse_members_to_eof(&mut self) -> PResult<()> {
        self.in_context(ErrorContext::ClassBody, |p| {
            while !p.at_eof()? {
                p.parse_class_body_declaration()?;
            }
            Ok(())
        })
    }

    pub(super) fn parse_initializer_to_eof(&mut self) -> PResult<()> {
        self.in_context(ErrorContext::VariableInitializer, |p| {
            let value = p.parse_variable_initializer()?;
            let span = value.span;
            p.push_statement(caret_ir::ast::StmtKind::Expr(value), span);
            if p.at_eof()? {
                Ok(())
            } else {
                Err(p.unexpected(TokenSet::single(TokenKind::Eof)))
            }
        })
    }

    pub(super) fn at_type_decl_start(&mut self) -> PResult<bool> {
        Ok(self.at_set(TYPE_DECL_START)?
            || (self.at(TokenKind::At)? && self.nth(1)? == TokenKind::Interface))
    }

    /// `default` used as an interface method modifier.
    pub(super) fn at_default_modifier(&mut self) -> PResult<bool> {
        Ok(self.at(TokenKind::Default)?
            && !matches!(self.nth(1)?, TokenKind::Colon | TokenKind::Arrow)
            && (MODIFIERS.contains(self.nth(1)?)
                || self.nth(1)?.is_primitive_type()
                || matches!(
                    self.nth(1)?,
                    TokenKind::Ident | TokenKind::Void | TokenKind::Lt | TokenKind::At
                )))
    }
}
