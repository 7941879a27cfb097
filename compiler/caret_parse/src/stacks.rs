//! Node stacks shared between the engine and its hooks.
//!
//! Names are accumulated one identifier at a time on `idents`; when a
//! dotted name ends, its length goes on `ident_lengths`. Class types use
//! the type-argument-aware grouping as well: the identifier group is split
//! after every segment that carries type arguments, `generics_lengths`
//! records, per group, how many entries of `generics` belong to it
//! (`None` when the group's last segment has no arguments, `Some(0)` for
//! a diamond), and `generics_ident_lengths` records the total number of
//! identifiers of the whole type.

use caret_ir::ast::{Modifiers, TypeRef, TypeRefKind, TypeSegment};
use caret_ir::{AstNode, Ident, Span};

/// An open block recorded for recovery.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub struct BlockStart {
    /// Offset of the `{`, or of the header keyword for a fake block.
    pub offset: u32,
    /// `for` headers open a scope without a brace.
    pub fake: bool,
}

#[derive(Default, Debug)]
pub struct NodeStacks {
    pub ast: Vec<AstNode>,
    pub idents: Vec<Ident>,
    pub ident_lengths: Vec<usize>,
    pub generics: Vec<TypeRef>,
    pub generics_lengths: Vec<Option<usize>>,
    pub generics_ident_lengths: Vec<usize>,
    pub block_starts: Vec<BlockStart>,
    pub modifiers: Modifiers,
    pub modifiers_start: Option<u32>,
}

impl NodeStacks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Empty every stack, keeping allocations.
    pub fn reset(&mut self) {
        self.ast.clear();
        self.idents.clear();
        self.ident_lengths.clear();
        self.generics.clear();
        self.generics_lengths.clear();
        self.generics_ident_lengths.clear();
        self.block_starts.clear();
        self.reset_modifiers();
    }

    pub fn reset_modifiers(&mut self) {
        self.modifiers = Modifiers::empty();
        self.modifiers_start = None;
    }

    pub fn push_ident(&mut self, ident: Ident) {
        self.idents.push(ident);
    }

    /// Close a name group of `len` identifiers.
    pub fn push_name_length(&mut self, len: usize) {
        self.ident_lengths.push(len);
    }

    /// The most recent name group, left in place.
    pub fn last_name(&self) -> &[Ident] {
        let len = self.ident_lengths.last().copied().unwrap_or(0);
        &self.idents[self.idents.len().saturating_sub(len)..]
    }

    /// All identifiers of the most recent class type, left in place.
    pub fn last_type_name(&self) -> &[Ident] {
        let len = self.generics_ident_lengths.last().copied().unwrap_or(0);
        &self.idents[self.idents.len().saturating_sub(len)..]
    }

    /// Remove and return the most recent name group.
    pub fn pop_name(&mut self) -> Vec<Ident> {
        let len = self.ident_lengths.pop().unwrap_or(0);
        let at = self.idents.len().saturating_sub(len);
        self.idents.split_off(at)
    }

    /// Remove the most recent class type, as segments.
    pub fn pop_type_segments(&mut self) -> Vec<TypeSegment> {
        let total = self.generics_ident_lengths.pop().unwrap_or(0);
        let mut groups = Vec::new();
        let mut taken = 0;
        while taken < total {
            let Some(len) = self.ident_lengths.pop() else {
                break;
            };
            let args = self
                .generics_lengths
                .pop()
                .flatten()
                .map(|n| self.generics.split_off(self.generics.len().saturating_sub(n)));
            let names = self.idents.split_off(self.idents.len().saturating_sub(len));
            taken += len;
            groups.push((names, args));
        }
        groups.reverse();

        let mut segments = Vec::with_capacity(total);
        for (names, mut args) in groups {
            let last = names.len().saturating_sub(1);
            for (i, name) in names.into_iter().enumerate() {
                let args = if i == last { args.take() } else { None };
                segments.push(TypeSegment { name, args });
            }
        }
        segments
    }

    /// Remove the most recent class type as a `TypeRef` ending at `end`.
    pub fn pop_type_reference(&mut self, dims: u32, end: u32) -> TypeRef {
        let segments = self.pop_type_segments();
        let start = segments.first().map_or(end, |s| s.name.span.start);
        TypeRef {
            kind: TypeRefKind::Class(segments),
            dims,
            span: Span::new(start, end.max(start)),
        }
    }

    /// Take every `ast` entry above `len`.
    pub fn drain_ast_from(&mut self, len: usize) -> Vec<AstNode> {
        let at = len.min(self.ast.len());
        self.ast.split_off(at)
    }
}
