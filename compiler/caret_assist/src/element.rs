//! The element context stack.
//!
//! A LIFO record of the syntactic constructs enclosing the parse position,
//! kept separately from the engine's node stacks. Delimiter entries mark
//! the nearest enclosing type, method, field initializer, annotation
//! member value or enum constant; selector entries mark an open call
//! argument list.
//!
//! Pops tolerate mismatches: [`ElementStack::pop`] removes the top entry only
//! when its kind matches, and [`ElementStack::pop_until`] leaves the stack
//! untouched when no entry of the kind exists.

use bitflags::bitflags;
use caret_ir::Ident;
use smallvec::SmallVec;

#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum ElementKind {
    Selector,
    TypeDelimiter,
    MethodDelimiter,
    FieldInitDelimiter,
    AttributeValueDelimiter,
    EnumConstantDelimiter,
}

impl ElementKind {
    pub const fn mask(self) -> ElementKinds {
        match self {
            ElementKind::Selector => ElementKinds::SELECTOR,
            ElementKind::TypeDelimiter => ElementKinds::TYPE,
            ElementKind::MethodDelimiter => ElementKinds::METHOD,
            ElementKind::FieldInitDelimiter => ElementKinds::FIELD_INIT,
            ElementKind::AttributeValueDelimiter => ElementKinds::ATTRIBUTE_VALUE,
            ElementKind::EnumConstantDelimiter => ElementKinds::ENUM_CONSTANT,
        }
    }
}

bitflags! {
    /// A set of [`ElementKind`]s, used to filter stack queries.
    #[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
    pub struct ElementKinds: u8 {
        const SELECTOR = 1 << 0;
        const TYPE = 1 << 1;
        const METHOD = 1 << 2;
        const FIELD_INIT = 1 << 3;
        const ATTRIBUTE_VALUE = 1 << 4;
        const ENUM_CONSTANT = 1 << 5;
        /// The delimiters that bound a member context.
        const CONTAINERS = Self::TYPE.bits() | Self::METHOD.bits() | Self::FIELD_INIT.bits();
    }
}

impl ElementKinds {
    pub const ANY: ElementKinds = ElementKinds::all();

    #[inline]
    pub fn matches(self, kind: ElementKind) -> bool {
        self.contains(kind.mask())
    }
}

/// Role-specific information attached to an entry.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
pub enum ElementInfo {
    #[default]
    Empty,
    /// Index into the identifier stack of the selector name.
    IdentSlot(usize),
    /// `this(...)` explicit constructor call.
    ThisConstructor,
    /// `super(...)` explicit constructor call.
    SuperConstructor,
    /// Enum constant header, with or without a class body.
    EnumConstantBody { has_body: bool },
}

#[derive(Clone, Eq, PartialEq, Debug)]
pub struct ElementEntry {
    pub kind: ElementKind,
    pub info: ElementInfo,
    /// The name that opened the entry, when there is one.
    pub payload: Option<Ident>,
}

#[derive(Clone, Eq, PartialEq, Debug, Default)]
pub struct ElementStack {
    entries: SmallVec<[ElementEntry; 8]>,
}

impl ElementStack {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries from bottom to top.
    pub fn entries(&self) -> &[ElementEntry] {
        &self.entries
    }

    pub fn push(&mut self, kind: ElementKind, info: ElementInfo, payload: Option<Ident>) {
        tracing::trace!(?kind, ?info, depth = self.entries.len(), "push element");
        self.entries.push(ElementEntry {
            kind,
            info,
            payload,
        });
    }

    /// Pop the top entry if it is of `kind`.
    pub fn pop(&mut self, kind: ElementKind) -> Option<ElementEntry> {
        if self.entries.last().is_some_and(|e| e.kind == kind) {
            tracing::trace!(?kind, depth = self.entries.len(), "pop element");
            self.entries.pop()
        } else {
            None
        }
    }

    /// Pop entries down to the topmost one of `kind`, which stays on top.
    pub fn pop_until(&mut self, kind: ElementKind) {
        if let Some(index) = self.last_index_of(kind) {
            self.entries.truncate(index + 1);
        }
    }

    /// Drop every entry, payloads included.
    pub fn flush(&mut self) {
        self.entries.clear();
    }

    fn nth_matching(&self, mask: ElementKinds, offset: usize) -> Option<&ElementEntry> {
        self.entries
            .iter()
            .rev()
            .filter(|e| mask.matches(e.kind))
            .nth(offset.checked_sub(1)?)
    }

    /// Kind of the `offset`th entry from the top among those in `mask`
    /// (`1` is the topmost).
    pub fn top_kind(&self, mask: ElementKinds, offset: usize) -> Option<ElementKind> {
        self.nth_matching(mask, offset).map(|e| e.kind)
    }

    pub fn top_info(&self, mask: ElementKinds, offset: usize) -> Option<ElementInfo> {
        self.nth_matching(mask, offset).map(|e| e.info)
    }

    pub fn top(&self) -> Option<&ElementEntry> {
        self.entries.last()
    }

    pub fn last_index_of(&self, kind: ElementKind) -> Option<usize> {
        self.entries.iter().rposition(|e| e.kind == kind)
    }

    /// The nearest member-context delimiter.
    fn nearest_container(&self) -> Option<ElementKind> {
        self.top_kind(ElementKinds::CONTAINERS, 1)
    }

    pub fn is_inside_method(&self) -> bool {
        self.nearest_container() == Some(ElementKind::MethodDelimiter)
    }

    pub fn is_inside_type(&self) -> bool {
        self.nearest_container() == Some(ElementKind::TypeDelimiter)
    }

    pub fn is_inside_field_initializer(&self) -> bool {
        self.nearest_container() == Some(ElementKind::FieldInitDelimiter)
    }

    /// Inside an annotation member value, with no member context between.
    pub fn is_inside_attribute_value(&self) -> bool {
        self.entries
            .iter()
            .rev()
            .map(|e| e.kind)
            .find(|kind| {
                ElementKinds::CONTAINERS
                    .union(ElementKinds::ATTRIBUTE_VALUE)
                    .matches(*kind)
            })
            == Some(ElementKind::AttributeValueDelimiter)
    }

    pub fn is_indirectly_inside_method(&self) -> bool {
        self.last_index_of(ElementKind::MethodDelimiter).is_some()
    }

    pub fn is_indirectly_inside_type(&self) -> bool {
        self.last_index_of(ElementKind::TypeDelimiter).is_some()
    }

    pub fn is_indirectly_inside_field_initializer(&self) -> bool {
        self.last_index_of(ElementKind::FieldInitDelimiter).is_some()
    }

    /// The innermost open call argument list.
    pub fn enclosing_selector(&self) -> Option<&ElementEntry> {
        self.entries
            .iter()
            .rev()
            .find(|e| e.kind == ElementKind::Selector)
    }
}

#[cfg(test)]
mod tests;
