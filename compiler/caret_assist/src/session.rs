//! Completion sessions.
//!
//! A [`ParseSession`] runs one completion request at a time: it marks the
//! caret in the token stream, drives the grammar engine with
//! [`AssistHooks`] attached, and recovers from stalls until either a
//! completion node is isolated or the input is exhausted. The lexer and
//! node stacks are kept between requests and reset in place.

use std::num::NonZeroU64;

use caret_ir::ast::{
    FieldDecl, MethodDecl, Modifiers, PrimitiveType, TypeDecl, TypeKind, TypeRef, TypeRefKind,
};
use caret_ir::{AssistId, Ident, InvalidCursorReason, Span};
use caret_lexer::Lexer;
use caret_parse::{Goal, Interrupt, NodeStacks, Parser, TokenSource};

use crate::element::{ElementEntry, ElementInfo, ElementKind, ElementStack};
use crate::hooks::AssistHooks;
use crate::node::CompletionNode;
use crate::recovered::{RecoveredElement, RecoveredNode, RecoveredTree};
use crate::recovery::{prepare_for_block_statements, prepare_for_headers, resume_goal};
use crate::scanner::CursorScanner;
use crate::{AssistError, SessionOptions};

/// Index of the last character before the caret; `-1` puts the caret at
/// the start of the source.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct Cursor(i64);

impl Cursor {
    #[inline]
    pub const fn new(last_before_caret: i64) -> Self {
        Cursor(last_before_caret)
    }

    /// The cursor for a caret sitting at byte offset `caret`.
    #[inline]
    pub fn at_caret(caret: u32) -> Self {
        Cursor(i64::from(caret) - 1)
    }

    #[inline]
    pub const fn get(self) -> i64 {
        self.0
    }

    /// Caret offset in a source of `len` bytes. Valid cursors range over
    /// `-1..=len`.
    pub fn caret(self, len: u32) -> Result<u32, AssistError> {
        if self.0 < -1 || self.0 > i64::from(len) {
            return Err(AssistError::CursorOutOfRange {
                cursor: self.0,
                len,
            });
        }
        u32::try_from(self.0 + 1).map_err(|_| AssistError::CursorOutOfRange {
            cursor: self.0,
            len,
        })
    }
}

/// The syntactic region a completion request is parsed as.
///
/// Spans of bodies exclude their braces.
#[derive(Clone, Eq, PartialEq, Debug)]
pub enum ReferenceContext {
    CompilationUnit,
    TypeBody { name: Box<str>, body: Span },
    MethodBody { name: Box<str>, body: Span },
    FieldInitializer { name: Box<str>, initializer: Span },
}

impl ReferenceContext {
    /// Range to scan. Method bodies and field initializers end at the
    /// caret.
    fn range(&self, caret: u32, len: u32) -> Result<Span, AssistError> {
        let (span, to_caret) = match self {
            ReferenceContext::CompilationUnit => return Ok(Span::new(0, len)),
            ReferenceContext::TypeBody { body, .. } => (*body, false),
            ReferenceContext::MethodBody { body, .. } => (*body, true),
            ReferenceContext::FieldInitializer { initializer, .. } => (*initializer, true),
        };
        if span.start > span.end || span.end > len {
            return Err(AssistError::ContextOutOfRange { span, len });
        }
        if to_caret {
            Ok(Span::new(span.start, caret.min(span.end).max(span.start)))
        } else {
            Ok(span)
        }
    }

    fn goal(&self) -> Goal {
        match self {
            ReferenceContext::CompilationUnit => Goal::CompilationUnit,
            ReferenceContext::TypeBody { .. } => Goal::ClassBodyDeclarations,
            ReferenceContext::MethodBody { .. } => Goal::BlockStatements,
            ReferenceContext::FieldInitializer { .. } => Goal::VariableInitializer,
        }
    }

    fn delimiter(&self) -> Option<ElementKind> {
        match self {
            ReferenceContext::CompilationUnit => None,
            ReferenceContext::TypeBody { .. } => Some(ElementKind::TypeDelimiter),
            ReferenceContext::MethodBody { .. } => Some(ElementKind::MethodDelimiter),
            ReferenceContext::FieldInitializer { .. } => Some(ElementKind::FieldInitDelimiter),
        }
    }

    /// Root of the recovered tree: the unit, or a stand-in for the
    /// declaration that owns the parsed region.
    fn root(&self, range: Span) -> RecoveredElement {
        let at = Span::point(range.start);
        let unknown = || TypeRef {
            kind: TypeRefKind::Class(Vec::new()),
            dims: 0,
            span: at,
        };
        match self {
            ReferenceContext::CompilationUnit => RecoveredElement::Unit,
            ReferenceContext::TypeBody { name, .. } => RecoveredElement::Type(TypeDecl {
                kind: TypeKind::Class,
                modifiers: Modifiers::empty(),
                annotations: Vec::new(),
                name: Ident::new(name.clone(), at),
                type_params: Vec::new(),
                extends: Vec::new(),
                implements: Vec::new(),
                enum_constants: Vec::new(),
                members: Vec::new(),
                span: at,
                body_start: Some(range.start),
                declaration_end: None,
            }),
            ReferenceContext::MethodBody { name, .. } => RecoveredElement::Method(MethodDecl {
                modifiers: Modifiers::empty(),
                annotations: Vec::new(),
                type_params: Vec::new(),
                return_type: Some(TypeRef {
                    kind: TypeRefKind::Primitive(PrimitiveType::Void),
                    dims: 0,
                    span: at,
                }),
                name: Ident::new(name.clone(), at),
                params: Vec::new(),
                throws: Vec::new(),
                body: None,
                default_value: None,
                span: at,
                body_start: Some(range.start),
                declaration_end: None,
            }),
            ReferenceContext::FieldInitializer { name, .. } => RecoveredElement::Field(FieldDecl {
                modifiers: Modifiers::empty(),
                annotations: Vec::new(),
                ty: unknown(),
                name: Ident::new(name.clone(), at),
                init: None,
                span: at,
                declaration_end: None,
            }),
        }
    }
}

/// The element context a completion node was found in.
#[derive(Clone, Eq, PartialEq, Debug)]
pub struct CompletionContext {
    elements: ElementStack,
}

impl CompletionContext {
    pub fn elements(&self) -> &ElementStack {
        &self.elements
    }

    pub fn is_inside_method(&self) -> bool {
        self.elements.is_inside_method()
    }

    pub fn is_inside_type(&self) -> bool {
        self.elements.is_inside_type()
    }

    pub fn is_inside_field_initializer(&self) -> bool {
        self.elements.is_inside_field_initializer()
    }

    pub fn is_inside_attribute_value(&self) -> bool {
        self.elements.is_inside_attribute_value()
    }

    pub fn enclosing_selector(&self) -> Option<&ElementEntry> {
        self.elements.enclosing_selector()
    }
}

#[derive(Clone, Debug)]
pub struct Completion {
    pub node: CompletionNode,
    pub context: CompletionContext,
    /// Enclosing declarations, when the session rebuilds them.
    pub tree: Option<RecoveredTree>,
    /// Offset just past the construct the node stands for.
    pub checkpoint: u32,
}

impl Completion {
    /// The innermost declaration open around the node.
    pub fn enclosing(&self) -> Option<&RecoveredNode> {
        let tree = self.tree.as_ref()?;
        tree.get(tree.current())
    }
}

#[derive(Clone, Eq, PartialEq, Debug)]
pub struct RecoveryReport {
    /// Element context after the first stall, or at the end of a parse
    /// that never stalled.
    pub elements: ElementStack,
    pub rounds: u32,
    pub checkpoint: u32,
    /// `false` when recovery stopped with nothing left to resume from, or
    /// at the round limit.
    pub resumable: bool,
}

#[derive(Clone, Debug)]
pub struct Recovered {
    pub tree: RecoveredTree,
    pub report: RecoveryReport,
}

/// The result of a completion request.
#[derive(Clone, Debug)]
pub enum CompletionOutcome {
    Completion(Completion),
    Recovered(Recovered),
    InvalidCursorLocation(InvalidCursorReason),
}

impl CompletionOutcome {
    pub fn completion(&self) -> Option<&Completion> {
        match self {
            CompletionOutcome::Completion(completion) => Some(completion),
            _ => None,
        }
    }

    pub fn recovered(&self) -> Option<&Recovered> {
        match self {
            CompletionOutcome::Recovered(recovered) => Some(recovered),
            _ => None,
        }
    }
}

pub struct ParseSession {
    lexer: Lexer,
    stacks: NodeStacks,
    options: SessionOptions,
    /// Requests served so far; each gets a fresh assist identifier.
    generation: u64,
}

impl Default for ParseSession {
    fn default() -> Self {
        Self::new()
    }
}

impl ParseSession {
    pub fn new() -> Self {
        ParseSession {
            lexer: Lexer::new(""),
            stacks: NodeStacks::new(),
            options: SessionOptions::default(),
            generation: 0,
        }
    }

    #[must_use]
    pub fn with_options(mut self, options: SessionOptions) -> Self {
        self.options = options;
        self
    }

    pub fn options(&self) -> &SessionOptions {
        &self.options
    }

    /// Drop everything held from the previous request.
    pub fn reset(&mut self) {
        self.stacks.reset();
        self.lexer.reset_source("");
    }

    /// Parse `source` for a completion at `cursor`.
    pub fn complete(
        &mut self,
        source: &str,
        cursor: Cursor,
        context: &ReferenceContext,
    ) -> Result<CompletionOutcome, AssistError> {
        self.reset();
        self.generation = self.generation.wrapping_add(1);
        let assist = AssistId::new(NonZeroU64::MIN.saturating_add(self.generation));

        self.lexer.reset_source(source);
        let len = self.lexer.source_len();
        let caret = cursor.caret(len)?;
        let range = context.range(caret, len)?;
        let _session = tracing::debug_span!("complete", caret, %range).entered();
        self.lexer.restrict(range);

        let mut hooks = AssistHooks::new(assist, context.root(range), range.start);
        if let Some(kind) = context.delimiter() {
            hooks.elements_mut().push(kind, ElementInfo::Empty, None);
        }
        let mut scanner = CursorScanner::new(&mut self.lexer, caret, assist);
        let outcome = drive(
            &mut scanner,
            &mut self.stacks,
            hooks,
            self.options,
            context,
            range,
        );
        match &outcome {
            Ok(CompletionOutcome::Completion(found)) => tracing::debug!(
                kind = ?found.node.kind,
                partial = found.node.partial_name(),
                "completion"
            ),
            Ok(CompletionOutcome::Recovered(recovered)) => tracing::debug!(
                rounds = recovered.report.rounds,
                checkpoint = recovered.report.checkpoint,
                "recovered"
            ),
            Ok(CompletionOutcome::InvalidCursorLocation(reason)) => {
                tracing::debug!(?reason, "invalid cursor location");
            }
            Err(error) => tracing::warn!(%error, "completion session failed"),
        }
        self.stacks.reset();
        outcome
    }
}

/// Parse, recovering from stalls, until an outcome is reached.
fn drive(
    scanner: &mut CursorScanner<'_>,
    stacks: &mut NodeStacks,
    mut hooks: AssistHooks,
    options: SessionOptions,
    context: &ReferenceContext,
    range: Span,
) -> Result<CompletionOutcome, AssistError> {
    let whole_unit = matches!(context, ReferenceContext::CompilationUnit);
    let mut goal = context.goal();
    let mut diet = false;
    let mut resume = range.start;
    let mut rounds = 0u32;
    let mut first_stall: Option<ElementStack> = None;

    loop {
        let _round = tracing::debug_span!("round", rounds, resume, ?goal).entered();
        scanner.reset_to(resume);
        let result = Parser::new(&mut *scanner, &mut *stacks, &mut hooks)
            .with_diet(diet)
            .parse(goal);
        if let Some(fault) = hooks.take_fault() {
            return Err(fault);
        }
        let error = match result {
            Ok(()) => {
                hooks.absorb_stacks(stacks, None);
                return Ok(recovered(hooks, first_stall, rounds, true));
            }
            Err(Interrupt::InvalidCursor(reason)) => {
                return Ok(CompletionOutcome::InvalidCursorLocation(reason));
            }
            Err(Interrupt::Found { checkpoint }) => {
                let Some(found) = hooks.take_found() else {
                    return Err(AssistError::CorruptStack {
                        detail: "completion signalled without a node".to_owned(),
                    });
                };
                let tree = options.continue_after_completion.then(|| {
                    hooks.absorb_stacks(stacks, Some(found.node.span.start));
                    hooks.into_tree()
                });
                return Ok(CompletionOutcome::Completion(Completion {
                    node: found.node,
                    context: CompletionContext {
                        elements: found.elements,
                    },
                    tree,
                    checkpoint,
                }));
            }
            Err(Interrupt::Stall(error)) => error,
        };

        tracing::debug!(
            found = ?error.found,
            at = %error.span,
            context = ?error.context,
            "stall"
        );
        hooks.absorb_stacks(stacks, None);
        if first_stall.is_none() {
            first_stall = Some(hooks.elements().clone());
        }
        rounds += 1;
        if rounds > options.max_recovery_rounds {
            tracing::debug!(rounds, "recovery round limit reached");
            return Ok(recovered(hooks, first_stall, rounds, false));
        }

        let mut next = hooks.checkpoint();
        if next <= resume {
            // Nothing new was reduced: step over one token.
            match scanner.token_end_after(resume) {
                Some(end) => next = end,
                None => return Ok(recovered(hooks, first_stall, rounds, false)),
            }
        }
        if next <= resume {
            return Err(AssistError::NonMonotonicRecovery {
                previous: resume,
                next,
            });
        }

        goal = resume_goal(whole_unit, hooks.elements(), hooks.current_element());
        if goal == Goal::Headers {
            prepare_for_headers(hooks.elements_mut());
        } else {
            prepare_for_block_statements(hooks.elements_mut());
        }
        tracing::debug!(checkpoint = next, ?goal, "resume");
        stacks.reset();
        diet = options.diet_after_recovery && goal == Goal::Headers;
        hooks.begin_round();
        resume = next;
    }
}

fn recovered(
    hooks: AssistHooks,
    first_stall: Option<ElementStack>,
    rounds: u32,
    resumable: bool,
) -> CompletionOutcome {
    let elements = first_stall.unwrap_or_else(|| hooks.elements().clone());
    let checkpoint = hooks.checkpoint();
    CompletionOutcome::Recovered(Recovered {
        tree: hooks.into_tree(),
        report: RecoveryReport {
            elements,
            rounds,
            checkpoint,
            resumable,
        },
    })
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    reason = "test assertions use unwrap for clarity"
)]
