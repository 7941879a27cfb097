//! Cursor-aware completion parsing.
//!
//! Given a source buffer, a cursor and the region the source stands for,
//! a [`ParseSession`] determines which syntactic construct the caret sits
//! in. The answer is one of:
//!
//! - a [`CompletionNode`], the partial node built around the text being
//!   typed, with the element context it was found in;
//! - a [`RecoveredTree`] of partial declarations, when the parser stalled
//!   before reaching the caret and had to resume past the damage;
//! - an invalid cursor location, for a caret inside a comment, literal or
//!   unicode escape.
//!
//! # Pieces
//!
//! - [`CursorScanner`]: replaces the word at the caret with the assist
//!   identifier, a token tagged with a per-request [`caret_ir::AssistId`]
//! - [`pending`]: finds the assist identifier among the engine's pending
//!   name groups
//! - [`ElementStack`]: the nesting of types, methods, field initializers,
//!   annotation values, enum constants and call argument lists
//! - reduction hooks: keep the element stack in step with the engine and
//!   build the completion node
//! - recovery: folds reduced nodes into the recovered tree and picks the
//!   goal to resume with

mod element;
mod error;
mod hooks;
mod node;
mod options;
pub mod pending;
mod recovered;
mod recovery;
mod scanner;
mod session;

pub use element::{ElementEntry, ElementInfo, ElementKind, ElementKinds, ElementStack};
pub use error::AssistError;
pub use node::{CompletionKind, CompletionNode, CompletionPayload, ModuleRole};
pub use options::SessionOptions;
pub use recovered::{NodeId, RecoveredElement, RecoveredNode, RecoveredTree};
pub use scanner::CursorScanner;
pub use session::{
    Completion, CompletionContext, CompletionOutcome, Cursor, ParseSession, Recovered,
    RecoveryReport, ReferenceContext,
};
