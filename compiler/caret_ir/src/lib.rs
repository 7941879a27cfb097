//! Shared vocabulary of the caret completion parser.
//!
//! - [`Span`]: byte ranges into the source buffer
//! - [`Token`] / [`TokenKind`]: the Java lexicon, plus the [`AssistId`]
//!   carried by the single synthetic identifier at the caret
//! - [`ast`]: nodes reduced by the grammar engine

pub mod ast;
mod span;
mod token;

pub use ast::{AstNode, Ident};
pub use span::Span;
pub use token::{AssistId, InvalidCursorReason, Token, TokenKind, TOKEN_KIND_COUNT};
