//! Failures of a completion session.
//!
//! Grammar stalls are not errors: they feed recovery. An invalid cursor
//! location is a normal outcome, and so is recovery cut short by the
//! round limit. What remains are bad requests and recovery that cannot
//! make progress.

use caret_ir::Span;

#[derive(Clone, Eq, PartialEq, Debug, thiserror::Error)]
pub enum AssistError {
    #[error("cursor {cursor} is outside a source of {len} bytes")]
    CursorOutOfRange { cursor: i64, len: u32 },

    #[error("reference context {span} is outside a source of {len} bytes")]
    ContextOutOfRange { span: Span, len: u32 },

    #[error("recovery would resume at {next}, before the previous checkpoint {previous}")]
    NonMonotonicRecovery { previous: u32, next: u32 },

    #[error("pending name stacks are inconsistent: {detail}")]
    CorruptStack { detail: String },
}
