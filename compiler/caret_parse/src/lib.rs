//! Recursive-descent grammar engine for a practical Java subset.
//!
//! The engine keeps its intermediate results on explicit [`NodeStacks`]
//! instead of the call stack wherever a partial result matters after a
//! stall: open type, method and initializer containers, reduced
//! parameters, statements of open blocks, and pending dotted names all
//! live there. A [`ReduceHooks`] implementation observes every consumed
//! token, every reduction and every name group the engine is about to
//! consume, and may stop the parse by claiming a name group.
//!
//! The engine never recovers on its own. Any unexpected token ends the
//! parse with [`Interrupt::Stall`], leaving the stacks as they were at
//! that point.

mod error;
mod grammar;
mod hooks;
mod source;
mod stack;
mod stacks;
mod token_set;

pub use error::{ErrorContext, ParseError};
pub use grammar::Parser;
pub use hooks::{Flow, Goal, NameSite, NoHooks, ReduceHooks, Rule};
pub use source::TokenSource;
pub use stack::ensure_sufficient_stack;
pub use stacks::{BlockStart, NodeStacks};
pub use token_set::TokenSet;

use caret_ir::{AstNode, InvalidCursorReason};
use caret_lexer::Lexer;

/// Why a parse stopped before completing its goal.
#[derive(Clone, Eq, PartialEq, Debug)]
pub enum Interrupt {
    /// No production accepts the current token.
    Stall(ParseError),
    /// A hook claimed a pending name group.
    Found { checkpoint: u32 },
    /// The token source refused to continue.
    InvalidCursor(InvalidCursorReason),
}

impl From<InvalidCursorReason> for Interrupt {
    fn from(reason: InvalidCursorReason) -> Self {
        Interrupt::InvalidCursor(reason)
    }
}

impl From<ParseError> for Interrupt {
    fn from(error: ParseError) -> Self {
        Interrupt::Stall(error)
    }
}

pub type PResult<T> = Result<T, Interrupt>;

/// Parse a whole compilation unit without hooks.
///
/// Returns the top-level nodes (package, imports, module and types).
pub fn parse_compilation_unit(source: &str) -> Result<Vec<AstNode>, ParseError> {
    let mut lexer = Lexer::new(source);
    let mut stacks = NodeStacks::new();
    let mut hooks = NoHooks;
    let mut parser = Parser::new(&mut lexer, &mut stacks, &mut hooks);
    match parser.parse(Goal::CompilationUnit) {
        Ok(()) => Ok(std::mem::take(&mut stacks.ast)),
        Err(Interrupt::Stall(error)) => Err(error),
        // A plain lexer has no cursor and no hook claims names.
        Err(Interrupt::Found { .. } | Interrupt::InvalidCursor(_)) => Ok(Vec::new()),
    }
}

#[cfg(test)]
mod tests;
